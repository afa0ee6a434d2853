//! Sequential big-endian reads over a borrowed class file buffer.

use std::borrow::Cow;

use crate::error::DecodeError;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data` within the class file.
    base: usize,
    /// Set for a cursor limited to one attribute body.
    declared: Option<usize>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
            declared: None,
        }
    }

    /// Offset of the next byte within the class file.
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.overrun())?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Takes the next `len` bytes as a cursor of their own. Reading past
    /// them is an [`DecodeError::AttributeOverrun`], not a truncation.
    pub fn bounded(&mut self, len: usize) -> Result<ByteCursor<'a>, DecodeError> {
        let base = self.position();
        let data = self.take(len)?;
        Ok(ByteCursor {
            data,
            pos: 0,
            base,
            declared: Some(len),
        })
    }

    fn overrun(&self) -> DecodeError {
        match self.declared {
            Some(declared) => DecodeError::AttributeOverrun {
                offset: self.base,
                declared,
            },
            None => DecodeError::Truncated(self.base + self.data.len()),
        }
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Decodes the "modified UTF-8" encoding used for class file text.
///
/// Text that is also valid standard UTF-8 without NULs or four-byte forms is
/// borrowed as is. Otherwise the bytes are decoded as UTF-16 code units
/// (`C0 80` for NUL, surrogate pairs encoded separately); unpaired surrogates
/// become U+FFFD.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<Cow<'_, str>, DecodeError> {
    if let Ok(text) = std::str::from_utf8(bytes)
        && !bytes.iter().any(|b| *b == 0 || *b >= 0xF0)
    {
        return Ok(Cow::Borrowed(text));
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = match b {
            0x01..=0x7F => (u16::from(b), 1),
            0xC0..=0xDF => {
                let b2 = continuation(bytes, i + 1)?;
                ((u16::from(b & 0x1F) << 6) | b2, 2)
            }
            0xE0..=0xEF => {
                let b2 = continuation(bytes, i + 1)?;
                let b3 = continuation(bytes, i + 2)?;
                ((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3, 3)
            }
            _ => return Err(DecodeError::InvalidText),
        };
        units.push(unit);
        i += width;
    }

    Ok(Cow::Owned(String::from_utf16_lossy(&units)))
}

fn continuation(bytes: &[u8], i: usize) -> Result<u16, DecodeError> {
    bytes
        .get(i)
        .filter(|b| *b & 0xC0 == 0x80)
        .map(|b| u16::from(b & 0x3F))
        .ok_or(DecodeError::InvalidText)
}
