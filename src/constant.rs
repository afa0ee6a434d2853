//! The constant pool of a class file.
//!
//! Only text entries and the class/string entries that point at them are kept;
//! every other entry is skipped by its fixed width. Text is decoded when it is
//! resolved, not when the pool is read.

use std::borrow::Cow;

use crate::cursor::{ByteCursor, decode_modified_utf8};
use crate::error::DecodeError;

pub const CP_UTF8: u8 = 1;
pub const CP_INTEGER: u8 = 3;
pub const CP_FLOAT: u8 = 4;
pub const CP_LONG: u8 = 5;
pub const CP_DOUBLE: u8 = 6;
pub const CP_CLASS: u8 = 7;
pub const CP_STRING: u8 = 8;
pub const CP_FIELD_REF: u8 = 9;
pub const CP_METHOD_REF: u8 = 10;
pub const CP_INTERFACE_METHOD_REF: u8 = 11;
pub const CP_NAME_AND_TYPE: u8 = 12;
pub const CP_METHOD_HANDLE: u8 = 15;
pub const CP_METHOD_TYPE: u8 = 16;
pub const CP_DYNAMIC: u8 = 17;
pub const CP_INVOKE_DYNAMIC: u8 = 18;
pub const CP_MODULE: u8 = 19;
pub const CP_PACKAGE: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant<'a> {
    /// Slot 0, and the second slot of a long or double.
    Unused,
    /// Undecoded modified UTF-8 bytes.
    Utf8(&'a [u8]),
    /// A class or string entry: the index of its text.
    Ref(u16),
    Other,
}

#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    entries: Vec<Constant<'a>>,
}

impl<'a> ConstantPool<'a> {
    pub fn read(cursor: &mut ByteCursor<'a>) -> Result<Self, DecodeError> {
        let count = usize::from(cursor.u16()?);
        let mut entries = vec![Constant::Unused; count.max(1)];

        let mut index = 1;
        while index < count {
            let tag = cursor.u8()?;
            let mut slots = 1;
            entries[index] = match tag {
                CP_UTF8 => {
                    let len = usize::from(cursor.u16()?);
                    Constant::Utf8(cursor.take(len)?)
                }
                // The referenced text may come later in the pool.
                CP_CLASS | CP_STRING => Constant::Ref(cursor.u16()?),
                CP_METHOD_TYPE | CP_MODULE | CP_PACKAGE => {
                    cursor.skip(2)?;
                    Constant::Other
                }
                CP_METHOD_HANDLE => {
                    cursor.skip(3)?;
                    Constant::Other
                }
                CP_INTEGER | CP_FLOAT | CP_FIELD_REF | CP_METHOD_REF
                | CP_INTERFACE_METHOD_REF | CP_NAME_AND_TYPE | CP_DYNAMIC
                | CP_INVOKE_DYNAMIC => {
                    cursor.skip(4)?;
                    Constant::Other
                }
                CP_LONG | CP_DOUBLE => {
                    cursor.skip(8)?;
                    slots = 2;
                    Constant::Other
                }
                _ => return Err(DecodeError::UnknownConstantTag { tag, index }),
            };
            index += slots;
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<Constant<'a>, DecodeError> {
        if index == 0 {
            return Err(DecodeError::InvalidConstantIndex(index));
        }
        self.entries
            .get(usize::from(index))
            .copied()
            .ok_or(DecodeError::InvalidConstantIndex(index))
    }

    /// Resolves the text at `index`, following one class or string reference.
    pub fn text(&self, index: u16) -> Result<Cow<'a, str>, DecodeError> {
        match self.get(index)? {
            Constant::Utf8(bytes) => decode_modified_utf8(bytes),
            Constant::Ref(target) => match self.get(target)? {
                Constant::Utf8(bytes) => decode_modified_utf8(bytes),
                _ => Err(DecodeError::NotText(target)),
            },
            _ => Err(DecodeError::NotText(index)),
        }
    }

    /// Reads a two-byte constant index from the cursor and resolves its text.
    pub fn read_text(&self, cursor: &mut ByteCursor<'a>) -> Result<Cow<'a, str>, DecodeError> {
        self.text(cursor.u16()?)
    }
}
