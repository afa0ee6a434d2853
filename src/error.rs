//! Error types for class file decoding and class path traversal.
//!
//! Failures below the unit level are [`DecodeError`]s: they know nothing about
//! where the bytes came from. Once a unit or root is known, they are wrapped
//! into an [`Error`] that carries the [`Origin`] of the offending data.

use std::io;
use thiserror::Error;

use crate::model::Origin;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The data is not a valid class file.
    ///
    /// Always fatal for the unit being decoded; the unit contributes no
    /// annotated elements.
    #[error("Malformed class data in {origin}: {source}")]
    Format {
        origin: Origin,
        #[source]
        source: DecodeError,
    },

    #[error("Can't read {origin}: {source}")]
    Io {
        origin: Origin,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn io(origin: Origin, source: io::Error) -> Self {
        Error::Io { origin, source }
    }

    pub fn origin(&self) -> Option<&Origin> {
        match self {
            Error::Format { origin, .. } | Error::Io { origin, .. } => Some(origin),
            Error::Config(_) => None,
        }
    }
}

/// Structural failures found while walking the bytes of one class file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a class file (magic 0x{0:08X})")]
    BadMagic(u32),

    #[error("unknown tag {tag} for constant #{index}")]
    UnknownConstantTag { tag: u8, index: usize },

    #[error("constant index #{0} is out of range")]
    InvalidConstantIndex(u16),

    #[error("constant #{0} does not resolve to text")]
    NotText(u16),

    #[error("not a valid annotation element value tag: 0x{0:02x}")]
    UnknownValueTag(u8),

    #[error("annotation element values nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("invalid modified UTF-8 text")]
    InvalidText,

    #[error("attribute at offset {offset} runs past its declared length of {declared} bytes")]
    AttributeOverrun { offset: usize, declared: usize },

    /// The class data ends at the given offset before the structure does.
    #[error("unexpected end of class data at offset {0}")]
    Truncated(usize),
}

impl DecodeError {
    /// Attaches the origin of the decoded unit.
    ///
    /// Truncated data is reported as an I/O failure of the source, everything
    /// else as a format failure.
    pub fn at(self, origin: Origin) -> Error {
        match self {
            DecodeError::Truncated(offset) => Error::Io {
                origin,
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("class data ends at offset {offset}"),
                ),
            },
            source => Error::Format { origin, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn truncation_is_reported_as_io() {
        let origin = Origin::File(PathBuf::from("A.class"));
        let err = DecodeError::Truncated(12).at(origin.clone());
        match err {
            Error::Io { origin: o, source } => {
                assert_eq!(o, origin);
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn format_error_names_origin() {
        let origin = Origin::File(PathBuf::from("A.class"));
        let err = DecodeError::BadMagic(0xDEADBEEF).at(origin);
        assert!(matches!(err, Error::Format { .. }));
        assert_eq!(
            err.to_string(),
            "Malformed class data in A.class: not a class file (magic 0xDEADBEEF)"
        );
        assert!(err.origin().is_some());
    }
}
