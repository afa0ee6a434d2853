//! Reads attribute lists, reporting the annotations they declare.
//!
//! Attributes other than `RuntimeVisibleAnnotations` and
//! `RuntimeInvisibleAnnotations` are skipped by their declared length.
//! Annotation element values are never interpreted, only stepped over.

use crate::constant::ConstantPool;
use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::filter::AnnotationFilter;
use crate::model::{Annotated, ElementKind, Origin};

pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

/// Element values nested deeper than this are rejected.
pub const MAX_VALUE_DEPTH: usize = 256;

// Element value tags
const BYTE: u8 = b'B';
const CHAR: u8 = b'C';
const DOUBLE: u8 = b'D';
const FLOAT: u8 = b'F';
const INT: u8 = b'I';
const LONG: u8 = b'J';
const SHORT: u8 = b'S';
const BOOLEAN: u8 = b'Z';
const STRING: u8 = b's';
const ENUM: u8 = b'e';
const CLASS: u8 = b'c';
const ANNOTATION: u8 = b'@';
const ARRAY: u8 = b'[';

/// The class element whose attributes are being read.
#[derive(Debug, Clone, Copy)]
pub struct ElementScope<'s> {
    pub class_name: &'s str,
    pub kind: ElementKind,
    pub element: Option<&'s str>,
    pub origin: &'s Origin,
}

impl ElementScope<'_> {
    fn annotated(&self, annotation: &str, runtime: bool) -> Annotated {
        Annotated::new(
            self.kind,
            annotation,
            self.class_name,
            self.element,
            runtime,
            self.origin.clone(),
        )
    }
}

/// Reads a counted attribute list, appending accepted annotations to `found`.
pub fn read_attributes<'a, F>(
    cursor: &mut ByteCursor<'a>,
    constants: &ConstantPool<'a>,
    filter: &F,
    scope: ElementScope<'_>,
    found: &mut Vec<Annotated>,
) -> Result<(), DecodeError>
where
    F: AnnotationFilter + ?Sized,
{
    let count = cursor.u16()?;
    for _ in 0..count {
        let name = constants.read_text(cursor)?;
        let length = cursor.u32()? as usize;
        let runtime = match name.as_ref() {
            RUNTIME_VISIBLE_ANNOTATIONS => true,
            RUNTIME_INVISIBLE_ANNOTATIONS => false,
            _ => {
                cursor.skip(length)?;
                continue;
            }
        };

        let mut body = cursor.bounded(length)?;
        read_annotations(&mut body, constants, filter, scope, runtime, found)?;
    }
    Ok(())
}

fn read_annotations<'a, F>(
    cursor: &mut ByteCursor<'a>,
    constants: &ConstantPool<'a>,
    filter: &F,
    scope: ElementScope<'_>,
    runtime: bool,
    found: &mut Vec<Annotated>,
) -> Result<(), DecodeError>
where
    F: AnnotationFilter + ?Sized,
{
    let count = cursor.u16()?;
    for _ in 0..count {
        let raw_type_name = constants.read_text(cursor)?;
        skip_element_value_pairs(cursor, 0)?;

        if let Some(annotation) = filter.accept_annotation(&raw_type_name) {
            found.push(scope.annotated(&annotation, runtime));
        }
    }
    Ok(())
}

fn skip_element_value_pairs(cursor: &mut ByteCursor<'_>, depth: usize) -> Result<(), DecodeError> {
    let count = cursor.u16()?;
    for _ in 0..count {
        cursor.skip(2)?; // element name
        skip_element_value(cursor, depth)?;
    }
    Ok(())
}

fn skip_element_value(cursor: &mut ByteCursor<'_>, depth: usize) -> Result<(), DecodeError> {
    if depth >= MAX_VALUE_DEPTH {
        return Err(DecodeError::TooDeep(MAX_VALUE_DEPTH));
    }

    let tag = cursor.u8()?;
    match tag {
        BYTE | CHAR | DOUBLE | FLOAT | INT | LONG | SHORT | BOOLEAN | STRING | CLASS => {
            cursor.skip(2)?;
        }
        ENUM => cursor.skip(4)?, // type name, constant name
        ANNOTATION => {
            cursor.skip(2)?; // type name
            skip_element_value_pairs(cursor, depth + 1)?;
        }
        ARRAY => {
            let count = cursor.u16()?;
            for _ in 0..count {
                skip_element_value(cursor, depth + 1)?;
            }
        }
        _ => return Err(DecodeError::UnknownValueTag(tag)),
    }
    Ok(())
}
