//! Decodes one compiled class, reporting its annotated elements.
//!
//! The class file is walked in order: magic, version, constant pool, access
//! flags and class name. If the filter rejects the class package, decoding
//! stops there. Otherwise the super class and interfaces are skipped, and the
//! attributes of each field, each method and finally the class itself are
//! read for annotations.

use tracing::trace;

use crate::annotation::{ElementScope, read_attributes};
use crate::constant::ConstantPool;
use crate::cursor::ByteCursor;
use crate::error::{DecodeError, Result};
use crate::filter::{AnnotationFilter, class_package};
use crate::model::{Annotated, ElementKind, Origin};

pub const MAGIC: u32 = 0xCAFEBABE;
pub const CLASS_SUFFIX: &str = ".class";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassScan {
    pub class_name: String,
    /// False if the class package was rejected by the filter.
    pub accepted: bool,
    pub fields_scanned: usize,
    pub methods_scanned: usize,
    /// Accepted annotations in declaration order: fields, then methods, then
    /// the class itself.
    pub annotated: Vec<Annotated>,
}

/// Decodes the class file in `bytes`, which came from `origin`.
///
/// A failure leaves nothing behind: either all annotated elements of the
/// class are returned or an error naming `origin` is.
pub fn scan_class<F>(bytes: &[u8], filter: &F, origin: &Origin) -> Result<ClassScan>
where
    F: AnnotationFilter + ?Sized,
{
    decode(bytes, filter, origin).map_err(|e| e.at(origin.clone()))
}

fn decode<F>(bytes: &[u8], filter: &F, origin: &Origin) -> std::result::Result<ClassScan, DecodeError>
where
    F: AnnotationFilter + ?Sized,
{
    let mut cursor = ByteCursor::new(bytes);

    let magic = cursor.u32()?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }
    cursor.skip(4)?; // minor, major version

    let constants = ConstantPool::read(&mut cursor)?;
    cursor.skip(2)?; // access flags

    let class_name = constants.read_text(&mut cursor)?.replace('/', ".");
    let mut scan = ClassScan {
        class_name,
        ..ClassScan::default()
    };

    if !filter.accept_package(class_package(&scan.class_name)) {
        trace!(class = %scan.class_name, "package not accepted");
        return Ok(scan);
    }
    scan.accepted = true;

    cursor.skip(2)?; // super class
    let interfaces = usize::from(cursor.u16()?);
    cursor.skip(interfaces * 2)?;

    for kind in [ElementKind::Field, ElementKind::Method] {
        let count = cursor.u16()?;
        for _ in 0..count {
            cursor.skip(2)?; // access flags
            let name = constants.read_text(&mut cursor)?;
            cursor.skip(2)?; // descriptor

            let scope = ElementScope {
                class_name: &scan.class_name,
                kind,
                element: Some(name.as_ref()),
                origin,
            };
            read_attributes(&mut cursor, &constants, filter, scope, &mut scan.annotated)?;

            match kind {
                ElementKind::Field => scan.fields_scanned += 1,
                _ => scan.methods_scanned += 1,
            }
        }
    }

    let scope = ElementScope {
        class_name: &scan.class_name,
        kind: ElementKind::Class,
        element: None,
        origin,
    };
    read_attributes(&mut cursor, &constants, filter, scope, &mut scan.annotated)?;

    trace!(
        class = %scan.class_name,
        annotated = scan.annotated.len(),
        "decoded class"
    );
    Ok(scan)
}
