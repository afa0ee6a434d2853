//! # annotation-finder
//!
//! Finds the classes, methods and fields that carry given Java annotations by
//! reading compiled class files directly, without loading them.
//!
//! ## Architecture
//!
//! - **cursor**: Bounds-checked big-endian reads and modified UTF-8 text
//! - **constant**: Constant pool indexing and text resolution
//! - **annotation**: Attribute lists and annotation entries, values skipped
//! - **classfile**: Decoding of one class, with early package rejection
//! - **filter**: Which packages are scanned and which annotations reported
//! - **model**: Annotated elements and where they were found
//! - **flat_map**: Lazy flattening with a pre-filter, used by every traversal
//! - **scan**: Class file, directory and JAR archive roots
//! - **classpath**: Ordered root set and the combined result sequence
//! - **finder**: Builder tying a filter to a class path
//! - **error**: Error types

pub mod annotation;
pub mod classfile;
pub mod classpath;
pub mod cli;
pub mod config;
pub mod constant;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod finder;
pub mod flat_map;
pub mod model;
pub mod scan;

#[cfg(test)]
mod testing;

pub use classpath::{Annotations, ClassPath, ErrorPolicy};
pub use error::{DecodeError, Error, Result};
pub use filter::{AllAnnotations, AnnotationFilter, PackageFilter};
pub use finder::Finder;
pub use model::{Annotated, ElementKind, Origin};
pub use scan::{Root, ScanStats, ScanSummary, Scanner};
