use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Class,
    Method,
    Field,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Class => "class",
            ElementKind::Method => "method",
            ElementKind::Field => "field",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    File(PathBuf),
    Entry { archive: PathBuf, entry: String },
}

impl Origin {
    pub fn file(path: &Path) -> Self {
        Origin::File(path.to_path_buf())
    }

    pub fn entry(archive: &Path, entry: &str) -> Self {
        Origin::Entry {
            archive: archive.to_path_buf(),
            entry: entry.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Origin::File(path) => path,
            Origin::Entry { archive, .. } => archive,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Entry { archive, entry } => write!(f, "{}!/{entry}", archive.display()),
        }
    }
}

/// A class element found to reference an accepted annotation.
///
/// One value is created for each annotation occurrence found while decoding
/// a class. Equality and hashing cover every field, including the origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Annotated {
    kind: ElementKind,
    annotation: String,
    class_name: String,
    element: Option<String>,
    runtime: bool,
    origin: Origin,
}

impl Annotated {
    pub fn class(annotation: &str, class_name: &str, runtime: bool, origin: Origin) -> Self {
        Self::new(ElementKind::Class, annotation, class_name, None, runtime, origin)
    }

    pub fn method(
        annotation: &str,
        class_name: &str,
        method: &str,
        runtime: bool,
        origin: Origin,
    ) -> Self {
        Self::new(
            ElementKind::Method,
            annotation,
            class_name,
            Some(method),
            runtime,
            origin,
        )
    }

    pub fn field(
        annotation: &str,
        class_name: &str,
        field: &str,
        runtime: bool,
        origin: Origin,
    ) -> Self {
        Self::new(
            ElementKind::Field,
            annotation,
            class_name,
            Some(field),
            runtime,
            origin,
        )
    }

    pub(crate) fn new(
        kind: ElementKind,
        annotation: &str,
        class_name: &str,
        element: Option<&str>,
        runtime: bool,
        origin: Origin,
    ) -> Self {
        Self {
            kind,
            annotation: annotation.to_string(),
            class_name: class_name.to_string(),
            element: element.map(str::to_string),
            runtime,
            origin,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the name of the referenced annotation, as it was declared to
    /// the filter.
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn simple_annotation_name(&self) -> &str {
        self.annotation
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(&self.annotation)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the method or field name. Absent for class annotations.
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Returns true if the annotation is retained at runtime, false if it is
    /// only recorded in the class file.
    pub fn is_runtime(&self) -> bool {
        self.runtime
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_class(&self) -> bool {
        self.kind == ElementKind::Class
    }

    pub fn is_method(&self) -> bool {
        self.kind == ElementKind::Method
    }

    pub fn is_field(&self) -> bool {
        self.kind == ElementKind::Field
    }
}

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {} {}", self.simple_annotation_name(), self.kind, self.class_name)?;
        if let Some(element) = &self.element {
            write!(f, ".{element}")?;
        }
        let retention = if self.runtime { "runtime" } else { "class" };
        write!(f, " ({retention}, {})", self.origin)
    }
}
