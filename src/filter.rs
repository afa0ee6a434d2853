//! Criteria for selecting annotated class elements.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

pub trait AnnotationFilter: Send + Sync {
    /// Returns true if classes of the given package should be scanned.
    /// The default package is `""`.
    fn accept_package(&self, package: &str) -> bool;

    /// If the raw type name (for example `Ljava/lang/Deprecated;`) identifies
    /// an accepted annotation, returns the annotation name to report.
    fn accept_annotation<'a>(&'a self, raw_type_name: &'a str) -> Option<Cow<'a, str>>;
}

/// An [`AnnotationFilter`] for a declared set of annotations, optionally
/// restricted to classes of specific packages.
///
/// With no packages declared, classes of every package are accepted. With no
/// annotations declared, nothing is reported.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    annotations: HashMap<String, String>,
    packages: HashSet<String>,
}

impl PackageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an annotation to find, by its fully qualified class name.
    /// Nested annotation types use `$`, as in `org.example.Outer$Marker`.
    pub fn annotation(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.annotations.insert(raw_type_name(&name), name);
        self
    }

    pub fn annotations<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |filter, name| filter.annotation(name))
    }

    /// Restricts the scan to classes of the given package. Subpackages are
    /// not included.
    pub fn in_package(mut self, name: impl Into<String>) -> Self {
        self.packages.insert(name.into());
        self
    }

    pub fn in_packages<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |filter, name| filter.in_package(name))
    }

    pub fn annotation_names(&self) -> impl Iterator<Item = &str> {
        self.annotations.values().map(String::as_str)
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    /// Rejects empty annotation names and package names with whitespace.
    /// The empty package name selects the default package.
    pub fn validate(&self) -> Result<()> {
        if self.annotations.values().any(|name| name.trim().is_empty()) {
            return Err(Error::Config("annotation name is empty".to_string()));
        }
        validate_packages(&self.packages)
    }
}

impl AnnotationFilter for PackageFilter {
    fn accept_package(&self, package: &str) -> bool {
        self.packages.is_empty() || self.packages.contains(package)
    }

    fn accept_annotation<'a>(&'a self, raw_type_name: &'a str) -> Option<Cow<'a, str>> {
        self.annotations
            .get(raw_type_name)
            .map(|name| Cow::Borrowed(name.as_str()))
    }
}

/// Reports every annotation, named by its class name, optionally restricted
/// to classes of specific packages.
#[derive(Debug, Clone, Default)]
pub struct AllAnnotations {
    packages: HashSet<String>,
}

impl AllAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_package(mut self, name: impl Into<String>) -> Self {
        self.packages.insert(name.into());
        self
    }

    pub fn in_packages<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |filter, name| filter.in_package(name))
    }

    pub fn validate(&self) -> Result<()> {
        validate_packages(&self.packages)
    }
}

impl AnnotationFilter for AllAnnotations {
    fn accept_package(&self, package: &str) -> bool {
        self.packages.is_empty() || self.packages.contains(package)
    }

    fn accept_annotation<'a>(&'a self, raw_type_name: &'a str) -> Option<Cow<'a, str>> {
        Some(Cow::Owned(type_name(raw_type_name)))
    }
}

fn validate_packages(packages: &HashSet<String>) -> Result<()> {
    match packages.iter().find(|name| name.chars().any(char::is_whitespace)) {
        Some(name) => Err(Error::Config(format!("invalid package name: {name:?}"))),
        None => Ok(()),
    }
}

pub fn raw_type_name(class_name: &str) -> String {
    format!("L{};", class_name.replace('.', "/"))
}

/// Returns the class name for a type descriptor, the inverse of
/// [`raw_type_name`].
pub fn type_name(raw_type_name: &str) -> String {
    raw_type_name
        .strip_prefix('L')
        .and_then(|name| name.strip_suffix(';'))
        .unwrap_or(raw_type_name)
        .replace('/', ".")
}

pub fn class_package(class_name: &str) -> &str {
    class_name.rfind('.').map_or("", |i| &class_name[..i])
}

pub fn entry_package(entry_name: &str) -> String {
    entry_name
        .rfind('/')
        .map_or_else(String::new, |i| entry_name[..i].replace('/', "."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_type_name_uses_descriptor_form() {
        assert_eq!(raw_type_name("java.lang.Deprecated"), "Ljava/lang/Deprecated;");
        assert_eq!(raw_type_name("a.Outer$Inner"), "La/Outer$Inner;");
        assert_eq!(type_name("La/Outer$Inner;"), "a.Outer$Inner");
        assert_eq!(type_name("Ljava/lang/Deprecated;"), "java.lang.Deprecated");
    }

    #[test]
    fn package_names() {
        assert_eq!(class_package("org.example.Sample"), "org.example");
        assert_eq!(class_package("Sample"), "");
        assert_eq!(entry_package("org/example/Sample.class"), "org.example");
        assert_eq!(entry_package("Sample.class"), "");
    }

    #[test]
    fn accepts_every_package_when_unrestricted() {
        let filter = PackageFilter::new().annotation("java.lang.Deprecated");
        assert!(filter.accept_package("org.example"));
        assert!(filter.accept_package(""));
    }

    #[test]
    fn accepts_only_declared_packages() {
        let filter = PackageFilter::new().in_packages(["org.example", "org.other"]);
        assert!(filter.accept_package("org.example"));
        assert!(!filter.accept_package("org.example.sub"));
        assert!(!filter.accept_package("org"));
        assert!(!filter.accept_package(""));
    }

    #[test]
    fn translates_accepted_descriptors() {
        let filter = PackageFilter::new().annotations(["java.lang.Deprecated", "org.example.Marker"]);
        assert_eq!(
            filter.accept_annotation("Ljava/lang/Deprecated;").as_deref(),
            Some("java.lang.Deprecated")
        );
        assert_eq!(filter.accept_annotation("Lorg/example/Other;"), None);
        assert_eq!(PackageFilter::new().accept_annotation("Ljava/lang/Deprecated;"), None);
    }

    #[test]
    fn all_annotations_reports_class_names() {
        let filter = AllAnnotations::new();
        assert_eq!(
            filter.accept_annotation("Lorg/example/Outer$Marker;").as_deref(),
            Some("org.example.Outer$Marker")
        );
        assert!(filter.accept_package("org.example"));
        assert!(!AllAnnotations::new().in_package("a").accept_package("b"));
    }

    #[test]
    fn validate_rejects_empty_annotation_names() {
        assert!(PackageFilter::new().annotation("a.B").validate().is_ok());
        assert!(matches!(
            PackageFilter::new().annotation(" ").validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PackageFilter::new().in_package("org. example").validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn default_package_can_be_selected() {
        let filter = PackageFilter::new().annotation("a.B").in_package("");
        assert!(filter.validate().is_ok());
        assert!(filter.accept_package(""));
        assert!(!filter.accept_package("org.example"));
    }
}
