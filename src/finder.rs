use std::path::PathBuf;
use std::sync::Arc;

use crate::classpath::{Annotations, ClassPath, ErrorPolicy};
use crate::error::Result;
use crate::filter::{AllAnnotations, AnnotationFilter, PackageFilter};

/// Finds the classes, methods and fields carrying given annotations.
///
/// ```no_run
/// use annotation_finder::Finder;
///
/// let found = Finder::new()
///     .annotation("java.lang.Deprecated")
///     .in_package(["org.example"])
///     .in_classes(["target/classes", "lib/example.jar"])
///     .find()?;
/// for annotated in found {
///     println!("{}", annotated?);
/// }
/// # Ok::<(), annotation_finder::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Finder {
    filter: PackageFilter,
    all: bool,
    class_path: ClassPath,
    policy: ErrorPolicy,
}

impl Finder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotation(mut self, name: impl Into<String>) -> Self {
        self.filter = self.filter.annotation(name);
        self
    }

    pub fn annotations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.annotations(names);
        self
    }

    /// Reports every annotation instead of the named ones.
    pub fn all_annotations(mut self) -> Self {
        self.all = true;
        self
    }

    pub fn in_package<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.in_packages(names);
        self
    }

    pub fn in_classes<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.class_path.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn in_system_class_path(mut self) -> Self {
        self.class_path.extend(ClassPath::system().roots().iter().cloned());
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn filter(&self) -> &PackageFilter {
        &self.filter
    }

    pub fn is_all_annotations(&self) -> bool {
        self.all
    }

    pub fn class_path(&self) -> &ClassPath {
        &self.class_path
    }

    /// Starts the search. Class data is only read as the returned sequence is
    /// pulled.
    pub fn find(&self) -> Result<Annotations> {
        let filter: Arc<dyn AnnotationFilter> = if self.all {
            let all = AllAnnotations::new().in_packages(self.filter.package_names());
            all.validate()?;
            Arc::new(all)
        } else {
            self.filter.validate()?;
            Arc::new(self.filter.clone())
        };
        Ok(self.class_path.scan(filter, self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn builds_filter_and_class_path() {
        let finder = Finder::new()
            .annotation("java.lang.Deprecated")
            .in_package(["org.example"])
            .in_classes(["lib/a.jar", "classes", "lib/a.jar"]);

        assert_eq!(
            finder.filter().accept_annotation("Ljava/lang/Deprecated;").as_deref(),
            Some("java.lang.Deprecated")
        );
        assert!(finder.filter().accept_package("org.example"));
        assert!(!finder.filter().accept_package("org.other"));
        assert_eq!(finder.class_path().len(), 2);
    }

    #[test]
    fn empty_annotation_name_is_a_config_error() {
        let result = Finder::new().annotation(" ").in_classes(["classes"]).find();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn all_annotations_ignores_named_annotations() {
        let finder = Finder::new().annotation(" ").all_annotations();
        assert!(finder.is_all_annotations());
        assert!(finder.find().is_ok());
    }

    #[test]
    fn empty_class_path_finds_nothing() {
        let mut found = Finder::new().annotation("java.lang.Deprecated").find().unwrap();
        assert!(found.next().is_none());
    }
}
