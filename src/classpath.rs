//! The ordered set of roots to search, and the sequence of annotated elements
//! found across all of them.

use std::env;
use std::ffi::OsStr;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::AnnotationFilter;
use crate::flat_map::FlatMap;
use crate::model::Annotated;
use crate::scan::{AnnotatedIter, Root, ScanStats, Scanner};

pub const CLASSPATH_VAR: &str = "CLASSPATH";

/// Class path roots in the order they were added, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPath {
    roots: Vec<PathBuf>,
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a platform search path such as `lib/a.jar:classes`. Empty
    /// elements are ignored.
    pub fn from_search_path(search_path: impl AsRef<OsStr>) -> Self {
        env::split_paths(search_path.as_ref())
            .filter(|path| !path.as_os_str().is_empty())
            .collect()
    }

    pub fn system() -> Self {
        env::var_os(CLASSPATH_VAR)
            .map(Self::from_search_path)
            .unwrap_or_default()
    }

    pub fn push(&mut self, root: impl Into<PathBuf>) -> bool {
        let root = root.into();
        if self.roots.contains(&root) {
            return false;
        }
        self.roots.push(root);
        true
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Scans every root in order. Nothing is read until the returned
    /// sequence is pulled.
    pub fn scan(
        &self,
        filter: Arc<dyn AnnotationFilter>,
        policy: ErrorPolicy,
    ) -> Annotations {
        let scanner = Scanner::new(filter);
        let stats = scanner.stats().clone();
        let roots = self.roots.clone().into_iter().filter_map(|path| {
            let root = Root::classify(&path);
            if root.is_none() {
                debug!(root = %path.display(), "skipping unsupported root");
            }
            root
        });
        let inner = FlatMap::new(roots, move |root| scanner.scan_root(root));
        Annotations::new(Box::new(inner), policy, stats)
    }
}

impl Extend<PathBuf> for ClassPath {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, roots: I) {
        for root in roots {
            self.push(root);
        }
    }
}

impl FromIterator<PathBuf> for ClassPath {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(roots: I) -> Self {
        let mut class_path = Self::new();
        class_path.extend(roots);
        class_path
    }
}

impl<'a> FromIterator<&'a Path> for ClassPath {
    fn from_iter<I: IntoIterator<Item = &'a Path>>(roots: I) -> Self {
        roots.into_iter().map(Path::to_path_buf).collect()
    }
}

/// What to do when a class file or root cannot be read or decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    #[default]
    FailFast,
    /// Log the error, count it in [`ScanStats::failures_skipped`] and carry
    /// on with the next class file or root.
    SkipFailed,
}

/// The annotated elements of a class path, in root order.
///
/// Dropping the sequence releases any archive still open.
pub struct Annotations {
    inner: Option<AnnotatedIter>,
    policy: ErrorPolicy,
    stats: ScanStats,
}

impl Annotations {
    fn new(inner: AnnotatedIter, policy: ErrorPolicy, stats: ScanStats) -> Self {
        Self {
            inner: Some(inner),
            policy,
            stats,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

impl Iterator for Annotations {
    type Item = Result<Annotated>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.as_mut()?.next();
            match item {
                Some(Ok(annotated)) => return Some(Ok(annotated)),
                Some(Err(err)) if self.policy == ErrorPolicy::SkipFailed => {
                    warn!(error = %err, "skipping unreadable class data");
                    self.stats.failures_skipped.fetch_add(1, Ordering::Relaxed);
                }
                Some(Err(err)) => {
                    self.inner = None;
                    return Some(Err(err));
                }
                None => {
                    self.inner = None;
                    return None;
                }
            }
        }
    }
}

impl FusedIterator for Annotations {}
