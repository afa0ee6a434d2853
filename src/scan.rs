//! Traversal of a single class path root: a class file, a directory of class
//! files, or a JAR archive.
//!
//! Every root expands lazily into a sequence of annotated elements. Class data
//! is read one unit at a time, and only when the consumer asks for more.

use ignore::WalkBuilder;
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::vec;
use tracing::{debug, trace};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::classfile::{ClassScan, scan_class};
use crate::error::{Error, Result};
use crate::filter::{AnnotationFilter, entry_package};
use crate::flat_map::FlatMap;
use crate::model::{Annotated, Origin};

pub type AnnotatedIter = Box<dyn Iterator<Item = Result<Annotated>>>;

/// Entries larger than this are not preallocated in full.
const MAX_PREALLOCATED_ENTRY: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Root {
    ClassFile(PathBuf),
    Directory(PathBuf),
    Archive(PathBuf),
}

impl Root {
    /// Returns the kind of root found at `path`, or `None` if it is neither a
    /// directory, a `.jar` file nor a `.class` file.
    pub fn classify(path: &Path) -> Option<Root> {
        if path.is_dir() {
            Some(Root::Directory(path.to_path_buf()))
        } else if has_extension(path, "jar") {
            Some(Root::Archive(path.to_path_buf()))
        } else if has_extension(path, "class") {
            Some(Root::ClassFile(path.to_path_buf()))
        } else {
            None
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Root::ClassFile(path) | Root::Directory(path) | Root::Archive(path) => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Root::ClassFile(_) => "class",
            Root::Directory(_) => "directory",
            Root::Archive(_) => "archive",
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub units_opened: Arc<AtomicUsize>,
    pub units_decoded: Arc<AtomicUsize>,
    pub units_rejected: Arc<AtomicUsize>,
    pub entries_skipped: Arc<AtomicUsize>,
    pub fields_scanned: Arc<AtomicUsize>,
    pub methods_scanned: Arc<AtomicUsize>,
    pub failures_skipped: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub units_opened: usize,
    pub units_decoded: usize,
    /// Units whose package was rejected after reading the class name.
    pub units_rejected: usize,
    /// Archive entries whose package was rejected before reading any data.
    pub entries_skipped: usize,
    pub fields_scanned: usize,
    pub methods_scanned: usize,
    pub failures_skipped: usize,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> ScanSummary {
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
        ScanSummary {
            units_opened: load(&self.units_opened),
            units_decoded: load(&self.units_decoded),
            units_rejected: load(&self.units_rejected),
            entries_skipped: load(&self.entries_skipped),
            fields_scanned: load(&self.fields_scanned),
            methods_scanned: load(&self.methods_scanned),
            failures_skipped: load(&self.failures_skipped),
        }
    }

    fn record(&self, scan: &ClassScan) {
        self.units_decoded.fetch_add(1, Ordering::Relaxed);
        if !scan.accepted {
            self.units_rejected.fetch_add(1, Ordering::Relaxed);
        }
        self.fields_scanned
            .fetch_add(scan.fields_scanned, Ordering::Relaxed);
        self.methods_scanned
            .fetch_add(scan.methods_scanned, Ordering::Relaxed);
    }
}

#[derive(Clone)]
pub struct Scanner {
    filter: Arc<dyn AnnotationFilter>,
    stats: ScanStats,
}

impl Scanner {
    pub fn new(filter: Arc<dyn AnnotationFilter>) -> Self {
        Self::with_stats(filter, ScanStats::new())
    }

    pub fn with_stats(filter: Arc<dyn AnnotationFilter>, stats: ScanStats) -> Self {
        Self { filter, stats }
    }

    pub fn filter(&self) -> &dyn AnnotationFilter {
        self.filter.as_ref()
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn scan_root(&self, root: Root) -> AnnotatedIter {
        debug!(root = %root.path().display(), kind = root.kind(), "scanning root");
        match root {
            Root::ClassFile(path) => Box::new(self.decode_file(&path)),
            Root::Directory(path) => self.scan_directory(path),
            Root::Archive(path) => self.scan_archive(path),
        }
    }

    /// Scans every class file below `dir`, at any depth, in file name order.
    pub fn scan_directory(&self, dir: PathBuf) -> AnnotatedIter {
        let scanner = self.clone();
        Box::new(FlatMap::new(class_files(dir), move |file: Result<PathBuf>| match file {
            Ok(path) => scanner.decode_file(&path),
            Err(err) => vec![Err(err)].into_iter(),
        }))
    }

    /// Scans the class entries of a JAR archive in central directory order.
    ///
    /// Entries outside the accepted packages are skipped without reading
    /// their data. The archive stays open until the returned sequence is
    /// exhausted or dropped.
    pub fn scan_archive(&self, path: PathBuf) -> AnnotatedIter {
        let opened = ClassArchive::open(&path).and_then(|mut archive| {
            let entries = archive.class_entries()?;
            Ok((archive, entries))
        });
        let (mut archive, entries) = match opened {
            Ok(opened) => opened,
            Err(err) => return Box::new(std::iter::once(Err(err))),
        };
        debug!(archive = %path.display(), entries = entries.len(), "opened archive");

        let filter = Arc::clone(&self.filter);
        let stats = self.stats.clone();
        let scanner = self.clone();
        Box::new(FlatMap::with_accept(
            entries,
            move |entry: &ArchiveEntry| {
                let accepted = filter.accept_package(&entry_package(&entry.name));
                if !accepted {
                    trace!(entry = %entry.name, "package not accepted");
                    stats.entries_skipped.fetch_add(1, Ordering::Relaxed);
                }
                accepted
            },
            move |entry: ArchiveEntry| scanner.decode_entry(&mut archive, &entry),
        ))
    }

    fn decode_file(&self, path: &Path) -> vec::IntoIter<Result<Annotated>> {
        let origin = Origin::file(path);
        self.stats.units_opened.fetch_add(1, Ordering::Relaxed);
        let result = std::fs::read(path)
            .map_err(|e| Error::io(origin.clone(), e))
            .and_then(|bytes| self.decode(&bytes, &origin));
        into_items(result)
    }

    fn decode_entry(
        &self,
        archive: &mut ClassArchive,
        entry: &ArchiveEntry,
    ) -> vec::IntoIter<Result<Annotated>> {
        let origin = Origin::entry(archive.path(), &entry.name);
        self.stats.units_opened.fetch_add(1, Ordering::Relaxed);
        let result = archive
            .read_entry(entry, &origin)
            .and_then(|bytes| self.decode(&bytes, &origin));
        into_items(result)
    }

    fn decode(&self, bytes: &[u8], origin: &Origin) -> Result<Vec<Annotated>> {
        let scan = scan_class(bytes, self.filter.as_ref(), origin)?;
        self.stats.record(&scan);
        Ok(scan.annotated)
    }
}

fn into_items(result: Result<Vec<Annotated>>) -> vec::IntoIter<Result<Annotated>> {
    match result {
        Ok(annotated) => annotated.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
        Err(err) => vec![Err(err)].into_iter(),
    }
}

/// Lists the class files below `dir` lazily, depth first, with the members
/// of each directory in file name order.
pub fn class_files(dir: PathBuf) -> impl Iterator<Item = Result<PathBuf>> {
    let walker = WalkBuilder::new(&dir)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    walker.filter_map(move |entry| match entry {
        Ok(entry) => {
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            (is_file && has_extension(entry.path(), "class")).then(|| Ok(entry.into_path()))
        }
        Err(err) => Some(Err(Error::io(Origin::File(dir.clone()), walk_error(err)))),
    })
}

fn walk_error(err: ignore::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::other(message))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub index: usize,
    pub name: String,
}

pub struct ClassArchive {
    path: PathBuf,
    zip: ZipArchive<Cursor<Mmap>>,
}

impl ClassArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let origin = || Origin::file(path);
        let file = File::open(path).map_err(|e| Error::io(origin(), e))?;
        // SAFETY: The file is opened read-only and the map is owned by the
        // archive, so it is dropped together with the zip reader.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(origin(), e))?;
        let zip = ZipArchive::new(Cursor::new(mmap)).map_err(|e| Error::io(origin(), zip_error(e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn class_entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();
        for index in 0..self.zip.len() {
            let entry = self
                .zip
                .by_index_raw(index)
                .map_err(|e| Error::io(Origin::file(&self.path), zip_error(e)))?;
            let name = entry.name();
            if name.ends_with(crate::classfile::CLASS_SUFFIX) {
                entries.push(ArchiveEntry {
                    index,
                    name: name.to_string(),
                });
            }
        }
        Ok(entries)
    }

    pub fn read_entry(&mut self, entry: &ArchiveEntry, origin: &Origin) -> Result<Vec<u8>> {
        let mut file = self
            .zip
            .by_index(entry.index)
            .map_err(|e| Error::io(origin.clone(), zip_error(e)))?;
        let capacity = file.size().min(MAX_PREALLOCATED_ENTRY) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::io(origin.clone(), e))?;
        Ok(bytes)
    }
}

fn zip_error(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
