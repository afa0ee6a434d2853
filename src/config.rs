use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::classpath::{CLASSPATH_VAR, ClassPath};
use std::path::PathBuf;

/// Environment variable holding a log filter directive, such as `debug` or
/// `annotation_finder=trace`.
pub const LOG_VAR: &str = "ANNOTATION_FINDER_LOG";

/// Builds the class path from explicit roots, followed by the `CLASSPATH`
/// roots when `system` is set or when no roots are given.
pub fn resolve_class_path(roots: &[PathBuf], system: bool) -> Result<ClassPath> {
    let mut class_path: ClassPath = roots.iter().cloned().collect();
    if system || roots.is_empty() {
        class_path.extend(ClassPath::system().roots().iter().cloned());
    }

    if class_path.is_empty() {
        anyhow::bail!("No roots to search: pass ROOT arguments or set {CLASSPATH_VAR}");
    }
    Ok(class_path)
}

/// Accepts annotation names the way they are written in source, such as
/// `@java.lang.Deprecated` or `java.lang. Deprecated;`.
pub fn normalize_annotation_name(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix('@') {
        s = rest.trim();
    }
    if s.ends_with(';') {
        s = s.trim_end_matches(';').trim();
    }
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn resolve_annotations(raw: &[String]) -> Result<Vec<String>> {
    let names: Vec<String> = raw
        .iter()
        .map(|name| normalize_annotation_name(name))
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        anyhow::bail!("No annotation names given");
    }
    Ok(names)
}

pub fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "annotation_finder=debug,warn",
            _ => "annotation_finder=trace,debug",
        })
    })
}

pub fn init_logging(verbose: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(anyhow::Error::msg)
        .context("Failed to install log subscriber")
}
