use annotation_finder::cli::{Cli, Commands, OutputFormat};
use annotation_finder::config::{init_logging, resolve_annotations, resolve_class_path};
use annotation_finder::{Annotated, ClassPath, ErrorPolicy, Finder, Root, ScanSummary};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Find {
            roots,
            annotations,
            all,
            packages,
            system,
            keep_going,
            format,
            output,
        } => {
            let class_path = resolve_class_path(&roots, system)?;
            let policy = if keep_going {
                ErrorPolicy::SkipFailed
            } else {
                ErrorPolicy::FailFast
            };
            let finder = if all {
                Finder::new().all_annotations()
            } else {
                Finder::new().annotations(resolve_annotations(&annotations)?)
            };
            let finder = finder
                .in_package(packages)
                .in_classes(class_path.roots().iter().cloned())
                .error_policy(policy);

            let mut out = open_output(output.as_deref())?;
            write_find_output(&finder, format, &mut out)?;
            out.flush().context("Failed to flush output")?;
        }
        Commands::Roots { roots, system } => {
            let class_path = resolve_class_path(&roots, system)?;
            println!("{}", serde_json::to_string_pretty(&describe_roots(&class_path))?);
        }
    }

    Ok(())
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_find(args))
}

/// Lets `annotation-finder -a NAME ROOT...` stand for `annotation-finder find -a NAME ROOT...`.
fn rewrite_args_for_implicit_find(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["find", "roots", "help"];
    let passthrough = ["-h", "--help", "-V", "--version"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        let is_verbose = a == "--verbose" || (a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v'));
        if !is_verbose {
            break;
        }
        idx += 1;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) && !passthrough.contains(&token) {
            args.insert(idx, "find".to_string());
        }
    }

    args
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = output else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

#[derive(Debug, Serialize)]
struct FindResult {
    annotations: Vec<String>,
    all_annotations: bool,
    roots: Vec<String>,
    found: usize,
    duration_ms: u64,
    stats: ScanSummary,
    elements: Vec<Annotated>,
}

fn write_find_output(finder: &Finder, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let start = Instant::now();
    let mut found = finder.find()?;
    let mut count = 0usize;

    match format {
        OutputFormat::Json => {
            let elements = found.by_ref().collect::<Result<Vec<_>, _>>()?;
            count = elements.len();
            let mut annotations: Vec<String> =
                finder.filter().annotation_names().map(str::to_string).collect();
            annotations.sort();
            let result = FindResult {
                annotations,
                all_annotations: finder.is_all_annotations(),
                roots: finder
                    .class_path()
                    .roots()
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect(),
                found: count,
                duration_ms: start.elapsed().as_millis() as u64,
                stats: found.stats().summary(),
                elements,
            };
            serde_json::to_writer_pretty(&mut *out, &result)?;
            writeln!(out)?;
        }
        OutputFormat::Lines => {
            for annotated in found.by_ref() {
                serde_json::to_writer(&mut *out, &annotated?)?;
                writeln!(out)?;
                count += 1;
            }
        }
        OutputFormat::Text => {
            for annotated in found.by_ref() {
                writeln!(out, "{}", annotated?)?;
                count += 1;
            }
        }
    }

    info!(
        found = count,
        duration_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct RootInfo {
    path: String,
    kind: &'static str,
    exists: bool,
}

fn describe_roots(class_path: &ClassPath) -> Vec<RootInfo> {
    class_path
        .roots()
        .iter()
        .map(|path| RootInfo {
            path: path.to_string_lossy().to_string(),
            kind: Root::classify(path).map_or("unsupported", |root| root.kind()),
            exists: path.exists(),
        })
        .collect()
}
