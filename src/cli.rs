use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "annotation-finder", version)]
#[command(about = "Find classes, methods and fields carrying Java annotations, reading class files without loading them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List annotated elements found in the given roots
    Find {
        /// Class files, directories or JAR archives, searched in order
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,

        /// Fully qualified annotation name, such as java.lang.Deprecated
        #[arg(
            short = 'a',
            long = "annotation",
            value_name = "NAME",
            required_unless_present = "all",
            value_delimiter = ','
        )]
        annotations: Vec<String>,

        /// Report every annotation found
        #[arg(long, conflicts_with = "annotations")]
        all: bool,

        /// Only search classes of this package
        #[arg(short = 'p', long = "package", value_name = "PACKAGE", value_delimiter = ',')]
        packages: Vec<String>,

        /// Also search the roots of the CLASSPATH environment variable
        #[arg(long)]
        system: bool,

        /// Skip class data that cannot be read instead of stopping
        #[arg(long)]
        keep_going: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show how each root would be searched
    Roots {
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,

        #[arg(long)]
        system: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document with every element and scan counters
    Json,
    /// One JSON object per element, written as found
    Lines,
    Text,
}
