//! openapi-lint CLI tool.
//!
//! Usage:
//! ```bash
//! openapi-lint check [OPTIONS] [PATHS]...
//! openapi-lint list-rules
//! openapi-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use openapi_lint_core::DocumentKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Convention linter for Swagger 2.0 / OpenAPI documents
#[derive(Parser)]
#[command(name = "openapi-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents
    Check {
        /// Files or directories to validate, as one merge group
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Kind of the documents (overrides configuration)
        #[arg(short, long)]
        kind: Option<KindArg>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules, by id or name (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Validate documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Do not report dangling or cyclic `$ref`s
        #[arg(long)]
        no_references: bool,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for validation reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-message compact format.
    Compact,
}

/// Document kind as accepted on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum KindArg {
    /// Plain Swagger documents.
    Default,
    /// Resource-manager documents.
    Arm,
    /// Data-plane documents.
    DataPlane,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Default => Self::Default,
            KindArg::Arm => Self::Arm,
            KindArg::DataPlane => Self::DataPlane,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            paths,
            kind,
            format,
            rules,
            exclude,
            sequential,
            no_references,
        } => {
            let project = commands::check::project_dir(&paths);
            let source = config_resolver::resolve(project, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                kind: kind.map(DocumentKind::from),
                format,
                rules,
                exclude,
                sequential,
                no_references,
            };
            commands::check::run(&paths, options, &source)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
