pub mod attachments;
pub mod init;
pub mod report;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::load_settings;

/// Resolve the effective source file and attachment directory: command-line
/// overrides first, then the saved settings.
pub(crate) fn resolve_paths(
    source: Option<String>,
    attachments: Option<String>,
) -> (PathBuf, PathBuf) {
    let settings = load_settings();
    let source = PathBuf::from(source.unwrap_or(settings.source_file));
    let attachments = PathBuf::from(attachments.unwrap_or(settings.attachments_dir));
    (source, attachments)
}

pub fn completions(shell: clap_complete::Shell) -> crate::error::Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(shell, &mut Cli::command(), "disputes", &mut std::io::stdout());
    Ok(())
}

#[derive(Parser)]
#[command(name = "disputes", about = "Disputed-transaction review CLI with per-day PDF matching.")]
pub struct Cli {
    /// With no subcommand, opens the report.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up disputes: record the source spreadsheet and attachment directory.
    Init {
        /// Path to the disputed-transactions spreadsheet (.xlsx or .csv)
        #[arg(long)]
        source: Option<String>,
        /// Directory containing per-day PDF attachments
        #[arg(long)]
        attachments: Option<String>,
    },
    /// Render the disputed-transactions report.
    Report {
        /// Spreadsheet to load (default: configured source)
        #[arg(long)]
        source: Option<String>,
        /// Attachment directory to scan (default: configured directory)
        #[arg(long)]
        attachments: Option<String>,
        /// Plain-text rendering even on a terminal
        #[arg(long)]
        text: bool,
        /// Write the text rendering to a file
        #[arg(long)]
        output: Option<String>,
    },
    /// Inspect per-day PDF attachments.
    Attachments {
        #[command(subcommand)]
        command: AttachmentsCommands,
    },
    /// Show current configuration and summary statistics.
    Status,
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum AttachmentsCommands {
    /// List the attachment index and any build warnings.
    List {
        /// Attachment directory to scan (default: configured directory)
        #[arg(long)]
        attachments: Option<String>,
    },
    /// Save one day's PDF to disk.
    Save {
        /// Date to resolve: YYYY-MM-DD
        date: String,
        /// Output path (default: the attachment's original filename)
        #[arg(long)]
        output: Option<String>,
        /// Attachment directory to scan (default: configured directory)
        #[arg(long)]
        attachments: Option<String>,
    },
}
