use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexsum_core::TabKind;

/// Upload legal documents for analysis and read back the results.
#[derive(Debug, Parser)]
#[command(name = "lexsum", version)]
pub struct Cli {
    /// RON configuration file. Defaults to `lexsum.ron` when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis backend.
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory for the recent-documents cache and the log file.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level and echo log lines to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a document, follow its progress and print the analysis.
    Summarize {
        file: PathBuf,
        /// Also write the complete result payload as JSON.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List recently analysed documents.
    Recent {
        /// Show saved documents instead of saved summaries.
        #[arg(long)]
        documents: bool,
    },
    /// Print one analysis tab of a finished request.
    Tab {
        request_id: String,
        /// One of summary, risk-analysis, financial-terms, quality, audit-trail.
        tab: TabKind,
    },
    /// Ask a question about an analysed document.
    Chat { request_id: String, message: String },
}
