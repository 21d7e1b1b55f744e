//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::run;

use crate::export::ExportFormat;
use crate::filters::SortKey;
use crate::utils::environment::PROJECTS_DIR_ENV;

#[derive(Debug, Parser)]
#[command(name = "ccsearch")]
#[command(version)]
#[command(about = "Browse, search, tag and export local chat session transcripts", long_about = None)]
pub struct Cli {
    /// Sessions root holding one directory per project [default: ~/.claude/projects]
    #[arg(long, global = true, env = PROJECTS_DIR_ENV, value_name = "DIR")]
    pub projects_dir: Option<PathBuf>,

    /// Log loader and search details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List projects with their session counts
    Projects,

    /// List sessions, most recently updated first
    List {
        /// Only sessions whose project path contains this text
        #[arg(short, long)]
        project: Option<String>,
        /// Filter expression, e.g. "tag:work since:2024-01-01"
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(short, long, value_enum, default_value_t = SortKey::Updated)]
        sort: SortKey,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search message text, ranked by how often the terms occur
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },

    /// Print a session's messages
    Show {
        /// Session id or a unique prefix of one
        id: String,
    },

    /// Print the heuristic summary of a session
    Summary {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Export sessions as JSON, Markdown or CSV
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        project: Option<String>,
        /// Only the N most recently updated sessions
        #[arg(long, value_name = "N")]
        last: Option<usize>,
        /// Comma-separated session ids (takes precedence over --project)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        /// Keep full project paths instead of shortening them
        #[arg(long)]
        full_paths: bool,
    },

    /// Read a JSON export bundle and list what it contains
    Import {
        file: PathBuf,
        /// Also search the imported sessions
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Replace a session's tags (no tags clears them)
    Tag {
        id: String,
        #[arg(value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Set a session's title (an empty title restores the generated one)
    Title {
        id: String,
        #[arg(num_args = 0..)]
        title: Vec<String>,
    },

    /// Delete a session file
    Delete {
        id: String,
        /// Required; deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// Show corpus statistics
    Stats,

    /// Interactive browser
    Tui {
        /// Initial input, e.g. "tag:work | login bug"
        #[arg(short, long)]
        input: Option<String>,
    },
}
