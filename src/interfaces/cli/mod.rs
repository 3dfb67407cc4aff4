//! Command-line interface.
//!
//! Parses arguments and dispatches to the command handlers.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

#[derive(Parser)]
#[command(name = "zipstream")]
#[command(about = "Read CSV files out of ZIP archives and ask an LLM about them")]
#[command(version)]
pub struct Cli {
    /// Gemini API key (overrides config file and environment)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Config file path (defaults to ./zipstream.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model to use (overrides config file)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entry names inside an archive
    List {
        /// Path to the ZIP archive
        archive: PathBuf,
    },

    /// Print the first rows of a CSV entry
    Preview {
        archive: PathBuf,
        /// Entry name inside the archive
        entry: String,
        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
    },

    /// List models available to the configured API key
    Models,

    /// Ask the model a question about a CSV entry
    Ask {
        archive: PathBuf,
        entry: String,
        question: String,
        /// Rows of the table included in the prompt (overrides config file)
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },

    /// Print the rows with the largest values in a numeric column
    Top {
        archive: PathBuf,
        entry: String,
        /// Column to sort by
        #[arg(long)]
        column: String,
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
        /// Smallest values first
        #[arg(long)]
        ascending: bool,
    },

    /// Run the end-to-end walkthrough: list, preview, models, ask, top 3
    Demo {
        archive: PathBuf,
        entry: String,
        /// Numeric column used for the question and the local top 3
        #[arg(long, default_value = "alcohol")]
        column: String,
        /// Question to ask (defaults to one about `--column`)
        #[arg(long)]
        question: Option<String>,
    },
}
