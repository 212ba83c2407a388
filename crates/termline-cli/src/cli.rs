//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use crate::config::LogLevel;

/// Match, complete, highlight and validate input against a grammar.
#[derive(Parser, Debug)]
#[command(name = "termline", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["grammar", "grammar_file"])))]
pub struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Grammar expression.
    #[arg(long)]
    pub grammar: Option<String>,

    /// File holding the grammar expression.
    #[arg(long, value_name = "PATH")]
    pub grammar_file: Option<PathBuf>,

    /// Complete variable VAR from a comma-separated word list.
    #[arg(long = "words", value_name = "VAR=W1,W2,...")]
    pub words: Vec<String>,

    /// Highlight variable VAR with STYLE.
    #[arg(long = "style", value_name = "VAR=STYLE")]
    pub styles: Vec<String>,

    /// Style of text outside styled variables.
    #[arg(long, value_name = "STYLE")]
    pub default_style: Option<String>,

    /// What to do with the input.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations on one input string.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Match the whole input; fails when it is not a sentence.
    Match {
        /// Text to match.
        input: String,
    },
    /// Match the input as the beginning of a sentence.
    Prefix {
        /// Text to match.
        input: String,
    },
    /// Complete the variable before the cursor.
    Complete {
        /// Text to complete.
        input: String,
        /// Cursor byte offset; defaults to the end of the input.
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// Style the input.
    Highlight {
        /// Text to style.
        input: String,
    },
    /// Check the input; fails when it is not a sentence.
    Validate {
        /// Text to check.
        input: String,
    },
}
