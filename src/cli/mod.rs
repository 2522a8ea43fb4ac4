//! CLI command definitions for pathconf
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::format::OutputFormat;
use crate::source::{JsonParser, KeyValueParser, Parser as SourceParser, YamlParser};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Input document format, when the file extension does not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Json,
    Yaml,
    /// `path=value` lines
    Kv,
}

impl InputFormat {
    /// Parser for this format, splitting paths on `delimiter`.
    pub fn parser(&self, delimiter: char) -> Box<dyn SourceParser + Send + Sync> {
        match self {
            InputFormat::Json => Box::new(JsonParser),
            InputFormat::Yaml => Box::new(YamlParser),
            InputFormat::Kv => Box::new(KeyValueParser::new().delimiter(delimiter)),
        }
    }
}

/// Query and edit path-addressed configuration documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to load; repeat to merge several, later files win
    #[arg(short, long = "file", value_name = "FILE", global = true)]
    pub files: Vec<PathBuf>,

    /// Input format (overrides detection from the file extension)
    #[arg(long, value_enum, global = true)]
    pub format: Option<InputFormat>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    pub output: OutputFormat,

    /// Path delimiter
    #[arg(short, long, default_value_t = '.', global = true)]
    pub delimiter: char,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a path
    Get { path: String },

    /// Report whether a path resolves (exit status 1 if not)
    Has { path: String },

    /// Set a value and print the resulting tree
    ///
    /// The value is read as YAML, so `8080`, `true` and `[a, b]` keep their
    /// types; anything else is a string.
    Set { path: String, value: String },

    /// Delete a subtree and print the resulting tree
    Delete { path: String },

    /// List top-level keys
    Keys,

    /// List every leaf path
    Paths,

    /// Print every leaf as `path = value`
    Flatten,

    /// Print the mapping at a path as a standalone document
    Cut { path: String },

    /// Print the whole merged tree
    Show {
        /// Load the tiered configuration (defaults, project, user, environment)
        /// underneath any --file arguments
        #[arg(long)]
        layered: bool,
    },
}

impl Command {
    /// True when the command wants the tiered configuration as its base.
    pub fn wants_layers(&self) -> bool {
        matches!(self, Command::Show { layered: true })
    }
}
