//! CLI commands and argument parsing

use crate::types::BacklinkFlag;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for TheSeed wiki APIs
#[derive(Parser, Debug)]
#[command(name = "theseed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true, env = "THESEED_BASE_URL")]
    pub base_url: Option<String>,

    /// API token (overrides the config file)
    #[arg(long, global = true, env = "THESEED_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Minimum seconds between requests (overrides the config file)
    #[arg(long, global = true, env = "THESEED_INTERVAL")]
    pub interval: Option<f64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a document's source and edit token
    Fetch {
        /// Document title
        document: String,
    },

    /// Save a new revision of a document
    Submit {
        /// Document title
        document: String,

        /// File with the new source ("-" reads stdin)
        #[arg(short = 'i', long)]
        file: PathBuf,

        /// Edit summary
        #[arg(short, long, default_value = "")]
        log: String,

        /// Edit token from a previous fetch (fetched automatically when omitted)
        #[arg(long)]
        edit_token: Option<String>,
    },

    /// List documents linking to a document
    Backlinks {
        /// Document title
        document: String,

        /// Namespace keyword (category, template, ...) or wiki namespace name
        #[arg(short, long)]
        namespace: Option<String>,

        /// Link kind: any, link, file, include, redirect
        #[arg(long)]
        flag: Option<BacklinkFlag>,

        /// Start listing from this document
        #[arg(long)]
        from: Option<String>,

        /// List up to this document
        #[arg(long)]
        until: Option<String>,
    },

    /// List discussion threads of a document
    Discuss {
        /// Document title
        document: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
