//! CLI module
//!
//! Command-line interface over [`TheSeedClient`](crate::http::TheSeedClient).
//!
//! # Commands
//!
//! - `fetch` - Fetch a document for editing
//! - `submit` - Save a new revision
//! - `backlinks` - List backlinks
//! - `discuss` - List discussion threads

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
