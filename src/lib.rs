// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # theseed-client
//!
//! A typed, rate-limited client for TheSeed wiki engine APIs (NamuWiki and
//! other TheSeed-based wikis).
//!
//! ## Features
//!
//! - **Typed Responses**: every response body is validated into a record,
//!   or rejected with the offending field paths
//! - **Soft Rate Limiting**: a minimum interval between requests, shared
//!   across clones of the limiter
//! - **Bearer Auth**: the API token rides on every request and never shows
//!   up in logs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use theseed_client::{BacklinkQuery, EditSubmitRequest, RateLimiter, Result, TheSeedClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let limiter = RateLimiter::new(Duration::from_secs(1));
//!     let client = TheSeedClient::with_limiter("https://theseed.example/api", "token", limiter)?;
//!
//!     let page = client.fetch_for_edit("Sandbox").await?;
//!     let request = EditSubmitRequest::from_fetch(&page, format!("{}\nhello", page.text), "bot edit");
//!     let saved = client.submit_edit("Sandbox", &request).await?;
//!     println!("saved rev {}", saved.rev);
//!
//!     let links = client.get_backlinks("Sandbox", &BacklinkQuery::new()).await?;
//!     println!("{} backlinks", links.backlinks.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ──► TheSeedClient ──► RateLimiter::acquire ──► HTTP call
//!                                                          │
//!              typed record ◄── schema::parse ◄── 2xx ◄────┤
//!              Error::HttpStatus ◄────────────── non-2xx ◄─┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Wiki constants (namespaces, backlink flags)
pub mod types;

/// API token handling
pub mod auth;

/// Typed client and rate limiter
pub mod http;

/// Response schemas and validation
pub mod schema;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::{BacklinkFlag, Namespace};

pub use auth::ApiToken;
pub use config::ClientConfig;
pub use http::{BacklinkQuery, RateLimiter, TheSeedClient};
pub use schema::{
    BacklinkEntry, BacklinkResult, DiscussionStatus, DiscussionThread, EditFetchResult,
    EditSubmitRequest, EditSubmitResult, NamespaceCount, SchemaValidationError,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
