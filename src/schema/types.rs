//! Request and response records for the TheSeed API
//!
//! See <https://doc.theseed.io/> for the upstream API documentation.

use super::reader::{Closed, Fields};
use super::Schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Edit
// ============================================================================

/// Response of `GET /edit/{document}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFetchResult {
    /// Current source of the document
    pub text: String,
    /// Whether the document exists
    pub exists: bool,
    /// Edit token to pass to the following submit
    pub token: String,
}

impl Schema for EditFetchResult {
    const NAME: &'static str = "EditFetchResult";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let text = fields.string("text");
        let exists = fields.boolean("exists");
        let token = fields.string("token");
        Some(Self {
            text: text?,
            exists: exists?,
            token: token?,
        })
    }
}

/// Body of `POST /edit/{document}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSubmitRequest {
    /// New source of the document
    pub text: String,
    /// Edit summary
    pub log: String,
    /// Edit token from [`EditFetchResult::token`]
    pub token: String,
}

impl EditSubmitRequest {
    pub fn new(text: impl Into<String>, log: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            log: log.into(),
            token: token.into(),
        }
    }

    /// Build a submit request reusing the token of a previous fetch
    pub fn from_fetch(
        fetched: &EditFetchResult,
        text: impl Into<String>,
        log: impl Into<String>,
    ) -> Self {
        Self::new(text, log, fetched.token.clone())
    }
}

/// Response of `POST /edit/{document}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSubmitResult {
    pub status: String,
    /// Revision number created by the edit
    pub rev: i64,
}

impl Schema for EditSubmitResult {
    const NAME: &'static str = "EditSubmitResult";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let status = fields.string("status");
        let rev = fields.integer("rev");
        Some(Self {
            status: status?,
            rev: rev?,
        })
    }
}

// ============================================================================
// Backlinks
// ============================================================================

/// Number of backlinking documents in one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceCount {
    pub namespace: String,
    pub count: i64,
}

impl Schema for NamespaceCount {
    const NAME: &'static str = "NamespaceCount";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let namespace = fields.string("namespace");
        let count = fields.integer("count");
        Some(Self {
            namespace: namespace?,
            count: count?,
        })
    }
}

/// One document linking to the queried document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklinkEntry {
    pub document: String,
    /// Link kinds as reported by the server (e.g. `link,include`)
    pub flags: String,
}

impl Schema for BacklinkEntry {
    const NAME: &'static str = "BacklinkEntry";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let document = fields.string("document");
        let flags = fields.string("flags");
        Some(Self {
            document: document?,
            flags: flags?,
        })
    }
}

/// Response of `GET /backlink/{document}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklinkResult {
    pub namespaces: Vec<NamespaceCount>,
    pub backlinks: Vec<BacklinkEntry>,
    /// Cursor for the previous page, if any
    pub from: Option<String>,
    /// Cursor for the next page, if any
    pub until: Option<String>,
}

impl Schema for BacklinkResult {
    const NAME: &'static str = "BacklinkResult";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let namespaces = fields.list("namespaces");
        let backlinks = fields.list("backlinks");
        let from = fields.optional_string("from");
        let until = fields.optional_string("until");
        Some(Self {
            namespaces: namespaces?,
            backlinks: backlinks?,
            from: from?,
            until: until?,
        })
    }
}

// ============================================================================
// Discussions
// ============================================================================

/// State of a discussion thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionStatus {
    Normal,
    Close,
    Pause,
}

impl DiscussionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscussionStatus::Normal => "normal",
            DiscussionStatus::Close => "close",
            DiscussionStatus::Pause => "pause",
        }
    }
}

impl Closed for DiscussionStatus {
    const VARIANTS: &'static [&'static str] = &["normal", "close", "pause"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(DiscussionStatus::Normal),
            "close" => Some(DiscussionStatus::Close),
            "pause" => Some(DiscussionStatus::Pause),
            _ => None,
        }
    }
}

impl fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `GET /discuss/{document}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscussionThread {
    pub slug: String,
    pub topic: String,
    /// Time of the last comment (`updated_date` on the wire)
    pub updated_at: DateTime<Utc>,
    pub status: DiscussionStatus,
}

impl Schema for DiscussionThread {
    const NAME: &'static str = "DiscussionThread";

    fn read(fields: &mut Fields<'_>) -> Option<Self> {
        let slug = fields.string("slug");
        let topic = fields.string("topic");
        let updated_at = fields.timestamp("updated_date");
        let status = fields.choice("status");
        Some(Self {
            slug: slug?,
            topic: topic?,
            updated_at: updated_at?,
            status: status?,
        })
    }
}
