//! Wiki constants shared by callers
//!
//! Namespace names and backlink flag bits as TheSeed wikis (NamuWiki
//! and friends) define them. The client passes them through as opaque
//! query values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Namespaces
// ============================================================================

/// Document namespace
///
/// Serialized as the wiki name; deserialized from the wiki name or keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Namespace {
    Category,
    Document,
    Frame,
    File,
    Template,
    User,
    Meta,
    Trash,
    System,
    FileTrash,
}

impl Namespace {
    /// All namespaces in display order
    pub const ALL: [Namespace; 10] = [
        Namespace::Category,
        Namespace::Document,
        Namespace::Frame,
        Namespace::File,
        Namespace::Template,
        Namespace::User,
        Namespace::Meta,
        Namespace::Trash,
        Namespace::System,
        Namespace::FileTrash,
    ];

    /// Name used by the wiki (query and response value)
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Category => "분류",
            Namespace::Document => "문서",
            Namespace::Frame => "틀",
            Namespace::File => "파일",
            Namespace::Template => "템플릿",
            Namespace::User => "사용자",
            Namespace::Meta => "더시드위키",
            Namespace::Trash => "휴지통",
            Namespace::System => "시스템",
            Namespace::FileTrash => "파일휴지통",
        }
    }

    /// ASCII keyword, used on the command line
    pub fn keyword(self) -> &'static str {
        match self {
            Namespace::Category => "category",
            Namespace::Document => "document",
            Namespace::Frame => "frame",
            Namespace::File => "file",
            Namespace::Template => "template",
            Namespace::User => "user",
            Namespace::Meta => "meta",
            Namespace::Trash => "trash",
            Namespace::System => "system",
            Namespace::FileTrash => "file_trash",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    /// Accepts either the wiki name or the ASCII keyword
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s || ns.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown namespace: {s}"))
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.as_str().to_string()
    }
}

impl TryFrom<String> for Namespace {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Backlink flags
// ============================================================================

/// How a backlinking document refers to the target
///
/// Serialized as its bit value, the same as the `flag` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum BacklinkFlag {
    /// Any kind of reference
    #[default]
    Any,
    Link,
    File,
    /// Transclusion
    Include,
    Redirect,
}

impl BacklinkFlag {
    /// Bit value sent as the `flag` query parameter
    pub fn bits(self) -> u32 {
        match self {
            BacklinkFlag::Any => 0,
            BacklinkFlag::Link => 1,
            BacklinkFlag::File => 2,
            BacklinkFlag::Include => 4,
            BacklinkFlag::Redirect => 8,
        }
    }
}

impl From<BacklinkFlag> for u32 {
    fn from(flag: BacklinkFlag) -> Self {
        flag.bits()
    }
}

impl TryFrom<u32> for BacklinkFlag {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(BacklinkFlag::Any),
            1 => Ok(BacklinkFlag::Link),
            2 => Ok(BacklinkFlag::File),
            4 => Ok(BacklinkFlag::Include),
            8 => Ok(BacklinkFlag::Redirect),
            other => Err(format!("unknown backlink flag bits: {other}")),
        }
    }
}

impl FromStr for BacklinkFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "0" => Ok(BacklinkFlag::Any),
            "link" | "1" => Ok(BacklinkFlag::Link),
            "file" | "2" => Ok(BacklinkFlag::File),
            "include" | "4" => Ok(BacklinkFlag::Include),
            "redirect" | "8" => Ok(BacklinkFlag::Redirect),
            other => Err(format!("unknown backlink flag: {other}")),
        }
    }
}
