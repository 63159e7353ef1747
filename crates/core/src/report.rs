//! Wire shapes returned by the analysis endpoint.
//!
//! An [`AnalysisReport`] is the single normalized result shape the rest of
//! the client passes around: both a successful listing and a server-reported
//! error deserialize into it, and cached entries store exactly this shape.

use serde::{Deserialize, Serialize};

/// One directory analysis result, successful or not.
///
/// A report with `error: Some(_)` is an error result; any `path`/`logs` it
/// carries are still meaningful (partial results keep their logs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Canonical path the backend designates as authoritative for this
    /// result. Used as the cache key; may differ from the requested path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub results: Vec<ChildEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items_in_dir: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Canonical path if the backend reported one.
    pub fn canonical_path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// One child entry within a successful listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_readable_size: Option<String>,
    /// Traversal failure local to this entry (e.g. permission denied).
    /// Does not fail the whole listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChildEntry {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Anything the backend reports that we don't recognize.
    #[default]
    #[serde(other)]
    Unknown,
}
