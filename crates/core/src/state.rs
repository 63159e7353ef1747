//! Request lifecycle states.
//!
//! Every navigation resolves into exactly one [`RequestState`]; the
//! rendering layer only ever receives this tagged outcome, never a raw
//! error.

use crate::report::AnalysisReport;

/// Lifecycle of one navigation request. Transitions happen only inside the
/// navigator; rendering code reads but never writes this.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Loading(LoadingLabel),
    Succeeded(NavigationResult),
    Failed(NavigationError),
}

/// Status label shown while a request is in flight: a first fetch reads
/// "Analyzing", a forced re-fetch reads "Refreshing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingLabel {
    Analyzing,
    Refreshing,
}

impl LoadingLabel {
    pub fn display(&self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing…",
            Self::Refreshing => "Refreshing…",
        }
    }
}

/// A successful listing, with a marker for cache-sourced results so the
/// rendering layer can tag them.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    pub report: AnalysisReport,
    pub from_cache: bool,
}

/// A failed navigation. `path`/`logs` carry whatever partial data arrived
/// with the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationError {
    pub message: String,
    pub path: Option<String>,
    pub logs: Vec<String>,
    pub from_cache: bool,
}
