//! Session lifecycle and the navigation/loading state machine.
//!
//! [`Navigator`] is the orchestrator: given a requested path and a
//! force-refresh flag it decides cache-hit vs. cache-miss, issues the
//! outbound request on a miss, and folds every outcome into the single
//! [`dirscope_core::RequestState`] the rendering layer consumes.

pub mod navigator;
pub mod session;

pub use navigator::{DirectoryFetcher, NavigateOutcome, Navigator};
pub use session::{ClientSession, SessionController, SessionError};
