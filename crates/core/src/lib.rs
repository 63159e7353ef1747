pub mod controls;
pub mod paths;
pub mod report;
pub mod state;

pub use controls::{ControlState, GateContext, LoadingGate};
pub use report::{AnalysisReport, ChildEntry, EntryKind};
pub use state::{LoadingLabel, NavigationError, NavigationResult, RequestState};
