pub mod client;

pub use client::{AnalyzeClient, AnalyzeOutcome, FetchError};
