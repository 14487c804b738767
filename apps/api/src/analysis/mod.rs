// Per-project fitness analysis: an on-demand, de-duplicated cache in front of
// the analysis service, plus the HTTP handlers that drive it.

pub mod cache;
pub mod handlers;

pub use cache::{AnalysisCache, AnalysisState, RequestOutcome};
