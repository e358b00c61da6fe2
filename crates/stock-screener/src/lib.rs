//! Stock Screener Module
//!
//! Builds the screenable company universe, filters it by threshold ranges on
//! multi-year averages and orders the result with toggleable sort state.

pub mod models;
pub mod ranker;
pub mod screener;
pub mod universe;

pub use models::{
    IndustryFilter, Rejection, ScreenCriteria, ScreenMatch, SortDirection, SortKey, SortState, ThresholdRange,
    ZeroPolicy,
};
pub use ranker::Ranker;
pub use screener::{filter, ScreenSummary, Screener};
pub use universe::{passes_quality_gate, Universe};
