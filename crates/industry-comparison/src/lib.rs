//! Company-vs-industry analysis: tolerance-band comparison of multi-year
//! averages, the valuation triangle and per-year trend lines.

pub mod comparator;
pub mod trend;
pub mod valuation;

pub use comparator::{
    compare, Comparison, ComparisonDetail, Direction, Gap, IndustryComparator, MetricComparison, ToleranceConfig,
    DEFAULT_TOLERANCE,
};
pub use trend::{trend_chart, trend_line, TrendChart, TrendLine, TrendPoint};
pub use valuation::{ImpliedRatios, ValuationTriangle};
