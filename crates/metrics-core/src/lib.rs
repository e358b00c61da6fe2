pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod normalizer;
pub mod traits;
pub mod types;

pub use aggregate::{
    average, lookup_year, period_average, round_half_up, three_year_average, window_average, YearWindow,
};
pub use error::*;
pub use normalizer::{normalize, IndicatorNormalizer, NormalizerConfig};
pub use traits::*;
pub use types::*;
