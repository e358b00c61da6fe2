//! Multi-year aggregation over period-keyed metric series.
//!
//! Absence is carried as `None` all the way through: a missing year is dropped
//! from both the sum and the count, and a series with no readings averages to
//! `None`, never to zero.
//!
//! Means are computed in `Decimal` and rounded to two places with the
//! midpoint-away-from-zero rule, so `1.005` rounds to `1.01` regardless of how
//! the binary float happens to represent it.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{MetricSource, MetricsError, MetricsResult, PeriodSeries};

/// Fiscal years averaged by default.
pub const DEFAULT_WINDOW_YEARS: [&str; 3] = ["2022", "2023", "2024"];

/// Decimal places kept by every aggregate.
pub const AGGREGATE_DP: u32 = 2;

/// Ordered set of year keys an aggregate is taken over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct YearWindow {
    years: Vec<String>,
}

impl YearWindow {
    pub fn new<I, S>(years: I) -> MetricsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let years: Vec<String> = years.into_iter().map(Into::into).collect();
        if years.is_empty() {
            return Err(MetricsError::InvalidData("year window must not be empty".to_string()));
        }
        Ok(Self { years })
    }

    /// `len` consecutive years ending at `last_year`, oldest first.
    pub fn ending(last_year: i32, len: usize) -> MetricsResult<Self> {
        let first = i64::try_from(len)
            .ok()
            .and_then(|len| i32::try_from(i64::from(last_year) - len + 1).ok())
            .ok_or_else(|| {
                MetricsError::InvalidData(format!("{} years ending at {} is out of range", len, last_year))
            })?;
        Self::new((first..=last_year).map(|y| y.to_string()))
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn latest(&self) -> &str {
        // Non-empty by construction.
        self.years.last().map(String::as_str).unwrap_or_default()
    }

    /// Value for each window year, `None` where the series has no reading.
    pub fn values(&self, series: Option<&PeriodSeries>) -> Vec<Option<f64>> {
        self.years
            .iter()
            .map(|year| series.and_then(|s| lookup_year(s, year)))
            .collect()
    }

    /// Re-keys the readings of `series` by bare window year.
    pub fn project(&self, series: Option<&PeriodSeries>) -> PeriodSeries {
        self.years
            .iter()
            .zip(self.values(series))
            .filter_map(|(year, value)| value.map(|v| (year.clone(), v)))
            .collect()
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            years: DEFAULT_WINDOW_YEARS.iter().map(|y| y.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for YearWindow {
    type Error = MetricsError;

    fn try_from(years: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<YearWindow> for Vec<String> {
    fn from(window: YearWindow) -> Self {
        window.years
    }
}

/// Reading for a fiscal year: the bare `YYYY` key, else the `YYYY/12`
/// year-end period.
pub fn lookup_year(series: &PeriodSeries, year: &str) -> Option<f64> {
    series
        .get(year)
        .or_else(|| series.get(&format!("{}/12", year)))
        .copied()
        .filter(|v| v.is_finite())
}

/// Exact decimal form of an `f64` as it would be printed.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// Nearest `f64` to a decimal; parsing the printed form is correctly rounded.
pub fn from_decimal(value: Decimal) -> Option<f64> {
    value.to_string().parse::<f64>().ok().or_else(|| value.to_f64())
}

/// Rounds to `dp` places, half away from zero.
pub fn round_half_up(value: f64, dp: u32) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match to_decimal(value) {
        Some(d) => from_decimal(d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)),
        None => {
            let scale = 10f64.powi(dp as i32);
            Some((value * scale).round() / scale)
        }
    }
}

fn decimal_mean(readings: &[f64]) -> Option<Decimal> {
    let mut sum = Decimal::ZERO;
    for value in readings {
        sum = sum.checked_add(to_decimal(*value)?)?;
    }
    sum.checked_div(Decimal::from(readings.len()))
}

/// Arithmetic mean of the present, finite values, rounded to two places.
///
/// Returns `None` when nothing is left after dropping absent entries.
pub fn average<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let readings: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if readings.is_empty() {
        return None;
    }

    match decimal_mean(&readings) {
        Some(mean) => from_decimal(mean.round_dp_with_strategy(
            AGGREGATE_DP,
            RoundingStrategy::MidpointAwayFromZero,
        )),
        None => {
            // Magnitudes beyond Decimal's range; plain float mean.
            let mean = readings.iter().sum::<f64>() / readings.len() as f64;
            round_half_up(mean, AGGREGATE_DP)
        }
    }
}

/// Average of `metric` over the years of `window`.
pub fn window_average<S>(source: &S, metric: &str, window: &YearWindow) -> Option<f64>
where
    S: MetricSource + ?Sized,
{
    average(window.values(source.metric_series(metric)))
}

/// Average of `metric` over 2022-2024.
pub fn three_year_average<S>(source: &S, metric: &str) -> Option<f64>
where
    S: MetricSource + ?Sized,
{
    window_average(source, metric, &YearWindow::default())
}

/// Average over every period of a series, e.g. an industry headline figure.
pub fn period_average(series: &PeriodSeries) -> Option<f64> {
    average(series.values().copied().map(Some))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NormalizedIndicatorTable;
    use approx::assert_abs_diff_eq;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn table(metric: &str, points: &[(&str, f64)]) -> NormalizedIndicatorTable {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            metric.to_string(),
            points.iter().map(|(p, v)| (p.to_string(), *v)).collect(),
        );
        NormalizedIndicatorTable::from_series(metrics)
    }

    #[test]
    fn test_average_absence() {
        assert_eq!(average(Vec::<Option<f64>>::new()), None);
        assert_eq!(average(vec![None, None]), None);
        assert_eq!(average(vec![Some(f64::NAN), None]), None);
    }

    #[test]
    fn test_average_correctness() {
        assert_eq!(average(vec![Some(10.0), Some(20.0), Some(30.0)]), Some(20.0));
        assert_eq!(average(vec![Some(10.0), None, Some(20.0)]), Some(15.0));
        assert_eq!(average(vec![Some(10.0), Some(f64::NAN), Some(20.0)]), Some(15.0));
    }

    #[test]
    fn test_average_rounding() {
        assert_eq!(average(vec![Some(1.0), Some(2.0)]), Some(1.5));
        assert_eq!(average(vec![Some(1.005), Some(1.005)]), Some(1.01));
        assert_eq!(average(vec![Some(10.0), Some(10.0), Some(11.0)]), Some(10.33));
        assert_eq!(average(vec![Some(-1.005)]), Some(-1.01));
        assert_eq!(average(vec![Some(0.1), Some(0.2)]), Some(0.15));
    }

    #[test]
    fn test_average_large_magnitudes() {
        let avg = average(vec![Some(1e30), Some(3e30)]).unwrap();
        assert_abs_diff_eq!(avg / 1e30, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_decimal_conversion_is_exact() {
        assert_eq!(to_decimal(1.005), Some(dec!(1.005)));
        assert_eq!(to_decimal(-0.1), Some(dec!(-0.1)));
        assert_eq!(to_decimal(f64::NAN), None);
        assert_eq!(from_decimal(dec!(10.33)), Some(10.33));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.675, 2), Some(2.68));
        assert_eq!(round_half_up(0.125, 2), Some(0.13));
        assert_eq!(round_half_up(f64::INFINITY, 2), None);
    }

    #[test]
    fn test_three_year_average_skips_missing_years() {
        let t = table("PER", &[("2022", 10.0), ("2024", 14.0), ("2021", 100.0)]);
        assert_eq!(three_year_average(&t, "PER"), Some(12.0));
        assert_eq!(three_year_average(&t, "PBR"), None);
    }

    #[test]
    fn test_three_year_average_uses_year_end_periods() {
        let t = table("ROE", &[("2022/12", 8.0), ("2023/12", 10.0), ("2024/06", 50.0)]);
        assert_eq!(three_year_average(&t, "ROE"), Some(9.0));
    }

    #[test]
    fn test_custom_window() {
        let t = table("PBR", &[("2021", 2.0), ("2022", 1.0), ("2023", 3.0)]);
        let window = YearWindow::ending(2022, 2).unwrap();
        assert_eq!(window.years(), ["2021", "2022"]);
        assert_eq!(window.latest(), "2022");
        assert_eq!(window_average(&t, "PBR", &window), Some(1.5));
    }

    #[test]
    fn test_window_ending_bounds() {
        assert!(YearWindow::ending(2024, 0).is_err());
        assert!(YearWindow::ending(i32::MAX, 0).is_err());
        assert!(YearWindow::ending(i32::MIN, 2).is_err());
        assert!(YearWindow::ending(2024, usize::MAX).is_err());
        assert_eq!(YearWindow::ending(i32::MIN, 1).unwrap().years(), [i32::MIN.to_string()]);
    }

    #[test]
    fn test_empty_window_rejected() {
        assert!(YearWindow::new(Vec::<String>::new()).is_err());
        assert!(serde_json::from_str::<YearWindow>("[]").is_err());
        let window: YearWindow = serde_json::from_str(r#"["2023","2024"]"#).unwrap();
        assert_eq!(window.years().len(), 2);
    }

    #[test]
    fn test_project_rekeys_by_year() {
        let t = table("PER", &[("2022/12", 5.0), ("2024/12", 7.0), ("2025/03", 9.0)]);
        let projected = YearWindow::default().project(t.series("PER"));
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get("2022"), Some(&5.0));
        assert_eq!(projected.get("2024"), Some(&7.0));
    }

    #[test]
    fn test_period_average() {
        let t = table("PER", &[("2022", 10.0), ("2023", 11.0), ("2024", 13.0), ("2025", 14.0)]);
        assert_eq!(period_average(t.series("PER").unwrap()), Some(12.0));
        assert_eq!(period_average(&PeriodSeries::new()), None);
    }
}
