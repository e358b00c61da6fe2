//! Screening Data Models

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use metrics_core::{metric, MetricsError, YearWindow};

/// Inclusive `[min, max]` bound on a multi-year average.
///
/// `min > max` is accepted as-is; such a range matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: f64,
    pub max: f64,
}

impl ThresholdRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl FromStr for ThresholdRange {
    type Err = MetricsError;

    /// Parses `MIN:MAX`, e.g. `0:20` or `-5.5:12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MetricsError::InvalidRange(format!("expected MIN:MAX, got {:?}", s));
        let (min, max) = s.split_once(':').ok_or_else(invalid)?;
        let min: f64 = min.trim().parse().map_err(|_| invalid())?;
        let max: f64 = max.trim().parse().map_err(|_| invalid())?;
        if min.is_nan() || max.is_nan() {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }
}

impl fmt::Display for ThresholdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Industry equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndustryFilter {
    #[default]
    All,
    Only(String),
}

impl IndustryFilter {
    /// Labels that select every industry.
    pub const ALL_LABELS: [&'static str; 2] = ["ALL", "전체"];

    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || Self::ALL_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            IndustryFilter::All
        } else {
            IndustryFilter::Only(label.to_string())
        }
    }

    pub fn matches(&self, industry: &str) -> bool {
        match self {
            IndustryFilter::All => true,
            IndustryFilter::Only(name) => name == industry,
        }
    }
}

impl From<String> for IndustryFilter {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<IndustryFilter> for String {
    fn from(filter: IndustryFilter) -> Self {
        match filter {
            IndustryFilter::All => IndustryFilter::ALL_LABELS[0].to_string(),
            IndustryFilter::Only(name) => name,
        }
    }
}

impl fmt::Display for IndustryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndustryFilter::All => write!(f, "all industries"),
            IndustryFilter::Only(name) => write!(f, "{}", name),
        }
    }
}

/// How an average of exactly zero is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPolicy {
    /// Zero means "not reported" and fails the screen.
    #[default]
    TreatAsMissing,
    /// Zero is a real reading and is range-checked like any other value.
    Accept,
}

/// Everything a screen is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenCriteria {
    pub industry: IndustryFilter,
    /// metric -> inclusive range on its window average
    pub ranges: BTreeMap<String, ThresholdRange>,
    /// Metrics whose average must exist, ranged or not.
    pub metrics: Vec<String>,
    pub window: YearWindow,
    pub zero_policy: ZeroPolicy,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        let mut ranges = BTreeMap::new();
        ranges.insert(metric::PBR.to_string(), ThresholdRange::new(0.0, 3.0));
        ranges.insert(metric::PER.to_string(), ThresholdRange::new(0.0, 50.0));
        ranges.insert(metric::ROE.to_string(), ThresholdRange::new(0.0, 30.0));
        Self {
            industry: IndustryFilter::All,
            ranges,
            metrics: metric::QUALITY_GATE.iter().map(|m| m.to_string()).collect(),
            window: YearWindow::default(),
            zero_policy: ZeroPolicy::default(),
        }
    }
}

impl ScreenCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// No ranges: only the industry filter and the presence checks apply.
    pub fn unbounded() -> Self {
        Self {
            ranges: BTreeMap::new(),
            ..Self::default()
        }
    }

    pub fn with_industry(mut self, industry: IndustryFilter) -> Self {
        self.industry = industry;
        self
    }

    pub fn with_range(mut self, metric: impl Into<String>, range: ThresholdRange) -> Self {
        self.ranges.insert(metric.into(), range);
        self
    }

    pub fn with_window(mut self, window: YearWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_zero_policy(mut self, zero_policy: ZeroPolicy) -> Self {
        self.zero_policy = zero_policy;
        self
    }

    /// The listed metrics followed by any ranged metric not already listed.
    pub fn evaluated_metrics(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.metrics.iter().chain(self.ranges.keys()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// First range with `min > max`, if any.
    pub fn inverted_range(&self) -> Option<(&str, &ThresholdRange)> {
        self.ranges
            .iter()
            .find(|(_, range)| range.is_inverted())
            .map(|(name, range)| (name.as_str(), range))
    }
}

/// Column a result table is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Metric(String),
    /// Market capitalization, averaged over the window like the ratios.
    MarketCap,
}

impl SortKey {
    pub fn metric(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == metric::MARKET_CAP {
            SortKey::MarketCap
        } else {
            SortKey::Metric(name)
        }
    }

    /// Series the sort value is averaged from.
    pub fn series_name(&self) -> &str {
        match self {
            SortKey::Metric(name) => name,
            SortKey::MarketCap => metric::MARKET_CAP,
        }
    }
}

impl FromStr for SortKey {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(MetricsError::InvalidData("sort key must not be empty".to_string())),
            "MarketCap" | "market_cap" => Ok(SortKey::MarketCap),
            name => Ok(SortKey::metric(name)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.series_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and its direction. Starts unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub active: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    /// State after selecting `key`: the active key flips direction, any other
    /// key becomes active in ascending order.
    pub fn next(&self, key: &SortKey) -> SortState {
        if self.active.as_ref() == Some(key) {
            SortState {
                active: self.active.clone(),
                direction: self.direction.toggled(),
            }
        } else {
            SortState {
                active: Some(key.clone()),
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// Why a company failed a screen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("industry {actual} does not match {expected}")]
    IndustryMismatch { expected: String, actual: String },

    #[error("no {metric} reading over the window")]
    MissingAverage { metric: String },

    #[error("{metric} average is zero")]
    ZeroAverage { metric: String },

    #[error("{metric} average {value} outside {range}")]
    OutOfRange {
        metric: String,
        value: f64,
        range: ThresholdRange,
    },

    #[error("{metric} range {range} is inverted")]
    InvertedRange { metric: String, range: ThresholdRange },
}

/// A company that passed a screen, with the averages it was judged on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenMatch {
    pub company: String,
    pub industry: String,
    pub averages: BTreeMap<String, f64>,
}

impl ScreenMatch {
    pub fn average(&self, metric: &str) -> Option<f64> {
        self.averages.get(metric).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_range_parse() {
        let range: ThresholdRange = "0:20".parse().unwrap();
        assert_eq!(range, ThresholdRange::new(0.0, 20.0));
        assert!(range.contains(0.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(20.01));

        let negative: ThresholdRange = " -5.5 : 12 ".parse().unwrap();
        assert_eq!(negative.min, -5.5);

        assert!(matches!("20".parse::<ThresholdRange>(), Err(MetricsError::InvalidRange(_))));
        assert!("a:b".parse::<ThresholdRange>().is_err());
        assert!("NaN:1".parse::<ThresholdRange>().is_err());
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = ThresholdRange::new(5.0, 1.0);
        assert!(range.is_inverted());
        assert!(!range.contains(3.0));
        assert!(!range.contains(5.0));
        assert!(!range.contains(1.0));
    }

    #[test]
    fn test_industry_filter_parse() {
        assert_eq!(IndustryFilter::parse("ALL"), IndustryFilter::All);
        assert_eq!(IndustryFilter::parse("전체"), IndustryFilter::All);
        assert_eq!(IndustryFilter::parse("all"), IndustryFilter::All);
        assert_eq!(IndustryFilter::parse("화학"), IndustryFilter::Only("화학".to_string()));
        assert!(IndustryFilter::parse("화학").matches("화학"));
        assert!(!IndustryFilter::parse("화학").matches("철강"));
        assert!(IndustryFilter::All.matches("철강"));
    }

    #[test]
    fn test_default_criteria() {
        let criteria = ScreenCriteria::default();
        assert_eq!(criteria.ranges["PBR"], ThresholdRange::new(0.0, 3.0));
        assert_eq!(criteria.ranges["PER"], ThresholdRange::new(0.0, 50.0));
        assert_eq!(criteria.ranges["ROE"], ThresholdRange::new(0.0, 30.0));
        assert_eq!(criteria.evaluated_metrics(), vec!["PER", "PBR", "ROE"]);
        assert_eq!(criteria.zero_policy, ZeroPolicy::TreatAsMissing);
        assert!(criteria.inverted_range().is_none());
    }

    #[test]
    fn test_ranged_metrics_are_evaluated() {
        let criteria = ScreenCriteria::unbounded().with_range("DPS", ThresholdRange::new(100.0, 5000.0));
        assert_eq!(criteria.evaluated_metrics(), vec!["PER", "PBR", "ROE", "DPS"]);
    }

    #[test]
    fn test_criteria_from_json() {
        let criteria: ScreenCriteria = serde_json::from_str(
            r#"{"industry": "전체", "ranges": {"PER": {"min": 0, "max": 20}}, "zero_policy": "accept"}"#,
        )
        .unwrap();
        assert_eq!(criteria.industry, IndustryFilter::All);
        assert_eq!(criteria.ranges.len(), 1);
        assert_eq!(criteria.zero_policy, ZeroPolicy::Accept);
        assert_eq!(criteria.window, YearWindow::default());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("시가총액".parse::<SortKey>().unwrap(), SortKey::MarketCap);
        assert_eq!("MarketCap".parse::<SortKey>().unwrap(), SortKey::MarketCap);
        assert_eq!("PBR".parse::<SortKey>().unwrap(), SortKey::Metric("PBR".to_string()));
        assert_eq!(SortKey::MarketCap.series_name(), "시가총액");
        assert!("".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_state_toggles() {
        let pbr = SortKey::metric("PBR");
        let per = SortKey::metric("PER");

        let first = SortState::default().next(&pbr);
        assert_eq!(first.direction, SortDirection::Ascending);
        let second = first.next(&pbr);
        assert_eq!(second.direction, SortDirection::Descending);
        let third = second.next(&pbr);
        assert_eq!(third.direction, SortDirection::Ascending);

        let switched = second.next(&per);
        assert_eq!(switched.active, Some(per));
        assert_eq!(switched.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_rejection_messages() {
        let rejection = Rejection::OutOfRange {
            metric: "PER".to_string(),
            value: 30.0,
            range: ThresholdRange::new(0.0, 20.0),
        };
        assert_eq!(rejection.to_string(), "PER average 30 outside [0, 20]");
    }
}
