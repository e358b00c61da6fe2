//! Company-vs-industry comparison of multi-year averages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use metrics_core::aggregate::{from_decimal, to_decimal};
use metrics_core::{
    metric, round_half_up, window_average, CompanyEntity, IndustryAggregate, MetricsError, MetricsResult,
    YearWindow,
};

pub const DEFAULT_TOLERANCE: f64 = 5.0;

/// Per-metric tolerance band separating a narrow gap from a wide one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Applied to metrics without an entry in `metrics`.
    #[serde(default = "default_tolerance")]
    pub default: f64,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(metric::PBR.to_string(), 0.5);
        metrics.insert(metric::ROE.to_string(), 7.0);
        Self {
            default: DEFAULT_TOLERANCE,
            metrics,
        }
    }
}

impl ToleranceConfig {
    pub fn tolerance_for(&self, metric: &str) -> f64 {
        self.metrics.get(metric).copied().unwrap_or(self.default)
    }

    pub fn with_tolerance(mut self, metric: impl Into<String>, tolerance: f64) -> Self {
        self.metrics.insert(metric.into(), tolerance);
        self
    }

    /// Tolerances must be finite and non-negative.
    pub fn validate(&self) -> MetricsResult<()> {
        let bad = |t: f64| !t.is_finite() || t < 0.0;
        if bad(self.default) {
            return Err(MetricsError::InvalidData(format!(
                "default tolerance must be a non-negative number, got {}",
                self.default
            )));
        }
        if let Some((name, t)) = self.metrics.iter().find(|(_, t)| bad(**t)) {
            return Err(MetricsError::InvalidData(format!(
                "tolerance for {} must be a non-negative number, got {}",
                name, t
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gap {
    Narrow,
    Wide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDetail {
    pub direction: Direction,
    pub gap: Gap,
    pub company_avg: f64,
    pub industry_avg: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparison {
    InsufficientData,
    Compared(ComparisonDetail),
}

impl Comparison {
    pub fn detail(&self) -> Option<&ComparisonDetail> {
        match self {
            Comparison::Compared(detail) => Some(detail),
            Comparison::InsufficientData => None,
        }
    }

    pub fn is_comparable(&self) -> bool {
        matches!(self, Comparison::Compared(_))
    }
}

/// One metric's comparison for a named company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub company: String,
    pub metric: String,
    pub outcome: Comparison,
}

/// `|a - b|`, exact in decimal where both sides are representable.
fn abs_delta(a: f64, b: f64) -> f64 {
    to_decimal(a)
        .zip(to_decimal(b))
        .and_then(|(a, b)| a.checked_sub(b))
        .and_then(|d| from_decimal(d.abs()))
        .unwrap_or_else(|| (a - b).abs())
}

/// Classifies a company aggregate against its industry aggregate.
pub fn compare(
    metric: &str,
    company_avg: Option<f64>,
    industry_avg: Option<f64>,
    config: &ToleranceConfig,
) -> Comparison {
    let (Some(company_avg), Some(industry_avg)) = (company_avg, industry_avg) else {
        return Comparison::InsufficientData;
    };
    if !company_avg.is_finite() || !industry_avg.is_finite() {
        return Comparison::InsufficientData;
    }

    let delta = abs_delta(company_avg, industry_avg);
    let direction = if company_avg > industry_avg {
        Direction::Above
    } else {
        Direction::Below
    };
    let gap = if delta < config.tolerance_for(metric) {
        Gap::Narrow
    } else {
        Gap::Wide
    };

    Comparison::Compared(ComparisonDetail {
        direction,
        gap,
        company_avg,
        industry_avg,
        delta: round_half_up(delta, 2).unwrap_or(delta),
    })
}

pub struct IndustryComparator {
    tolerances: ToleranceConfig,
    window: YearWindow,
}

impl IndustryComparator {
    pub fn new() -> Self {
        Self {
            tolerances: ToleranceConfig::default(),
            window: YearWindow::default(),
        }
    }

    pub fn with_config(tolerances: ToleranceConfig, window: YearWindow) -> Self {
        Self { tolerances, window }
    }

    pub fn tolerances(&self) -> &ToleranceConfig {
        &self.tolerances
    }

    /// Compares the company's window average for `metric` with its industry's.
    /// A missing industry aggregate is reported as insufficient data.
    pub fn compare_company(
        &self,
        company: &CompanyEntity,
        industry: Option<&IndustryAggregate>,
        metric: &str,
    ) -> MetricComparison {
        let company_avg = window_average(company, metric, &self.window);
        let industry_avg = industry.and_then(|i| window_average(i, metric, &self.window));
        if industry.is_none() {
            tracing::debug!(
                "No industry aggregate for {} ({}), cannot compare {}",
                company.name(),
                company.industry(),
                metric
            );
        }

        MetricComparison {
            company: company.name().to_string(),
            metric: metric.to_string(),
            outcome: compare(metric, company_avg, industry_avg, &self.tolerances),
        }
    }

    pub fn compare_all<S: AsRef<str>>(
        &self,
        company: &CompanyEntity,
        industry: Option<&IndustryAggregate>,
        metrics: &[S],
    ) -> Vec<MetricComparison> {
        metrics
            .iter()
            .map(|m| self.compare_company(company, industry, m.as_ref()))
            .collect()
    }
}

impl Default for IndustryComparator {
    fn default() -> Self {
        Self::new()
    }
}
