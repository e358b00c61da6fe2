//! Threshold screening over multi-year averages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use metrics_core::{window_average, CompanyEntity};

use crate::models::{Rejection, ScreenCriteria, ScreenMatch, ZeroPolicy};
use crate::universe::Universe;

/// Outcome counts of one screening pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub total_screened: usize,
    pub total_passed_filters: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Screener;

impl Screener {
    pub fn new() -> Self {
        Self
    }

    /// Companies satisfying every criterion, in input order.
    ///
    /// An inverted range anywhere in `criteria` yields an empty result.
    pub fn filter<'a, I>(&self, companies: I, criteria: &ScreenCriteria) -> Vec<&'a CompanyEntity>
    where
        I: IntoIterator<Item = &'a CompanyEntity>,
    {
        self.filter_with_summary(companies, criteria).0
    }

    pub fn filter_with_summary<'a, I>(
        &self,
        companies: I,
        criteria: &ScreenCriteria,
    ) -> (Vec<&'a CompanyEntity>, ScreenSummary)
    where
        I: IntoIterator<Item = &'a CompanyEntity>,
    {
        if let Some((metric, range)) = criteria.inverted_range() {
            tracing::debug!("{} range {} is inverted, nothing can match", metric, range);
            return (Vec::new(), ScreenSummary::default());
        }

        let mut summary = ScreenSummary::default();
        let mut passed = Vec::new();
        for company in companies {
            summary.total_screened += 1;
            match self.evaluate(company, criteria) {
                Ok(_) => passed.push(company),
                Err(rejection) => tracing::debug!("{} rejected: {}", company.name(), rejection),
            }
        }
        summary.total_passed_filters = passed.len();

        tracing::info!(
            "Screened {} companies in {}, {} passed filters",
            summary.total_screened,
            criteria.industry,
            summary.total_passed_filters
        );
        (passed, summary)
    }

    /// Checks one company, returning its averages or the first failed criterion.
    pub fn evaluate(&self, company: &CompanyEntity, criteria: &ScreenCriteria) -> Result<ScreenMatch, Rejection> {
        if let Some((metric, range)) = criteria.inverted_range() {
            return Err(Rejection::InvertedRange {
                metric: metric.to_string(),
                range: *range,
            });
        }

        if !criteria.industry.matches(company.industry()) {
            return Err(Rejection::IndustryMismatch {
                expected: criteria.industry.to_string(),
                actual: company.industry().to_string(),
            });
        }

        let mut averages = BTreeMap::new();
        for metric in criteria.evaluated_metrics() {
            let value = window_average(company, metric, &criteria.window).ok_or_else(|| Rejection::MissingAverage {
                metric: metric.to_string(),
            })?;

            if value == 0.0 && criteria.zero_policy == ZeroPolicy::TreatAsMissing {
                return Err(Rejection::ZeroAverage {
                    metric: metric.to_string(),
                });
            }

            if let Some(range) = criteria.ranges.get(metric) {
                if !range.contains(value) {
                    return Err(Rejection::OutOfRange {
                        metric: metric.to_string(),
                        value,
                        range: *range,
                    });
                }
            }
            averages.insert(metric.to_string(), value);
        }

        Ok(ScreenMatch {
            company: company.name().to_string(),
            industry: company.industry().to_string(),
            averages,
        })
    }
}

/// Screens every company of the universe.
pub fn filter<'a>(universe: &'a Universe, criteria: &ScreenCriteria) -> Vec<&'a CompanyEntity> {
    Screener::new().filter(universe.companies(), criteria)
}
