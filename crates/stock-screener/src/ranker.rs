//! Result Ranking Module
//!
//! Orders screened companies by the window average of a metric, with
//! click-to-toggle sort state.

use std::borrow::Borrow;
use std::cmp::Ordering;

use metrics_core::{window_average, CompanyEntity, YearWindow};

use crate::models::{SortDirection, SortKey, SortState};

pub struct Ranker {
    window: YearWindow,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker {
    pub fn new() -> Self {
        Self {
            window: YearWindow::default(),
        }
    }

    pub fn with_window(window: YearWindow) -> Self {
        Self { window }
    }

    /// Window average of the key's series, or `None` without readings.
    pub fn value(&self, company: &CompanyEntity, key: &SortKey) -> Option<f64> {
        window_average(company, key.series_name(), &self.window)
    }

    /// Sort value: companies without a reading sort as 0.
    pub fn sort_value(&self, company: &CompanyEntity, key: &SortKey) -> f64 {
        self.value(company, key).unwrap_or(0.0)
    }

    /// Applies a click on `key` to `state` and returns the reordered companies
    /// together with the new state. Ties keep their input order.
    pub fn sort<C>(&self, mut companies: Vec<C>, key: &SortKey, state: &SortState) -> (Vec<C>, SortState)
    where
        C: Borrow<CompanyEntity>,
    {
        let next = state.next(key);
        self.sort_by_key(&mut companies, key, next.direction);
        (companies, next)
    }

    /// Stable in-place sort by `key` in a fixed direction.
    pub fn sort_by_key<C>(&self, companies: &mut [C], key: &SortKey, direction: SortDirection)
    where
        C: Borrow<CompanyEntity>,
    {
        companies.sort_by(|a, b| {
            let a = self.sort_value(a.borrow(), key);
            let b = self.sort_value(b.borrow(), key);
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// The `n` companies with the highest average, highest first. Companies
    /// without a reading are left out.
    pub fn top_n<'a, C>(&self, companies: &'a [C], key: &SortKey, n: usize) -> Vec<(&'a CompanyEntity, f64)>
    where
        C: Borrow<CompanyEntity>,
    {
        let mut ranked: Vec<(&CompanyEntity, f64)> = companies
            .iter()
            .filter_map(|c| {
                let company: &CompanyEntity = c.borrow();
                self.value(company, key).map(|v| (company, v))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}
