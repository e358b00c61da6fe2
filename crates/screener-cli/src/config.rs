use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use metrics_core::YearWindow;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Snapshot files
    pub indicators_path: PathBuf, // { company: { "<period>_<metric>": value } }
    pub roster_path: PathBuf,     // [{ 기업명, 업종명, 종목코드 }]
    pub industry_path: PathBuf,   // { industry: { companies, metric: { period: value } } }
    pub tolerances_path: Option<PathBuf>,

    // Aggregation
    pub window: YearWindow,
    pub excluded_periods: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .map(PathBuf::from)
                .with_context(|| format!("{} not set", key))
        };

        let window = match lookup("DASHBOARD_WINDOW") {
            Some(years) => YearWindow::new(split_list(&years)).context("DASHBOARD_WINDOW must list at least one year")?,
            None => YearWindow::default(),
        };

        let config = Self {
            indicators_path: required("DASHBOARD_INDICATORS_PATH")?,
            roster_path: required("DASHBOARD_ROSTER_PATH")?,
            industry_path: required("DASHBOARD_INDUSTRY_PATH")?,
            tolerances_path: lookup("DASHBOARD_TOLERANCES_PATH").map(PathBuf::from),

            window,
            excluded_periods: lookup("DASHBOARD_EXCLUDED_PERIODS")
                .map(|periods| split_list(&periods))
                .unwrap_or_else(|| vec!["2025/05".to_string()]),
        };

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
