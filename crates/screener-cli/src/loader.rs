//! Reads the JSON snapshot files named by the configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use industry_comparison::ToleranceConfig;
use metrics_core::dataset::{parse_indicator_dataset, parse_industry_dataset, parse_roster};
use metrics_core::{IndicatorNormalizer, NormalizerConfig};
use stock_screener::Universe;

use crate::config::AppConfig;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn load_universe(config: &AppConfig) -> Result<Universe> {
    let normalizer = IndicatorNormalizer::with_config(NormalizerConfig {
        excluded_periods: config.excluded_periods.clone(),
    });

    let roster = parse_roster(&read(&config.roster_path)?)
        .with_context(|| format!("Invalid roster in {}", config.roster_path.display()))?;
    let indicators = parse_indicator_dataset(&read(&config.indicators_path)?)
        .with_context(|| format!("Invalid indicator dataset in {}", config.indicators_path.display()))?;
    let industries = parse_industry_dataset(&read(&config.industry_path)?, &normalizer)
        .with_context(|| format!("Invalid industry dataset in {}", config.industry_path.display()))?;

    tracing::info!(
        "Loaded {} roster entries, {} indicator records, {} industries",
        roster.len(),
        indicators.len(),
        industries.len()
    );

    Ok(Universe::from_snapshot(&roster, &indicators, &normalizer, &config.window).with_industries(industries))
}

pub fn load_tolerances(path: Option<&Path>) -> Result<ToleranceConfig> {
    let Some(path) = path else {
        return Ok(ToleranceConfig::default());
    };
    let tolerances: ToleranceConfig = serde_json::from_str(&read(path)?)
        .with_context(|| format!("Invalid tolerance config in {}", path.display()))?;
    tolerances
        .validate()
        .with_context(|| format!("Invalid tolerance config in {}", path.display()))?;
    Ok(tolerances)
}
