//! Deserialization of the upstream JSON snapshots.

use std::collections::BTreeMap;

use crate::normalizer::IndicatorNormalizer;
use crate::{CompanyProfile, IndustryAggregate, IndustryAggregateRecord, MetricsResult, RawIndicatorRecord};

/// `{ "<company>": { "<period>_<metric>": value, ... } }`
pub fn parse_indicator_dataset(json: &str) -> MetricsResult<BTreeMap<String, RawIndicatorRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// `[{ "기업명": ..., "업종명": ..., "종목코드": ... }]`
pub fn parse_roster(json: &str) -> MetricsResult<Vec<CompanyProfile>> {
    Ok(serde_json::from_str(json)?)
}

/// `{ "<industry>": { "companies": [...], "<metric>": { "<period>": value } } }`
pub fn parse_industry_dataset(
    json: &str,
    normalizer: &IndicatorNormalizer,
) -> MetricsResult<BTreeMap<String, IndustryAggregate>> {
    let records: BTreeMap<String, IndustryAggregateRecord> = serde_json::from_str(json)?;
    Ok(records
        .iter()
        .map(|(name, record)| (name.clone(), normalizer.normalize_industry(name, record)))
        .collect())
}
