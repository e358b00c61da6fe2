//! Indicator normalization: the single boundary between the upstream
//! `"<period>_<metric>"` records and typed tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{IndustryAggregate, IndustryAggregateRecord, NormalizedIndicatorTable, PeriodSeries, RawIndicatorRecord};

/// Partial-month snapshot the feed publishes alongside the annual figures.
pub const STALE_PERIOD: &str = "2025/05";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Periods dropped from every table.
    #[serde(default = "default_excluded_periods")]
    pub excluded_periods: Vec<String>,
}

fn default_excluded_periods() -> Vec<String> {
    vec![STALE_PERIOD.to_string()]
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            excluded_periods: default_excluded_periods(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorNormalizer {
    config: NormalizerConfig,
}

impl IndicatorNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Parses one raw record into a metric -> period -> value table.
    ///
    /// Keys without a `_` separator, zero values and anything that is not a
    /// finite number are skipped rather than reported.
    pub fn normalize(&self, raw: &RawIndicatorRecord) -> NormalizedIndicatorTable {
        let mut metrics: BTreeMap<String, PeriodSeries> = BTreeMap::new();
        let mut periods: BTreeSet<&str> = BTreeSet::new();

        for (key, value) in raw {
            let Some((period, metric)) = split_key(key) else {
                tracing::trace!("Skipping non-indicator key {:?}", key);
                continue;
            };
            let Some(reading) = reading(value) else {
                continue;
            };
            if self.is_excluded(period) {
                continue;
            }
            metrics
                .entry(metric.to_string())
                .or_default()
                .insert(period.to_string(), reading);
            periods.insert(period);
        }

        tracing::trace!(
            "Normalized {} raw keys into {} metrics over {} periods",
            raw.len(),
            metrics.len(),
            periods.len()
        );
        NormalizedIndicatorTable::from_series(metrics)
    }

    /// Normalizes a `name -> raw record` dataset.
    pub fn normalize_dataset(
        &self,
        dataset: &BTreeMap<String, RawIndicatorRecord>,
    ) -> BTreeMap<String, NormalizedIndicatorTable> {
        dataset
            .iter()
            .map(|(name, raw)| (name.clone(), self.normalize(raw)))
            .collect()
    }

    /// Builds an industry aggregate from its upstream `metric -> period -> value`
    /// shape, applying the same absence rules as company records.
    pub fn normalize_industry(&self, name: &str, record: &IndustryAggregateRecord) -> IndustryAggregate {
        let mut raw = RawIndicatorRecord::new();
        for (metric, series) in &record.metrics {
            let Value::Object(points) = series else {
                tracing::debug!("Industry {} metric {} is not a period map, skipping", name, metric);
                continue;
            };
            for (period, value) in points {
                raw.insert(format!("{}_{}", period, metric), value.clone());
            }
        }
        IndustryAggregate::new(name, record.companies.clone(), self.normalize(&raw))
    }

    fn is_excluded(&self, period: &str) -> bool {
        self.config.excluded_periods.iter().any(|p| p == period)
    }
}

/// Normalizes with the default configuration.
pub fn normalize(raw: &RawIndicatorRecord) -> NormalizedIndicatorTable {
    IndicatorNormalizer::new().normalize(raw)
}

/// Splits `"<period>_<metric>"` at the first underscore; the metric keeps any
/// further underscores.
fn split_key(key: &str) -> Option<(&str, &str)> {
    let (period, metric) = key.split_once('_')?;
    if period.is_empty() || metric.is_empty() {
        return None;
    }
    Some((period, metric))
}

/// A usable reading: finite and non-zero. Numeric strings such as `"1,234.5"`
/// are accepted.
fn reading(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number != 0.0).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawIndicatorRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_end_to_end_record() {
        let table = normalize(&raw(json!({
            "2022_PER": 10,
            "2023_PER": 0,
            "2024_PER": 14,
            "2022_PBR": 1.0
        })));

        let per = table.series("PER").unwrap();
        assert_eq!(per.len(), 2);
        assert_eq!(per.get("2022"), Some(&10.0));
        assert_eq!(per.get("2024"), Some(&14.0));
        assert_eq!(per.get("2023"), None);

        let pbr = table.series("PBR").unwrap();
        assert_eq!(pbr.keys().collect::<Vec<_>>(), vec!["2022"]);
        assert_eq!(table.periods(), ["2022", "2024"]);
    }

    #[test]
    fn test_metric_keeps_inner_underscores() {
        let table = normalize(&raw(json!({ "2023/12_지배주주_순이익": 5000 })));
        assert_eq!(table.get("지배주주_순이익", "2023/12"), Some(5000.0));
    }

    #[test]
    fn test_malformed_keys_are_skipped() {
        let table = normalize(&raw(json!({
            "기업명": "삼성전자",
            "_PER": 3,
            "2024_": 4,
            "2024_ROE": 9.5
        })));
        assert_eq!(table.metric_names().collect::<Vec<_>>(), vec!["ROE"]);
        assert_eq!(table.periods(), ["2024"]);
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let table = normalize(&raw(json!({
            "2022_PER": null,
            "2023_PER": 0.0,
            "2024_PER": "-",
            "2022_ROE": [],
            "2023_ROE": "1,234.5",
            "2024_ROE": -3.2
        })));
        assert!(!table.has_reading("PER"));
        assert_eq!(table.get("ROE", "2023"), Some(1234.5));
        assert_eq!(table.get("ROE", "2024"), Some(-3.2));
    }

    #[test]
    fn test_stale_period_excluded() {
        let table = normalize(&raw(json!({
            "2024/12_PER": 11,
            "2025/05_PER": 13,
            "2025/05_PBR": 0.8
        })));
        assert_eq!(table.periods(), ["2024/12"]);
        assert_eq!(table.get("PER", "2025/05"), None);
        assert!(!table.has_reading("PBR"));
    }

    #[test]
    fn test_custom_excluded_periods() {
        let normalizer = IndicatorNormalizer::with_config(NormalizerConfig {
            excluded_periods: vec!["2021/12".to_string()],
        });
        let table = normalizer.normalize(&raw(json!({
            "2021/12_PER": 7,
            "2025/05_PER": 13
        })));
        assert_eq!(table.periods(), ["2025/05"]);
    }

    #[test]
    fn test_periods_and_metrics_sorted() {
        let table = normalize(&raw(json!({
            "2024/12_ROE": 1,
            "2022/12_PER": 2,
            "2023/12_EPS": 3,
            "2022/12_BPS": 4
        })));
        assert_eq!(table.periods(), ["2022/12", "2023/12", "2024/12"]);
        assert_eq!(
            table.metric_names().collect::<Vec<_>>(),
            vec!["BPS", "EPS", "PER", "ROE"]
        );
    }

    #[test]
    fn test_normalization_idempotent() {
        let first = normalize(&raw(json!({
            "2022/12_PER": 10.5,
            "2023/12_PER": 0,
            "2023/12_부채비율": 120.3,
            "2024/12_영업_이익": 77,
            "2025/05_PER": 9,
            "note": "ignored"
        })));
        let second = normalize(&first.to_raw());
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_never_reaches_table() {
        let record = raw(json!({
            "2022_PER": 0, "2023_PER": 0.0, "2024_PER": 12,
            "2022_ROE": 0
        }));
        let table = normalize(&record);
        assert_eq!(table.series("PER").unwrap().len(), 1);
        assert!(table.series("ROE").is_none());
        assert!(table.to_raw().values().all(|v| v.as_f64() != Some(0.0)));
    }

    #[test]
    fn test_normalize_industry_record() {
        let record: IndustryAggregateRecord = serde_json::from_value(json!({
            "companies": ["B", "A"],
            "PER": { "2022": 11.2, "2023": 0, "2024": 12.8 },
            "PBR": { "2022": 0.9 },
            "note": "ignored"
        }))
        .unwrap();

        let industry = IndicatorNormalizer::new().normalize_industry("화학", &record);

        assert_eq!(industry.name, "화학");
        assert_eq!(industry.sorted_companies(), vec!["A", "B"]);
        assert_eq!(industry.metrics.get("PER", "2024"), Some(12.8));
        assert_eq!(industry.metrics.get("PER", "2023"), None);
        assert_eq!(industry.metrics.periods(), ["2022", "2024"]);
    }

    #[test]
    fn test_normalize_dataset() {
        let mut dataset = BTreeMap::new();
        dataset.insert("A".to_string(), raw(json!({ "2024_PER": 5 })));
        dataset.insert("B".to_string(), raw(json!({})));

        let tables = IndicatorNormalizer::new().normalize_dataset(&dataset);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables["A"].get("PER", "2024"), Some(5.0));
        assert!(tables["B"].is_empty());
    }
}
