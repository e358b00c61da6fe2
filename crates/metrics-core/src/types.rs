use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::YearWindow;
use crate::MetricSource;

/// Raw indicator record as delivered by the upstream feed:
/// `"<period>_<metricName>" -> value`.
pub type RawIndicatorRecord = serde_json::Map<String, serde_json::Value>;

/// Period label -> reported value. Keys sort chronologically for both `YYYY`
/// and `YYYY/MM` labels.
pub type PeriodSeries = BTreeMap<String, f64>;

/// Recognised metric names as they appear in the upstream feed.
pub mod metric {
    pub const PER: &str = "PER";
    pub const PBR: &str = "PBR";
    pub const ROE: &str = "ROE";
    pub const ROA: &str = "ROA";
    pub const DPS: &str = "DPS";
    pub const EPS: &str = "EPS";
    pub const BPS: &str = "BPS";
    pub const DEBT_RATIO: &str = "부채비율";
    pub const DIVIDEND_YIELD: &str = "배당수익률";
    pub const OPERATING_MARGIN: &str = "영업이익률";
    pub const REVENUE: &str = "매출액";
    pub const OPERATING_PROFIT: &str = "영업이익";
    pub const NET_PROFIT: &str = "당기순이익";
    pub const MARKET_CAP: &str = "시가총액";
    pub const CONTROLLING_EQUITY: &str = "지배주주지분";
    pub const CONTROLLING_NET_INCOME: &str = "지배주주순이익";

    /// Ratios every screenable company must have at least one reading for.
    pub const QUALITY_GATE: [&str; 3] = [PER, PBR, ROE];
}

/// metric -> period -> value, plus the ordered period axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIndicatorTable {
    metrics: BTreeMap<String, PeriodSeries>,
    periods: Vec<String>,
}

impl NormalizedIndicatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from metric series, deriving the period axis as the
    /// sorted union of every series' keys. Empty series are dropped.
    pub fn from_series(metrics: BTreeMap<String, PeriodSeries>) -> Self {
        let metrics: BTreeMap<String, PeriodSeries> = metrics
            .into_iter()
            .filter(|(_, series)| !series.is_empty())
            .collect();
        let mut periods: Vec<String> = metrics
            .values()
            .flat_map(|series| series.keys().cloned())
            .collect();
        periods.sort();
        periods.dedup();
        Self { metrics, periods }
    }

    pub fn get(&self, metric: &str, period: &str) -> Option<f64> {
        self.metrics.get(metric).and_then(|s| s.get(period)).copied()
    }

    pub fn series(&self, metric: &str) -> Option<&PeriodSeries> {
        self.metrics.get(metric)
    }

    /// Metric names in lexicographic order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Every period that carries at least one reading, ascending.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// True when the metric has at least one reading in any period.
    pub fn has_reading(&self, metric: &str) -> bool {
        self.metrics.get(metric).is_some_and(|s| !s.is_empty())
    }

    /// Re-serializes into the `"<period>_<metric>"` key scheme.
    pub fn to_raw(&self) -> RawIndicatorRecord {
        let mut raw = RawIndicatorRecord::new();
        for (metric, series) in &self.metrics {
            for (period, value) in series {
                raw.insert(format!("{}_{}", period, metric), serde_json::json!(value));
            }
        }
        raw
    }
}

impl MetricSource for NormalizedIndicatorTable {
    fn metric_series(&self, metric: &str) -> Option<&PeriodSeries> {
        self.series(metric)
    }
}

/// Roster entry for one listed company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "기업명", alias = "name")]
    pub name: String,
    #[serde(rename = "업종명", alias = "industry")]
    pub industry: String,
    #[serde(rename = "종목코드", alias = "ticker", default)]
    pub ticker: Option<String>,
}

impl CompanyProfile {
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            industry: industry.into(),
            ticker: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }
}

/// Year-keyed series used by the screening table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSeries {
    pub per: PeriodSeries,
    pub pbr: PeriodSeries,
    pub roe: PeriodSeries,
    pub dps: PeriodSeries,
    pub controlling_equity: PeriodSeries,
    pub controlling_net_income: PeriodSeries,
    pub market_cap: PeriodSeries,
}

impl ScreeningSeries {
    /// Projects the screening metrics of `table` onto the years of `window`.
    pub fn project(table: &NormalizedIndicatorTable, window: &YearWindow) -> Self {
        let project = |name: &str| window.project(table.series(name));
        Self {
            per: project(metric::PER),
            pbr: project(metric::PBR),
            roe: project(metric::ROE),
            dps: project(metric::DPS),
            controlling_equity: project(metric::CONTROLLING_EQUITY),
            controlling_net_income: project(metric::CONTROLLING_NET_INCOME),
            market_cap: project(metric::MARKET_CAP),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PeriodSeries> {
        match name {
            metric::PER => Some(&self.per),
            metric::PBR => Some(&self.pbr),
            metric::ROE => Some(&self.roe),
            metric::DPS => Some(&self.dps),
            metric::CONTROLLING_EQUITY => Some(&self.controlling_equity),
            metric::CONTROLLING_NET_INCOME => Some(&self.controlling_net_income),
            metric::MARKET_CAP => Some(&self.market_cap),
            _ => None,
        }
    }
}

/// A company with its full indicator table and its screening projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntity {
    pub profile: CompanyProfile,
    pub indicators: NormalizedIndicatorTable,
    pub screening: ScreeningSeries,
}

impl CompanyEntity {
    pub fn new(profile: CompanyProfile, indicators: NormalizedIndicatorTable, window: &YearWindow) -> Self {
        let screening = ScreeningSeries::project(&indicators, window);
        Self {
            profile,
            indicators,
            screening,
        }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn industry(&self) -> &str {
        &self.profile.industry
    }

    /// True when any reading exists for the metric, in the screening
    /// projection or anywhere in the indicator history.
    pub fn has_reading(&self, name: &str) -> bool {
        self.screening.get(name).is_some_and(|s| !s.is_empty()) || self.indicators.has_reading(name)
    }
}

impl MetricSource for CompanyEntity {
    /// Always the full indicator history, so any window can be averaged. The
    /// screening projection is a view of the same readings.
    fn metric_series(&self, name: &str) -> Option<&PeriodSeries> {
        self.indicators.series(name)
    }
}

/// Cross-sectional industry averages, computed upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryAggregate {
    pub name: String,
    pub companies: Vec<String>,
    pub metrics: NormalizedIndicatorTable,
}

impl IndustryAggregate {
    pub fn new(name: impl Into<String>, companies: Vec<String>, metrics: NormalizedIndicatorTable) -> Self {
        Self {
            name: name.into(),
            companies,
            metrics,
        }
    }

    /// Member names in lexicographic order.
    pub fn sorted_companies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.companies.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, company: &str) -> bool {
        self.companies.iter().any(|c| c == company)
    }
}

impl MetricSource for IndustryAggregate {
    fn metric_series(&self, metric: &str) -> Option<&PeriodSeries> {
        self.metrics.series(metric)
    }
}

/// Upstream JSON shape of one industry entry:
/// `{ "companies": [...], "<metric>": { "<period>": value } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryAggregateRecord {
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}
