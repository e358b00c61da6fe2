//! Per-year trend lines for companies charted against their industry.

use serde::{Deserialize, Serialize};

use metrics_core::{period_average, CompanyEntity, IndustryAggregate, MetricSource, YearWindow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub label: String,
    pub points: Vec<TrendPoint>,
}

impl TrendLine {
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// True when no year has a reading.
    pub fn is_blank(&self) -> bool {
        self.points.iter().all(|p| p.value.is_none())
    }
}

/// One metric charted over a window: a line per company, then the industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChart {
    pub metric: String,
    pub years: Vec<String>,
    pub lines: Vec<TrendLine>,
    /// Mean of the industry series over every reported period.
    pub industry_headline: Option<f64>,
}

/// Values of `metric` for each window year; missing years stay `None`.
pub fn trend_line<S>(label: &str, source: &S, metric: &str, window: &YearWindow) -> TrendLine
where
    S: MetricSource + ?Sized,
{
    let points = window
        .years()
        .iter()
        .zip(window.values(source.metric_series(metric)))
        .map(|(year, value)| TrendPoint {
            year: year.clone(),
            value,
        })
        .collect();
    TrendLine {
        label: label.to_string(),
        points,
    }
}

pub fn trend_chart(
    metric: &str,
    companies: &[&CompanyEntity],
    industry: Option<&IndustryAggregate>,
    window: &YearWindow,
) -> TrendChart {
    let mut lines: Vec<TrendLine> = companies
        .iter()
        .map(|c| trend_line(c.name(), *c, metric, window))
        .collect();

    let mut industry_headline = None;
    if let Some(industry) = industry {
        lines.push(trend_line(&industry.name, industry, metric, window));
        industry_headline = industry.metrics.series(metric).and_then(period_average);
    }

    TrendChart {
        metric: metric.to_string(),
        years: window.years().to_vec(),
        lines,
        industry_headline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::{normalize, CompanyProfile};
    use serde_json::json;

    fn company(name: &str, raw: serde_json::Value) -> CompanyEntity {
        let table = normalize(raw.as_object().unwrap());
        CompanyEntity::new(CompanyProfile::new(name, "화학"), table, &YearWindow::default())
    }

    #[test]
    fn test_trend_line_keeps_gaps() {
        let a = company("A", json!({ "2022/12_ROE": 8.0, "2024/12_ROE": 12.0 }));
        let line = trend_line("A", &a, "ROE", &YearWindow::default());
        assert_eq!(line.values(), vec![Some(8.0), None, Some(12.0)]);
        assert_eq!(line.points[1].year, "2023");
        assert!(!line.is_blank());
    }

    #[test]
    fn test_trend_chart_two_companies_and_industry() {
        let a = company("A", json!({ "2022_PER": 10, "2023_PER": 11, "2024_PER": 12 }));
        let b = company("B", json!({ "2023_PER": 20 }));
        let industry = IndustryAggregate::new(
            "화학",
            vec!["A".to_string(), "B".to_string()],
            normalize(
                json!({ "2021_PER": 9, "2022_PER": 14, "2023_PER": 15, "2024_PER": 16 })
                    .as_object()
                    .unwrap(),
            ),
        );

        let chart = trend_chart("PER", &[&a, &b], Some(&industry), &YearWindow::default());

        assert_eq!(chart.years, ["2022", "2023", "2024"]);
        let labels: Vec<&str> = chart.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "화학"]);
        assert_eq!(chart.lines[1].values(), vec![None, Some(20.0), None]);
        assert_eq!(chart.lines[2].values(), vec![Some(14.0), Some(15.0), Some(16.0)]);
        assert_eq!(chart.industry_headline, Some(13.5));
    }

    #[test]
    fn test_trend_chart_without_industry() {
        let a = company("A", json!({}));
        let chart = trend_chart("ROE", &[&a], None, &YearWindow::default());
        assert_eq!(chart.lines.len(), 1);
        assert!(chart.lines[0].is_blank());
        assert_eq!(chart.industry_headline, None);
    }
}
