//! Plain-text rendering of screen results and company comparisons.

use industry_comparison::{Comparison, Direction, Gap, ImpliedRatios, MetricComparison, TrendChart};
use metrics_core::{metric, CompanyEntity};
use stock_screener::{Ranker, SortKey, SortState};

pub fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Market cap in 억원 (1e8 KRW), the unit the dashboard displays.
pub fn fmt_market_cap(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}억", v / 1e8),
        None => "-".to_string(),
    }
}

pub fn describe(comparison: &MetricComparison) -> String {
    match &comparison.outcome {
        Comparison::InsufficientData => format!("{}: insufficient data", comparison.metric),
        Comparison::Compared(detail) => {
            let direction = match detail.direction {
                Direction::Above => "above",
                Direction::Below => "below",
            };
            let gap = match detail.gap {
                Gap::Narrow => "narrow gap",
                Gap::Wide => "wide gap",
            };
            format!(
                "{}: {:.2} vs industry {:.2} ({} by {:.2}, {})",
                comparison.metric, detail.company_avg, detail.industry_avg, direction, detail.delta, gap
            )
        }
    }
}

pub fn print_screen(companies: &[&CompanyEntity], ranker: &Ranker, state: &SortState) {
    if let Some(key) = &state.active {
        println!("Sorted by {} ({:?})", key, state.direction);
    }
    println!(
        "{:<20} {:<14} {:>8} {:>8} {:>8} {:>8} {:>12}",
        "Company", "Industry", "PER", "PBR", "ROE", "DPS", "Market cap"
    );
    for company in companies {
        let avg = |name: &str| ranker.value(company, &SortKey::metric(name));
        println!(
            "{:<20} {:<14} {:>8} {:>8} {:>8} {:>8} {:>12}",
            company.name(),
            company.industry(),
            fmt_value(avg(metric::PER)),
            fmt_value(avg(metric::PBR)),
            fmt_value(avg(metric::ROE)),
            fmt_value(avg(metric::DPS)),
            fmt_market_cap(avg(metric::MARKET_CAP)),
        );
    }
    println!("{} companies", companies.len());
}

pub fn print_top(key: &SortKey, ranked: &[(&CompanyEntity, f64)]) {
    println!("Top {} by {}", ranked.len(), key);
    for (rank, (company, value)) in ranked.iter().enumerate() {
        println!("{:>3}. {:<20} {:>12}", rank + 1, company.name(), fmt_value(Some(*value)));
    }
}

pub fn print_comparison(company: &CompanyEntity, comparisons: &[MetricComparison]) {
    println!("{} ({}) vs industry average", company.name(), company.industry());
    for comparison in comparisons {
        println!("  {}", describe(comparison));
    }
}

pub fn print_valuation(year: &str, implied: &ImpliedRatios) {
    println!(
        "  {} valuation: PBR {} / PER {} / ROE {}",
        year,
        fmt_value(implied.pbr),
        fmt_value(implied.per),
        fmt_value(implied.roe)
    );
}

pub fn print_trend(chart: &TrendChart) {
    println!("  {} trend ({})", chart.metric, chart.years.join(", "));
    for line in &chart.lines {
        let values: Vec<String> = line.values().into_iter().map(fmt_value).collect();
        println!("    {:<20} {}", line.label, values.join("  "));
    }
    if let Some(headline) = chart.industry_headline {
        println!("    industry average over all periods: {:.2}", headline);
    }
}
