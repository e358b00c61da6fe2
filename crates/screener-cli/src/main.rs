//! screener-cli: screen, sort and compare companies from a local JSON snapshot.
//!
//! Usage:
//!   cargo run -p screener-cli -- --industry 화학 --per 0:20
//!   cargo run -p screener-cli -- --sort PBR --sort PBR     # PBR, descending
//!   cargo run -p screener-cli -- --sort 시가총액 --top 10
//!   cargo run -p screener-cli -- --company LG화학

mod args;
mod config;
mod loader;
mod report;

use anyhow::{Context, Result};

use args::{CliArgs, USAGE};
use config::AppConfig;
use industry_comparison::{trend_chart, IndustryComparator, ValuationTriangle};
use metrics_core::metric;
use stock_screener::{Ranker, Screener, SortKey, SortState};

/// Metrics shown when comparing a company against its industry.
const COMPARED_METRICS: [&str; 6] = [
    metric::PER,
    metric::PBR,
    metric::ROE,
    metric::DEBT_RATIO,
    metric::DIVIDEND_YIELD,
    metric::OPERATING_MARGIN,
];

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener_cli=info,stock_screener=info,metrics_core=warn".into()),
        )
        .init();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&raw_args) {
        Ok(cli) if cli.help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{:#}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = AppConfig::from_env()?;
    let universe = loader::load_universe(&config)?;
    let tolerances = loader::load_tolerances(config.tolerances_path.as_deref())?;

    let criteria = cli.criteria.clone().with_window(config.window.clone());
    let mut rows = Screener::new().filter(universe.companies(), &criteria);

    let ranker = Ranker::with_window(config.window.clone());
    let mut state = SortState::default();
    for key in &cli.sort_clicks {
        let (sorted, next) = ranker.sort(rows, key, &state);
        rows = sorted;
        state = next;
    }

    match cli.top {
        Some(n) => {
            let key = state.active.clone().unwrap_or_else(|| SortKey::metric(metric::ROE));
            report::print_top(&key, &ranker.top_n(&rows, &key, n));
        }
        None => report::print_screen(&rows, &ranker, &state),
    }

    if let Some(name) = &cli.company {
        let company = universe
            .get(name)
            .with_context(|| format!("{} is not in the screenable universe", name))?;
        let industry = universe.industry_of(company);
        if industry.is_none() {
            tracing::warn!("No industry aggregate for {}", company.industry());
        }

        println!();
        let comparator = IndustryComparator::with_config(tolerances, config.window.clone());
        report::print_comparison(company, &comparator.compare_all(company, industry, &COMPARED_METRICS));

        let year = config.window.latest();
        report::print_valuation(year, &ValuationTriangle::for_year(company, year).implied());

        let peers: Vec<&str> = universe.peers(company.industry()).into_iter().map(|c| c.name()).collect();
        println!("  peers: {}", peers.join(", "));

        for name in metric::QUALITY_GATE {
            report::print_trend(&trend_chart(name, &[company], industry, &config.window));
        }
    }

    Ok(())
}
