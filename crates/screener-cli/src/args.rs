use anyhow::{bail, Context, Result};

use metrics_core::metric;
use stock_screener::{IndustryFilter, ScreenCriteria, SortKey, ThresholdRange, ZeroPolicy};

pub const USAGE: &str = "\
Usage:
  screener-cli [OPTIONS]

Options:
  --industry NAME          Only screen one industry (ALL or 전체 for every industry)
  --per MIN:MAX            PER range on the window average (default 0:50)
  --pbr MIN:MAX            PBR range on the window average (default 0:3)
  --roe MIN:MAX            ROE range on the window average (default 0:30)
  --range METRIC=MIN:MAX   Range on any other metric, e.g. 부채비율=0:100
  --accept-zero            Treat a zero average as a real value
  --sort KEY               Sort by a metric or 시가총액; repeat a key to flip direction
  --top N                  Show the N highest companies for the active sort key
  --company NAME           Compare one company against its industry

Environment:
  DASHBOARD_INDICATORS_PATH, DASHBOARD_ROSTER_PATH, DASHBOARD_INDUSTRY_PATH,
  DASHBOARD_TOLERANCES_PATH (optional), DASHBOARD_WINDOW (optional, e.g. 2022,2023,2024)";

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub criteria: ScreenCriteria,
    /// Sort keys in the order they were given.
    pub sort_clicks: Vec<SortKey>,
    pub top: Option<usize>,
    pub company: Option<String>,
    pub help: bool,
}

/// Value following `flag`, if the flag is present. The flag may appear at most once.
fn value_of<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    let values = values_of(args, flag)?;
    if values.len() > 1 {
        bail!("{} given more than once", flag);
    }
    Ok(values.into_iter().next())
}

fn values_of<'a>(args: &'a [String], flag: &str) -> Result<Vec<&'a str>> {
    let mut values = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        if arg != flag {
            continue;
        }
        match args.get(i + 1) {
            Some(value) if !value.starts_with("--") => values.push(value.as_str()),
            _ => bail!("{} requires a value", flag),
        }
    }
    Ok(values)
}

impl CliArgs {
    /// Parses the arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let help = args.iter().any(|a| a == "--help" || a == "-h");
        let mut criteria = ScreenCriteria::default();

        if let Some(industry) = value_of(args, "--industry")? {
            criteria = criteria.with_industry(IndustryFilter::parse(industry));
        }

        for (flag, name) in [("--per", metric::PER), ("--pbr", metric::PBR), ("--roe", metric::ROE)] {
            if let Some(range) = value_of(args, flag)? {
                let range: ThresholdRange = range.parse().with_context(|| format!("Invalid {} value", flag))?;
                criteria = criteria.with_range(name, range);
            }
        }

        for entry in values_of(args, "--range")? {
            let (name, range) = entry
                .split_once('=')
                .with_context(|| format!("--range expects METRIC=MIN:MAX, got {:?}", entry))?;
            let range: ThresholdRange = range.parse().context("Invalid --range value")?;
            criteria = criteria.with_range(name.trim(), range);
        }

        if args.iter().any(|a| a == "--accept-zero") {
            criteria = criteria.with_zero_policy(ZeroPolicy::Accept);
        }

        let sort_clicks = values_of(args, "--sort")?
            .into_iter()
            .map(|key| key.parse::<SortKey>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --sort key")?;

        let top = value_of(args, "--top")?
            .map(|n| n.parse::<usize>())
            .transpose()
            .context("--top expects a positive integer")?;

        Ok(Self {
            criteria,
            sort_clicks,
            top,
            company: value_of(args, "--company")?.map(str::to_string),
            help,
        })
    }
}
