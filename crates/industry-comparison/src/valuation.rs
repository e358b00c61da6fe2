//! Valuation triangle: PBR, PER and ROE implied by market cap, controlling
//! equity and controlling net income.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use metrics_core::aggregate::{from_decimal, to_decimal, AGGREGATE_DP};
use metrics_core::{lookup_year, metric, CompanyEntity, MetricSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationTriangle {
    pub market_cap: Option<f64>,
    pub controlling_equity: Option<f64>,
    pub controlling_net_income: Option<f64>,
}

/// The three ratios derived from a [`ValuationTriangle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpliedRatios {
    pub pbr: Option<f64>,
    pub per: Option<f64>,
    pub roe: Option<f64>,
}

impl ValuationTriangle {
    pub fn new(market_cap: Option<f64>, controlling_equity: Option<f64>, controlling_net_income: Option<f64>) -> Self {
        Self {
            market_cap,
            controlling_equity,
            controlling_net_income,
        }
    }

    /// Reads the three absolute figures for `year` from the company's series.
    pub fn for_year(company: &CompanyEntity, year: &str) -> Self {
        let read = |name: &str| company.metric_series(name).and_then(|s| lookup_year(s, year));
        Self {
            market_cap: read(metric::MARKET_CAP),
            controlling_equity: read(metric::CONTROLLING_EQUITY),
            controlling_net_income: read(metric::CONTROLLING_NET_INCOME),
        }
    }

    /// Market cap / controlling equity.
    pub fn pbr(&self) -> Option<f64> {
        ratio(self.market_cap?, self.controlling_equity?, Decimal::ONE)
    }

    /// Market cap / controlling net income. Loss years have no PER.
    pub fn per(&self) -> Option<f64> {
        ratio(self.market_cap?, self.controlling_net_income?, Decimal::ONE)
    }

    /// Controlling net income / controlling equity, in percent.
    pub fn roe(&self) -> Option<f64> {
        ratio(self.controlling_net_income?, self.controlling_equity?, Decimal::ONE_HUNDRED)
    }

    pub fn implied(&self) -> ImpliedRatios {
        ImpliedRatios {
            pbr: self.pbr(),
            per: self.per(),
            roe: self.roe(),
        }
    }
}

fn ratio(numerator: f64, denominator: f64, scale: Decimal) -> Option<f64> {
    if denominator <= 0.0 {
        return None;
    }
    let value = to_decimal(numerator)?
        .checked_mul(scale)?
        .checked_div(to_decimal(denominator)?)?;
    from_decimal(value.round_dp_with_strategy(AGGREGATE_DP, RoundingStrategy::MidpointAwayFromZero))
}
