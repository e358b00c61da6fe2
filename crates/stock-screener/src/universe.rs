//! Company universe construction
//!
//! Joins the roster with the indicator dataset and applies the data-quality
//! gate: a company is only screenable when PER, PBR and ROE each have at least
//! one real reading somewhere in its history.

use std::collections::{BTreeMap, BTreeSet};

use metrics_core::{
    metric, CompanyEntity, CompanyProfile, IndicatorNormalizer, IndustryAggregate, RawIndicatorRecord, YearWindow,
};

#[derive(Debug, Clone, Default)]
pub struct Universe {
    companies: Vec<CompanyEntity>,
    industries: BTreeMap<String, IndustryAggregate>,
}

/// True when every quality-gate ratio has a reading.
pub fn passes_quality_gate(company: &CompanyEntity) -> bool {
    metric::QUALITY_GATE.iter().all(|m| company.has_reading(m))
}

impl Universe {
    /// Keeps the companies that pass the quality gate, in input order.
    pub fn new(companies: Vec<CompanyEntity>) -> Self {
        let total = companies.len();
        let companies: Vec<CompanyEntity> = companies
            .into_iter()
            .filter(|company| {
                let keep = passes_quality_gate(company);
                if !keep {
                    tracing::debug!("Dropping {}: missing PER, PBR or ROE history", company.name());
                }
                keep
            })
            .collect();

        tracing::info!("Universe built: {} of {} companies pass the quality gate", companies.len(), total);
        Self {
            companies,
            industries: BTreeMap::new(),
        }
    }

    /// Builds the universe from a roster and a `name -> raw record` dataset.
    ///
    /// Roster entries without indicator data and dataset entries without a
    /// roster entry are logged and skipped. The first roster entry wins when a
    /// name repeats.
    pub fn from_snapshot(
        roster: &[CompanyProfile],
        indicators: &BTreeMap<String, RawIndicatorRecord>,
        normalizer: &IndicatorNormalizer,
        window: &YearWindow,
    ) -> Self {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut companies = Vec::with_capacity(roster.len());

        for profile in roster {
            if !seen.insert(profile.name.as_str()) {
                tracing::warn!("Duplicate roster entry for {}, keeping the first", profile.name);
                continue;
            }
            let Some(raw) = indicators.get(&profile.name) else {
                tracing::warn!("No indicator data for {} ({})", profile.name, profile.industry);
                continue;
            };
            companies.push(CompanyEntity::new(profile.clone(), normalizer.normalize(raw), window));
        }

        let orphans = indicators.keys().filter(|name| !seen.contains(name.as_str())).count();
        if orphans > 0 {
            tracing::warn!("{} indicator records have no roster entry", orphans);
        }

        Self::new(companies)
    }

    pub fn with_industries(mut self, industries: BTreeMap<String, IndustryAggregate>) -> Self {
        self.industries = industries;
        self
    }

    pub fn companies(&self) -> &[CompanyEntity] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CompanyEntity> {
        self.companies.iter().find(|c| c.name() == name)
    }

    /// Distinct industries of the screenable companies, sorted.
    pub fn industries(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.companies.iter().map(|c| c.industry()).collect();
        names.into_iter().collect()
    }

    /// Companies in `industry`, sorted by name.
    pub fn peers(&self, industry: &str) -> Vec<&CompanyEntity> {
        let mut peers: Vec<&CompanyEntity> = self.companies.iter().filter(|c| c.industry() == industry).collect();
        peers.sort_by(|a, b| a.name().cmp(b.name()));
        peers
    }

    pub fn industry(&self, name: &str) -> Option<&IndustryAggregate> {
        self.industries.get(name)
    }

    pub fn industry_of(&self, company: &CompanyEntity) -> Option<&IndustryAggregate> {
        self.industry(company.industry())
    }
}
