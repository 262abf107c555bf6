//! Entity classification: profile + rule tables in, tiered verdict out.

pub mod tables;

mod rules;

use super::domain::{ClassificationOutcome, OrganizationProfile};
use super::validation::ProfileValidator;
use rules::{RuleContext, PRECEDENCE};
use tables::{CountryRuleTable, SectorTable, SizeThresholds};

/// Stateless classifier over injected sector and country tables. Every call
/// is a pure function of its inputs; outcomes for invalid profiles carry the
/// field errors instead of a verdict.
pub struct ClassificationEngine<'a> {
    sectors: &'a SectorTable,
    countries: &'a CountryRuleTable,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(sectors: &'a SectorTable, countries: &'a CountryRuleTable) -> Self {
        Self { sectors, countries }
    }

    pub fn classify(&self, profile: &OrganizationProfile) -> ClassificationOutcome {
        let report = ProfileValidator::new(self.sectors, self.countries).validate(profile);
        let warnings = report
            .warnings
            .iter()
            .map(|warning| warning.to_string())
            .collect();

        let country_rule = match self.countries.rule(&profile.country) {
            Some(rule) if report.is_valid() => rule,
            _ => {
                return ClassificationOutcome {
                    organization_id: profile.organization_id.clone(),
                    size_category: None,
                    verdict: None,
                    errors: report
                        .errors
                        .iter()
                        .map(|issue| issue.to_field_error())
                        .collect(),
                    warnings,
                };
            }
        };

        let thresholds = match &country_rule.size_overrides {
            Some(overrides) => SizeThresholds::nis2().with_overrides(overrides),
            None => SizeThresholds::nis2(),
        };
        let size = thresholds.categorize(profile.employee_count, profile.annual_revenue_millions);

        let ctx = RuleContext {
            profile,
            sector_rule: self.sectors.rule(profile.sector),
            country_rule,
            size,
        };

        let verdict = PRECEDENCE.iter().find_map(|rule| {
            (rule.apply)(&ctx).map(|mut result| {
                result.matched_rule = rule.name.to_string();
                result
            })
        });

        ClassificationOutcome {
            organization_id: profile.organization_id.clone(),
            size_category: Some(size),
            verdict,
            errors: Vec::new(),
            warnings,
        }
    }
}
