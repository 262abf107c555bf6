use serde::{Deserialize, Serialize};

use super::classification::tables::{CountryRuleTable, SectorTable};
use super::domain::{FieldError, OrganizationProfile, Sector};

/// Hard validation failures; each maps to the profile field a form should flag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationIssue {
    #[error("country '{0}' is not in the transposition rule table")]
    UnsupportedCountry(String),
    #[error("subsector selection is required for {0}")]
    MissingSubsector(String),
    #[error("'{subsector}' is not a recognised subsector of {sector}")]
    UnknownSubsector { sector: String, subsector: String },
    #[error("annual revenue must be a finite, non-negative amount")]
    InvalidRevenue,
    #[error("population served percentage is required for public administration")]
    MissingPopulationServed,
    #[error("population served percentage must lie between 0 and 100")]
    InvalidPopulationServed,
}

impl ValidationIssue {
    pub const fn field(&self) -> &'static str {
        match self {
            ValidationIssue::UnsupportedCountry(_) => "country",
            ValidationIssue::MissingSubsector(_) | ValidationIssue::UnknownSubsector { .. } => {
                "subsector"
            }
            ValidationIssue::InvalidRevenue => "annualRevenueMillions",
            ValidationIssue::MissingPopulationServed
            | ValidationIssue::InvalidPopulationServed => "populationServedPercent",
        }
    }

    pub fn to_field_error(&self) -> FieldError {
        FieldError {
            field: self.field().to_string(),
            message: self.to_string(),
        }
    }
}

/// Advisory findings that never block classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ProfileWarning {
    #[error("sector '{0}' is outside the NIS2 sector table")]
    SectorOutsideScope(String),
    #[error("organization may fall under the small-enterprise exemption unless it provides always-in-scope services")]
    LikelySizeExemption,
    #[error("no country-specific transposition requirements recorded for {0}")]
    NoCountryGuidance(String),
}

/// Validation findings for one profile snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ProfileWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Guard checking a profile against the injected rule tables before any
/// classification rule runs.
#[derive(Debug, Clone, Copy)]
pub struct ProfileValidator<'a> {
    sectors: &'a SectorTable,
    countries: &'a CountryRuleTable,
}

impl<'a> ProfileValidator<'a> {
    pub fn new(sectors: &'a SectorTable, countries: &'a CountryRuleTable) -> Self {
        Self { sectors, countries }
    }

    pub fn validate(&self, profile: &OrganizationProfile) -> ValidationReport {
        let mut report = ValidationReport::default();

        match self.countries.rule(&profile.country) {
            None => report.errors.push(ValidationIssue::UnsupportedCountry(
                profile.country.as_str().to_string(),
            )),
            Some(rule) if rule.specific_requirements.is_empty() => {
                report
                    .warnings
                    .push(ProfileWarning::NoCountryGuidance(rule.name.to_string()));
            }
            Some(_) => {}
        }

        if !profile.annual_revenue_millions.is_finite() || profile.annual_revenue_millions < 0.0 {
            report.errors.push(ValidationIssue::InvalidRevenue);
        }

        match self.sectors.rule(profile.sector) {
            None => report.warnings.push(ProfileWarning::SectorOutsideScope(
                profile.sector.label().to_string(),
            )),
            Some(rule) => {
                if !rule.subsectors.is_empty() {
                    match profile.subsector.as_deref() {
                        None => report.errors.push(ValidationIssue::MissingSubsector(
                            profile.sector.label().to_string(),
                        )),
                        Some(subsector)
                            if !rule
                                .subsectors
                                .iter()
                                .any(|known| known.eq_ignore_ascii_case(subsector)) =>
                        {
                            report.errors.push(ValidationIssue::UnknownSubsector {
                                sector: profile.sector.label().to_string(),
                                subsector: subsector.to_string(),
                            });
                        }
                        Some(_) => {}
                    }
                }

                if !rule.mandatory
                    && profile.employee_count < 50
                    && profile.annual_revenue_millions <= 10.0
                {
                    report.warnings.push(ProfileWarning::LikelySizeExemption);
                }
            }
        }

        if profile.sector == Sector::PublicAdministration {
            match profile.population_served_percent {
                None => report
                    .errors
                    .push(ValidationIssue::MissingPopulationServed),
                Some(percent) if !(0.0..=100.0).contains(&percent) || !percent.is_finite() => {
                    report.errors.push(ValidationIssue::InvalidPopulationServed);
                }
                Some(_) => {}
            }
        }

        report
    }
}
