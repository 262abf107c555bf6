use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{CountryCode, Sector, SizeCategory};

/// Regulated tier a sector belongs to in the annexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorTier {
    Essential,
    Important,
}

/// One row of the sector table. `size_exempt` lifts the micro/small
/// carve-out; `mandatory` forces inclusion regardless of any other rule
/// except the public-administration branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorRule {
    pub sector: Sector,
    pub tier: SectorTier,
    pub subsectors: &'static [&'static str],
    pub size_exempt: bool,
    pub mandatory: bool,
    pub cross_border: bool,
    pub critical_infrastructure: bool,
}

/// Versioned, hand-authored sector designations. Injected into the engine so
/// tests and future jurisdictional updates swap data, not code.
#[derive(Debug, Clone)]
pub struct SectorTable {
    rules: BTreeMap<Sector, SectorRule>,
}

impl SectorTable {
    pub fn nis2() -> Self {
        Self::from_rules(nis2_sector_rules())
    }

    pub fn from_rules(rules: Vec<SectorRule>) -> Self {
        Self {
            rules: rules.into_iter().map(|rule| (rule.sector, rule)).collect(),
        }
    }

    pub fn rule(&self, sector: Sector) -> Option<&SectorRule> {
        self.rules.get(&sector)
    }

    pub fn contains(&self, sector: Sector) -> bool {
        self.rules.contains_key(&sector)
    }

    pub fn rules(&self) -> impl Iterator<Item = &SectorRule> {
        self.rules.values()
    }
}

fn nis2_sector_rules() -> Vec<SectorRule> {
    vec![
        SectorRule {
            sector: Sector::Energy,
            tier: SectorTier::Essential,
            subsectors: &[
                "Electricity",
                "District heating/cooling",
                "Oil",
                "Gas",
                "Hydrogen",
            ],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::Transport,
            tier: SectorTier::Essential,
            subsectors: &["Air", "Rail", "Water", "Road"],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::Banking,
            tier: SectorTier::Essential,
            subsectors: &["Credit institutions"],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::FinancialMarketInfrastructures,
            tier: SectorTier::Essential,
            subsectors: &["Trading venues", "Central counterparties"],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::Health,
            tier: SectorTier::Essential,
            subsectors: &[
                "Healthcare providers",
                "EU reference laboratories",
                "Research entities",
            ],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::DrinkingWater,
            tier: SectorTier::Essential,
            subsectors: &["Drinking water suppliers"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::WasteWater,
            tier: SectorTier::Essential,
            subsectors: &["Waste water service providers"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::DigitalInfrastructure,
            tier: SectorTier::Essential,
            subsectors: &[
                "Internet exchange points",
                "Cloud providers",
                "Data centers",
                "CDN providers",
            ],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::IctServiceManagement,
            tier: SectorTier::Essential,
            subsectors: &[
                "Managed service providers",
                "Managed security service providers",
            ],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::PublicAdministration,
            tier: SectorTier::Essential,
            subsectors: &["Government entities", "Regional authorities"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::Space,
            tier: SectorTier::Essential,
            subsectors: &["Space-based infrastructure operators"],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::TrustServices,
            tier: SectorTier::Essential,
            subsectors: &["Qualified trust service providers"],
            size_exempt: true,
            mandatory: true,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::TldRegistries,
            tier: SectorTier::Essential,
            subsectors: &["TLD name registries"],
            size_exempt: true,
            mandatory: true,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::DnsProviders,
            tier: SectorTier::Essential,
            subsectors: &["DNS resolution services"],
            size_exempt: true,
            mandatory: true,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::PostalServices,
            tier: SectorTier::Important,
            subsectors: &["Postal service providers", "Courier services"],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::WasteManagement,
            tier: SectorTier::Important,
            subsectors: &["Waste management operators"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::Chemicals,
            tier: SectorTier::Important,
            subsectors: &["Chemical manufacturers", "Chemical distributors"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::Food,
            tier: SectorTier::Important,
            subsectors: &["Food producers", "Food distributors"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::Manufacturing,
            tier: SectorTier::Important,
            subsectors: &["Medical devices", "Electronics", "Machinery", "Vehicles"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: true,
        },
        SectorRule {
            sector: Sector::DigitalProviders,
            tier: SectorTier::Important,
            subsectors: &[
                "Online marketplaces",
                "Online search engines",
                "Social networking platforms",
            ],
            size_exempt: false,
            mandatory: false,
            cross_border: true,
            critical_infrastructure: false,
        },
        SectorRule {
            sector: Sector::Research,
            tier: SectorTier::Important,
            subsectors: &["Research organizations"],
            size_exempt: false,
            mandatory: false,
            cross_border: false,
            critical_infrastructure: false,
        },
    ]
}

/// National transposition progress, informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranspositionStatus {
    InProgress,
    Pending,
}

impl TranspositionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TranspositionStatus::InProgress => "In Progress",
            TranspositionStatus::Pending => "Pending",
        }
    }
}

/// Ceiling replacement for a single size band; unset fields keep the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandOverride {
    pub max_employees: Option<u32>,
    pub max_revenue_millions: Option<f64>,
}

/// Country-level replacements for individual size-band ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeOverrides {
    pub micro: Option<BandOverride>,
    pub small: Option<BandOverride>,
    pub medium: Option<BandOverride>,
}

/// Per-country transposition rules layered on top of the sector table.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRule {
    pub code: CountryCode,
    pub name: &'static str,
    pub transposition: TranspositionStatus,
    pub mandatory_sectors: Vec<Sector>,
    pub size_exempt_sectors: Vec<Sector>,
    pub size_overrides: Option<SizeOverrides>,
    pub specific_requirements: Vec<&'static str>,
}

impl CountryRule {
    fn plain(code: &'static str, name: &'static str, transposition: TranspositionStatus) -> Self {
        Self {
            code: CountryCode::new(code),
            name,
            transposition,
            mandatory_sectors: Vec::new(),
            size_exempt_sectors: Vec::new(),
            size_overrides: None,
            specific_requirements: Vec::new(),
        }
    }
}

/// Rule table for all 27 member states.
#[derive(Debug, Clone)]
pub struct CountryRuleTable {
    rules: BTreeMap<CountryCode, CountryRule>,
}

impl CountryRuleTable {
    pub fn eu27() -> Self {
        Self::from_rules(eu27_country_rules())
    }

    pub fn from_rules(rules: Vec<CountryRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.code.clone(), rule))
                .collect(),
        }
    }

    pub fn rule(&self, code: &CountryCode) -> Option<&CountryRule> {
        self.rules.get(code)
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.rules.contains_key(code)
    }

    pub fn rules(&self) -> impl Iterator<Item = &CountryRule> {
        self.rules.values()
    }

    /// Startup-time consistency check: every sector a country references must
    /// exist in the sector table.
    pub fn verify_integrity(&self, sectors: &SectorTable) -> Result<(), TableIntegrityError> {
        for rule in self.rules.values() {
            for sector in rule
                .mandatory_sectors
                .iter()
                .chain(rule.size_exempt_sectors.iter())
            {
                if !sectors.contains(*sector) {
                    return Err(TableIntegrityError::UnknownSector {
                        country: rule.code.as_str().to_string(),
                        sector: sector.label(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableIntegrityError {
    #[error("country {country} references sector '{sector}' missing from the sector table")]
    UnknownSector { country: String, sector: &'static str },
}

fn eu27_country_rules() -> Vec<CountryRule> {
    use TranspositionStatus::{InProgress, Pending};

    let mut rules = vec![
        CountryRule {
            specific_requirements: vec![
                "Critical infrastructure identification",
                "Cross-border notification",
            ],
            ..CountryRule::plain("BE", "Belgium", InProgress)
        },
        CountryRule {
            mandatory_sectors: vec![Sector::Chemicals],
            size_exempt_sectors: vec![Sector::Health],
            size_overrides: Some(SizeOverrides {
                micro: Some(BandOverride {
                    max_employees: None,
                    max_revenue_millions: Some(2.5),
                }),
                ..SizeOverrides::default()
            }),
            specific_requirements: vec![
                "IT-Sicherheitskatalog",
                "Critical infrastructure protection",
            ],
            ..CountryRule::plain("DE", "Germany", InProgress)
        },
        CountryRule {
            specific_requirements: vec!["Critical operator registration"],
            ..CountryRule::plain("ES", "Spain", InProgress)
        },
        CountryRule {
            mandatory_sectors: vec![Sector::Space],
            specific_requirements: vec!["OIV status consideration", "Security certification"],
            ..CountryRule::plain("FR", "France", InProgress)
        },
        CountryRule {
            specific_requirements: vec!["National cybersecurity perimeter"],
            ..CountryRule::plain("IT", "Italy", InProgress)
        },
        CountryRule {
            specific_requirements: vec!["Critical infrastructure designation"],
            ..CountryRule::plain("NL", "Netherlands", InProgress)
        },
    ];

    rules.extend(
        [
            ("AT", "Austria", InProgress),
            ("BG", "Bulgaria", Pending),
            ("HR", "Croatia", Pending),
            ("CY", "Cyprus", Pending),
            ("CZ", "Czech Republic", InProgress),
            ("DK", "Denmark", InProgress),
            ("EE", "Estonia", Pending),
            ("FI", "Finland", InProgress),
            ("GR", "Greece", Pending),
            ("HU", "Hungary", Pending),
            ("IE", "Ireland", InProgress),
            ("LV", "Latvia", Pending),
            ("LT", "Lithuania", Pending),
            ("LU", "Luxembourg", InProgress),
            ("MT", "Malta", Pending),
            ("PL", "Poland", InProgress),
            ("PT", "Portugal", Pending),
            ("RO", "Romania", Pending),
            ("SK", "Slovakia", Pending),
            ("SI", "Slovenia", Pending),
            ("SE", "Sweden", InProgress),
        ]
        .into_iter()
        .map(|(code, name, status)| CountryRule::plain(code, name, status)),
    );

    rules
}

/// Employee/revenue ceilings for one size band. Both conditions gate the
/// band: head count strictly below, revenue at or below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBand {
    pub max_employees: u32,
    pub max_revenue_millions: f64,
}

impl SizeBand {
    fn admits(&self, employees: u32, revenue_millions: f64) -> bool {
        employees < self.max_employees && revenue_millions <= self.max_revenue_millions
    }

    fn apply(&self, patch: &BandOverride) -> Self {
        Self {
            max_employees: patch.max_employees.unwrap_or(self.max_employees),
            max_revenue_millions: patch
                .max_revenue_millions
                .unwrap_or(self.max_revenue_millions),
        }
    }
}

/// Size banding per the directive's SME reference, with fall-through to the
/// next larger band whenever either ceiling is exceeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeThresholds {
    pub micro: SizeBand,
    pub small: SizeBand,
    pub medium: SizeBand,
}

impl SizeThresholds {
    pub fn nis2() -> Self {
        Self {
            micro: SizeBand {
                max_employees: 10,
                max_revenue_millions: 2.0,
            },
            small: SizeBand {
                max_employees: 50,
                max_revenue_millions: 10.0,
            },
            medium: SizeBand {
                max_employees: 250,
                max_revenue_millions: 50.0,
            },
        }
    }

    pub fn with_overrides(&self, overrides: &SizeOverrides) -> Self {
        Self {
            micro: overrides
                .micro
                .as_ref()
                .map_or(self.micro, |patch| self.micro.apply(patch)),
            small: overrides
                .small
                .as_ref()
                .map_or(self.small, |patch| self.small.apply(patch)),
            medium: overrides
                .medium
                .as_ref()
                .map_or(self.medium, |patch| self.medium.apply(patch)),
        }
    }

    pub fn categorize(&self, employees: u32, revenue_millions: f64) -> SizeCategory {
        if self.micro.admits(employees, revenue_millions) {
            SizeCategory::Micro
        } else if self.small.admits(employees, revenue_millions) {
            SizeCategory::Small
        } else if self.medium.admits(employees, revenue_millions) {
            SizeCategory::Medium
        } else {
            SizeCategory::Large
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_bands_require_both_ceilings() {
        let thresholds = SizeThresholds::nis2();

        assert_eq!(thresholds.categorize(5, 1.0), SizeCategory::Micro);
        // High revenue pushes a tiny head count out of the micro band.
        assert_eq!(thresholds.categorize(5, 8.0), SizeCategory::Small);
        assert_eq!(thresholds.categorize(49, 10.0), SizeCategory::Small);
        assert_eq!(thresholds.categorize(50, 10.0), SizeCategory::Medium);
        assert_eq!(thresholds.categorize(249, 50.0), SizeCategory::Medium);
        assert_eq!(thresholds.categorize(249, 50.1), SizeCategory::Large);
        assert_eq!(thresholds.categorize(250, 1.0), SizeCategory::Large);
    }

    #[test]
    fn overrides_patch_only_named_ceilings() {
        let thresholds = SizeThresholds::nis2().with_overrides(&SizeOverrides {
            micro: Some(BandOverride {
                max_employees: None,
                max_revenue_millions: Some(2.5),
            }),
            ..SizeOverrides::default()
        });

        assert_eq!(thresholds.micro.max_employees, 10);
        assert_eq!(thresholds.categorize(5, 2.3), SizeCategory::Micro);
        assert_eq!(
            SizeThresholds::nis2().categorize(5, 2.3),
            SizeCategory::Small
        );
    }

    #[test]
    fn eu27_table_is_internally_consistent() {
        let countries = CountryRuleTable::eu27();
        assert_eq!(countries.rules().count(), 27);
        countries
            .verify_integrity(&SectorTable::nis2())
            .expect("country table references known sectors");
    }

    #[test]
    fn mandatory_digital_service_sectors_are_size_exempt() {
        let sectors = SectorTable::nis2();
        for sector in [
            Sector::TrustServices,
            Sector::TldRegistries,
            Sector::DnsProviders,
        ] {
            let rule = sectors.rule(sector).expect("sector present");
            assert!(rule.mandatory);
            assert!(rule.size_exempt);
        }
    }
}
