use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the organization being assessed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// ISO-3166 alpha-2 country code, normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sectors designated by the directive, Annex I and Annex II, plus the
/// always-in-scope digital service categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    Energy,
    Transport,
    Banking,
    FinancialMarketInfrastructures,
    Health,
    DrinkingWater,
    WasteWater,
    DigitalInfrastructure,
    IctServiceManagement,
    PublicAdministration,
    Space,
    TrustServices,
    TldRegistries,
    DnsProviders,
    PostalServices,
    WasteManagement,
    Chemicals,
    Food,
    Manufacturing,
    DigitalProviders,
    Research,
}

impl Sector {
    pub const fn label(self) -> &'static str {
        match self {
            Sector::Energy => "Energy",
            Sector::Transport => "Transport",
            Sector::Banking => "Banking",
            Sector::FinancialMarketInfrastructures => "Financial market infrastructures",
            Sector::Health => "Health",
            Sector::DrinkingWater => "Drinking water",
            Sector::WasteWater => "Waste water",
            Sector::DigitalInfrastructure => "Digital infrastructure",
            Sector::IctServiceManagement => "ICT service management",
            Sector::PublicAdministration => "Public Administration",
            Sector::Space => "Space",
            Sector::TrustServices => "Trust service providers",
            Sector::TldRegistries => "Top-level domain name registries",
            Sector::DnsProviders => "DNS service providers",
            Sector::PostalServices => "Postal services",
            Sector::WasteManagement => "Waste management",
            Sector::Chemicals => "Chemicals",
            Sector::Food => "Food",
            Sector::Manufacturing => "Manufacturing",
            Sector::DigitalProviders => "Digital providers",
            Sector::Research => "Research",
        }
    }

    /// Resolve a CLI/user supplied sector label, ignoring case.
    pub fn from_label(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|sector| sector.label().eq_ignore_ascii_case(wanted))
    }

    pub const fn all() -> &'static [Sector] {
        &[
            Sector::Energy,
            Sector::Transport,
            Sector::Banking,
            Sector::FinancialMarketInfrastructures,
            Sector::Health,
            Sector::DrinkingWater,
            Sector::WasteWater,
            Sector::DigitalInfrastructure,
            Sector::IctServiceManagement,
            Sector::PublicAdministration,
            Sector::Space,
            Sector::TrustServices,
            Sector::TldRegistries,
            Sector::DnsProviders,
            Sector::PostalServices,
            Sector::WasteManagement,
            Sector::Chemicals,
            Sector::Food,
            Sector::Manufacturing,
            Sector::DigitalProviders,
            Sector::Research,
        ]
    }
}

/// Organization snapshot supplied by onboarding/settings, read-only for the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub organization_id: OrganizationId,
    pub sector: Sector,
    pub subsector: Option<String>,
    pub employee_count: u32,
    pub annual_revenue_millions: f64,
    pub country: CountryCode,
    pub population_served_percent: Option<f64>,
    pub cross_border_services: bool,
    pub critical_services_provider: bool,
}

/// Enterprise size band derived from head count and revenue, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    Micro,
    Small,
    Medium,
    Large,
}

impl SizeCategory {
    pub const fn label(self) -> &'static str {
        match self {
            SizeCategory::Micro => "micro",
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
        }
    }

    pub const fn is_small_or_micro(self) -> bool {
        matches!(self, SizeCategory::Micro | SizeCategory::Small)
    }
}

/// Regulated-entity tiers the directive distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Essential,
    Important,
    Excluded,
    NotCovered,
}

impl EntityType {
    pub const fn label(self) -> &'static str {
        match self {
            EntityType::Essential => "essential",
            EntityType::Important => "important",
            EntityType::Excluded => "excluded",
            EntityType::NotCovered => "not-covered",
        }
    }
}

/// Supervisory ceiling attached to a regulated tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyCeiling {
    pub max_fine_millions: u16,
    pub turnover_percent: f32,
}

/// Obligations that apply once an entity is classified in a regulated tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub risk_management: String,
    pub incident_reporting_hours: u8,
    pub audit_regime: String,
    pub penalty_ceiling: PenaltyCeiling,
    pub country_notes: Vec<String>,
}

impl RequirementSet {
    pub fn essential(country_notes: Vec<String>) -> Self {
        Self {
            risk_management: "Comprehensive risk management measures".to_string(),
            incident_reporting_hours: 24,
            audit_regime: "Annual external audit".to_string(),
            penalty_ceiling: PenaltyCeiling {
                max_fine_millions: 10,
                turnover_percent: 2.0,
            },
            country_notes,
        }
    }

    pub fn important(country_notes: Vec<String>) -> Self {
        Self {
            risk_management: "Basic risk management measures".to_string(),
            incident_reporting_hours: 72,
            audit_regime: "Bi-annual self-assessment".to_string(),
            penalty_ceiling: PenaltyCeiling {
                max_fine_millions: 7,
                turnover_percent: 1.4,
            },
            country_notes,
        }
    }
}

/// Verdict produced by the classification rules for a valid profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub entity_type: EntityType,
    pub reason: String,
    pub matched_rule: String,
    pub requirements: Option<RequirementSet>,
}

/// Structured validation failure attached to a classification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Full classification response: verdict when the profile is valid, field
/// errors otherwise, advisory warnings either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub organization_id: OrganizationId,
    pub size_category: Option<SizeCategory>,
    pub verdict: Option<ClassificationResult>,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
}

impl ClassificationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.verdict.as_ref().map(|verdict| verdict.entity_type)
    }
}

/// Stable key into the question catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Assessment categories, in catalog ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    RiskManagement,
    IncidentResponse,
    SupplyChain,
    SystemSecurity,
    TechnicalSecurity,
    HumanResources,
    Cryptography,
    IncidentReporting,
    Compliance,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Category::RiskManagement => "Risk Management",
            Category::IncidentResponse => "Incident Response",
            Category::SupplyChain => "Supply Chain Security",
            Category::SystemSecurity => "System Security",
            Category::TechnicalSecurity => "Technical Security",
            Category::HumanResources => "Human Resources Security",
            Category::Cryptography => "Cryptography",
            Category::IncidentReporting => "Incident Reporting",
            Category::Compliance => "Compliance",
        }
    }

    pub const fn ordered() -> [Category; 9] {
        [
            Category::RiskManagement,
            Category::IncidentResponse,
            Category::SupplyChain,
            Category::SystemSecurity,
            Category::TechnicalSecurity,
            Category::HumanResources,
            Category::Cryptography,
            Category::IncidentReporting,
            Category::Compliance,
        ]
    }
}

/// Ordinal control-maturity tag attached to each scored option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaturityLevel {
    Initial,
    Defined,
    Managed,
    Optimized,
}

impl MaturityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            MaturityLevel::Initial => "Initial",
            MaturityLevel::Defined => "Defined",
            MaturityLevel::Managed => "Managed",
            MaturityLevel::Optimized => "Optimized",
        }
    }

    pub const fn ordered() -> [MaturityLevel; 4] {
        [
            MaturityLevel::Initial,
            MaturityLevel::Defined,
            MaturityLevel::Managed,
            MaturityLevel::Optimized,
        ]
    }
}

/// File taxonomy for attached evidence; contents stay opaque to the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceKind {
    Document,
    Image,
    Spreadsheet,
    Code,
}

impl EvidenceKind {
    pub const fn label(self) -> &'static str {
        match self {
            EvidenceKind::Document => "document",
            EvidenceKind::Image => "image",
            EvidenceKind::Spreadsheet => "spreadsheet",
            EvidenceKind::Code => "code",
        }
    }
}

/// Pointer to an uploaded proof artifact held by the evidence store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceDescriptor {
    pub name: String,
    pub kind: EvidenceKind,
    pub storage_key: String,
}

/// Recorded response to one catalog question. Score and maturity are copied
/// from the selected option at answer time; later catalog edits never rewrite
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected_option: String,
    pub score: u8,
    pub maturity: MaturityLevel,
    pub recorded_at: NaiveDateTime,
    pub evidence: Vec<EvidenceDescriptor>,
}

/// Answers keyed by question id; re-answering replaces, never appends.
pub type AnswerMap = BTreeMap<QuestionId, Answer>;

/// Per-category aggregate. `answered == false` marks a "no data" zero so it
/// can never be confused with a genuine 0 % score downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u8,
    pub answered: bool,
    pub answered_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityCount {
    pub level: MaturityLevel,
    pub count: usize,
}

/// Answer scoring below the configured gap threshold, annotated with its
/// originating question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub question_id: QuestionId,
    pub title: String,
    pub category: Category,
    pub control: String,
    pub score: u8,
    pub maturity: MaturityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub const fn label(self) -> &'static str {
        match self {
            Effort::Low => "Low",
            Effort::Medium => "Medium",
            Effort::High => "High",
        }
    }
}

/// Remediation advice derived from low categories and critical gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub effort: Effort,
    pub timeline: String,
}

/// Complete scoring output, recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub completion_rate: u8,
    pub category_scores: Vec<CategoryScore>,
    pub maturity_distribution: Vec<MaturityCount>,
    pub critical_gaps: Vec<Gap>,
    pub recommendations: Vec<Recommendation>,
    pub orphaned_answers: Vec<QuestionId>,
}

impl AnalysisResult {
    /// Gaps re-ordered worst-first for callers that want a severity view.
    pub fn gaps_by_severity(&self) -> Vec<Gap> {
        let mut gaps = self.critical_gaps.clone();
        gaps.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.question_id.cmp(&b.question_id))
        });
        gaps
    }

    pub fn category_score(&self, category: Category) -> Option<&CategoryScore> {
        self.category_scores
            .iter()
            .find(|entry| entry.category == category)
    }
}
