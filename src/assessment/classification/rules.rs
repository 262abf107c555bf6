use super::super::domain::{
    ClassificationResult, EntityType, OrganizationProfile, RequirementSet, Sector, SizeCategory,
};
use super::tables::{CountryRule, SectorRule, SectorTier};

/// Everything a precedence rule may consult for one classification call.
pub(crate) struct RuleContext<'a> {
    pub profile: &'a OrganizationProfile,
    pub sector_rule: Option<&'a SectorRule>,
    pub country_rule: &'a CountryRule,
    pub size: SizeCategory,
}

impl RuleContext<'_> {
    fn mandatory_inclusion(&self) -> bool {
        self.sector_rule.map_or(false, |rule| rule.mandatory)
            || self
                .country_rule
                .mandatory_sectors
                .contains(&self.profile.sector)
    }

    fn size_exempt(&self) -> bool {
        self.sector_rule.map_or(false, |rule| rule.size_exempt)
            || self
                .country_rule
                .size_exempt_sectors
                .contains(&self.profile.sector)
    }

    /// The micro/small carve-out blocks a size-gated rule unless the sector
    /// is exempt from it.
    fn carved_out_by_size(&self) -> bool {
        self.size.is_small_or_micro() && !self.size_exempt()
    }

    fn country_notes(&self) -> Vec<String> {
        self.country_rule
            .specific_requirements
            .iter()
            .map(|note| note.to_string())
            .collect()
    }

    fn essential(&self, reason: impl Into<String>) -> ClassificationResult {
        verdict(
            EntityType::Essential,
            reason,
            Some(RequirementSet::essential(self.country_notes())),
        )
    }

    fn important(&self, reason: impl Into<String>) -> ClassificationResult {
        verdict(
            EntityType::Important,
            reason,
            Some(RequirementSet::important(self.country_notes())),
        )
    }
}

fn verdict(
    entity_type: EntityType,
    reason: impl Into<String>,
    requirements: Option<RequirementSet>,
) -> ClassificationResult {
    ClassificationResult {
        entity_type,
        reason: reason.into(),
        // Stamped by the precedence fold with the matching rule's name.
        matched_rule: String::new(),
        requirements,
    }
}

/// Named precedence rule; the first `Some` verdict wins and gets the rule's
/// name stamped onto it for auditability.
pub(crate) struct PrecedenceRule {
    pub name: &'static str,
    pub apply: fn(&RuleContext) -> Option<ClassificationResult>,
}

/// The consolidated rule order. Several rules can independently match the
/// same profile; top-to-bottom evaluation is the contract.
pub(crate) const PRECEDENCE: &[PrecedenceRule] = &[
    PrecedenceRule {
        name: "public-administration",
        apply: public_administration,
    },
    PrecedenceRule {
        name: "mandatory-inclusion",
        apply: mandatory_inclusion,
    },
    PrecedenceRule {
        name: "cross-border",
        apply: cross_border,
    },
    PrecedenceRule {
        name: "critical-services",
        apply: critical_services,
    },
    PrecedenceRule {
        name: "sector-tier",
        apply: sector_tier,
    },
];

/// Public bodies are judged on head count and served population alone; no
/// later rule may override this branch.
fn public_administration(ctx: &RuleContext) -> Option<ClassificationResult> {
    if ctx.profile.sector != Sector::PublicAdministration {
        return None;
    }

    let population = ctx.profile.population_served_percent.unwrap_or_default();
    if ctx.profile.employee_count >= 50 || population >= 5.0 {
        Some(ctx.essential("Public administration meeting size/population criteria"))
    } else {
        Some(verdict(
            EntityType::Excluded,
            "Public administration below thresholds",
            None,
        ))
    }
}

fn mandatory_inclusion(ctx: &RuleContext) -> Option<ClassificationResult> {
    ctx.mandatory_inclusion()
        .then(|| ctx.essential("Mandatory inclusion based on sector"))
}

fn cross_border(ctx: &RuleContext) -> Option<ClassificationResult> {
    (ctx.profile.cross_border_services && !ctx.carved_out_by_size())
        .then(|| ctx.essential("Cross-border service provider"))
}

fn critical_services(ctx: &RuleContext) -> Option<ClassificationResult> {
    (ctx.profile.critical_services_provider && !ctx.carved_out_by_size())
        .then(|| ctx.essential("Critical service provider"))
}

/// Terminal rule: tier lookup with the micro/small carve-out, or not-covered
/// when the sector is absent from the injected table.
fn sector_tier(ctx: &RuleContext) -> Option<ClassificationResult> {
    let Some(rule) = ctx.sector_rule else {
        return Some(verdict(
            EntityType::NotCovered,
            "Sector not covered by NIS2",
            None,
        ));
    };

    let result = match rule.tier {
        SectorTier::Essential if ctx.carved_out_by_size() => verdict(
            EntityType::Excluded,
            "Micro/small enterprise in essential sector",
            None,
        ),
        SectorTier::Essential => {
            ctx.essential(format!("Essential sector: {}", ctx.profile.sector.label()))
        }
        SectorTier::Important if ctx.carved_out_by_size() => verdict(
            EntityType::Excluded,
            "Micro/small enterprise in important sector",
            None,
        ),
        SectorTier::Important => {
            ctx.important(format!("Important sector: {}", ctx.profile.sector.label()))
        }
    };

    Some(result)
}
