use super::super::domain::{CategoryScore, Effort, Gap, Priority, Recommendation};
use super::catalog::QuestionCatalog;
use super::ScoringConfig;

/// Rank remediation advice: weakest answered categories first, then one
/// Critical entry per gap with a known control, truncated to the configured
/// cap. Gap-level detail is deliberately the part that gets dropped when the
/// cap is hit, and it only accompanies category-level findings: when every
/// answered category clears the attention threshold the list stays empty,
/// even if an isolated low answer exists inside an otherwise-high category.
pub(crate) fn build(
    category_scores: &[CategoryScore],
    gaps: &[Gap],
    catalog: &QuestionCatalog,
    config: &ScoringConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Stable sort keeps category-definition order as the tie break.
    let mut ranked: Vec<&CategoryScore> = category_scores
        .iter()
        .filter(|entry| entry.answered)
        .collect();
    ranked.sort_by_key(|entry| entry.score);

    for entry in ranked.into_iter().take(config.category_focus_count) {
        if entry.score >= config.attention_threshold {
            continue;
        }
        let name = entry.category.label();
        recommendations.push(Recommendation {
            priority: if entry.score < config.gap_threshold {
                Priority::High
            } else {
                Priority::Medium
            },
            category: name.to_string(),
            title: format!("Improve {name}"),
            description: format!(
                "Current score: {}%. Focus on implementing comprehensive {} measures.",
                entry.score,
                name.to_lowercase()
            ),
            effort: Effort::High,
            timeline: "3-6 months".to_string(),
        });
    }

    if recommendations.is_empty() {
        return recommendations;
    }

    for gap in gaps {
        if let Some(control) = catalog.control(&gap.control) {
            recommendations.push(Recommendation {
                priority: Priority::Critical,
                category: gap.category.label().to_string(),
                title: format!("Address {}", gap.title),
                description: format!("Implement {} to meet NIS2 requirements.", control.title),
                effort: Effort::Medium,
                timeline: "1-3 months".to_string(),
            });
        }
    }

    recommendations.truncate(config.max_recommendations);
    recommendations
}
