//! Compliance scoring: answer map + catalog in, analysis result out.

pub mod catalog;

mod recommendations;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    AnalysisResult, Answer, AnswerMap, CategoryScore, Gap, MaturityCount, MaturityLevel,
};
use catalog::{CategoryCatalog, Question, QuestionCatalog};

/// Dials for gap detection and recommendation ranking. Defaults reproduce
/// the reference behavior; callers may tighten or relax any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub gap_threshold: u8,
    pub attention_threshold: u8,
    pub category_focus_count: usize,
    pub max_recommendations: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 50,
            attention_threshold: 75,
            category_focus_count: 3,
            max_recommendations: 10,
        }
    }
}

/// Stateless aggregator applying the scoring configuration to an answer map.
/// Every call recomputes from scratch against a consistent snapshot.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        answers: &AnswerMap,
        catalog: &QuestionCatalog,
        categories: &CategoryCatalog,
    ) -> AnalysisResult {
        let mut scored: Vec<(&Question, &Answer)> = Vec::with_capacity(answers.len());
        let mut orphaned = Vec::new();

        for (question_id, answer) in answers {
            match catalog.question(question_id) {
                Some(question) => scored.push((question, answer)),
                None => {
                    warn!(
                        question_id = question_id.as_str(),
                        "answer references a question missing from the catalog; skipping"
                    );
                    orphaned.push(question_id.clone());
                }
            }
        }

        if scored.is_empty() {
            return AnalysisResult {
                overall_score: 0,
                completion_rate: 0,
                category_scores: zeroed_category_scores(categories),
                maturity_distribution: maturity_distribution(&[]),
                critical_gaps: Vec::new(),
                recommendations: Vec::new(),
                orphaned_answers: orphaned,
            };
        }

        let overall_score = rounded_mean(scored.iter().map(|(_, answer)| answer.score));

        let category_scores = categories
            .definitions()
            .iter()
            .map(|definition| {
                let scores: Vec<u8> = scored
                    .iter()
                    .filter(|(question, _)| question.category == definition.category)
                    .map(|(_, answer)| answer.score)
                    .collect();
                CategoryScore {
                    category: definition.category,
                    score: if scores.is_empty() {
                        0
                    } else {
                        rounded_mean(scores.iter().copied())
                    },
                    answered: !scores.is_empty(),
                    answered_count: scores.len(),
                }
            })
            .collect::<Vec<_>>();

        let completion_rate = if catalog.is_empty() {
            0
        } else {
            rounded_percent(scored.len(), catalog.len())
        };

        let critical_gaps: Vec<Gap> = scored
            .iter()
            .filter(|(_, answer)| answer.score < self.config.gap_threshold)
            .map(|(question, answer)| Gap {
                question_id: answer.question_id.clone(),
                title: question.title.to_string(),
                category: question.category,
                control: question.control.to_string(),
                score: answer.score,
                maturity: answer.maturity,
            })
            .collect();

        let recommendations =
            recommendations::build(&category_scores, &critical_gaps, catalog, &self.config);

        AnalysisResult {
            overall_score,
            completion_rate,
            category_scores,
            maturity_distribution: maturity_distribution(&scored),
            critical_gaps,
            recommendations,
            orphaned_answers: orphaned,
        }
    }
}

fn zeroed_category_scores(categories: &CategoryCatalog) -> Vec<CategoryScore> {
    categories
        .definitions()
        .iter()
        .map(|definition| CategoryScore {
            category: definition.category,
            score: 0,
            answered: false,
            answered_count: 0,
        })
        .collect()
}

/// Histogram over the four fixed levels; zero counts stay visible.
fn maturity_distribution(scored: &[(&Question, &Answer)]) -> Vec<MaturityCount> {
    MaturityLevel::ordered()
        .into_iter()
        .map(|level| MaturityCount {
            level,
            count: scored
                .iter()
                .filter(|(_, answer)| answer.maturity == level)
                .count(),
        })
        .collect()
}

/// Arithmetic mean rounded half-up to the nearest integer.
fn rounded_mean(scores: impl Iterator<Item = u8> + ExactSizeIterator) -> u8 {
    let count = scores.len();
    if count == 0 {
        return 0;
    }
    let sum: u32 = scores.map(u32::from).sum();
    ((sum as f64) / (count as f64)).round() as u8
}

fn rounded_percent(part: usize, whole: usize) -> u8 {
    ((part as f64) * 100.0 / (whole as f64)).round() as u8
}
