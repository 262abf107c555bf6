use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{Answer, AnswerMap, QuestionId};
use super::scoring::catalog::QuestionCatalog;

/// Import answers from a CSV export (`Question Id,Option,Recorded At`).
/// Rows resolve against the catalog with copy-on-answer semantics; rows the
/// catalog cannot resolve are skipped and reported, never fatal.
pub struct AnswerCsvImporter<'a> {
    catalog: &'a QuestionCatalog,
}

/// Outcome of one import run.
#[derive(Debug)]
pub struct AnswerImport {
    pub answers: AnswerMap,
    pub skipped: Vec<SkippedAnswerRow>,
}

/// Row the importer could not apply, with the reason for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAnswerRow {
    pub question_id: String,
    pub option: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownQuestion,
    UnknownOption,
}

impl SkipReason {
    pub const fn label(self) -> &'static str {
        match self {
            SkipReason::UnknownQuestion => "question not in catalog",
            SkipReason::UnknownOption => "option not defined for question",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerImportError {
    #[error("failed to read answer export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid answer CSV data: {0}")]
    Csv(#[from] csv::Error),
}

impl<'a> AnswerCsvImporter<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<AnswerImport, AnswerImportError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<AnswerImport, AnswerImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut answers = AnswerMap::new();
        let mut skipped = Vec::new();

        for row in csv_reader.deserialize::<AnswerRow>() {
            let row = row?;
            let question_id = QuestionId(row.question_id.clone());

            let Some(question) = self.catalog.question(&question_id) else {
                tracing::warn!(
                    question_id = row.question_id.as_str(),
                    "skipping answer row for unknown question"
                );
                skipped.push(SkippedAnswerRow {
                    question_id: row.question_id,
                    option: row.option,
                    reason: SkipReason::UnknownQuestion,
                });
                continue;
            };

            let Some(option) = question.option(&row.option) else {
                tracing::warn!(
                    question_id = row.question_id.as_str(),
                    option = row.option.as_str(),
                    "skipping answer row for unknown option"
                );
                skipped.push(SkippedAnswerRow {
                    question_id: row.question_id,
                    option: row.option,
                    reason: SkipReason::UnknownOption,
                });
                continue;
            };

            let recorded_at = row
                .recorded_at
                .as_deref()
                .and_then(parse_datetime)
                .unwrap_or_else(|| Utc::now().naive_utc());

            // Duplicate question ids follow the keyed store: last row wins.
            answers.insert(
                question_id.clone(),
                Answer {
                    question_id,
                    selected_option: option.value.to_string(),
                    score: option.score,
                    maturity: option.maturity,
                    recorded_at,
                    evidence: Vec::new(),
                },
            );
        }

        Ok(AnswerImport { answers, skipped })
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    #[serde(rename = "Question Id")]
    question_id: String,
    #[serde(rename = "Option")]
    option: String,
    #[serde(rename = "Recorded At", default, deserialize_with = "empty_string_as_none")]
    recorded_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::MaturityLevel;

    fn import(data: &str) -> AnswerImport {
        let catalog = QuestionCatalog::nis2();
        AnswerCsvImporter::new(&catalog)
            .from_reader(data.as_bytes())
            .expect("csv parses")
    }

    #[test]
    fn resolves_rows_with_copy_on_answer_semantics() {
        let import = import(
            "Question Id,Option,Recorded At\n\
             risk-mgmt-policies,largely-compliant,2025-11-02 09:30:00\n\
             access-control,non-compliant,2025-11-02\n",
        );

        assert!(import.skipped.is_empty());
        assert_eq!(import.answers.len(), 2);

        let policies = &import.answers[&QuestionId("risk-mgmt-policies".to_string())];
        assert_eq!(policies.score, 75);
        assert_eq!(policies.maturity, MaturityLevel::Managed);

        let access = &import.answers[&QuestionId("access-control".to_string())];
        assert_eq!(access.score, 0);
        assert_eq!(access.maturity, MaturityLevel::Initial);
    }

    #[test]
    fn skips_unknown_rows_without_aborting() {
        let import = import(
            "Question Id,Option,Recorded At\n\
             retired-question,fully-compliant,2025-11-02\n\
             risk-mgmt-policies,no-such-option,2025-11-02\n\
             risk-mgmt-policies,fully-compliant,2025-11-02\n",
        );

        assert_eq!(import.answers.len(), 1);
        assert_eq!(import.skipped.len(), 2);
        assert_eq!(import.skipped[0].reason, SkipReason::UnknownQuestion);
        assert_eq!(import.skipped[1].reason, SkipReason::UnknownOption);
    }

    #[test]
    fn duplicate_question_rows_follow_last_write_wins() {
        let import = import(
            "Question Id,Option,Recorded At\n\
             risk-mgmt-policies,non-compliant,2025-11-01\n\
             risk-mgmt-policies,fully-compliant,2025-11-02\n",
        );

        assert_eq!(import.answers.len(), 1);
        let answer = &import.answers[&QuestionId("risk-mgmt-policies".to_string())];
        assert_eq!(answer.score, 100);
    }

    #[test]
    fn malformed_csv_is_a_hard_error() {
        let catalog = QuestionCatalog::nis2();
        let result = AnswerCsvImporter::new(&catalog)
            .from_reader("Question Id,Option\n\"unterminated".as_bytes());
        assert!(matches!(result, Err(AnswerImportError::Csv(_))));
    }
}
