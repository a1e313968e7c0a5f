//! In-memory worksheet model: constructed once per generation request,
//! immutable thereafter, consumed exactly once by the compiler.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::problem::SelectedProblem;

/// Non-empty worksheet title.
///
/// Validated once at construction; everything downstream can trust it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title(String);

impl Title {
    pub fn new(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "worksheet title must not be empty".to_string(),
            ));
        }
        Ok(Title(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single worksheet problem. `answer` is empty when the answer key had no
/// entry for it; the answer page simply omits that line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub question: String,
    pub answer: String,
}

impl Problem {
    pub fn has_answer(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// A fully assembled worksheet ready for compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetData {
    pub title: Title,
    pub problems: Vec<Problem>,
    pub tips: Vec<String>,
}

impl WorksheetData {
    /// Validating constructor: at least one problem, every question non-empty.
    pub fn new(title: Title, problems: Vec<Problem>, tips: Vec<String>) -> Result<Self, AppError> {
        if problems.is_empty() {
            return Err(AppError::Validation(
                "worksheet must contain at least one problem".to_string(),
            ));
        }
        if let Some(idx) = problems.iter().position(|p| p.question.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "problem {}: question must not be empty",
                idx + 1
            )));
        }
        Ok(WorksheetData {
            title,
            problems,
            tips,
        })
    }

    /// Builds a worksheet from selector output. Selected problems always carry
    /// answers, so no coverage check is needed on this path.
    pub fn from_selection(title: Title, selected: &[SelectedProblem]) -> Result<Self, AppError> {
        let problems = selected
            .iter()
            .map(|p| Problem {
                question: p.question.clone(),
                answer: p.answer.clone(),
            })
            .collect();
        WorksheetData::new(title, problems, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_problem(question: &str, answer: &str) -> Problem {
        Problem {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_title_rejects_empty() {
        assert!(Title::new("").is_err());
        assert!(Title::new("   ").is_err());
    }

    #[test]
    fn test_title_trims_whitespace() {
        let title = Title::new("  Fraction Practice  ").unwrap();
        assert_eq!(title.as_str(), "Fraction Practice");
    }

    #[test]
    fn test_worksheet_requires_at_least_one_problem() {
        let title = Title::new("Empty Sheet").unwrap();
        assert!(WorksheetData::new(title, vec![], vec![]).is_err());
    }

    #[test]
    fn test_worksheet_rejects_blank_question() {
        let title = Title::new("Sheet").unwrap();
        let problems = vec![make_problem("1/2 + 1/4", "3/4"), make_problem("  ", "")];
        let err = WorksheetData::new(title, problems, vec![]).unwrap_err();
        assert!(err.to_string().contains("problem 2"));
    }

    #[test]
    fn test_worksheet_accepts_valid_input() {
        let title = Title::new("Sheet").unwrap();
        let problems = vec![make_problem("1/2 + 1/4", "3/4")];
        let ws = WorksheetData::new(title, problems, vec!["Find a common denominator".to_string()])
            .unwrap();
        assert_eq!(ws.problems.len(), 1);
        assert_eq!(ws.tips.len(), 1);
    }

    #[test]
    fn test_has_answer_is_false_for_blank() {
        assert!(!make_problem("1 + 1", "").has_answer());
        assert!(!make_problem("1 + 1", "  ").has_answer());
        assert!(make_problem("1 + 1", "2").has_answer());
    }
}
