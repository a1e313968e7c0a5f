//! Markdown worksheet parser: a single pass with section-aware state tracking.
//!
//! The worksheet convention is fixed: a `###` title line, a pipe-delimited
//! problem table (left-column expression in cell 1, right-column expression in
//! cell 3), a `### Answer Key` section of `N. answer` lines, and an optional
//! tips section opened by a line starting with `**Tip`.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::errors::AppError;
use crate::models::worksheet::{Problem, Title, WorksheetData};
use crate::parser::expression::validate_expression;

/// Right-column problems are numbered from here. This is a parsing-format
/// convention (15 problems per column on the original sheets), NOT a layout
/// constant; deriving it from layout config would silently break answer
/// alignment for existing markdown fixtures.
const RIGHT_COLUMN_START: u32 = 16;

/// Minimum fraction of problems that must have answers.
const ANSWER_COVERAGE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Problems,
    AnswerKey,
    Tips,
}

/// Reads and parses a worksheet markdown file.
pub async fn parse_worksheet_file(path: &Path) -> Result<WorksheetData, AppError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Input(format!("cannot read {}: {e}", path.display())))?;
    parse_worksheet(&text)
}

/// Parses worksheet markdown into a validated [`WorksheetData`].
pub fn parse_worksheet(text: &str) -> Result<WorksheetData, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Parse("worksheet content is empty".to_string()));
    }

    let mut title: Option<String> = None;
    let mut section = Section::Problems;
    // (assigned number, question) in encounter order.
    let mut left_column: Vec<(u32, String)> = Vec::new();
    let mut right_column: Vec<(u32, String)> = Vec::new();
    let mut answers: HashMap<u32, String> = HashMap::new();
    let mut tips: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.starts_with("### Answer Key") {
            section = Section::AnswerKey;
            continue;
        }
        if line.starts_with("**Tip") {
            section = Section::Tips;
            continue;
        }
        if let Some(heading) = line.strip_prefix("###") {
            if title.is_none() {
                title = Some(heading.trim().to_string());
            }
            continue;
        }

        match section {
            Section::Problems => {
                if line.contains('|') && !is_separator_row(line) {
                    extract_table_row(line, &mut left_column, &mut right_column)?;
                }
            }
            Section::AnswerKey => {
                if let Some((num, answer)) = line.split_once('.') {
                    if let Ok(n) = num.trim().parse::<u32>() {
                        let answer = answer.trim();
                        check_answer_denominator(n, answer)?;
                        answers.insert(n, answer.to_string());
                    }
                }
            }
            Section::Tips => {
                if let Some(tip) = line.strip_prefix('-') {
                    tips.push(tip.trim().to_string());
                }
            }
        }
    }

    let title = title.ok_or_else(|| AppError::Parse("no title line found".to_string()))?;

    let total = left_column.len() + right_column.len();
    if total == 0 {
        return Err(AppError::Parse("no problems found".to_string()));
    }

    // Assemble [left..., right...] and attach answers by assigned number.
    let problems: Vec<Problem> = left_column
        .iter()
        .chain(right_column.iter())
        .map(|(n, question)| Problem {
            question: question.clone(),
            answer: answers.get(n).cloned().unwrap_or_default(),
        })
        .collect();

    enforce_answer_coverage(&left_column, &right_column, &problems)?;

    WorksheetData::new(Title::new(&title)?, problems, tips)
}

/// Splits a pipe row into cells and extracts the left/right expressions.
///
/// Cells consisting solely of digits are row-number labels and are skipped.
/// Each accepted expression is validated before it enters the worksheet.
fn extract_table_row(
    line: &str,
    left_column: &mut Vec<(u32, String)>,
    right_column: &mut Vec<(u32, String)>,
) -> Result<(), AppError> {
    let cells: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if let Some(cell) = cells.get(1) {
        if !is_numeric_label(cell) {
            let number = left_column.len() as u32 + 1;
            validate_expression(cell, number)?;
            left_column.push((number, cell.to_string()));
        }
    }
    if let Some(cell) = cells.get(3) {
        if !is_numeric_label(cell) {
            let number = RIGHT_COLUMN_START + right_column.len() as u32;
            validate_expression(cell, number)?;
            right_column.push((number, cell.to_string()));
        }
    }
    Ok(())
}

/// Rejects `num/den` answers with a zero denominator.
fn check_answer_denominator(number: u32, answer: &str) -> Result<(), AppError> {
    for token in answer.split_whitespace() {
        if let Some((_, den)) = token.split_once('/') {
            if den.trim().parse::<i64>() == Ok(0) {
                return Err(AppError::Parse(format!(
                    "answer {number}: fraction with zero denominator"
                )));
            }
        }
    }
    Ok(())
}

/// Coverage below 50% is fatal; partial coverage is a warning naming the
/// missing problem numbers, and generation proceeds without those key lines.
fn enforce_answer_coverage(
    left_column: &[(u32, String)],
    right_column: &[(u32, String)],
    problems: &[Problem],
) -> Result<(), AppError> {
    let total = problems.len();
    let answered = problems.iter().filter(|p| p.has_answer()).count();

    if (answered as f64) < (total as f64) * ANSWER_COVERAGE_THRESHOLD {
        return Err(AppError::AnswerCoverage(format!(
            "Critical: insufficient answers ({answered} of {total} problems answered)"
        )));
    }

    if answered < total {
        let missing: Vec<u32> = left_column
            .iter()
            .chain(right_column.iter())
            .zip(problems.iter())
            .filter(|(_, p)| !p.has_answer())
            .map(|((n, _), _)| *n)
            .collect();
        warn!(
            "worksheet has {} unanswered problems (numbers {:?}); their answer-key lines will be omitted",
            total - answered,
            missing
        );
    }

    Ok(())
}

fn is_numeric_label(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit())
}

fn is_separator_row(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"### Fraction Practice

| 1 | 1/2 + 1/4 | 16 | 2/3 + 1/6 |
| 2 | 3/4 - 1/2 | 17 | 1 1/2 + 1 1/4 |
| 3 | 1/3 + 1/3 | 18 | 2 - 1/4 |

### Answer Key

1. 3/4
2. 1/4
3. 2/3
16. 5/6
17. 2 3/4
18. 1 3/4

**Tips for success**
- Find a common denominator first
- Simplify your final answer
"#;

    #[test]
    fn test_fixture_parses_six_problems_in_column_order() {
        let ws = parse_worksheet(FIXTURE).unwrap();
        assert_eq!(ws.title.as_str(), "Fraction Practice");
        assert_eq!(ws.problems.len(), 6);
        // [left1, left2, left3, right1, right2, right3]
        assert_eq!(ws.problems[0].question, "1/2 + 1/4");
        assert_eq!(ws.problems[1].question, "3/4 - 1/2");
        assert_eq!(ws.problems[2].question, "1/3 + 1/3");
        assert_eq!(ws.problems[3].question, "2/3 + 1/6");
        assert_eq!(ws.problems[4].question, "1 1/2 + 1 1/4");
        assert_eq!(ws.problems[5].question, "2 - 1/4");
    }

    #[test]
    fn test_fixture_attaches_answers_by_position() {
        let ws = parse_worksheet(FIXTURE).unwrap();
        assert_eq!(ws.problems[0].answer, "3/4");
        assert_eq!(ws.problems[2].answer, "2/3");
        assert_eq!(ws.problems[3].answer, "5/6");
        // Mixed-number answer survives intact.
        assert_eq!(ws.problems[4].answer, "2 3/4");
        assert_eq!(ws.problems[5].answer, "1 3/4");
    }

    #[test]
    fn test_fixture_collects_tips() {
        let ws = parse_worksheet(FIXTURE).unwrap();
        assert_eq!(
            ws.tips,
            vec![
                "Find a common denominator first".to_string(),
                "Simplify your final answer".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_content_is_fatal() {
        assert!(matches!(
            parse_worksheet("   \n  \n"),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let md = "| 1 | 1/2 + 1/4 |\n### Answer Key\n1. 3/4\n";
        let err = parse_worksheet(md).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_no_problems_is_fatal() {
        let md = "### Empty Sheet\n\n### Answer Key\n";
        let err = parse_worksheet(md).unwrap_err();
        assert!(err.to_string().contains("no problems"));
    }

    #[test]
    fn test_malformed_expression_aborts_with_problem_number() {
        let md = "### Sheet\n| 1 | 1/2 + 1/4 |\n| 2 | 5++3 |\n### Answer Key\n1. 3/4\n2. 8\n";
        let err = parse_worksheet(md).unwrap_err();
        assert!(err.to_string().contains("problem 2"));
    }

    #[test]
    fn test_zero_denominator_answer_rejected() {
        let md = "### Sheet\n| 1 | 1/2 + 1/4 |\n### Answer Key\n1. 3/0\n";
        let err = parse_worksheet(md).unwrap_err();
        assert!(err.to_string().contains("zero denominator"));
    }

    #[test]
    fn test_coverage_below_half_is_fatal() {
        // 10 problems, 4 answers → 40% < 50% → fatal.
        let mut md = String::from("### Sheet\n");
        for i in 1..=5 {
            md.push_str(&format!("| {i} | {i}/7 + 1/7 | {} | {i}/9 + 1/9 |\n", 15 + i));
        }
        md.push_str("### Answer Key\n1. 2/7\n2. 3/7\n3. 4/7\n4. 5/7\n");
        let err = parse_worksheet(&md).unwrap_err();
        assert!(matches!(err, AppError::AnswerCoverage(_)));
        assert!(err.to_string().contains("Critical"));
    }

    #[test]
    fn test_partial_coverage_proceeds_with_warning() {
        // 10 problems, 8 answers → succeeds; problems 5 and 20 stay blank.
        let mut md = String::from("### Sheet\n");
        for i in 1..=5 {
            md.push_str(&format!("| {i} | {i}/7 + 1/7 | {} | {i}/9 + 1/9 |\n", 15 + i));
        }
        md.push_str("### Answer Key\n1. a1\n2. a2\n3. a3\n4. a4\n16. a5\n17. a6\n18. a7\n19. a8\n");
        let ws = parse_worksheet(&md).unwrap();
        assert_eq!(ws.problems.len(), 10);
        assert!(!ws.problems[4].has_answer()); // left #5
        assert!(!ws.problems[9].has_answer()); // right #20
        assert_eq!(ws.problems.iter().filter(|p| p.has_answer()).count(), 8);
    }

    #[test]
    fn test_separator_rows_are_skipped() {
        // Without the separator skip, "---" cells would hit the validator.
        let md = "### Sheet\n|---|-----------|---|-----------|\n| 1 | 1/2 + 1/4 |\n### Answer Key\n1. 3/4\n";
        let ws = parse_worksheet(md).unwrap();
        assert_eq!(ws.problems.len(), 1);
        assert_eq!(ws.problems[0].question, "1/2 + 1/4");
    }

    #[test]
    fn test_numeric_label_cells_are_skipped() {
        let md = "### Sheet\n| 12 | 1/2 + 1/4 |\n### Answer Key\n1. 3/4\n";
        let ws = parse_worksheet(md).unwrap();
        assert_eq!(ws.problems.len(), 1);
        assert_eq!(ws.problems[0].question, "1/2 + 1/4");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_input_error() {
        let err = parse_worksheet_file(Path::new("/nonexistent/sheet.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }
}
