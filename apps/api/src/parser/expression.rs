//! Structural validation of problem expressions.
//!
//! Runs at parse time so malformed worksheets fail fast instead of producing
//! a garbled PDF. Checks are lexical only; no arithmetic evaluation.

use crate::errors::AppError;

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// Validates one raw expression, failing with a problem-numbered error.
///
/// Rejected shapes:
/// - empty after trimming
/// - leading or trailing operator (`+5`, `5+`)
/// - two operators in direct succession (`5++3`), except a minus directly
///   after another operator, which encodes a negative operand (`5 - -3`)
/// - unbalanced parenthesis counts (`(5+3`)
/// - any `num/den` token with a zero denominator (`1/0`)
pub fn validate_expression(expression: &str, problem_number: u32) -> Result<(), AppError> {
    let trimmed = expression.trim();

    if trimmed.is_empty() {
        return Err(invalid(problem_number, "expression is empty"));
    }

    if trimmed.starts_with(&OPERATORS[..]) {
        return Err(invalid(problem_number, "expression starts with an operator"));
    }
    if trimmed.ends_with(&OPERATORS[..]) {
        return Err(invalid(problem_number, "expression ends with an operator"));
    }

    let mut prev: Option<char> = None;
    let mut open_parens = 0i32;
    let mut close_parens = 0i32;

    for c in trimmed.chars() {
        if c.is_whitespace() {
            continue;
        }
        match c {
            '(' => open_parens += 1,
            ')' => close_parens += 1,
            _ => {}
        }
        if let Some(p) = prev {
            // A minus after an operator is a negative operand, not a typo.
            if is_operator(p) && is_operator(c) && c != '-' {
                return Err(invalid(problem_number, "two operators in succession"));
            }
        }
        prev = Some(c);
    }

    if open_parens != close_parens {
        return Err(invalid(problem_number, "unbalanced parentheses"));
    }

    for token in trimmed.split_whitespace() {
        if let Some((_, den)) = token.split_once('/') {
            let den = den.trim_matches(|c| c == '(' || c == ')');
            if den.parse::<i64>() == Ok(0) {
                return Err(invalid(problem_number, "fraction with zero denominator"));
            }
        }
    }

    Ok(())
}

fn invalid(problem_number: u32, reason: &str) -> AppError {
    AppError::Validation(format!("problem {problem_number}: {reason}"))
}
