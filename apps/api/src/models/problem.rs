use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Problem difficulty bucket. Selection is stratified over these in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Worksheet problem category stored in the problem bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Arithmetic,
    Fractions,
    #[serde(rename = "mixed_numbers")]
    MixedNumbers,
    Algebra,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Arithmetic => "arithmetic",
            ProblemType::Fractions => "fractions",
            ProblemType::MixedNumbers => "mixed_numbers",
            ProblemType::Algebra => "algebra",
        }
    }

    /// Human-readable label used for default worksheet titles.
    pub fn label(&self) -> &'static str {
        match self {
            ProblemType::Arithmetic => "Arithmetic",
            ProblemType::Fractions => "Fractions",
            ProblemType::MixedNumbers => "Mixed Numbers",
            ProblemType::Algebra => "Algebra",
        }
    }
}

impl FromStr for ProblemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arithmetic" => Ok(ProblemType::Arithmetic),
            "fractions" => Ok(ProblemType::Fractions),
            "mixed_numbers" => Ok(ProblemType::MixedNumbers),
            "algebra" => Ok(ProblemType::Algebra),
            other => Err(format!("unknown problem type '{other}'")),
        }
    }
}

/// Raw problem-bank row as stored in PostgreSQL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProblemRow {
    pub id: Uuid,
    pub problem_type: String,
    pub difficulty: String,
    pub question: String,
    pub answer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A problem chosen by the selector, with its bank metadata attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedProblem {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub problem_type: ProblemType,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
}

impl TryFrom<ProblemRow> for SelectedProblem {
    type Error = anyhow::Error;

    fn try_from(row: ProblemRow) -> Result<Self, Self::Error> {
        let problem_type = row
            .problem_type
            .parse::<ProblemType>()
            .map_err(anyhow::Error::msg)?;
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(anyhow::Error::msg)?;
        Ok(SelectedProblem {
            id: row.id,
            question: row.question,
            answer: row.answer,
            problem_type,
            difficulty,
            tags: row.tags,
        })
    }
}
