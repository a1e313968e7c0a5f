//! Difficulty-stratified problem selection from the problem bank.
//!
//! For each difficulty bucket independently: fetch candidates matching
//! type/tag constraints, verify the bucket can be filled, shuffle, take the
//! requested count. Buckets concatenate in fixed order easy → medium → hard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::problem::{Difficulty, ProblemRow, ProblemType, SelectedProblem};
use crate::selection::rng::{fisher_yates, EntropyRandom, RandomSource, SeededRandom};

// ────────────────────────────────────────────────────────────────────────────
// Criteria
// ────────────────────────────────────────────────────────────────────────────

/// Requested number of problems per difficulty bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyMix {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyMix {
    pub fn count_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }
}

/// Selection request, produced by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub problem_type: ProblemType,
    pub total_count: u32,
    pub difficulty_mix: DifficultyMix,
    #[serde(default)]
    pub required_tags: Vec<String>,
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    #[serde(default)]
    pub seed: Option<String>,
}

impl SelectionCriteria {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.total_count == 0 {
            return Err(AppError::Validation(
                "total_count must be positive".to_string(),
            ));
        }
        if self.difficulty_mix.total() != self.total_count {
            return Err(AppError::Validation(format!(
                "difficulty mix sums to {}, expected total_count {}",
                self.difficulty_mix.total(),
                self.total_count
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data source
// ────────────────────────────────────────────────────────────────────────────

/// Query capability the selector needs from the problem bank. Tag constraints
/// are set-membership filters applied by the query, not post-filtering.
#[async_trait]
pub trait ProblemSource: Send + Sync {
    async fn fetch(
        &self,
        problem_type: ProblemType,
        difficulty: Difficulty,
        required_tags: &[String],
        excluded_tags: &[String],
    ) -> anyhow::Result<Vec<SelectedProblem>>;
}

/// PostgreSQL-backed problem source.
pub struct PgProblemSource {
    pool: PgPool,
}

impl PgProblemSource {
    pub fn new(pool: PgPool) -> Self {
        PgProblemSource { pool }
    }
}

#[async_trait]
impl ProblemSource for PgProblemSource {
    async fn fetch(
        &self,
        problem_type: ProblemType,
        difficulty: Difficulty,
        required_tags: &[String],
        excluded_tags: &[String],
    ) -> anyhow::Result<Vec<SelectedProblem>> {
        let rows = sqlx::query_as::<_, ProblemRow>(
            "SELECT id, problem_type, difficulty, question, answer, tags, created_at \
             FROM problems \
             WHERE problem_type = $1 AND difficulty = $2 \
               AND tags @> $3 AND NOT (tags && $4)",
        )
        .bind(problem_type.as_str())
        .bind(difficulty.as_str())
        .bind(required_tags)
        .bind(excluded_tags)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SelectedProblem::try_from).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Per-bucket accounting attached to a selection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionMetadata {
    pub requested_total: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
    pub seeded: bool,
}

/// Ordered selection output: easy problems first, then medium, then hard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub problems: Vec<SelectedProblem>,
    pub metadata: SelectionMetadata,
}

/// Selects a shuffled, difficulty-stratified subset of the problem bank.
///
/// With a seed, repeated calls over the same candidate set return the
/// identical selection and ordering.
pub async fn select_problems(
    criteria: &SelectionCriteria,
    source: &dyn ProblemSource,
) -> Result<Selection, AppError> {
    criteria.validate()?;

    let mut rng: Box<dyn RandomSource> = match &criteria.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(EntropyRandom::new()),
    };

    let mut problems: Vec<SelectedProblem> = Vec::with_capacity(criteria.total_count as usize);

    for difficulty in Difficulty::ALL {
        let requested = criteria.difficulty_mix.count_for(difficulty) as usize;
        if requested == 0 {
            continue;
        }

        let mut candidates = source
            .fetch(
                criteria.problem_type,
                difficulty,
                &criteria.required_tags,
                &criteria.excluded_tags,
            )
            .await
            .map_err(AppError::Internal)?;

        debug!(
            "fetched {} {} {} candidates ({} requested)",
            candidates.len(),
            difficulty.as_str(),
            criteria.problem_type.as_str(),
            requested
        );

        if candidates.len() < requested {
            return Err(AppError::InsufficientData {
                difficulty: difficulty.as_str(),
                problem_type: criteria.problem_type.as_str(),
                requested,
                available: candidates.len(),
            });
        }

        fisher_yates(&mut candidates, rng.as_mut());
        problems.extend(candidates.into_iter().take(requested));
    }

    let metadata = SelectionMetadata {
        requested_total: criteria.total_count,
        easy: criteria.difficulty_mix.easy,
        medium: criteria.difficulty_mix.medium,
        hard: criteria.difficulty_mix.hard,
        seeded: criteria.seed.is_some(),
    };

    Ok(Selection { problems, metadata })
}
