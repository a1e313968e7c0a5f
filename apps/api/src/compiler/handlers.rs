//! Axum route handlers for worksheet compilation.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::compiler::{slugify, write_pdf, WorksheetCompiler};
use crate::errors::AppError;
use crate::models::worksheet::{Title, WorksheetData};
use crate::parser::markdown::{parse_worksheet, parse_worksheet_file};
use crate::selection::selector::{select_problems, PgProblemSource, SelectionCriteria};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct CompileFileRequest {
    /// Markdown worksheet to read.
    pub input_path: String,
    /// Target `.pdf` path, resolved inside the configured output directory.
    pub output_path: String,
}

#[derive(Debug, Serialize)]
pub struct CompileFileResponse {
    pub output_path: String,
    pub problem_count: usize,
    pub bytes_written: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Worksheet title; defaults to "<Type> Practice".
    pub title: Option<String>,
    #[serde(flatten)]
    pub criteria: SelectionCriteria,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/worksheets/compile
///
/// Parses worksheet markdown from the request body and returns the compiled
/// PDF with a slugified attachment filename.
pub async fn handle_compile(
    State(state): State<AppState>,
    Json(request): Json<CompileRequest>,
) -> Result<Response, AppError> {
    if request.markdown.trim().is_empty() {
        return Err(AppError::Validation("markdown cannot be empty".to_string()));
    }

    let worksheet = parse_worksheet(&request.markdown)?;
    let compiler = WorksheetCompiler::new(
        state.layout_config.clone(),
        state.render_config.clone(),
    );
    let bytes = compiler.compile(&worksheet)?;

    Ok(pdf_response(worksheet.title.as_str(), bytes))
}

/// POST /api/v1/worksheets/compile-file
///
/// File-path variant: reads a markdown file, writes the PDF under the
/// configured output directory. Uses the fixed 15-per-column layout.
pub async fn handle_compile_file(
    State(state): State<AppState>,
    Json(request): Json<CompileFileRequest>,
) -> Result<Json<CompileFileResponse>, AppError> {
    let worksheet = parse_worksheet_file(std::path::Path::new(&request.input_path)).await?;
    let compiler = WorksheetCompiler::new(
        state.layout_config.clone(),
        state.render_config.clone(),
    );
    let bytes = compiler.compile(&worksheet)?;

    let written = write_pdf(
        &bytes,
        std::path::Path::new(&request.output_path),
        &state.config.output_dir,
    )
    .await?;

    Ok(Json(CompileFileResponse {
        output_path: written.display().to_string(),
        problem_count: worksheet.problems.len(),
        bytes_written: bytes.len(),
    }))
}

/// POST /api/v1/worksheets/generate
///
/// Selection pipeline: criteria → stratified DB select → worksheet → PDF.
/// Uses the computed-rows / auto-spacing layout so any count fills the page.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let source = PgProblemSource::new(state.db.clone());
    let selection = select_problems(&request.criteria, &source).await?;

    let title_text = request
        .title
        .unwrap_or_else(|| format!("{} Practice", request.criteria.problem_type.label()));
    let worksheet = WorksheetData::from_selection(Title::new(&title_text)?, &selection.problems)?;

    let compiler = WorksheetCompiler::new(
        state.layout_config.clone().computed(),
        state.render_config.clone(),
    );
    let bytes = compiler.compile(&worksheet)?;

    Ok(pdf_response(worksheet.title.as_str(), bytes))
}

/// Builds an `application/pdf` response with an attachment filename derived
/// from the worksheet title.
fn pdf_response(title: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}.pdf\"", slugify(title));
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_response_headers() {
        let response = pdf_response("Week 3: Mixed Numbers", vec![1, 2, 3]);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"week-3-mixed-numbers.pdf\""
        );
    }

    #[test]
    fn test_generate_request_deserializes_flattened_criteria() {
        let json = r#"{
            "title": "Friday Quiz",
            "problem_type": "fractions",
            "total_count": 6,
            "difficulty_mix": {"easy": 3, "medium": 2, "hard": 1},
            "seed": "friday"
        }"#;
        let request: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.title.as_deref(), Some("Friday Quiz"));
        assert_eq!(request.criteria.total_count, 6);
        assert_eq!(request.criteria.seed.as_deref(), Some("friday"));
        assert!(request.criteria.required_tags.is_empty());
    }
}
