//! Worksheet compiler: turns a [`WorksheetData`] into a finished PDF.
//!
//! One layout engine and one math renderer serve both output paths (file and
//! HTTP); the paths differ only in the `LayoutConfig` they pass in. Pages:
//! problems with blank answer lines, a coordinate-aligned answer key, and an
//! optional tips page.

pub mod handlers;

use std::path::{Component, Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::info;

use crate::errors::AppError;
use crate::layout::{LayoutConfig, PageLayoutEngine};
use crate::models::worksheet::WorksheetData;
use crate::render::math::{MathRenderer, RenderConfig};
use crate::render::metrics::{HELVETICA, HELVETICA_BOLD};
use crate::render::surface::{DrawSurface, PdfSurface};

const TITLE_SIZE_PT: f32 = 18.0;
const BODY_SIZE_PT: f32 = 12.0;
const TIP_SIZE_PT: f32 = 11.0;
/// Gap between the number label and the expression.
const LABEL_GAP_MM: f32 = 2.5;
/// Gap between the expression and the `=` that follows it.
const ANSWER_GAP_MM: f32 = 2.5;
/// Blank write-in line appended to every problem on the problems page.
const ANSWER_BLANK: &str = "= _______";
const TIP_INDENT_MM: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Problems,
    AnswerKey,
}

pub struct WorksheetCompiler {
    layout: PageLayoutEngine,
    renderer: MathRenderer,
}

impl WorksheetCompiler {
    pub fn new(layout_config: LayoutConfig, render_config: RenderConfig) -> Self {
        WorksheetCompiler {
            layout: PageLayoutEngine::new(layout_config),
            renderer: MathRenderer::new(render_config),
        }
    }

    /// Compiles the worksheet into PDF bytes.
    pub fn compile(&self, worksheet: &WorksheetData) -> Result<Vec<u8>, AppError> {
        let config = self.layout.config().clone();
        let (doc, page1, layer1) = PdfDocument::new(
            worksheet.title.as_str(),
            Mm(config.page_width_mm),
            Mm(config.page_height_mm),
            "problems",
        );

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Render(e.to_string()))?;

        let cells = self.layout.layout(worksheet.problems.len());

        {
            let layer = doc.get_page(page1).get_layer(layer1);
            let mut surface = PdfSurface::new(layer, &regular, &bold);
            self.draw_problem_page(&mut surface, worksheet, &cells, PageKind::Problems);
        }

        {
            let (page, layer) = doc.add_page(
                Mm(config.page_width_mm),
                Mm(config.page_height_mm),
                "answer key",
            );
            let layer = doc.get_page(page).get_layer(layer);
            let mut surface = PdfSurface::new(layer, &regular, &bold);
            self.draw_problem_page(&mut surface, worksheet, &cells, PageKind::AnswerKey);
        }

        if !worksheet.tips.is_empty() {
            let (page, layer) = doc.add_page(
                Mm(config.page_width_mm),
                Mm(config.page_height_mm),
                "tips",
            );
            let layer = doc.get_page(page).get_layer(layer);
            let mut surface = PdfSurface::new(layer, &regular, &bold);
            self.draw_tips_page(&mut surface, worksheet);
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| AppError::Render(format!("failed to serialize PDF: {e}")))?;

        info!(
            "compiled worksheet '{}': {} problems, {} tips, {} bytes",
            worksheet.title,
            worksheet.problems.len(),
            worksheet.tips.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Draws one of the two aligned pages. The answer-key page reuses the
    /// exact problem coordinates so answer row N matches problem row N.
    fn draw_problem_page(
        &self,
        surface: &mut dyn DrawSurface,
        worksheet: &WorksheetData,
        cells: &[crate::layout::LayoutCell],
        kind: PageKind,
    ) {
        let config = self.layout.config();
        let title = match kind {
            PageKind::Problems => worksheet.title.as_str().to_string(),
            PageKind::AnswerKey => format!("{} - Answer Key", worksheet.title),
        };
        self.draw_centered_title(surface, &title, config.page_width_mm);

        for (index, (problem, cell)) in worksheet.problems.iter().zip(cells.iter()).enumerate() {
            let label = format!("{}.", index + 1);
            surface.draw_bold_text(&label, BODY_SIZE_PT, cell.x_mm, cell.y_mm);

            let expr_x = cell.x_mm + HELVETICA_BOLD.measure_mm(&label, BODY_SIZE_PT) + LABEL_GAP_MM;
            let consumed =
                self.renderer
                    .draw_expression(surface, expr_x, cell.y_mm, &problem.question, BODY_SIZE_PT);

            let tail_x = expr_x + consumed + ANSWER_GAP_MM;
            match kind {
                PageKind::Problems => {
                    surface.draw_text(ANSWER_BLANK, BODY_SIZE_PT, tail_x, cell.y_mm);
                }
                PageKind::AnswerKey => {
                    if problem.has_answer() {
                        surface.draw_text("=", BODY_SIZE_PT, tail_x, cell.y_mm);
                        let answer_x =
                            tail_x + HELVETICA.measure_mm("=", BODY_SIZE_PT) + ANSWER_GAP_MM;
                        self.renderer.draw_expression(
                            surface,
                            answer_x,
                            cell.y_mm,
                            &problem.answer,
                            BODY_SIZE_PT,
                        );
                    }
                }
            }
        }
    }

    fn draw_tips_page(&self, surface: &mut dyn DrawSurface, worksheet: &WorksheetData) {
        let config = self.layout.config();
        self.draw_centered_title(surface, "Tips", config.page_width_mm);

        let line_step = self.layout.row_spacing(worksheet.tips.len().max(2));
        let x = config.margin_mm + TIP_INDENT_MM;
        for (index, tip) in worksheet.tips.iter().enumerate() {
            let y = config.start_y_mm - index as f32 * line_step;
            surface.draw_text(&format!("• {tip}"), TIP_SIZE_PT, x, y);
        }
    }

    fn draw_centered_title(&self, surface: &mut dyn DrawSurface, title: &str, page_width_mm: f32) {
        let config = self.layout.config();
        let width = HELVETICA_BOLD.measure_mm(title, TITLE_SIZE_PT);
        let x = (page_width_mm - width) / 2.0;
        let y = config.page_height_mm - config.margin_mm - 10.0;
        surface.draw_bold_text(title, TITLE_SIZE_PT, x, y);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output helpers
// ────────────────────────────────────────────────────────────────────────────

/// Validates that `path` names a `.pdf` file inside `allowed_dir`. Relative
/// paths are resolved against `allowed_dir`, and `..` traversal is rejected.
/// Returns the resolved path to write.
pub fn validate_output_path(path: &Path, allowed_dir: &Path) -> Result<PathBuf, AppError> {
    if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
        return Err(AppError::Input(format!(
            "output path must end in .pdf: {}",
            path.display()
        )));
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(AppError::Input(format!(
            "output path must not traverse directories: {}",
            path.display()
        )));
    }

    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        allowed_dir.join(path)
    };
    if !resolved.starts_with(allowed_dir) {
        return Err(AppError::Input(format!(
            "output path must be inside {}: {}",
            allowed_dir.display(),
            path.display()
        )));
    }
    Ok(resolved)
}

/// Writes compiled PDF bytes to a validated path. `tokio::fs::write` opens,
/// writes, and closes the handle within the call, so a failure partway
/// through never leaks the file handle.
pub async fn write_pdf(bytes: &[u8], path: &Path, allowed_dir: &Path) -> Result<PathBuf, AppError> {
    let resolved = validate_output_path(path, allowed_dir)?;
    if let Some(parent) = resolved.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Render(format!("cannot create {}: {e}", parent.display())))?;
    }
    tokio::fs::write(&resolved, bytes)
        .await
        .map_err(|e| AppError::Render(format!("cannot write {}: {e}", resolved.display())))?;
    info!("wrote {} bytes to {}", bytes.len(), resolved.display());
    Ok(resolved)
}

/// Derives a filesystem- and header-safe filename slug from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // suppress a leading dash
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("worksheet");
    }
    slug
}
