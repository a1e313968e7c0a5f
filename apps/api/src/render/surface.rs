//! Drawing-surface abstraction over the PDF page layer.
//!
//! The math renderer and compiler draw through this trait so tests can record
//! draw calls instead of producing a document. Coordinates are millimetres
//! with the PDF convention: y grows upward from the page bottom, and text is
//! positioned by its baseline.

use printpdf::{IndirectFontRef, Line, Mm, PdfLayerReference, Point};

pub trait DrawSurface {
    /// Draws a text run in the regular font, baseline at (x, y).
    fn draw_text(&mut self, text: &str, font_size_pt: f32, x_mm: f32, y_mm: f32);

    /// Draws a text run in the bold font, baseline at (x, y).
    fn draw_bold_text(&mut self, text: &str, font_size_pt: f32, x_mm: f32, y_mm: f32);

    /// Draws a horizontal rule from x1 to x2 at height y.
    fn draw_rule(&mut self, x1_mm: f32, x2_mm: f32, y_mm: f32);
}

/// Surface backed by one printpdf page layer and the two builtin fonts.
pub struct PdfSurface<'a> {
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl<'a> PdfSurface<'a> {
    pub fn new(
        layer: PdfLayerReference,
        regular: &'a IndirectFontRef,
        bold: &'a IndirectFontRef,
    ) -> Self {
        layer.set_outline_thickness(0.5);
        PdfSurface {
            layer,
            regular,
            bold,
        }
    }
}

impl DrawSurface for PdfSurface<'_> {
    fn draw_text(&mut self, text: &str, font_size_pt: f32, x_mm: f32, y_mm: f32) {
        self.layer
            .use_text(text, font_size_pt, Mm(x_mm), Mm(y_mm), self.regular);
    }

    fn draw_bold_text(&mut self, text: &str, font_size_pt: f32, x_mm: f32, y_mm: f32) {
        self.layer
            .use_text(text, font_size_pt, Mm(x_mm), Mm(y_mm), self.bold);
    }

    fn draw_rule(&mut self, x1_mm: f32, x2_mm: f32, y_mm: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x1_mm), Mm(y_mm)), false),
                (Point::new(Mm(x2_mm), Mm(y_mm)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }
}
