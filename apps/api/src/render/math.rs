//! Math-expression renderer.
//!
//! Draws plain text, simple fractions, mixed numbers, and strictly binary
//! numeric expressions at precise page coordinates, returning the horizontal
//! space consumed. Anything with alphabetic content is a single verbatim text
//! run: letters are not numeric operands, so algebraic sums like
//! `2a + 3b + 4a` must never be decomposed into fraction/number sub-parts.

use serde::{Deserialize, Serialize};

use crate::render::metrics::{HELVETICA, PT_TO_MM};
use crate::render::surface::DrawSurface;

/// Spacing and fraction-geometry constants, passed in explicitly so tests can
/// exercise alternative geometries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Gap on each side of a binary operator glyph.
    pub operator_gap_mm: f32,
    /// Gap between the whole part and the fraction of a mixed number.
    pub mixed_gap_mm: f32,
    /// Padding added to the wider of numerator/denominator.
    pub fraction_pad_mm: f32,
    /// Numerator baseline rise above the expression baseline, in em.
    pub numerator_rise_em: f32,
    /// Fraction bar drop below the expression baseline.
    pub rule_drop_mm: f32,
    /// Denominator baseline drop below the fraction bar.
    pub denominator_drop_mm: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            operator_gap_mm: 1.8,
            mixed_gap_mm: 1.2,
            fraction_pad_mm: 2.0,
            numerator_rise_em: 0.8,
            rule_drop_mm: 1.2,
            denominator_drop_mm: 4.2,
        }
    }
}

/// Stateless renderer; one instance per generation request.
#[derive(Debug, Clone, Default)]
pub struct MathRenderer {
    config: RenderConfig,
}

impl MathRenderer {
    pub fn new(config: RenderConfig) -> Self {
        MathRenderer { config }
    }

    /// Draws an expression at (x, y) and returns the consumed width in mm.
    ///
    /// Dispatch, in priority order:
    /// 1. any alphabetic character → one verbatim text run
    /// 2. exactly one top-level `" + "` / `" - "` with two non-empty operands
    ///    → decomposed binary rendering; more than one occurrence → verbatim
    /// 3. otherwise → `draw_number`
    pub fn draw_expression(
        &self,
        surface: &mut dyn DrawSurface,
        x: f32,
        y: f32,
        expression: &str,
        font_size_pt: f32,
    ) -> f32 {
        let expr = expression.trim();
        if expr.is_empty() {
            return 0.0;
        }

        if expr.chars().any(char::is_alphabetic) {
            surface.draw_text(expr, font_size_pt, x, y);
            return HELVETICA.measure_mm(expr, font_size_pt);
        }

        if expr.contains(" + ") || expr.contains(" - ") {
            return match split_binary(expr) {
                Some((lhs, op, rhs)) => {
                    let mut cursor = x;
                    cursor += self.draw_number(surface, cursor, y, lhs, font_size_pt);
                    cursor += self.config.operator_gap_mm;
                    surface.draw_text(op, font_size_pt, cursor, y);
                    cursor += HELVETICA.measure_mm(op, font_size_pt);
                    cursor += self.config.operator_gap_mm;
                    cursor += self.draw_number(surface, cursor, y, rhs, font_size_pt);
                    cursor - x
                }
                // More than one top-level operator: plain text, no decomposition.
                None => {
                    surface.draw_text(expr, font_size_pt, x, y);
                    HELVETICA.measure_mm(expr, font_size_pt)
                }
            };
        }

        self.draw_number(surface, x, y, expr, font_size_pt)
    }

    /// Draws a whole number, simple fraction, or mixed number.
    pub fn draw_number(
        &self,
        surface: &mut dyn DrawSurface,
        x: f32,
        y: f32,
        number_text: &str,
        font_size_pt: f32,
    ) -> f32 {
        let text = number_text.trim();

        // Letters never reach fraction decomposition, even via this path.
        if text.chars().any(char::is_alphabetic) {
            surface.draw_text(text, font_size_pt, x, y);
            return HELVETICA.measure_mm(text, font_size_pt);
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => match single.split_once('/') {
                Some((numerator, denominator)) => {
                    self.draw_fraction(surface, x, y, numerator, denominator, font_size_pt)
                }
                None => {
                    surface.draw_text(single, font_size_pt, x, y);
                    HELVETICA.measure_mm(single, font_size_pt)
                }
            },
            [whole, fraction] if fraction.contains('/') => {
                surface.draw_text(whole, font_size_pt, x, y);
                let whole_width = HELVETICA.measure_mm(whole, font_size_pt);
                let fraction_width = match fraction.split_once('/') {
                    Some((numerator, denominator)) => self.draw_fraction(
                        surface,
                        x + whole_width + self.config.mixed_gap_mm,
                        y,
                        numerator,
                        denominator,
                        font_size_pt,
                    ),
                    None => 0.0,
                };
                whole_width + self.config.mixed_gap_mm + fraction_width
            }
            _ => {
                surface.draw_text(text, font_size_pt, x, y);
                HELVETICA.measure_mm(text, font_size_pt)
            }
        }
    }

    /// Draws a fraction and returns its width: `max(num, den) + padding`.
    ///
    /// Numerator and denominator are each centered independently within that
    /// shared span. The invariant holds whichever part is wider.
    pub fn draw_fraction(
        &self,
        surface: &mut dyn DrawSurface,
        x: f32,
        y: f32,
        numerator: &str,
        denominator: &str,
        font_size_pt: f32,
    ) -> f32 {
        let numerator_width = HELVETICA.measure_mm(numerator, font_size_pt);
        let denominator_width = HELVETICA.measure_mm(denominator, font_size_pt);
        let width = numerator_width.max(denominator_width) + self.config.fraction_pad_mm;

        let rise = self.config.numerator_rise_em * font_size_pt * PT_TO_MM;
        surface.draw_text(
            numerator,
            font_size_pt,
            x + (width - numerator_width) / 2.0,
            y + rise,
        );

        let rule_y = y - self.config.rule_drop_mm;
        surface.draw_rule(x, x + width, rule_y);

        surface.draw_text(
            denominator,
            font_size_pt,
            x + (width - denominator_width) / 2.0,
            rule_y - self.config.denominator_drop_mm,
        );

        width
    }
}

/// Splits a purely numeric expression on its single top-level ` + ` / ` - `.
///
/// Returns `None` when more than one top-level operator is present or an
/// operand is empty; those render as plain text.
fn split_binary(expr: &str) -> Option<(&str, &'static str, &str)> {
    let occurrences = expr.matches(" + ").count() + expr.matches(" - ").count();
    if occurrences != 1 {
        return None;
    }

    let plus = expr.find(" + ");
    let minus = expr.find(" - ");
    let (idx, op) = match (plus, minus) {
        (Some(p), None) => (p, "+"),
        (None, Some(m)) => (m, "-"),
        // occurrences == 1 rules out both or neither being present.
        _ => return None,
    };

    let lhs = expr[..idx].trim();
    let rhs = expr[idx + 3..].trim();
    if lhs.is_empty() || rhs.is_empty() {
        return None;
    }
    Some((lhs, op, rhs))
}
