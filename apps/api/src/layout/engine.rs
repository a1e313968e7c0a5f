//! Two-column page layout engine.
//!
//! Maps a problem index to a page coordinate. Pure and deterministic: the
//! problems page and the answer-key page run the same layout so entry N sits
//! at the same coordinate on both. Coordinates are millimetres, y measured
//! up from the page bottom (PDF convention).

use serde::{Deserialize, Serialize};

/// How many rows each column holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowsPerColumn {
    /// Fixed capacity per column (the markdown-file convention of 15).
    Fixed(usize),
    /// `ceil(count / 2)`, used by the on-demand service path to split any count
    /// evenly across both columns.
    Computed,
}

/// Vertical distance between consecutive rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowSpacing {
    Fixed(f32),
    /// `clamp(printable_height / rows, min, max)`: keeps problems evenly
    /// distributed without overflowing the printable area at any count.
    Auto { min_mm: f32, max_mm: f32 },
}

/// Page geometry for one worksheet. Defaulted but overridable by the caller;
/// no hidden global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// x-origin of each of the two columns.
    pub column_x_mm: [f32; 2],
    /// y of the first row, below the title block.
    pub start_y_mm: f32,
    pub rows_per_column: RowsPerColumn,
    pub spacing: RowSpacing,
}

impl Default for LayoutConfig {
    /// US letter, 15 rows per column at fixed spacing (the file-path layout).
    fn default() -> Self {
        LayoutConfig {
            page_width_mm: 215.9,
            page_height_mm: 279.4,
            margin_mm: 18.0,
            column_x_mm: [24.0, 118.0],
            start_y_mm: 238.0,
            rows_per_column: RowsPerColumn::Fixed(15),
            spacing: RowSpacing::Fixed(14.0),
        }
    }
}

impl LayoutConfig {
    /// Service-path variant: computed rows, auto spacing.
    pub fn computed(self) -> Self {
        LayoutConfig {
            rows_per_column: RowsPerColumn::Computed,
            spacing: RowSpacing::Auto {
                min_mm: 9.0,
                max_mm: 17.0,
            },
            ..self
        }
    }
}

/// Coordinate assigned to one problem index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutCell {
    pub column: usize,
    pub row: usize,
    pub x_mm: f32,
    pub y_mm: f32,
}

/// Computes per-problem coordinates for a page.
#[derive(Debug, Clone)]
pub struct PageLayoutEngine {
    config: LayoutConfig,
}

impl PageLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        PageLayoutEngine { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn rows_for(&self, count: usize) -> usize {
        let rows = match self.config.rows_per_column {
            RowsPerColumn::Fixed(n) => n,
            RowsPerColumn::Computed => (count + 1) / 2,
        };
        rows.max(1)
    }

    fn spacing_for(&self, rows: usize) -> f32 {
        match self.config.spacing {
            RowSpacing::Fixed(mm) => mm,
            RowSpacing::Auto { min_mm, max_mm } => {
                let printable = self.config.start_y_mm - self.config.margin_mm;
                (printable / rows as f32).clamp(min_mm, max_mm)
            }
        }
    }

    /// Row spacing used for `count` problems, also the line step on the
    /// tips page.
    pub fn row_spacing(&self, count: usize) -> f32 {
        self.spacing_for(self.rows_for(count))
    }

    /// Assigns every problem index a column, row, and coordinate.
    pub fn layout(&self, count: usize) -> Vec<LayoutCell> {
        let rows = self.rows_for(count);
        let spacing = self.spacing_for(rows);

        (0..count)
            .map(|index| {
                let column = (index / rows).min(1);
                let row = index - column * rows;
                LayoutCell {
                    column,
                    row,
                    x_mm: self.config.column_x_mm[column],
                    y_mm: self.config.start_y_mm - row as f32 * spacing,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(config: LayoutConfig) -> PageLayoutEngine {
        PageLayoutEngine::new(config)
    }

    #[test]
    fn test_layout_is_identical_across_pages() {
        // Problems page and answer-key page must align row for row.
        let e = engine(LayoutConfig::default());
        assert_eq!(e.layout(23), e.layout(23));
    }

    #[test]
    fn test_fixed_rows_split_at_capacity() {
        let e = engine(LayoutConfig::default()); // 15 per column
        let cells = e.layout(20);
        assert_eq!(cells[0].column, 0);
        assert_eq!(cells[14].column, 0);
        assert_eq!(cells[15].column, 1);
        assert_eq!(cells[15].row, 0);
        assert_eq!(cells[19].row, 4);
    }

    #[test]
    fn test_computed_rows_split_evenly() {
        let e = engine(LayoutConfig::default().computed());
        let cells = e.layout(7); // ceil(7/2) = 4 rows
        assert_eq!(cells.iter().filter(|c| c.column == 0).count(), 4);
        assert_eq!(cells.iter().filter(|c| c.column == 1).count(), 3);
        assert_eq!(cells[4].row, 0);
    }

    #[test]
    fn test_columns_use_configured_x_origins() {
        let config = LayoutConfig::default();
        let cells = engine(config.clone()).layout(20);
        assert_eq!(cells[0].x_mm, config.column_x_mm[0]);
        assert_eq!(cells[15].x_mm, config.column_x_mm[1]);
    }

    #[test]
    fn test_rows_descend_the_page() {
        let cells = engine(LayoutConfig::default()).layout(5);
        for pair in cells.windows(2) {
            assert!(pair[1].y_mm < pair[0].y_mm);
        }
    }

    #[test]
    fn test_auto_spacing_clamps_to_max_for_few_problems() {
        let e = engine(LayoutConfig::default().computed());
        // 4 problems → 2 rows → printable/2 would be huge → clamped to max.
        assert!((e.row_spacing(4) - 17.0).abs() < 1e-4);
    }

    #[test]
    fn test_auto_spacing_clamps_to_min_for_many_problems() {
        let e = engine(LayoutConfig::default().computed());
        // 60 problems → 30 rows → printable/30 ≈ 7.3 → clamped to min.
        assert!((e.row_spacing(60) - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_auto_spacing_never_overflows_printable_area() {
        let config = LayoutConfig::default().computed();
        let e = engine(config.clone());
        for count in [2usize, 10, 24, 30, 40] {
            let cells = e.layout(count);
            for cell in &cells {
                assert!(
                    cell.y_mm >= config.margin_mm - 1e-3,
                    "count {count}: row at y {} below margin",
                    cell.y_mm
                );
            }
        }
    }

    #[test]
    fn test_single_problem_layout() {
        let cells = engine(LayoutConfig::default().computed()).layout(1);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].column, 0);
        assert_eq!(cells[0].row, 0);
    }
}
