pub mod engine;

pub use engine::{LayoutCell, LayoutConfig, PageLayoutEngine, RowSpacing, RowsPerColumn};
