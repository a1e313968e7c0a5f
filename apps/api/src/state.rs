use sqlx::PgPool;

use crate::config::Config;
use crate::layout::LayoutConfig;
use crate::render::math::RenderConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Default page geometry; the generate path switches it to computed rows.
    pub layout_config: LayoutConfig,
    pub render_config: RenderConfig,
}
