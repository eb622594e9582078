//! Route definitions for template widget positions.

use axum::routing::get;
use axum::Router;

use crate::handlers::widget_positions;
use crate::state::AppState;

/// Template routes mounted at `/templates`.
///
/// ```text
/// GET    /{id}/widget-positions   -> list_positions
/// POST   /{id}/widget-positions   -> create_position
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}/widget-positions",
        get(widget_positions::list_positions).post(widget_positions::create_position),
    )
}
