//! Route definitions for the widget catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::widgets;
use crate::state::AppState;

/// Catalog routes mounted at `/widgets`.
///
/// ```text
/// GET    /         -> list_widgets
/// GET    /{slug}   -> get_widget
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(widgets::list_widgets))
        .route("/{slug}", get(widgets::get_widget))
}
