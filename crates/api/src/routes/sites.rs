//! Route definitions for site-scoped widget placement.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{layout, site_widgets, widgets};
use crate::state::AppState;

/// Site routes mounted at `/sites`.
///
/// ```text
/// GET    /{id}/available-widgets                -> list_available_for_site
/// GET    /{id}/widgets                          -> list_site_widgets
/// POST   /{id}/widgets                          -> create_site_widget
/// GET    /{id}/widgets/grouped                  -> list_grouped
/// GET    /{id}/widgets/rendered                 -> list_rendered
/// GET    /{id}/widgets/missing-required         -> list_missing_required
/// PATCH  /{id}/widgets/{instance_id}            -> update_site_widget
/// DELETE /{id}/widgets/{instance_id}            -> delete_site_widget
/// POST   /{id}/widgets/{instance_id}/move       -> move_site_widget
/// GET    /{id}/layout                           -> get_layout
/// POST   /{id}/layout                           -> save_layout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/available-widgets",
            get(widgets::list_available_for_site),
        )
        .route(
            "/{id}/widgets",
            get(site_widgets::list_site_widgets).post(site_widgets::create_site_widget),
        )
        .route("/{id}/widgets/grouped", get(site_widgets::list_grouped))
        .route("/{id}/widgets/rendered", get(site_widgets::list_rendered))
        .route(
            "/{id}/widgets/missing-required",
            get(site_widgets::list_missing_required),
        )
        .route(
            "/{id}/widgets/{instance_id}",
            patch(site_widgets::update_site_widget).delete(site_widgets::delete_site_widget),
        )
        .route(
            "/{id}/widgets/{instance_id}/move",
            post(site_widgets::move_site_widget),
        )
        .route("/{id}/layout", get(layout::get_layout).post(layout::save_layout))
}
