pub mod health;
pub mod sites;
pub mod templates;
pub mod widgets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /widgets                                         list catalog (?site_type=)
/// /widgets/{slug}                                  get definition
///
/// /templates/{id}/widget-positions                 list, create (admin path)
///
/// /sites/{id}/available-widgets                    catalog for the site's type
/// /sites/{id}/widgets                              list, create
/// /sites/{id}/widgets/grouped                      instances by position
/// /sites/{id}/widgets/rendered                     render view (?audience=)
/// /sites/{id}/widgets/missing-required             required positions left empty
/// /sites/{id}/widgets/{instance_id}                update (PATCH), delete
/// /sites/{id}/widgets/{instance_id}/move           move (POST)
/// /sites/{id}/layout                               get, save sidebar position
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Read-only widget catalog.
        .nest("/widgets", widgets::router())
        // Template-scoped position registry.
        .nest("/templates", templates::router())
        // Site-scoped instances and layout preference.
        .nest("/sites", sites::router())
}
