//! Handlers for the read-only widget catalog.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use edusite_core::error::PlacementError;
use edusite_core::types::DbId;
use edusite_db::repositories::WidgetDefinitionRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::SiteWidgetStore;

/// Query parameters for listing the catalog.
#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub site_type: Option<String>,
}

/// GET /api/v1/widgets?site_type=
///
/// List active widget definitions, optionally restricted to a site type.
pub async fn list_widgets(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<impl IntoResponse> {
    let items =
        WidgetDefinitionRepo::list_active(&state.pool, params.site_type.as_deref()).await?;
    tracing::debug!(
        count = items.len(),
        site_type = params.site_type.as_deref().unwrap_or("*"),
        "Listed widget catalog",
    );
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/widgets/{slug}
///
/// Retrieve a single definition by slug.
pub async fn get_widget(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let definition = WidgetDefinitionRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::from(PlacementError::UnknownWidget { slug: slug.clone() }))?;
    Ok(Json(DataResponse { data: definition }))
}

/// GET /api/v1/sites/{id}/available-widgets
///
/// Catalog filtered by the site's own type.
pub async fn list_available_for_site(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = SiteWidgetStore::site(&state.pool, site_id).await?;
    let items = WidgetDefinitionRepo::list_active(&state.pool, Some(&site.site_type)).await?;
    Ok(Json(DataResponse { data: items }))
}
