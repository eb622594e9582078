//! Handlers for site widget instances.
//!
//! Instance endpoints return bare JSON (arrays and objects without an
//! envelope); the editor client reads them directly.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use edusite_core::render::RenderAudience;
use edusite_core::types::DbId;
use edusite_db::models::site_widget::{CreateSiteWidget, MoveSiteWidget, UpdateSiteWidget};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::SiteWidgetStore;

/// Query parameters for the rendered view.
#[derive(Debug, Deserialize)]
pub struct RenderParams {
    #[serde(default)]
    pub audience: RenderAudience,
}

/// GET /api/v1/sites/{id}/widgets
pub async fn list_site_widgets(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let widgets = SiteWidgetStore::list_for_site(&state.pool, site_id).await?;
    Ok(Json(widgets))
}

/// POST /api/v1/sites/{id}/widgets
///
/// Place a catalog widget at the end of a position.
pub async fn create_site_widget(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<CreateSiteWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = SiteWidgetStore::create(&state.pool, site_id, &input).await?;

    tracing::info!(
        site_id,
        instance_id = widget.id,
        widget_slug = %widget.widget_slug,
        position_slug = %widget.position_slug,
        order = widget.display_order,
        "Site widget created",
    );

    Ok((StatusCode::CREATED, Json(widget)))
}

/// POST /api/v1/sites/{id}/widgets/{instance_id}/move
pub async fn move_site_widget(
    State(state): State<AppState>,
    Path((site_id, instance_id)): Path<(DbId, DbId)>,
    Json(input): Json<MoveSiteWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = SiteWidgetStore::move_instance(&state.pool, site_id, instance_id, &input).await?;

    tracing::info!(
        site_id,
        instance_id,
        position_slug = %widget.position_slug,
        requested_order = input.order,
        order = widget.display_order,
        "Site widget moved",
    );

    Ok(Json(widget))
}

/// PATCH /api/v1/sites/{id}/widgets/{instance_id}
///
/// Partially update config and flags. Never changes position or order.
pub async fn update_site_widget(
    State(state): State<AppState>,
    Path((site_id, instance_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSiteWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = SiteWidgetStore::update(&state.pool, site_id, instance_id, &input).await?;

    tracing::info!(
        site_id,
        instance_id,
        config_changed = input.config.is_some(),
        is_visible = widget.is_visible,
        is_active = widget.is_active,
        "Site widget updated",
    );

    Ok(Json(widget))
}

/// DELETE /api/v1/sites/{id}/widgets/{instance_id}
pub async fn delete_site_widget(
    State(state): State<AppState>,
    Path((site_id, instance_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    SiteWidgetStore::delete(&state.pool, site_id, instance_id).await?;
    tracing::info!(site_id, instance_id, "Site widget deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sites/{id}/widgets/grouped
///
/// Instances keyed by position slug, positions in registry order.
pub async fn list_grouped(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let groups = SiteWidgetStore::grouped(&state.pool, site_id).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// GET /api/v1/sites/{id}/widgets/rendered?audience=visitor|editor
pub async fn list_rendered(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Query(params): Query<RenderParams>,
) -> AppResult<impl IntoResponse> {
    let widgets = SiteWidgetStore::rendered(&state.pool, site_id, params.audience).await?;
    Ok(Json(DataResponse { data: widgets }))
}

/// GET /api/v1/sites/{id}/widgets/missing-required
pub async fn list_missing_required(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let positions = SiteWidgetStore::missing_required(&state.pool, site_id).await?;
    Ok(Json(DataResponse { data: positions }))
}
