//! Handlers for the per-site layout preference.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use edusite_core::layout::SidebarPosition;
use edusite_core::types::DbId;
use edusite_db::models::layout_preference::{LayoutPreferenceView, SaveLayoutPreference};
use edusite_db::repositories::LayoutPreferenceRepo;

use crate::error::AppResult;
use crate::response::SuccessResponse;
use crate::state::AppState;
use crate::store::SiteWidgetStore;

/// GET /api/v1/sites/{id}/layout
///
/// Stored preference, or the default (`right`) if never saved.
pub async fn get_layout(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = SiteWidgetStore::site(&state.pool, site_id).await?;
    let sidebar_position = match LayoutPreferenceRepo::find(&state.pool, site.id).await? {
        Some(stored) => stored.sidebar_position.parse::<SidebarPosition>()?,
        None => SidebarPosition::default(),
    };

    Ok(Json(SuccessResponse::ok(LayoutPreferenceView {
        site_id: site.id,
        sidebar_position,
    })))
}

/// POST /api/v1/sites/{id}/layout
pub async fn save_layout(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<SaveLayoutPreference>,
) -> AppResult<impl IntoResponse> {
    let site = SiteWidgetStore::site(&state.pool, site_id).await?;
    LayoutPreferenceRepo::upsert(&state.pool, site.id, input.sidebar_position).await?;

    tracing::info!(
        site_id,
        sidebar_position = %input.sidebar_position,
        "Layout preference saved",
    );

    Ok(Json(SuccessResponse::ok(LayoutPreferenceView {
        site_id: site.id,
        sidebar_position: input.sidebar_position,
    })))
}
