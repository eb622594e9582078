//! Handlers for per-template widget positions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use edusite_core::error::{CoreError, PlacementError};
use edusite_core::types::DbId;
use edusite_core::widget_position;
use edusite_db::models::template::Template;
use edusite_db::models::widget_position::CreateWidgetPosition;
use edusite_db::repositories::{TemplateRepo, WidgetPositionRepo};

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Verify that a template exists, returning the full row.
async fn ensure_template_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Template> {
    TemplateRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        })
    })
}

/// GET /api/v1/templates/{id}/widget-positions
///
/// List the active positions of a template in registry order.
pub async fn list_positions(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_template_exists(&state.pool, template_id).await?;
    let positions = WidgetPositionRepo::list_for_template(&state.pool, template_id, false).await?;
    Ok(Json(SuccessResponse::ok(positions)))
}

/// POST /api/v1/templates/{id}/widget-positions
///
/// Administrative path for adding a position to a template. A slug already
/// used by the template is rejected with `DUPLICATE_POSITION`.
pub async fn create_position(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Json(input): Json<CreateWidgetPosition>,
) -> AppResult<impl IntoResponse> {
    widget_position::validate_slug(&input.slug)?;
    widget_position::validate_area(&input.area)?;
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Position name must not be empty".into()));
    }
    ensure_template_exists(&state.pool, template_id).await?;

    if WidgetPositionRepo::find(&state.pool, template_id, &input.slug)
        .await?
        .is_some()
    {
        return Err(PlacementError::DuplicatePosition {
            template_id,
            slug: input.slug,
        }
        .into());
    }

    let position = WidgetPositionRepo::create(&state.pool, template_id, &input).await?;

    tracing::info!(
        template_id,
        position_id = position.id,
        slug = %position.slug,
        "Widget position created",
    );

    Ok((StatusCode::CREATED, Json(SuccessResponse::ok(position))))
}
