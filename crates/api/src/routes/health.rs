use axum::extract::State;
use axum::{routing::get, Json, Router};
use edusite_db::repositories::WidgetDefinitionRepo;
use serde::Serialize;

use crate::state::AppState;

/// Health of the placement service.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is down or the catalog offers
    /// nothing to place.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Widget definitions in the catalog, inactive ones included.
    pub catalog_widgets: i64,
    /// Definitions editors can currently place.
    pub placeable_widgets: i64,
}

/// GET /health -- database reachability and catalog readiness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = edusite_db::health_check(&state.pool).await.is_ok();
    let (catalog_widgets, placeable_widgets) = if db_healthy {
        WidgetDefinitionRepo::count(&state.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Widget catalog count failed");
                (0, 0)
            })
    } else {
        (0, 0)
    };

    let status = if db_healthy && placeable_widgets > 0 {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        catalog_widgets,
        placeable_widgets,
    })
}

/// Mount health check routes (root level, outside `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
