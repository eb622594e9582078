//! HTTP-level integration tests for the widget catalog, template positions
//! and the layout preference.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_site, get, post_json};
use edusite_db::repositories::TemplateRepo;
use serde_json::json;
use sqlx::PgPool;

async fn classic_id(pool: &PgPool) -> i64 {
    TemplateRepo::find_by_slug(pool, "classic")
        .await
        .unwrap()
        .expect("classic is seeded")
        .id
}

fn slugs(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|d| d["slug"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_catalog_filters_by_site_type(pool: PgPool) {
    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/widgets").await).await;
    let all = slugs(&json);
    assert_eq!(all[0], "hero");
    assert!(!all.contains(&"legacy_slider".to_string()));

    let json = body_json(
        get(build_test_app(pool.clone()), "/api/v1/widgets?site_type=main").await,
    )
    .await;
    assert!(!slugs(&json).contains(&"top_donors".to_string()));

    let json = body_json(
        get(
            build_test_app(pool.clone()),
            "/api/v1/widgets?site_type=organization",
        )
        .await,
    )
    .await;
    assert!(slugs(&json).contains(&"top_donors".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_site_type_is_not_an_error(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/widgets?site_type=spaceship").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!slugs(&json).contains(&"donations_list".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_widget_by_slug(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/api/v1/widgets/hero").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["slug"], "hero");

    let response = get(build_test_app(pool), "/api/v1/widgets/carousel").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "UNKNOWN_WIDGET");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_available_widgets_use_site_type(pool: PgPool) {
    let site = create_site(&pool, "classic", "organization").await;
    let json = body_json(
        get(
            build_test_app(pool),
            &format!("/api/v1/sites/{site}/available-widgets"),
        )
        .await,
    )
    .await;
    assert!(slugs(&json).contains(&"top_donors".to_string()));
}

// ---------------------------------------------------------------------------
// Test: positions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_positions_envelope_and_order(pool: PgPool) {
    let template = classic_id(&pool).await;
    let response = get(
        build_test_app(pool),
        &format!("/api/v1/templates/{template}/widget-positions"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(
        slugs(&json),
        ["header", "hero", "content", "sidebar", "footer"]
    );
    assert_eq!(json["data"][0]["order"], 1);
    assert!(json["data"][3]["allowed_widgets"].as_array().unwrap().len() > 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_position_and_duplicate(pool: PgPool) {
    let template = classic_id(&pool).await;
    let uri = format!("/api/v1/templates/{template}/widget-positions");
    let body = json!({
        "slug": "banner",
        "name": "Banner",
        "area": "header",
        "order": 6,
        "allowed_widgets": ["hero"]
    });

    let response = post_json(build_test_app(pool.clone()), &uri, body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["slug"], "banner");
    assert_eq!(json["data"]["order"], 6);

    let response = post_json(build_test_app(pool.clone()), &uri, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_POSITION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_position_validates_slug_and_area(pool: PgPool) {
    let template = classic_id(&pool).await;
    let uri = format!("/api/v1/templates/{template}/widget-positions");

    let response = post_json(
        build_test_app(pool.clone()),
        &uri,
        json!({ "slug": "Side-Bar", "name": "x", "area": "sidebar" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        build_test_app(pool),
        &uri,
        json!({ "slug": "cellar", "name": "Cellar", "area": "basement" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: layout preference
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_defaults_then_saves(pool: PgPool) {
    let site = create_site(&pool, "classic", "alumni").await;
    let uri = format!("/api/v1/sites/{site}/layout");

    let json = body_json(get(build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["sidebar_position"], "right");

    let response = post_json(
        build_test_app(pool.clone()),
        &uri,
        json!({ "sidebar_position": "left" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["sidebar_position"], "left");

    let json = body_json(get(build_test_app(pool), &uri).await).await;
    assert_eq!(json["data"]["sidebar_position"], "left");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_rejects_unknown_side(pool: PgPool) {
    let site = create_site(&pool, "classic", "main").await;
    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/sites/{site}/layout"),
        json!({ "sidebar_position": "middle" }),
    )
    .await;
    assert!(response.status().is_client_error());
}
