//! Integration tests for the widget catalog, template positions and layout
//! preferences.

use edusite_core::layout::SidebarPosition;
use edusite_db::models::template::CreateTemplate;
use edusite_db::models::widget_position::CreateWidgetPosition;
use edusite_db::repositories::{
    LayoutPreferenceRepo, SiteRepo, TemplateRepo, WidgetDefinitionRepo, WidgetPositionRepo,
};
use sqlx::PgPool;

fn new_position(slug: &str, order: i32) -> CreateWidgetPosition {
    CreateWidgetPosition {
        slug: slug.to_string(),
        name: slug.to_string(),
        description: None,
        area: "content".to_string(),
        display_order: Some(order),
        allowed_widgets: vec![],
        is_required: None,
        is_active: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bootstrap(pool: PgPool) {
    edusite_db::health_check(&pool).await.unwrap();

    for table in ["templates", "widget_definitions", "widget_positions"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }
}

// ---------------------------------------------------------------------------
// Test: catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_hides_inactive_and_sorts(pool: PgPool) {
    let (total, active_count) = WidgetDefinitionRepo::count(&pool).await.unwrap();
    assert_eq!(total, active_count + 1, "legacy_slider is seeded inactive");

    let active = WidgetDefinitionRepo::list_active(&pool, None).await.unwrap();
    assert_eq!(active.len() as i64, active_count);
    assert!(active.iter().all(|d| d.is_active));
    assert!(!active.iter().any(|d| d.slug == "legacy_slider"));
    assert!(active.windows(2).all(|w| w[0].sort_order <= w[1].sort_order));
    assert_eq!(active[0].slug, "hero");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_filters_by_site_type(pool: PgPool) {
    let main = WidgetDefinitionRepo::list_active(&pool, Some("main")).await.unwrap();
    assert!(!main.iter().any(|d| d.slug == "top_donors"));
    assert!(!main.iter().any(|d| d.slug == "donations_list"));
    assert!(main.iter().any(|d| d.slug == "text"));

    let org = WidgetDefinitionRepo::list_active(&pool, Some("organization"))
        .await
        .unwrap();
    assert!(org.iter().any(|d| d.slug == "top_donors"));
    assert!(org.iter().any(|d| d.slug == "donations_list"));

    let unknown = WidgetDefinitionRepo::list_active(&pool, Some("spaceship"))
        .await
        .unwrap();
    assert!(unknown.iter().all(|d| d.allowed_site_types.is_empty()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_definition_by_slug(pool: PgPool) {
    let hero = WidgetDefinitionRepo::find_by_slug(&pool, "hero")
        .await
        .unwrap()
        .expect("hero is seeded");
    assert!(hero.fields_config.get("title").is_some());

    let missing = WidgetDefinitionRepo::find_by_slug(&pool, "nope").await.unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: positions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seeded_positions_in_registry_order(pool: PgPool) {
    let template = TemplateRepo::find_by_slug(&pool, "classic")
        .await
        .unwrap()
        .expect("classic is seeded");
    let positions = WidgetPositionRepo::list_for_template(&pool, template.id, false)
        .await
        .unwrap();
    let slugs: Vec<_> = positions.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["header", "hero", "content", "sidebar", "footer"]);

    let content = WidgetPositionRepo::find(&pool, template.id, "content")
        .await
        .unwrap()
        .expect("content exists");
    assert!(content.is_required);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_position_defaults_and_inactive_filter(pool: PgPool) {
    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Bare".to_string(),
            slug: "bare".to_string(),
        },
    )
    .await
    .unwrap();

    let main = WidgetPositionRepo::create(&pool, template.id, &new_position("main", 1))
        .await
        .unwrap();
    assert!(main.is_active);
    assert!(!main.is_required);
    assert!(main.allowed_widgets.is_empty());

    let mut hidden = new_position("hidden", 2);
    hidden.is_active = Some(false);
    WidgetPositionRepo::create(&pool, template.id, &hidden)
        .await
        .unwrap();

    let active = WidgetPositionRepo::list_for_template(&pool, template.id, false)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    let all = WidgetPositionRepo::list_for_template(&pool, template.id, true)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_position_slug_is_unique_violation(pool: PgPool) {
    let template = TemplateRepo::find_by_slug(&pool, "classic")
        .await
        .unwrap()
        .expect("classic is seeded");

    let err = WidgetPositionRepo::create(&pool, template.id, &new_position("hero", 9))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_widget_positions_template_slug"));

    // Same slug on another template is fine.
    let other = TemplateRepo::find_by_slug(&pool, "campaign_landing")
        .await
        .unwrap()
        .expect("campaign_landing is seeded");
    assert!(
        WidgetPositionRepo::create(&pool, other.id, &new_position("sidebar", 9))
            .await
            .is_ok()
    );
}

// ---------------------------------------------------------------------------
// Test: layout preference
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_preference_upsert(pool: PgPool) {
    let template = TemplateRepo::find_by_slug(&pool, "classic")
        .await
        .unwrap()
        .expect("classic is seeded");
    let site = SiteRepo::create(
        &pool,
        &edusite_db::models::site::CreateSite {
            name: "Chess Club".to_string(),
            site_type: "organization".to_string(),
            template_id: template.id,
        },
    )
    .await
    .unwrap();

    assert!(LayoutPreferenceRepo::find(&pool, site.id).await.unwrap().is_none());

    let saved = LayoutPreferenceRepo::upsert(&pool, site.id, SidebarPosition::Left)
        .await
        .unwrap();
    assert_eq!(saved.sidebar_position, "left");

    let saved = LayoutPreferenceRepo::upsert(&pool, site.id, SidebarPosition::Right)
        .await
        .unwrap();
    assert_eq!(saved.sidebar_position, "right");

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM site_layout_preferences WHERE site_id = $1")
            .bind(site.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 1);
}
