//! Repository for the `widget_definitions` table (the widget catalog).

use edusite_core::widget_catalog;
use sqlx::PgPool;

use crate::models::widget_definition::WidgetDefinition;

/// Column list for `widget_definitions` queries.
const COLUMNS: &str = "id, slug, name, description, icon, category, allowed_site_types, \
    fields_config, settings_config, is_active, sort_order, created_at, updated_at";

/// Read-only access to the widget catalog.
pub struct WidgetDefinitionRepo;

impl WidgetDefinitionRepo {
    /// Count catalog definitions as `(total, active)`.
    pub async fn count(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM widget_definitions",
        )
        .fetch_one(pool)
        .await
    }

    /// List active definitions usable on `site_type` (all site types when
    /// `None`), ordered by `sort_order` then `name`.
    pub async fn list_active(
        pool: &PgPool,
        site_type: Option<&str>,
    ) -> Result<Vec<WidgetDefinition>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM widget_definitions \
             WHERE is_active = true \
             ORDER BY sort_order, name"
        );
        let rows = sqlx::query_as::<_, WidgetDefinition>(&query)
            .fetch_all(pool)
            .await?;
        Ok(widget_catalog::list_active(rows, site_type))
    }

    /// Find a definition by slug, active or not.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<WidgetDefinition>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM widget_definitions WHERE slug = $1");
        sqlx::query_as::<_, WidgetDefinition>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
