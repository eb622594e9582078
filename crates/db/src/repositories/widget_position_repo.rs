//! Repository for the `widget_positions` table.

use edusite_core::types::DbId;
use sqlx::PgPool;

use crate::models::widget_position::{CreateWidgetPosition, WidgetPosition};

/// Column list for `widget_positions` queries.
const COLUMNS: &str = "id, template_id, slug, name, description, area, display_order, \
    allowed_widgets, is_required, is_active, created_at, updated_at";

/// Provides data access for per-template widget positions.
pub struct WidgetPositionRepo;

impl WidgetPositionRepo {
    /// Insert a new position.
    ///
    /// A duplicate `(template_id, slug)` fails on
    /// `uq_widget_positions_template_slug`.
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        input: &CreateWidgetPosition,
    ) -> Result<WidgetPosition, sqlx::Error> {
        let query = format!(
            "INSERT INTO widget_positions \
                (template_id, slug, name, description, area, display_order, \
                 allowed_widgets, is_required, is_active) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7, \
                     COALESCE($8, false), COALESCE($9, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WidgetPosition>(&query)
            .bind(template_id)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.area)
            .bind(input.display_order)
            .bind(&input.allowed_widgets)
            .bind(input.is_required)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// List positions of a template ordered by `order`, ties broken by slug.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<WidgetPosition>, sqlx::Error> {
        let query = if include_inactive {
            format!(
                "SELECT {COLUMNS} FROM widget_positions \
                 WHERE template_id = $1 \
                 ORDER BY display_order, slug"
            )
        } else {
            format!(
                "SELECT {COLUMNS} FROM widget_positions \
                 WHERE template_id = $1 AND is_active = true \
                 ORDER BY display_order, slug"
            )
        };
        sqlx::query_as::<_, WidgetPosition>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Find a position by template and slug.
    pub async fn find(
        pool: &PgPool,
        template_id: DbId,
        slug: &str,
    ) -> Result<Option<WidgetPosition>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM widget_positions WHERE template_id = $1 AND slug = $2"
        );
        sqlx::query_as::<_, WidgetPosition>(&query)
            .bind(template_id)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
