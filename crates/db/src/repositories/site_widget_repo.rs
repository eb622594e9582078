//! Repository for the `site_widgets` table.
//!
//! Every mutation that touches orders (`create`, `move_to`, `delete`) runs in
//! one transaction that first locks the owning site row, so placement writes
//! for a site are serialized and a renumbering is committed whole or not at
//! all. The `(site_id, position_slug, display_order)` unique constraint is
//! deferred to commit time.

use edusite_core::placement::{self, OrderAssignment};
use edusite_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::site_widget::SiteWidget;

/// Column list for `site_widgets` queries.
const COLUMNS: &str = "id, site_id, widget_slug, position_slug, display_order, config, \
    is_active, is_visible, created_at, updated_at";

/// Provides data access for site widget instances.
pub struct SiteWidgetRepo;

impl SiteWidgetRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// List every instance of a site, grouped by position and in render order.
    pub async fn list_for_site(pool: &PgPool, site_id: DbId) -> Result<Vec<SiteWidget>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM site_widgets \
             WHERE site_id = $1 \
             ORDER BY position_slug, display_order, created_at, id"
        );
        sqlx::query_as::<_, SiteWidget>(&query)
            .bind(site_id)
            .fetch_all(pool)
            .await
    }

    /// Find an instance by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SiteWidget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_widgets WHERE id = $1");
        sqlx::query_as::<_, SiteWidget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instance by ID, only if it belongs to `site_id`.
    pub async fn find_for_site(
        pool: &PgPool,
        site_id: DbId,
        id: DbId,
    ) -> Result<Option<SiteWidget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_widgets WHERE id = $1 AND site_id = $2");
        sqlx::query_as::<_, SiteWidget>(&query)
            .bind(id)
            .bind(site_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Order-changing mutations
    // -----------------------------------------------------------------------

    /// Append a new instance to the end of a position.
    ///
    /// The order is `max(existing) + 1`, or 1 for an empty position. The
    /// caller has already validated the placement and the config.
    pub async fn create(
        pool: &PgPool,
        site_id: DbId,
        widget_slug: &str,
        position_slug: &str,
        config: &serde_json::Value,
    ) -> Result<SiteWidget, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_site(&mut tx, site_id).await?;

        let orders: Vec<i32> = sqlx::query_scalar(
            "SELECT display_order FROM site_widgets \
             WHERE site_id = $1 AND position_slug = $2",
        )
        .bind(site_id)
        .bind(position_slug)
        .fetch_all(&mut *tx)
        .await?;
        let order = placement::next_order(orders);

        let query = format!(
            "INSERT INTO site_widgets (site_id, widget_slug, position_slug, display_order, config) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let widget = sqlx::query_as::<_, SiteWidget>(&query)
            .bind(site_id)
            .bind(widget_slug)
            .bind(position_slug)
            .bind(order)
            .bind(config)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(widget)
    }

    /// Move an instance to `target_order` within `target_position`.
    ///
    /// Source and destination positions are renumbered densely from 1 in the
    /// same transaction. Returns `None` if the instance does not belong to
    /// the site.
    pub async fn move_to(
        pool: &PgPool,
        site_id: DbId,
        id: DbId,
        target_position: &str,
        target_order: i32,
    ) -> Result<Option<SiteWidget>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_site(&mut tx, site_id).await?;

        let source_position: Option<String> = sqlx::query_scalar(
            "SELECT position_slug FROM site_widgets WHERE id = $1 AND site_id = $2",
        )
        .bind(id)
        .bind(site_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(source_position) = source_position else {
            return Ok(None);
        };

        let affected = vec![source_position, target_position.to_string()];
        let query = format!(
            "SELECT {COLUMNS} FROM site_widgets \
             WHERE site_id = $1 AND position_slug = ANY($2) \
             FOR UPDATE"
        );
        let rows = sqlx::query_as::<_, SiteWidget>(&query)
            .bind(site_id)
            .bind(&affected)
            .fetch_all(&mut *tx)
            .await?;

        let Ok(plan) = placement::plan_move(&rows, id, target_position, target_order) else {
            return Ok(None);
        };
        Self::apply(&mut tx, &plan.assignments).await?;

        tracing::debug!(
            site_id,
            instance_id = id,
            target_position,
            final_order = plan.final_order,
            changed = plan.assignments.len(),
            "Applied move plan",
        );

        let query = format!("SELECT {COLUMNS} FROM site_widgets WHERE id = $1");
        let widget = sqlx::query_as::<_, SiteWidget>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(widget))
    }

    /// Delete an instance and close the gap in its former position.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, site_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_site(&mut tx, site_id).await?;

        let query = format!(
            "SELECT {COLUMNS} FROM site_widgets \
             WHERE site_id = $1 AND position_slug = \
                (SELECT position_slug FROM site_widgets WHERE id = $2 AND site_id = $1) \
             FOR UPDATE"
        );
        let rows = sqlx::query_as::<_, SiteWidget>(&query)
            .bind(site_id)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let Ok(plan) = placement::plan_removal(&rows, id) else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM site_widgets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::apply(&mut tx, &plan).await?;

        tx.commit().await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Order-preserving mutations
    // -----------------------------------------------------------------------

    /// Partially update config and visibility flags.
    ///
    /// Uses `COALESCE` so only provided fields are changed. Never touches
    /// `position_slug` or `display_order`.
    pub async fn update(
        pool: &PgPool,
        site_id: DbId,
        id: DbId,
        config: Option<&serde_json::Value>,
        is_visible: Option<bool>,
        is_active: Option<bool>,
    ) -> Result<Option<SiteWidget>, sqlx::Error> {
        let query = format!(
            "UPDATE site_widgets SET \
                 config     = COALESCE($3, config), \
                 is_visible = COALESCE($4, is_visible), \
                 is_active  = COALESCE($5, is_active) \
             WHERE id = $1 AND site_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteWidget>(&query)
            .bind(id)
            .bind(site_id)
            .bind(config)
            .bind(is_visible)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Take a row lock on the site, serializing placement writes per site.
    async fn lock_site(tx: &mut Transaction<'_, Postgres>, site_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT id FROM sites WHERE id = $1 FOR UPDATE")
            .bind(site_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(())
    }

    /// Write a placement plan within an existing transaction.
    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        assignments: &[OrderAssignment],
    ) -> Result<(), sqlx::Error> {
        for assignment in assignments {
            sqlx::query(
                "UPDATE site_widgets SET position_slug = $2, display_order = $3 WHERE id = $1",
            )
            .bind(assignment.id)
            .bind(&assignment.position_slug)
            .bind(assignment.order)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
