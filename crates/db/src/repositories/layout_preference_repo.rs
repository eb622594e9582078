//! Repository for the `site_layout_preferences` table.

use edusite_core::layout::SidebarPosition;
use edusite_core::types::DbId;
use sqlx::PgPool;

use crate::models::layout_preference::SiteLayoutPreference;

/// Column list for `site_layout_preferences` queries.
const COLUMNS: &str = "site_id, sidebar_position, created_at, updated_at";

/// Provides data access for the per-site layout singleton.
pub struct LayoutPreferenceRepo;

impl LayoutPreferenceRepo {
    /// Find the stored preference for a site.
    pub async fn find(
        pool: &PgPool,
        site_id: DbId,
    ) -> Result<Option<SiteLayoutPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_layout_preferences WHERE site_id = $1");
        sqlx::query_as::<_, SiteLayoutPreference>(&query)
            .bind(site_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the preference for a site.
    pub async fn upsert(
        pool: &PgPool,
        site_id: DbId,
        sidebar_position: SidebarPosition,
    ) -> Result<SiteLayoutPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_layout_preferences (site_id, sidebar_position) \
             VALUES ($1, $2) \
             ON CONFLICT (site_id) DO UPDATE SET sidebar_position = EXCLUDED.sidebar_position \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteLayoutPreference>(&query)
            .bind(site_id)
            .bind(sidebar_position.as_str())
            .fetch_one(pool)
            .await
    }
}
