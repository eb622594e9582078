//! Repository for the `sites` table.

use edusite_core::types::DbId;
use sqlx::PgPool;

use crate::models::site::{CreateSite, Site};

/// Column list for `sites` queries.
const COLUMNS: &str = "id, name, site_type, template_id, created_at, updated_at";

/// Provides read access to sites plus creation for provisioning.
pub struct SiteRepo;

impl SiteRepo {
    /// Insert a new site.
    pub async fn create(pool: &PgPool, input: &CreateSite) -> Result<Site, sqlx::Error> {
        let query = format!(
            "INSERT INTO sites (name, site_type, template_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(&input.name)
            .bind(&input.site_type)
            .bind(input.template_id)
            .fetch_one(pool)
            .await
    }

    /// Find a site by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
