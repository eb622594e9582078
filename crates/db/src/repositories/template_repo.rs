//! Repository for the `templates` table.

use edusite_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateTemplate, Template};

/// Column list for `templates` queries.
const COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides data access for site templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE slug = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
