//! Widget catalog model.
//!
//! Definitions are seeded by migrations and read-only at runtime. The slug
//! is the stable identity referenced by site widget instances.

use edusite_core::types::{DbId, Timestamp};
use edusite_core::widget_catalog::CatalogItem;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `widget_definitions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WidgetDefinition {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: String,
    /// Empty means available on every site type.
    pub allowed_site_types: Vec<String>,
    /// Schema of the editable instance fields (type, label, default, limits).
    pub fields_config: serde_json::Value,
    pub settings_config: serde_json::Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CatalogItem for WidgetDefinition {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn allowed_site_types(&self) -> &[String] {
        &self.allowed_site_types
    }
}
