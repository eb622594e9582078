//! Widget position model and DTOs.
//!
//! Positions are named slots scoped to a template. `(template_id, slug)` is
//! unique. On the wire the display order is called `order`.

use edusite_core::placement::RequiredSlot;
use edusite_core::types::{DbId, Timestamp};
use edusite_core::widget_position::PositionSlot;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `widget_positions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WidgetPosition {
    pub id: DbId,
    pub template_id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub area: String,
    #[serde(rename = "order")]
    pub display_order: i32,
    /// Empty means any widget may be placed here.
    pub allowed_widgets: Vec<String>,
    pub is_required: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PositionSlot for WidgetPosition {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn allowed_widgets(&self) -> &[String] {
        &self.allowed_widgets
    }
}

impl RequiredSlot for WidgetPosition {
    fn is_required(&self) -> bool {
        self.is_required
    }
}

/// DTO for creating a widget position on a template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWidgetPosition {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub area: String,
    #[serde(rename = "order")]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub allowed_widgets: Vec<String>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
}
