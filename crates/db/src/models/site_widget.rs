//! Site widget instance model and DTOs.
//!
//! An instance places one catalog widget into one position of one site.
//! `display_order` (wire name `order`) is dense per position, starting at 1.

use edusite_core::placement::Placed;
use edusite_core::render::Renderable;
use edusite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `site_widgets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteWidget {
    pub id: DbId,
    pub site_id: DbId,
    pub widget_slug: String,
    pub position_slug: String,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub is_visible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Placed for SiteWidget {
    fn id(&self) -> DbId {
        self.id
    }

    fn position_slug(&self) -> &str {
        &self.position_slug
    }

    fn order(&self) -> i32 {
        self.display_order
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Renderable for SiteWidget {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }
}

/// An instance as rendered for an audience.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSiteWidget {
    #[serde(flatten)]
    pub widget: SiteWidget,
    /// `true` when editors see a placeholder instead of the widget.
    pub placeholder: bool,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for placing a catalog widget into a position.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSiteWidget {
    pub widget_slug: String,
    pub position_slug: String,
    pub config: Option<serde_json::Value>,
}

/// DTO for moving an instance to a position and 1-based slot.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveSiteWidget {
    pub position_slug: String,
    pub order: i32,
}

/// DTO for partially updating an instance.
///
/// `config` is shallow-merged into the stored config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSiteWidget {
    pub config: Option<serde_json::Value>,
    pub is_visible: Option<bool>,
    pub is_active: Option<bool>,
}
