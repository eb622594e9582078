//! Per-site layout preference model.

use edusite_core::layout::SidebarPosition;
use edusite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `site_layout_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteLayoutPreference {
    pub site_id: DbId,
    pub sidebar_position: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Layout preference as returned to clients, defaulted when never saved.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPreferenceView {
    pub site_id: DbId,
    pub sidebar_position: SidebarPosition,
}

/// DTO for saving the layout preference.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveLayoutPreference {
    pub sidebar_position: SidebarPosition,
}
