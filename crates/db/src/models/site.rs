//! Site model.
//!
//! Sites are owned by the site aggregate. This subsystem reads a site's
//! type and template to validate placements; creation exists for fixtures
//! and provisioning tooling.

use edusite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: DbId,
    pub name: String,
    pub site_type: String,
    pub template_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a site.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSite {
    pub name: String,
    pub site_type: String,
    pub template_id: DbId,
}
