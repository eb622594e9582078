//! Read-only catalog and position registry handed to the editor.
//!
//! Loaded once per editing session and injected into [`PlacementEditor`]
//! as a value.
//!
//! [`PlacementEditor`]: crate::PlacementEditor

use edusite_core::widget_catalog::CatalogItem;
use edusite_core::widget_position::{sort_positions, PositionSlot};
use serde::Deserialize;

/// A widget definition as offered in the editor's palette.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WidgetSummary {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: String,
    #[serde(default)]
    pub allowed_site_types: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CatalogItem for WidgetSummary {
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

/// A template position, used as a drop target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionSummary {
    pub slug: String,
    pub name: String,
    pub area: String,
    #[serde(rename = "order")]
    pub display_order: i32,
    #[serde(default)]
    pub allowed_widgets: Vec<String>,
    pub is_required: bool,
    pub is_active: bool,
}

impl PositionSlot for PositionSummary {
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

/// Widgets available to the site and the positions of its template.
#[derive(Debug, Clone, Default)]
pub struct EditorCatalog {
    widgets: Vec<WidgetSummary>,
    positions: Vec<PositionSummary>,
}

impl EditorCatalog {
    pub fn new(widgets: Vec<WidgetSummary>, mut positions: Vec<PositionSummary>) -> Self {
        sort_positions(&mut positions);
        Self { widgets, positions }
    }

    pub fn widgets(&self) -> &[WidgetSummary] {
        &self.widgets
    }

    /// Positions in registry order.
    pub fn positions(&self) -> &[PositionSummary] {
        &self.positions
    }

    pub fn widget(&self, slug: &str) -> Option<&WidgetSummary> {
        self.widgets.iter().find(|w| w.slug == slug)
    }

    pub fn position(&self, slug: &str) -> Option<&PositionSummary> {
        self.positions.iter().find(|p| p.slug == slug)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_positions_sorted_into_registry_order() {
        let slugs: Vec<_> = classic().positions().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(slugs, ["hero", "content", "sidebar"]);
    }

    #[test]
    fn test_lookup() {
        let catalog = classic();
        assert!(catalog.widget("text").is_some());
        assert!(catalog.widget("carousel").is_none());
        assert_eq!(catalog.position("sidebar").unwrap().allowed_widgets.len(), 2);
    }

    #[test]
    fn test_position_decodes_wire_order() {
        let position: PositionSummary = serde_json::from_value(json!({
            "id": 4,
            "template_id": 1,
            "slug": "sidebar",
            "name": "Sidebar",
            "description": null,
            "area": "sidebar",
            "order": 4,
            "allowed_widgets": ["text"],
            "is_required": false,
            "is_active": true
        }))
        .unwrap();
        assert_eq!(position.display_order, 4);
    }
}
