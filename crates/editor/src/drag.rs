//! Drag-and-drop protocol.
//!
//! A drag carries either a catalog entry (drop creates an instance) or a
//! placed instance (drop moves it). Drop targets report eligibility from the
//! position's allow-list. Eligibility only styles the target; a discouraged
//! drop is still sent and the server decides.

use edusite_core::types::DbId;
use edusite_core::widget_position::{allows_widget, PositionSlot};

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Catalog { widget_slug: String },
    Instance { instance_id: DbId },
}

impl DragPayload {
    /// Slug of the widget being dragged, if it can be resolved locally.
    pub fn widget_slug<'a>(&'a self, snapshot: &'a Snapshot) -> Option<&'a str> {
        match self {
            Self::Catalog { widget_slug } => Some(widget_slug.as_str()),
            Self::Instance { instance_id } => snapshot
                .get(*instance_id)
                .map(|w| w.widget_slug.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Discouraged,
}

/// Hover feedback for dropping `widget_slug` onto `position`.
pub fn drop_eligibility(widget_slug: Option<&str>, position: &impl PositionSlot) -> Eligibility {
    match widget_slug {
        Some(slug) if position.is_active() && allows_widget(position, slug) => {
            Eligibility::Eligible
        }
        _ => Eligibility::Discouraged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::position;
    use crate::snapshot::fixtures::placed;

    #[test]
    fn test_allow_list() {
        let sidebar = position("sidebar", 3, &["text", "news"]);
        assert_eq!(drop_eligibility(Some("text"), &sidebar), Eligibility::Eligible);
        assert_eq!(drop_eligibility(Some("hero"), &sidebar), Eligibility::Discouraged);
    }

    #[test]
    fn test_empty_allow_list_accepts_anything() {
        let hero = position("hero", 1, &[]);
        assert_eq!(drop_eligibility(Some("news"), &hero), Eligibility::Eligible);
    }

    #[test]
    fn test_inactive_or_unresolved_is_discouraged() {
        let mut hero = position("hero", 1, &[]);
        assert_eq!(drop_eligibility(None, &hero), Eligibility::Discouraged);
        hero.is_active = false;
        assert_eq!(drop_eligibility(Some("text"), &hero), Eligibility::Discouraged);
    }

    #[test]
    fn test_instance_payload_resolves_through_snapshot() {
        let snapshot = Snapshot::new(vec![placed(5, "news", "content", 1)]);
        let payload = DragPayload::Instance { instance_id: 5 };
        assert_eq!(payload.widget_slug(&snapshot), Some("news"));
        let stale = DragPayload::Instance { instance_id: 6 };
        assert_eq!(stale.widget_slug(&snapshot), None);
    }
}
