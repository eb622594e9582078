//! Local view of a site's placed widgets.
//!
//! The editor mutates a [`Snapshot`] optimistically using the same planners
//! the server applies, so the local orders match what the store will commit.

use edusite_core::error::PlacementError;
use edusite_core::placement::{self, next_order, OrderAssignment, Placed};
use edusite_core::render::Renderable;
use edusite_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A placed widget as returned by the placement API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWidget {
    pub id: DbId,
    pub site_id: DbId,
    pub widget_slug: String,
    pub position_slug: String,
    pub order: i32,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub is_visible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Placed for PlacedWidget {
    fn id(&self) -> DbId {
        self.id
    }

    fn position_slug(&self) -> &str {
        &self.position_slug
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl Renderable for PlacedWidget {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }
}

/// Every placed widget of one site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    widgets: Vec<PlacedWidget>,
}

impl Snapshot {
    pub fn new(widgets: Vec<PlacedWidget>) -> Self {
        Self { widgets }
    }

    pub fn widgets(&self) -> &[PlacedWidget] {
        &self.widgets
    }

    pub fn get(&self, id: DbId) -> Option<&PlacedWidget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: DbId) -> Option<&mut PlacedWidget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Instances of one position in render order.
    pub fn in_position(&self, position_slug: &str) -> Vec<&PlacedWidget> {
        let mut seq: Vec<&PlacedWidget> = self
            .widgets
            .iter()
            .filter(|w| w.position_slug == position_slug)
            .collect();
        seq.sort_by(|a, b| placement::render_order(*a, *b));
        seq
    }

    /// Order a widget appended to `position_slug` would receive.
    pub fn next_order(&self, position_slug: &str) -> i32 {
        next_order(
            self.widgets
                .iter()
                .filter(|w| w.position_slug == position_slug)
                .map(|w| w.order),
        )
    }

    /// Append `widget` at the end of its position.
    pub fn append(&mut self, mut widget: PlacedWidget) {
        widget.order = self.next_order(&widget.position_slug);
        self.widgets.push(widget);
    }

    /// Move an instance, renumbering source and target. Returns the final
    /// (clamped) order.
    pub fn apply_move(
        &mut self,
        id: DbId,
        position_slug: &str,
        order: i32,
    ) -> Result<i32, PlacementError> {
        let plan = placement::plan_move(&self.widgets, id, position_slug, order)?;
        self.apply(&plan.assignments);
        Ok(plan.final_order)
    }

    /// Remove an instance and close the gap it leaves.
    pub fn remove(&mut self, id: DbId) -> Result<PlacedWidget, PlacementError> {
        let assignments = placement::plan_removal(&self.widgets, id)?;
        let idx = self
            .widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or(PlacementError::InstanceNotFound { id })?;
        let removed = self.widgets.remove(idx);
        self.apply(&assignments);
        Ok(removed)
    }

    /// Replace the instance with id `id` by `widget`, which may carry a new id.
    pub fn replace(&mut self, id: DbId, widget: PlacedWidget) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                *slot = widget;
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, assignments: &[OrderAssignment]) {
        for a in assignments {
            if let Some(w) = self.get_mut(a.id) {
                w.position_slug.clone_from(&a.position_slug);
                w.order = a.order;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    pub fn placed(id: DbId, widget: &str, position: &str, order: i32) -> PlacedWidget {
        let at = Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap();
        PlacedWidget {
            id,
            site_id: 7,
            widget_slug: widget.to_string(),
            position_slug: position.to_string(),
            order,
            config: json!({}),
            is_active: true,
            is_visible: true,
            created_at: at,
            updated_at: at,
        }
    }
}
