//! Placement rules for site widget instances.
//!
//! Orders inside one position always form the dense sequence `1..=n`.
//! The planners here compute which rows must change to keep that true after
//! a create, move or delete; the repository applies a plan inside a single
//! transaction so a partial renumbering is never committed.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::error::PlacementError;
use crate::types::{DbId, Timestamp};
use crate::widget_catalog::{permits_site_type, CatalogItem};
use crate::widget_position::{allows_widget, PositionSlot};

/// Read access to the placement fields of a site widget instance.
pub trait Placed {
    fn id(&self) -> DbId;
    fn position_slug(&self) -> &str;
    fn order(&self) -> i32;
    fn created_at(&self) -> Timestamp;
}

/// A single row update produced by a placement plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAssignment {
    pub id: DbId,
    pub position_slug: String,
    pub order: i32,
}

/// Outcome of [`plan_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Rows whose position or order changes, the moved instance included.
    pub assignments: Vec<OrderAssignment>,
    /// Order the moved instance ends up with after clamping.
    pub final_order: i32,
}

impl MovePlan {
    pub fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that `widget` may occupy `position` on a site of `site_type`.
///
/// Checks run in this order: position allow-list, widget active flag,
/// widget site-type restriction.
pub fn check_placement(
    widget: &impl CatalogItem,
    position: &impl PositionSlot,
    site_type: &str,
) -> Result<(), PlacementError> {
    if !position.is_active() || !allows_widget(position, widget.slug()) {
        return Err(PlacementError::PositionNotAllowed {
            widget: widget.slug().to_string(),
            position: position.slug().to_string(),
        });
    }
    if !widget.is_active() {
        return Err(PlacementError::WidgetNotAllowed {
            widget: widget.slug().to_string(),
            reason: "widget is inactive".to_string(),
        });
    }
    if !permits_site_type(widget, site_type) {
        return Err(PlacementError::WidgetNotAllowed {
            widget: widget.slug().to_string(),
            reason: format!("not available for site type '{site_type}'"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Render order inside a position: `order`, then creation time, then id.
pub fn render_order(a: &impl Placed, b: &impl Placed) -> Ordering {
    a.order()
        .cmp(&b.order())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Order for a new instance appended to a position holding `existing`.
pub fn next_order(existing: impl IntoIterator<Item = i32>) -> i32 {
    existing.into_iter().max().map_or(1, |max| max + 1)
}

/// Clamp a requested 1-based slot into `1..=len`.
pub fn clamp_order(requested: i32, len: usize) -> i32 {
    let upper = i32::try_from(len.max(1)).unwrap_or(i32::MAX);
    requested.clamp(1, upper)
}

/// Returns `true` if `orders` is exactly `{1, ..., n}` without duplicates.
pub fn is_dense(orders: impl IntoIterator<Item = i32>) -> bool {
    let mut orders: Vec<i32> = orders.into_iter().collect();
    orders.sort_unstable();
    orders
        .iter()
        .enumerate()
        .all(|(idx, &order)| usize::try_from(order).is_ok_and(|o| o == idx + 1))
}

/// Instances of one position in render order.
fn sequence<'a, T: Placed>(rows: &'a [T], position_slug: &str) -> Vec<&'a T> {
    let mut seq: Vec<&T> = rows
        .iter()
        .filter(|r| r.position_slug() == position_slug)
        .collect();
    seq.sort_by(|a, b| render_order(*a, *b));
    seq
}

/// Number `seq` densely from 1 into `position_slug`, emitting only rows whose
/// stored position or order differs.
fn renumber<T: Placed>(seq: &[&T], position_slug: &str, out: &mut Vec<OrderAssignment>) {
    for (idx, row) in seq.iter().enumerate() {
        let order = i32::try_from(idx + 1).unwrap_or(i32::MAX);
        if row.order() != order || row.position_slug() != position_slug {
            out.push(OrderAssignment {
                id: row.id(),
                position_slug: position_slug.to_string(),
                order,
            });
        }
    }
}

/// Plan for moving `instance_id` to `target_order` inside `target_position`.
///
/// `rows` must contain every instance of the site in the source and target
/// positions; other rows are ignored. Inserting shifts everything at or
/// after the target slot down by one; leaving the source closes the gap.
/// `target_order` is clamped into the valid range of the destination.
pub fn plan_move<T: Placed>(
    rows: &[T],
    instance_id: DbId,
    target_position: &str,
    target_order: i32,
) -> Result<MovePlan, PlacementError> {
    let moving = rows
        .iter()
        .find(|r| r.id() == instance_id)
        .ok_or(PlacementError::InstanceNotFound { id: instance_id })?;
    let source_position = moving.position_slug().to_string();

    let mut assignments = Vec::new();

    if source_position != target_position {
        let source: Vec<&T> = sequence(rows, &source_position)
            .into_iter()
            .filter(|r| r.id() != instance_id)
            .collect();
        renumber(&source, &source_position, &mut assignments);
    }

    let mut target: Vec<&T> = sequence(rows, target_position)
        .into_iter()
        .filter(|r| r.id() != instance_id)
        .collect();
    let final_order = clamp_order(target_order, target.len() + 1);
    let insert_at = usize::try_from(final_order - 1).unwrap_or(0);
    target.insert(insert_at, moving);
    renumber(&target, target_position, &mut assignments);

    Ok(MovePlan {
        assignments,
        final_order,
    })
}

/// Plan for closing the gap left by removing `instance_id`.
///
/// The removed row itself is not part of the returned assignments.
pub fn plan_removal<T: Placed>(
    rows: &[T],
    instance_id: DbId,
) -> Result<Vec<OrderAssignment>, PlacementError> {
    let removed = rows
        .iter()
        .find(|r| r.id() == instance_id)
        .ok_or(PlacementError::InstanceNotFound { id: instance_id })?;
    let position_slug = removed.position_slug().to_string();

    let remaining: Vec<&T> = sequence(rows, &position_slug)
        .into_iter()
        .filter(|r| r.id() != instance_id)
        .collect();

    let mut assignments = Vec::new();
    renumber(&remaining, &position_slug, &mut assignments);
    Ok(assignments)
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group instances by position, each group in render order.
///
/// Groups follow `registry` (position slugs in registry order); instances in
/// positions missing from the registry come last, by slug.
pub fn group_by_position<T: Placed>(items: Vec<T>, registry: &[&str]) -> IndexMap<String, Vec<T>> {
    let mut groups: IndexMap<String, Vec<T>> = IndexMap::new();
    for item in items {
        groups
            .entry(item.position_slug().to_string())
            .or_default()
            .push(item);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| render_order(a, b));
    }

    let rank = |slug: &str| registry.iter().position(|s| *s == slug).unwrap_or(usize::MAX);
    groups.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    groups
}

/// Required, active positions that hold no active instance.
pub fn missing_required_positions<'a, P, T>(positions: &'a [P], instances: &[T]) -> Vec<&'a P>
where
    P: PositionSlot + RequiredSlot,
    T: Placed + crate::render::Renderable,
{
    positions
        .iter()
        .filter(|p| p.is_active() && p.is_required())
        .filter(|p| {
            !instances
                .iter()
                .any(|i| i.position_slug() == p.slug() && i.is_active())
        })
        .collect()
}

/// Positions that may be flagged as required by the template author.
pub trait RequiredSlot {
    fn is_required(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone)]
    struct Row {
        id: DbId,
        position: String,
        order: i32,
        created: i64,
        active: bool,
    }

    impl Placed for Row {
        fn id(&self) -> DbId {
            self.id
        }
        fn position_slug(&self) -> &str {
            &self.position
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn created_at(&self) -> Timestamp {
            Utc.timestamp_opt(self.created, 0).single().unwrap_or_default()
        }
    }

    impl crate::render::Renderable for Row {
        fn is_active(&self) -> bool {
            self.active
        }
        fn is_visible(&self) -> bool {
            true
        }
    }

    fn row(id: DbId, position: &str, order: i32) -> Row {
        Row {
            id,
            position: position.to_string(),
            order,
            created: id,
            active: true,
        }
    }

    /// Apply a plan to an in-memory table the way the repository does.
    fn apply(rows: &mut [Row], assignments: &[OrderAssignment]) {
        for a in assignments {
            let r = rows.iter_mut().find(|r| r.id == a.id).unwrap();
            r.position = a.position_slug.clone();
            r.order = a.order;
        }
    }

    fn orders_in(rows: &[Row], position: &str) -> Vec<(DbId, i32)> {
        let mut v: Vec<_> = rows
            .iter()
            .filter(|r| r.position == position)
            .map(|r| (r.id, r.order))
            .collect();
        v.sort_by_key(|(_, o)| *o);
        v
    }

    #[test]
    fn test_next_order() {
        assert_eq!(next_order(Vec::new()), 1);
        assert_eq!(next_order(vec![1, 2, 3]), 4);
        assert_eq!(next_order(vec![5, 2]), 6);
    }

    #[test]
    fn test_clamp_order() {
        assert_eq!(clamp_order(0, 3), 1);
        assert_eq!(clamp_order(-4, 3), 1);
        assert_eq!(clamp_order(2, 3), 2);
        assert_eq!(clamp_order(99, 3), 3);
        assert_eq!(clamp_order(7, 0), 1);
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(Vec::new()));
        assert!(is_dense(vec![2, 1, 3]));
        assert!(!is_dense(vec![1, 1, 2]));
        assert!(!is_dense(vec![1, 3]));
        assert!(!is_dense(vec![0, 1]));
    }

    #[test]
    fn test_move_up_within_position() {
        let mut rows = vec![row(1, "hero", 1), row(2, "hero", 2), row(3, "hero", 3)];
        let plan = plan_move(&rows, 3, "hero", 1).unwrap();
        assert_eq!(plan.final_order, 1);
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "hero"), [(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_move_down_within_position() {
        let mut rows = vec![row(1, "hero", 1), row(2, "hero", 2), row(3, "hero", 3)];
        let plan = plan_move(&rows, 1, "hero", 3).unwrap();
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "hero"), [(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn test_move_to_same_slot_is_noop() {
        let rows = vec![row(1, "hero", 1), row(2, "hero", 2)];
        let plan = plan_move(&rows, 2, "hero", 2).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_move_across_positions_renumbers_both() {
        let mut rows = vec![
            row(1, "content", 1),
            row(2, "content", 2),
            row(3, "content", 3),
            row(4, "sidebar", 1),
            row(5, "sidebar", 2),
        ];
        let plan = plan_move(&rows, 2, "sidebar", 2).unwrap();
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "content"), [(1, 1), (3, 2)]);
        assert_eq!(orders_in(&rows, "sidebar"), [(4, 1), (2, 2), (5, 3)]);
    }

    #[test]
    fn test_move_into_empty_position() {
        let mut rows = vec![row(1, "content", 1), row(2, "content", 2)];
        let plan = plan_move(&rows, 1, "footer", 5).unwrap();
        assert_eq!(plan.final_order, 1);
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "content"), [(2, 1)]);
        assert_eq!(orders_in(&rows, "footer"), [(1, 1)]);
    }

    #[test]
    fn test_move_clamps_past_end() {
        let mut rows = vec![row(1, "a", 1), row(2, "b", 1), row(3, "b", 2)];
        let plan = plan_move(&rows, 1, "b", 40).unwrap();
        assert_eq!(plan.final_order, 3);
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "b"), [(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn test_move_unknown_instance() {
        let rows = vec![row(1, "a", 1)];
        assert_matches!(
            plan_move(&rows, 9, "a", 1),
            Err(PlacementError::InstanceNotFound { id: 9 })
        );
    }

    #[test]
    fn test_move_repairs_duplicate_orders_by_creation_time() {
        let mut rows = vec![row(1, "a", 1), row(2, "a", 1), row(3, "a", 2)];
        let plan = plan_move(&rows, 3, "a", 1).unwrap();
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "a"), [(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_removal_closes_gap() {
        let mut rows = vec![row(1, "a", 1), row(2, "a", 2), row(3, "a", 3), row(4, "b", 1)];
        let plan = plan_removal(&rows, 2).unwrap();
        assert_eq!(plan.len(), 1);
        rows.retain(|r| r.id != 2);
        apply(&mut rows, &plan);
        assert_eq!(orders_in(&rows, "a"), [(1, 1), (3, 2)]);
        assert_eq!(orders_in(&rows, "b"), [(4, 1)]);
    }

    #[test]
    fn test_removal_of_last_needs_no_updates() {
        let rows = vec![row(1, "a", 1), row(2, "a", 2)];
        assert!(plan_removal(&rows, 2).unwrap().is_empty());
    }

    /// Create A and B in `hero`, move B to the top, then delete A.
    #[test]
    fn test_hero_scenario() {
        let mut rows: Vec<Row> = Vec::new();

        let a = row(1, "hero", next_order(orders_in(&rows, "hero").iter().map(|(_, o)| *o)));
        assert_eq!(a.order, 1);
        rows.push(a);

        let b = row(2, "hero", next_order(orders_in(&rows, "hero").iter().map(|(_, o)| *o)));
        assert_eq!(b.order, 2);
        rows.push(b);

        let plan = plan_move(&rows, 2, "hero", 1).unwrap();
        apply(&mut rows, &plan.assignments);
        assert_eq!(orders_in(&rows, "hero"), [(2, 1), (1, 2)]);

        let plan = plan_removal(&rows, 1).unwrap();
        rows.retain(|r| r.id != 1);
        apply(&mut rows, &plan);
        assert_eq!(orders_in(&rows, "hero"), [(2, 1)]);
    }

    /// Drive a long pseudo-random sequence of create/move/delete operations
    /// and check every position stays dense after each step.
    #[test]
    fn test_orders_stay_dense_under_random_operations() {
        const POSITIONS: [&str; 4] = ["header", "content", "sidebar", "footer"];
        let mut seed: u64 = 0x5eed_cafe;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };

        let mut rows: Vec<Row> = Vec::new();
        let mut next_id: DbId = 1;

        for _ in 0..2_000 {
            match next(3) {
                0 => {
                    let position = POSITIONS[next(4) as usize];
                    let order = next_order(
                        rows.iter()
                            .filter(|r| r.position == position)
                            .map(|r| r.order),
                    );
                    rows.push(row(next_id, position, order));
                    next_id += 1;
                }
                1 if !rows.is_empty() => {
                    let id = rows[next(rows.len() as u64) as usize].id;
                    let target = POSITIONS[next(4) as usize];
                    let order = next(8) as i32;
                    let plan = plan_move(&rows, id, target, order).unwrap();
                    apply(&mut rows, &plan.assignments);
                }
                2 if !rows.is_empty() => {
                    let id = rows[next(rows.len() as u64) as usize].id;
                    let plan = plan_removal(&rows, id).unwrap();
                    rows.retain(|r| r.id != id);
                    apply(&mut rows, &plan);
                }
                _ => {}
            }

            for position in POSITIONS {
                let orders = rows.iter().filter(|r| r.position == position).map(|r| r.order);
                assert!(is_dense(orders), "position {position} lost density");
            }
        }
    }

    #[test]
    fn test_group_by_position_follows_registry() {
        let rows = vec![
            row(1, "footer", 1),
            row(2, "hero", 2),
            row(3, "hero", 1),
            row(4, "orphan", 1),
        ];
        let groups = group_by_position(rows, &["hero", "content", "footer"]);
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, ["hero", "footer", "orphan"]);
        let hero: Vec<_> = groups["hero"].iter().map(|r| r.id).collect();
        assert_eq!(hero, [3, 2]);
    }

    struct Slot {
        slug: &'static str,
        required: bool,
        allowed: Vec<String>,
        active: bool,
    }

    impl PositionSlot for Slot {
        fn slug(&self) -> &str {
            self.slug
        }
        fn display_order(&self) -> i32 {
            0
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn allowed_widgets(&self) -> &[String] {
            &self.allowed
        }
    }

    impl RequiredSlot for Slot {
        fn is_required(&self) -> bool {
            self.required
        }
    }

    fn slot(slug: &'static str) -> Slot {
        Slot {
            slug,
            required: false,
            allowed: vec![],
            active: true,
        }
    }

    #[test]
    fn test_missing_required_positions_ignores_inactive_instances() {
        let mut hero = slot("hero");
        hero.required = true;
        let mut footer = slot("footer");
        footer.required = true;
        let positions = vec![hero, footer, slot("sidebar")];

        let mut inactive = row(1, "hero", 1);
        inactive.active = false;
        let rows = vec![inactive, row(2, "footer", 1)];

        let missing: Vec<_> = missing_required_positions(&positions, &rows)
            .iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(missing, ["hero"]);
    }

    struct Widget {
        slug: &'static str,
        active: bool,
        site_types: Vec<String>,
    }

    impl CatalogItem for Widget {
        fn slug(&self) -> &str {
            self.slug
        }
        fn name(&self) -> &str {
            self.slug
        }
        fn sort_order(&self) -> i32 {
            0
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn allowed_site_types(&self) -> &[String] {
            &self.site_types
        }
    }

    fn widget(slug: &'static str) -> Widget {
        Widget {
            slug,
            active: true,
            site_types: vec![],
        }
    }

    #[test]
    fn test_check_placement_allow_list() {
        let mut hero = slot("hero");
        hero.allowed = vec!["hero".into()];
        assert!(check_placement(&widget("hero"), &hero, "main").is_ok());
        assert_matches!(
            check_placement(&widget("text"), &hero, "main"),
            Err(PlacementError::PositionNotAllowed { .. })
        );
    }

    #[test]
    fn test_check_placement_inactive_position() {
        let mut hero = slot("hero");
        hero.active = false;
        assert_matches!(
            check_placement(&widget("hero"), &hero, "main"),
            Err(PlacementError::PositionNotAllowed { .. })
        );
    }

    #[test]
    fn test_check_placement_site_type() {
        let mut donors = widget("top_donors");
        donors.site_types = vec!["organization".into()];
        assert!(check_placement(&donors, &slot("sidebar"), "organization").is_ok());
        assert_matches!(
            check_placement(&donors, &slot("sidebar"), "main"),
            Err(PlacementError::WidgetNotAllowed { .. })
        );
    }

    #[test]
    fn test_check_placement_inactive_widget() {
        let mut retired = widget("legacy");
        retired.active = false;
        let err = check_placement(&retired, &slot("content"), "main").unwrap_err();
        assert_eq!(err.kind(), "WIDGET_NOT_ALLOWED");
    }
}
