//! Widget catalog rules.
//!
//! The catalog is read-only at runtime. These helpers decide which
//! definitions are offered for a given site type and in which order.

use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Catalog item view
// ---------------------------------------------------------------------------

/// Read access to the fields of a widget definition that the placement
/// rules care about.
pub trait CatalogItem {
    fn slug(&self) -> &str;
    fn name(&self) -> &str;
    fn sort_order(&self) -> i32;
    fn is_active(&self) -> bool;
    /// Empty means the widget is available on every site type.
    fn allowed_site_types(&self) -> &[String];
}

/// Returns `true` if the definition may be used on a site of `site_type`.
pub fn permits_site_type(item: &impl CatalogItem, site_type: &str) -> bool {
    let allowed = item.allowed_site_types();
    allowed.is_empty() || allowed.iter().any(|t| t == site_type)
}

/// Catalog display order: `sort_order`, then `name`.
pub fn catalog_order(a: &impl CatalogItem, b: &impl CatalogItem) -> Ordering {
    a.sort_order()
        .cmp(&b.sort_order())
        .then_with(|| a.name().cmp(b.name()))
}

/// Active definitions usable on `site_type` (or on any site when `None`),
/// in catalog display order.
///
/// An unrecognised site type is not an error: restricted entries are
/// filtered out and unrestricted ones remain.
pub fn list_active<T: CatalogItem>(items: Vec<T>, site_type: Option<&str>) -> Vec<T> {
    let mut active: Vec<T> = items
        .into_iter()
        .filter(|item| item.is_active())
        .filter(|item| site_type.map_or(true, |st| permits_site_type(item, st)))
        .collect();
    active.sort_by(|a, b| catalog_order(a, b));
    active
}
