//! Widget position rules: areas, slug format, ordering and allow-lists.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Areas
// ---------------------------------------------------------------------------

/// Coarse visual zones a position can belong to.
pub mod areas {
    pub const HEADER: &str = "header";
    pub const HERO: &str = "hero";
    pub const CONTENT: &str = "content";
    pub const SIDEBAR: &str = "sidebar";
    pub const FOOTER: &str = "footer";

    /// All recognised areas, in page order.
    pub const ALL: &[&str] = &[HEADER, HERO, CONTENT, SIDEBAR, FOOTER];
}

/// Maximum length of a position slug.
pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"));

/// Validate that `area` is one of the known zones.
pub fn validate_area(area: &str) -> Result<(), CoreError> {
    if areas::ALL.contains(&area) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid area '{area}'. Must be one of: {}",
            areas::ALL.join(", ")
        )))
    }
}

/// Validate a position slug: lowercase, starts with a letter, `[a-z0-9_]`.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Position slug must be 1-{MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid position slug '{slug}'. Use lowercase letters, digits and underscores"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Position slot view
// ---------------------------------------------------------------------------

/// Read access to the fields of a widget position used by placement rules.
pub trait PositionSlot {
    fn slug(&self) -> &str;
    fn display_order(&self) -> i32;
    fn is_active(&self) -> bool;
    /// Empty means any widget may be placed here.
    fn allowed_widgets(&self) -> &[String];
}

/// Returns `true` if `widget_slug` satisfies the position's allow-list.
pub fn allows_widget(position: &impl PositionSlot, widget_slug: &str) -> bool {
    let allowed = position.allowed_widgets();
    allowed.is_empty() || allowed.iter().any(|w| w == widget_slug)
}

/// Registry order: `order` ascending, ties broken by slug.
pub fn registry_order(a: &impl PositionSlot, b: &impl PositionSlot) -> Ordering {
    a.display_order()
        .cmp(&b.display_order())
        .then_with(|| a.slug().cmp(b.slug()))
}

/// Sort positions into registry order in place.
pub fn sort_positions<T: PositionSlot>(positions: &mut [T]) {
    positions.sort_by(|a, b| registry_order(a, b));
}
