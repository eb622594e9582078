//! Render visibility rules for site widget instances.
//!
//! `is_active` and `is_visible` are independent. Inactive instances are
//! suppressed for everyone. Invisible ones are shown to editors as
//! placeholders and hidden from visitors.

use serde::{Deserialize, Serialize};

/// Who a page is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderAudience {
    #[default]
    Visitor,
    Editor,
}

/// How an instance appears to a given audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Full,
    Placeholder,
    Suppressed,
}

/// Read access to the two visibility flags of an instance.
pub trait Renderable {
    fn is_active(&self) -> bool;
    fn is_visible(&self) -> bool;
}

/// Decide how `item` renders for `audience`.
pub fn render_mode(item: &impl Renderable, audience: RenderAudience) -> RenderMode {
    match (item.is_active(), item.is_visible(), audience) {
        (false, _, _) => RenderMode::Suppressed,
        (true, true, _) => RenderMode::Full,
        (true, false, RenderAudience::Editor) => RenderMode::Placeholder,
        (true, false, RenderAudience::Visitor) => RenderMode::Suppressed,
    }
}

/// Keep only the items that render for `audience`, paired with their mode.
pub fn renderable<T: Renderable>(items: Vec<T>, audience: RenderAudience) -> Vec<(T, RenderMode)> {
    items
        .into_iter()
        .filter_map(|item| match render_mode(&item, audience) {
            RenderMode::Suppressed => None,
            mode => Some((item, mode)),
        })
        .collect()
}
