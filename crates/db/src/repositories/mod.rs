//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod layout_preference_repo;
pub mod site_repo;
pub mod site_widget_repo;
pub mod template_repo;
pub mod widget_definition_repo;
pub mod widget_position_repo;

pub use layout_preference_repo::LayoutPreferenceRepo;
pub use site_repo::SiteRepo;
pub use site_widget_repo::SiteWidgetRepo;
pub use template_repo::TemplateRepo;
pub use widget_definition_repo::WidgetDefinitionRepo;
pub use widget_position_repo::WidgetPositionRepo;
