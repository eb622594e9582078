//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the request payloads that write it

pub mod layout_preference;
pub mod site;
pub mod site_widget;
pub mod template;
pub mod widget_definition;
pub mod widget_position;
