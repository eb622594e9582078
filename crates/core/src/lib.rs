//! Domain logic for the site builder's widget placement subsystem.
//!
//! This crate has no I/O. It owns the rules the persistence and HTTP layers
//! enforce: catalog filtering, position allow-lists, dense ordering, typed
//! widget configuration and render visibility.

pub mod error;
pub mod layout;
pub mod placement;
pub mod render;
pub mod types;
pub mod widget_catalog;
pub mod widget_config;
pub mod widget_position;
