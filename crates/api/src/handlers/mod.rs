pub mod layout;
pub mod site_widgets;
pub mod widget_positions;
pub mod widgets;
