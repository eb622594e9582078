use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rejections raised by the widget placement rules.
///
/// Every variant is detected before anything is persisted. [`kind`](Self::kind)
/// is the stable code sent to clients alongside the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("Unknown widget '{slug}'")]
    UnknownWidget { slug: String },

    #[error("Unknown position '{slug}' for template {template_id}")]
    UnknownPosition { template_id: DbId, slug: String },

    #[error("Widget '{widget}' is not allowed in position '{position}'")]
    PositionNotAllowed { widget: String, position: String },

    #[error("Widget '{widget}' is not allowed on this site: {reason}")]
    WidgetNotAllowed { widget: String, reason: String },

    #[error("Position '{slug}' already exists for template {template_id}")]
    DuplicatePosition { template_id: DbId, slug: String },

    #[error("Site widget instance {id} not found")]
    InstanceNotFound { id: DbId },

    #[error("Invalid config for widget '{widget}': {message}")]
    InvalidConfig { widget: String, message: String },
}

impl PlacementError {
    /// Machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownWidget { .. } => "UNKNOWN_WIDGET",
            Self::UnknownPosition { .. } => "UNKNOWN_POSITION",
            Self::PositionNotAllowed { .. } => "POSITION_NOT_ALLOWED",
            Self::WidgetNotAllowed { .. } => "WIDGET_NOT_ALLOWED",
            Self::DuplicatePosition { .. } => "DUPLICATE_POSITION",
            Self::InstanceNotFound { .. } => "INSTANCE_NOT_FOUND",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_distinct() {
        let errors = [
            PlacementError::UnknownWidget { slug: "x".into() },
            PlacementError::UnknownPosition {
                template_id: 1,
                slug: "x".into(),
            },
            PlacementError::PositionNotAllowed {
                widget: "x".into(),
                position: "y".into(),
            },
            PlacementError::WidgetNotAllowed {
                widget: "x".into(),
                reason: "inactive".into(),
            },
            PlacementError::DuplicatePosition {
                template_id: 1,
                slug: "x".into(),
            },
            PlacementError::InstanceNotFound { id: 9 },
            PlacementError::InvalidConfig {
                widget: "x".into(),
                message: "bad".into(),
            },
        ];
        let mut kinds: Vec<_> = errors.iter().map(PlacementError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_placement_error_converts_into_core_error() {
        let err: CoreError = PlacementError::InstanceNotFound { id: 3 }.into();
        assert_eq!(err.to_string(), "Site widget instance 3 not found");
    }
}
