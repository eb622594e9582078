use std::time::Duration;

/// How long a freshly created instance keeps its "newly added" marker.
pub const DEFAULT_REVEAL_WINDOW: Duration = Duration::from_secs(3);

/// Default number of undo snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Placement editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Server origin, e.g. `http://localhost:3000`.
    pub base_url: String,
    pub reveal_window: Duration,
    pub history_limit: usize,
}

impl EditorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            reveal_window: DEFAULT_REVEAL_WINDOW,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Root of the versioned API, without a trailing slash.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.base_url.trim_end_matches('/'))
    }
}
