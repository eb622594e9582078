use edusite_core::error::PlacementError;
use edusite_core::types::DbId;

/// Errors raised by the placement editor and its store clients.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The placement API rejected the call.
    #[error("Placement API error ({status} {code}): {message}")]
    Api {
        status: u16,
        /// Machine-readable code from the error body, e.g. `POSITION_NOT_ALLOWED`.
        code: String,
        message: String,
    },

    /// Another mutation is still in flight.
    #[error("Another change is still being saved")]
    Busy,

    #[error("Widget instance {id} is not on this page")]
    UnknownInstance { id: DbId },

    /// A change rejected locally before reaching the store.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("Nothing to {0}")]
    HistoryEmpty(&'static str),
}

impl EditorError {
    /// The API error code, if the server produced one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
