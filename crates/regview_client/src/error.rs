use thiserror::Error;

use crate::state::{ConnectionState, TransportEvent};

/// Errors that can occur inside the regview client.
///
/// Event handlers never surface these to the page; they are logged where
/// they are observed.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A transport event arrived that the connection state machine does not accept.
    #[error("cannot apply {event:?} while {from:?}")]
    InvalidTransition {
        from: ConnectionState,
        event: TransportEvent,
    },

    /// The WebSocket endpoint URL could not be built.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The page location could not be read.
    #[error("page location unavailable: {message}")]
    Location { message: String },
}
