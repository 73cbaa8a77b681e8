use crate::error::ViewerError;

/// Lifecycle of the single connection owned by a [`LiveSession`](crate::LiveSession).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
    Errored,
}

/// Transport lifecycle events fed into the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportEvent {
    Opened,
    Closed,
    Errored,
    /// A reconnect policy is starting a new connection attempt.
    Reconnecting,
}

impl ConnectionState {
    /// Closed and Errored end the connection; only a reconnect leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }

    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    /// Computes the state that follows `event`.
    ///
    /// Close and error events are accepted in every state. A browser reports
    /// an error and then a close for the same failure, and may report several
    /// errors in a row, so terminal states absorb them.
    pub fn transition(self, event: TransportEvent) -> Result<ConnectionState, ViewerError> {
        use ConnectionState::*;

        match (self, event) {
            (Connecting, TransportEvent::Opened) => Ok(Open),
            (_, TransportEvent::Closed) => Ok(Closed),
            (_, TransportEvent::Errored) => Ok(Errored),
            (Closed | Errored, TransportEvent::Reconnecting) => Ok(Connecting),
            (from, event) => Err(ViewerError::InvalidTransition { from, event }),
        }
    }
}
