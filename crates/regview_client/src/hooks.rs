use leptos::prelude::*;
use leptos_use::core::ConnectionReadyState;

use crate::provider::{LiveViewContext, SignalView};

/// Hook to access the live view signals.
///
/// # Panics
///
/// Panics if called outside of a `LiveViewProvider` context.
pub fn use_live_view() -> SignalView {
    expect_context::<LiveViewContext>().view
}

/// Hook to observe the WebSocket ready state, e.g. for a connection badge.
///
/// # Panics
///
/// Panics if called outside of a `LiveViewProvider` context.
pub fn use_ready_state() -> Signal<ConnectionReadyState> {
    expect_context::<LiveViewContext>().ready_state
}
