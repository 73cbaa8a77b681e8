//! # Regview Client
//!
//! Live register viewer for `regview` servers.
//!
//! A server pushes JSON envelopes over a WebSocket: one `serverInfo` status
//! line, then a stream of `modbusData` updates whose content is a list of
//! `address:value` pairs (or an `Error:` fault line). This crate owns one
//! connection per view and turns that stream into a two-column table, a status
//! line and a "last updated" time.
//!
//! ## Layers
//!
//! - [`LiveSession`]: connection state machine and message routing
//! - [`Renderer`]: table, timestamp and pulse updates behind the [`Render`] seam
//! - sink traits ([`StatusSink`], [`TimestampSink`], [`TableSink`], [`PulseTimer`])
//!   standing in for the page
//! - [`LiveViewProvider`] and components for Leptos pages
//! - [`NativeViewer`] for running a session outside the browser
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use leptos::prelude::*;
//! use regview_client::{LastUpdated, LiveViewProvider, ReadingsTable, ServerStatus};
//!
//! #[component]
//! fn App() -> impl IntoView {
//!     view! {
//!         <LiveViewProvider>
//!             <ServerStatus/>
//!             <ReadingsTable/>
//!             <LastUpdated/>
//!         </LiveViewProvider>
//!     }
//! }
//! ```

// Module declarations
mod components;
mod config;
mod error;
mod hooks;
mod memory;
mod provider;
mod renderer;
mod session;
mod sinks;
mod state;

#[cfg(not(target_arch = "wasm32"))]
mod native_client;

// Re-exports
pub use components::{ConnectionBadge, LastUpdated, ReadingsTable, ServerStatus};
pub use config::{
    ReconnectPolicy, ViewerConfig, CLOSED_TEXT, DEFAULT_ENDPOINT_PATH, DEFAULT_PULSE_CLASS,
    DEFAULT_PULSE_DURATION, ERROR_TEXT,
};
pub use error::ViewerError;
pub use hooks::{use_live_view, use_ready_state};
pub use memory::{DeferredQueue, MemoryView, MemoryViewState};
pub use provider::{LeptosTimer, LiveViewContext, LiveViewProvider, SignalView};
pub use renderer::{Render, Renderer};
pub use session::LiveSession;
pub use sinks::{PulseTimer, StatusSink, TableRow, TableSink, TimestampSink};
pub use state::{ConnectionState, TransportEvent};

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::NativeViewer;

// Re-export ConnectionReadyState for convenience
pub use leptos_use::core::ConnectionReadyState;
