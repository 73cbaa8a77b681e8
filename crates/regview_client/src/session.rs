use std::fmt::Debug;
use std::time::Duration;

use codee::Decoder;
use log::{debug, info, warn};
use regview_common::codec::EnvelopeJsonCodec;
use regview_common::{Envelope, MessageKind};

use crate::config::{ReconnectPolicy, ViewerConfig};
use crate::renderer::Render;
use crate::sinks::StatusSink;
use crate::state::{ConnectionState, TransportEvent};

/// Owns one connection's lifecycle and routes what it receives.
///
/// Transports call the `on_*` handlers as events arrive, one at a time.
/// Handlers never fail: malformed frames are dropped and transport faults
/// become placeholder rows.
///
/// ```rust
/// use regview_client::{DeferredQueue, LiveSession, MemoryView, Renderer, TableRow, ViewerConfig};
///
/// let config = ViewerConfig::default();
/// let view = MemoryView::new();
/// let renderer = Renderer::new(view.clone(), view.clone(), DeferredQueue::new(), &config);
/// let mut session = LiveSession::new(view.clone(), renderer, &config);
///
/// session.on_open();
/// session.on_message(r#"{"type":"modbusData","content":"0:12, 1:34","timestamp":1714566600000}"#);
/// assert_eq!(view.rows().len(), 2);
///
/// session.on_close();
/// assert_eq!(view.rows(), vec![TableRow::spanning(regview_client::CLOSED_TEXT)]);
/// ```
pub struct LiveSession<S, R> {
    state: ConnectionState,
    status: S,
    renderer: R,
    reconnect: ReconnectPolicy,
    reconnect_attempts: u32,
    closed_text: String,
    error_text: String,
}

impl<S, R> LiveSession<S, R>
where
    S: StatusSink,
    R: Render,
{
    pub fn new(status: S, renderer: R, config: &ViewerConfig) -> Self {
        Self {
            state: ConnectionState::Connecting,
            status,
            renderer,
            reconnect: config.reconnect,
            reconnect_attempts: 0,
            closed_text: config.closed_text.clone(),
            error_text: config.error_text.clone(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn on_open(&mut self) {
        if self.apply(TransportEvent::Opened) {
            info!("Live view connection opened");
            self.reconnect_attempts = 0;
        }
    }

    /// Handles one text frame.
    pub fn on_message(&mut self, raw: &str) {
        if !self.state.is_open() {
            debug!("Dropping frame received while {:?}", self.state);
            return;
        }

        let envelope = match EnvelopeJsonCodec::decode(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("Dropping envelope: {}", err);
                return;
            }
        };

        self.route(envelope);
    }

    fn route(&self, envelope: Envelope) {
        match &envelope.kind {
            MessageKind::ServerInfo => self.status.set_status(&envelope.content),
            MessageKind::DataUpdate => match envelope.data_timestamp() {
                Ok(timestamp) => self.renderer.render_data_update(&envelope.content, timestamp),
                Err(err) => debug!("Dropping envelope: {}", err),
            },
            MessageKind::Other(tag) => debug!("Ignoring envelope of kind {:?}", tag),
        }
    }

    /// The connection closed. Status text keeps its last value.
    pub fn on_close(&mut self) {
        if self.apply(TransportEvent::Closed) {
            info!("Live view connection closed");
        }
        self.renderer.render_placeholder(&self.closed_text);
    }

    /// The transport reported an error. `detail` is logged, never rendered.
    pub fn on_error(&mut self, detail: &dyn Debug) {
        self.apply(TransportEvent::Errored);
        warn!("Live view connection error: {:?}", detail);
        self.renderer.render_placeholder(&self.error_text);
    }

    /// Starts another connection attempt if the reconnect policy allows one.
    ///
    /// Returns the delay to wait before connecting. The placeholder stays on
    /// screen until the new connection delivers data.
    pub fn begin_reconnect(&mut self) -> Option<Duration> {
        if !self.state.is_terminal() {
            return None;
        }

        let attempt = self.reconnect_attempts.saturating_add(1);
        let delay = self.reconnect.delay_for(attempt)?;
        if !self.apply(TransportEvent::Reconnecting) {
            return None;
        }
        self.reconnect_attempts = attempt;
        info!("Reconnecting in {:?} (attempt {})", delay, attempt);
        Some(delay)
    }

    fn apply(&mut self, event: TransportEvent) -> bool {
        match self.state.transition(event) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }
}
