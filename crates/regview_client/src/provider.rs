use std::sync::{Arc, Mutex};
use std::time::Duration;

use codee::string::FromToStringCodec;
use leptos::prelude::*;
use leptos_use::core::ConnectionReadyState;
use leptos_use::{
    use_websocket_with_options, DummyEncoder, ReconnectLimit, UseWebSocketOptions,
    UseWebSocketReturn,
};
use log::error;
use url::Url;

use crate::config::{ReconnectPolicy, ViewerConfig};
use crate::error::ViewerError;
use crate::renderer::{Render, Renderer};
use crate::session::LiveSession;
use crate::sinks::{PulseTimer, StatusSink, TableRow, TableSink, TimestampSink};

/// Reactive signals standing in for the page's view hooks.
///
/// Components read these; the session writes them through the sink traits.
#[derive(Clone, Copy, Debug)]
pub struct SignalView {
    pub rows: RwSignal<Vec<TableRow>>,
    pub status: RwSignal<String>,
    pub timestamp: RwSignal<String>,
    /// Marker class currently set on the table container
    pub marker: RwSignal<Option<String>>,
}

impl SignalView {
    pub fn new() -> Self {
        Self {
            rows: RwSignal::new(Vec::new()),
            status: RwSignal::new(String::new()),
            timestamp: RwSignal::new(String::new()),
            marker: RwSignal::new(None),
        }
    }
}

impl Default for SignalView {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for SignalView {
    fn set_status(&self, text: &str) {
        self.status.set(text.to_string());
    }
}

impl TimestampSink for SignalView {
    fn set_timestamp(&self, text: &str) {
        self.timestamp.set(text.to_string());
    }
}

impl TableSink for SignalView {
    fn replace_rows(&self, rows: Vec<TableRow>) {
        self.rows.set(rows);
    }

    fn add_marker(&self, class: &str) {
        self.marker.set(Some(class.to_string()));
    }

    fn remove_marker(&self, class: &str) {
        if self.marker.get_untracked().as_deref() == Some(class) {
            self.marker.set(None);
        }
    }
}

/// Defers pulse removal onto the browser's event loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeptosTimer;

impl PulseTimer for LeptosTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + 'static>) {
        set_timeout(task, delay);
    }
}

/// Context provided by [`LiveViewProvider`].
#[derive(Clone, Copy)]
pub struct LiveViewContext {
    pub view: SignalView,
    /// Ready state of the underlying WebSocket
    pub ready_state: Signal<ConnectionReadyState>,
}

type BrowserSession = LiveSession<SignalView, Renderer<SignalView, SignalView, LeptosTimer>>;

fn with_session(session: &Mutex<BrowserSession>, f: impl FnOnce(&mut BrowserSession)) {
    match session.lock() {
        Ok(mut guard) => f(&mut guard),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}

/// `ws(s)://<page host><endpoint path>`, mirroring the page's own scheme.
fn page_endpoint(config: &ViewerConfig) -> Result<Url, ViewerError> {
    let location = window().location();
    let host = location.host().map_err(|err| ViewerError::Location {
        message: format!("{:?}", err),
    })?;
    let secure = location
        .protocol()
        .map(|protocol| protocol == "https:")
        .unwrap_or(false);
    config.endpoint_url(&host, secure)
}

/// Maps a reconnect policy onto `leptos-use` options.
///
/// `leptos-use` retries at a fixed interval, so the browser uses the initial
/// backoff delay for every attempt.
fn reconnect_options(policy: &ReconnectPolicy) -> (ReconnectLimit, u64) {
    match *policy {
        ReconnectPolicy::Never => (ReconnectLimit::Limited(0), 0),
        ReconnectPolicy::Backoff {
            initial,
            max_attempts,
            ..
        } => (
            ReconnectLimit::Limited(u64::from(max_attempts)),
            initial.as_millis().try_into().unwrap_or(u64::MAX),
        ),
    }
}

/// Moves a terminal session back to `Connecting` when the socket starts a
/// reconnect attempt.
fn follow_ready_state<S, R>(session: &mut LiveSession<S, R>, ready_state: ConnectionReadyState)
where
    S: StatusSink,
    R: Render,
{
    if ready_state == ConnectionReadyState::Connecting {
        session.begin_reconnect();
    }
}

/// Opens the live view connection and provides [`LiveViewContext`].
///
/// Wrap the part of the page that shows the readings; the session lives as
/// long as this component.
///
/// # Example
///
/// ```rust,ignore
/// use leptos::prelude::*;
/// use regview_client::{LiveViewProvider, ReadingsTable, ServerStatus, LastUpdated};
///
/// #[component]
/// pub fn App() -> impl IntoView {
///     view! {
///         <LiveViewProvider>
///             <ServerStatus/>
///             <ReadingsTable/>
///             <LastUpdated/>
///         </LiveViewProvider>
///     }
/// }
/// ```
#[component]
pub fn LiveViewProvider(
    /// Viewer settings (default: `ViewerConfig::default()`)
    #[prop(optional)]
    config: Option<ViewerConfig>,
    /// WebSocket URL; derived from the page location when omitted
    #[prop(optional, into)]
    url: Option<String>,
    /// Child components
    children: Children,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let view = SignalView::new();

    let url = match url {
        Some(url) => url,
        None => match page_endpoint(&config) {
            Ok(url) => url.to_string(),
            Err(err) => {
                error!("Cannot resolve live view endpoint, using relative path: {}", err);
                config.endpoint_path.clone()
            }
        },
    };

    let renderer = Renderer::new(view, view, LeptosTimer, &config);
    let session = Arc::new(Mutex::new(LiveSession::new(view, renderer, &config)));
    let (reconnect_limit, reconnect_interval) = reconnect_options(&config.reconnect);

    let open_session = Arc::clone(&session);
    let message_session = Arc::clone(&session);
    let close_session = Arc::clone(&session);
    let error_session = Arc::clone(&session);

    let UseWebSocketReturn { ready_state, .. } = use_websocket_with_options::<
        String,
        String,
        FromToStringCodec,
        (),
        DummyEncoder,
    >(
        &url,
        UseWebSocketOptions::default()
            .reconnect_limit(reconnect_limit)
            .reconnect_interval(reconnect_interval)
            .on_open(move |_| with_session(&open_session, |session| session.on_open()))
            .on_message_raw(move |raw: &str| {
                with_session(&message_session, |session| session.on_message(raw))
            })
            .on_close(move |_| with_session(&close_session, |session| session.on_close()))
            .on_error(move |err| with_session(&error_session, |session| session.on_error(&err))),
    );

    // leptos-use drives reconnects itself; the session only follows along.
    let reconnect_session = Arc::clone(&session);
    Effect::new(move |_| {
        let state = ready_state.get();
        with_session(&reconnect_session, |session| follow_ready_state(session, state));
    });

    provide_context(LiveViewContext { view, ready_state });

    children()
}
