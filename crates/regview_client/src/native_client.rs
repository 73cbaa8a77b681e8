//! Native transport for a live view session.
//!
//! Drives a [`LiveSession`] from an `async-tungstenite` connection on the
//! async-std runtime. Handlers run on the driving task one at a time, and
//! pulse removals are run from the same task through a [`DeferredQueue`].

use std::time::{Duration, Instant};

use async_std::task;
use async_tungstenite::tungstenite::{Error as WsError, Message};
use futures::future::{self, Either};
use futures::{Stream, StreamExt};
use log::{debug, error, info};
use url::Url;

use crate::memory::DeferredQueue;
use crate::renderer::Render;
use crate::session::LiveSession;
use crate::sinks::StatusSink;

/// Connects a session to a live view endpoint outside the browser.
///
/// # Example
///
/// ```rust,ignore
/// use regview_client::{DeferredQueue, LiveSession, MemoryView, NativeViewer, Renderer, ViewerConfig};
///
/// let config = ViewerConfig::default();
/// let view = MemoryView::new();
/// let deferred = DeferredQueue::new();
/// let renderer = Renderer::new(view.clone(), view.clone(), deferred.clone(), &config);
/// let mut session = LiveSession::new(view.clone(), renderer, &config);
///
/// let viewer = NativeViewer::new(config.endpoint_url("127.0.0.1:8080", false)?);
/// async_std::task::block_on(viewer.run(&mut session, &deferred));
/// ```
#[derive(Clone, Debug)]
pub struct NativeViewer {
    url: Url,
}

impl NativeViewer {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Runs the session until its connection ends and the session's reconnect
    /// policy declines another attempt.
    ///
    /// `deferred` must be the timer the session's renderer schedules on.
    /// Pending pulse removals are flushed before returning.
    pub async fn run<S, R>(&self, session: &mut LiveSession<S, R>, deferred: &DeferredQueue)
    where
        S: StatusSink,
        R: Render,
    {
        loop {
            info!("Connecting to {}", self.url);
            match async_tungstenite::async_std::connect_async(self.url.as_str()).await {
                Ok((mut stream, _response)) => {
                    session.on_open();
                    pump(&mut stream, session, deferred).await;
                }
                Err(err) => {
                    error!("Could not connect to {}: {}", self.url, err);
                    session.on_error(&err);
                }
            }

            let Some(delay) = session.begin_reconnect() else {
                break;
            };
            idle(delay, deferred).await;
        }

        deferred.run_all();
    }
}

/// Feeds frames into the session until the connection ends.
async fn pump<St, S, R>(stream: &mut St, session: &mut LiveSession<S, R>, deferred: &DeferredQueue)
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
    S: StatusSink,
    R: Render,
{
    loop {
        let frame = match deferred.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match future::select(stream.next(), Box::pin(task::sleep(wait))).await {
                    Either::Left((frame, _)) => frame,
                    Either::Right(_) => {
                        deferred.run_due(Instant::now());
                        continue;
                    }
                }
            }
            None => stream.next().await,
        };

        match frame {
            Some(Ok(Message::Text(text))) => session.on_message(&text),
            Some(Ok(Message::Close(close_frame))) => {
                debug!("Close frame: {:?}", close_frame);
                session.on_close();
                return;
            }
            Some(Ok(other)) => debug!("Ignoring non-text frame: {:?}", other),
            Some(Err(err)) => {
                session.on_error(&err);
                return;
            }
            None => {
                session.on_close();
                return;
            }
        }
    }
}

/// Sleeps through a reconnect delay while still running pulse removals.
async fn idle(delay: Duration, deferred: &DeferredQueue) {
    let until = Instant::now() + delay;
    loop {
        let now = Instant::now();
        deferred.run_due(now);
        if now >= until {
            return;
        }
        let next = deferred.next_deadline().map_or(until, |deadline| deadline.min(until));
        task::sleep(next.saturating_duration_since(now)).await;
    }
}
