#![cfg(not(target_arch = "wasm32"))]

use std::net::SocketAddr;
use std::time::Duration;

use async_std::net::TcpListener;
use async_std::task;
use async_tungstenite::tungstenite::Message;
use async_tungstenite::WebSocketStream;
use futures::{SinkExt, StreamExt};
use regview_client::{
    ConnectionState, DeferredQueue, LiveSession, MemoryView, NativeViewer, ReconnectPolicy,
    Renderer, TableRow, ViewerConfig, CLOSED_TEXT, ERROR_TEXT,
};

type TestSession = LiveSession<MemoryView, Renderer<MemoryView, MemoryView, DeferredQueue>>;

const SERVER_INFO: &str = r#"{"type":"serverInfo","content":"Server: 127.0.0.1:5020","timestamp":""}"#;

fn data_frame(content: &str) -> String {
    format!(r#"{{"type":"modbusData","content":"{content}","timestamp":"2024-05-01T12:30:00Z"}}"#)
}

fn reading(address: &str, value: &str) -> TableRow {
    TableRow::Reading {
        address: address.to_string(),
        value: value.to_string(),
    }
}

fn session(config: &ViewerConfig) -> (TestSession, MemoryView, DeferredQueue) {
    let view = MemoryView::recording();
    let deferred = DeferredQueue::new();
    let renderer = Renderer::new(view.clone(), view.clone(), deferred.clone(), config);
    (LiveSession::new(view.clone(), renderer, config), view, deferred)
}

async fn listen() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn viewer(config: &ViewerConfig, addr: SocketAddr) -> NativeViewer {
    NativeViewer::new(config.endpoint_url(&addr.to_string(), false).unwrap())
}

async fn accept(listener: &TcpListener) -> WebSocketStream<async_std::net::TcpStream> {
    let (tcp, _) = listener.accept().await.unwrap();
    async_tungstenite::accept_async(tcp).await.unwrap()
}

/// Sends `frames`, then closes and waits for the client's close reply.
async fn serve(mut ws: WebSocketStream<async_std::net::TcpStream>, frames: Vec<String>) {
    for frame in frames {
        ws.send(Message::text(frame)).await.unwrap();
    }
    ws.close(None).await.unwrap();
    while let Some(Ok(_)) = ws.next().await {}
}

#[test]
fn test_stream_then_close() {
    task::block_on(async {
        let config = ViewerConfig::default();
        let (listener, addr) = listen().await;
        let server = task::spawn(async move {
            let ws = accept(&listener).await;
            serve(
                ws,
                vec![
                    SERVER_INFO.to_string(),
                    data_frame("0:12, 1:34"),
                    data_frame("Error: read timeout"),
                ],
            )
            .await;
        });

        let (mut session, view, deferred) = session(&config);
        viewer(&config, addr).run(&mut session, &deferred).await;
        server.await;

        assert_eq!(session.state(), ConnectionState::Closed);
        assert_eq!(view.status().as_deref(), Some("Server: 127.0.0.1:5020"));
        assert_eq!(
            view.history(),
            vec![
                vec![reading("0", "12"), reading("1", "34")],
                vec![TableRow::spanning("Error: read timeout")],
                vec![TableRow::spanning(CLOSED_TEXT)],
            ]
        );
        assert!(view.timestamp().unwrap().starts_with("Last updated: "));
        assert_eq!(view.pulses(), 2);
        assert!(!view.has_marker("pulse"));
        assert_eq!(deferred.pending(), 0);
    });
}

#[test]
fn test_malformed_frames_are_ignored() {
    task::block_on(async {
        let config = ViewerConfig::default();
        let (listener, addr) = listen().await;
        let server = task::spawn(async move {
            let ws = accept(&listener).await;
            serve(
                ws,
                vec![
                    "not json".to_string(),
                    r#"{"type":"heartbeat","content":"x"}"#.to_string(),
                    r#"{"type":"modbusData","content":"0:1"}"#.to_string(),
                    data_frame("0:2"),
                ],
            )
            .await;
        });

        let (mut session, view, deferred) = session(&config);
        viewer(&config, addr).run(&mut session, &deferred).await;
        server.await;

        assert_eq!(view.status(), None);
        assert_eq!(
            view.history(),
            vec![
                vec![reading("0", "2")],
                vec![TableRow::spanning(CLOSED_TEXT)],
            ]
        );
    });
}

#[test]
fn test_connect_failure_shows_error_placeholder() {
    task::block_on(async {
        let config = ViewerConfig::default();
        let (listener, addr) = listen().await;
        drop(listener);

        let (mut session, view, deferred) = session(&config);
        viewer(&config, addr).run(&mut session, &deferred).await;

        assert_eq!(session.state(), ConnectionState::Errored);
        assert_eq!(view.rows(), vec![TableRow::spanning(ERROR_TEXT)]);
        assert_eq!(view.status(), None);
    });
}

#[test]
fn test_backoff_reconnects_until_attempts_run_out() {
    task::block_on(async {
        let config = ViewerConfig::default().with_reconnect(ReconnectPolicy::Backoff {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(20),
            max_attempts: 1,
        });
        let (listener, addr) = listen().await;
        let server = task::spawn(async move {
            let first = accept(&listener).await;
            serve(first, vec![data_frame("0:1")]).await;

            let second = accept(&listener).await;
            // The third attempt must be refused.
            drop(listener);
            serve(second, vec![data_frame("0:2")]).await;
        });

        let (mut session, view, deferred) = session(&config);
        viewer(&config, addr).run(&mut session, &deferred).await;
        server.await;

        assert_eq!(session.state(), ConnectionState::Errored);
        assert_eq!(
            view.history(),
            vec![
                vec![reading("0", "1")],
                vec![TableRow::spanning(CLOSED_TEXT)],
                vec![reading("0", "2")],
                vec![TableRow::spanning(CLOSED_TEXT)],
                vec![TableRow::spanning(ERROR_TEXT)],
            ]
        );
        assert!(!view.has_marker("pulse"));
    });
}

#[test]
fn test_pulse_clears_while_connection_stays_open() {
    task::block_on(async {
        let config = ViewerConfig::default().with_pulse_duration(Duration::from_millis(5));
        let (listener, addr) = listen().await;
        let server = task::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.send(Message::text(data_frame("0:1"))).await.unwrap();
            task::sleep(Duration::from_millis(100)).await;
            serve(ws, Vec::new()).await;
        });

        let (mut session, view, deferred) = session(&config);
        let check = view.clone();
        let watcher = async move {
            task::sleep(Duration::from_millis(60)).await;
            (check.pulses(), check.has_marker("pulse"))
        };

        let native = viewer(&config, addr);
        let run = native.run(&mut session, &deferred);
        let (_, (pulses, marked)) = futures::join!(run, watcher);
        server.await;

        assert_eq!(pulses, 1);
        assert!(!marked);
        assert_eq!(view.rows(), vec![TableRow::spanning(CLOSED_TEXT)]);
    });
}
