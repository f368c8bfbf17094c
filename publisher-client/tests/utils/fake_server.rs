use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};

type Script = (
    mpsc::UnboundedSender<String>,
    mpsc::UnboundedReceiver<String>,
);

/// Stand-in for the signaling server: accepts a single WebSocket client,
/// records every text frame it receives and sends whatever the test pushes.
///
/// Dropping the server (or calling [`FakeSignalingServer::hang_up`]) closes
/// the client connection.
pub struct FakeSignalingServer {
    pub url: String,
    received: mpsc::UnboundedReceiver<String>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

impl FakeSignalingServer {
    pub async fn start() -> Self {
        let (received_tx, received) = mpsc::unbounded_channel();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let script: Arc<Mutex<Option<Script>>> =
            Arc::new(Mutex::new(Some((received_tx, outgoing_rx))));

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(script);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake signaling server");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("ws://{}/ws", addr),
            received,
            outgoing: Some(outgoing),
        }
    }

    pub fn send(&self, text: String) {
        if let Some(tx) = &self.outgoing {
            let _ = tx.send(text);
        }
    }

    pub fn hang_up(&mut self) {
        self.outgoing = None;
    }

    /// Next text frame from the client, parsed as JSON.
    pub async fn next_message(&mut self, timeout_ms: u64) -> Option<serde_json::Value> {
        let text = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.received.recv(),
        )
        .await
        .ok()??;
        serde_json::from_str(&text).ok()
    }

    /// Skips frames until one with the given `message` tag arrives.
    pub async fn expect_message(&mut self, tag: &str, timeout_ms: u64) -> serde_json::Value {
        loop {
            let msg = self
                .next_message(timeout_ms)
                .await
                .unwrap_or_else(|| panic!("Timeout waiting for {}", tag));
            if msg["message"] == tag {
                return msg;
            }
            tracing::debug!("[FakeServer] skipping {}", msg["message"]);
        }
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(script): State<Arc<Mutex<Option<Script>>>>,
) -> impl IntoResponse {
    let script = script.lock().await.take();
    ws.on_upgrade(move |socket| async move {
        if let Some(script) = script {
            handle_socket(socket, script).await;
        }
    })
}

async fn handle_socket(socket: WebSocket, (received, mut outgoing): Script) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = received.send(text.to_string());
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },

            out = outgoing.recv() => match out {
                Some(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }
}
