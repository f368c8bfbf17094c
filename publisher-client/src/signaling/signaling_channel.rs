use crate::config::ClientConfig;
use crate::error::SignalingError;
use crate::signaling::{SignalingOutput, WIRE_TARGET};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use publisher_core::OutboundMessage;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Raw inbound text messages, in arrival order. Ends when the connection closes.
pub type InboundStream = BoxStream<'static, Result<String, SignalingError>>;

/// WebSocket connection to the signaling server.
pub struct SignalingChannel {
    sender: SignalingSender,
    receiver: Option<SplitStream<WsStream>>,
}

impl SignalingChannel {
    /// Connects to `config.server_url` and announces this client with a
    /// `connection` envelope.
    pub async fn connect(config: &ClientConfig) -> Result<Self, SignalingError> {
        let url = config.server_url.as_str();
        let secure = validate_url(url)?;

        let connector = if secure {
            Some(tls_connector(config.skip_certificate_validation)?)
        } else {
            warn!("Signaling over unencrypted {}", url);
            None
        };

        let (ws, _response) =
            tokio_tungstenite::connect_async_tls_with_config(url, None, false, connector)
                .await
                .map_err(|source| SignalingError::Connection {
                    url: url.to_owned(),
                    source,
                })?;
        info!("Connected to signaling server {}", url);

        let (sink, stream) = ws.split();
        let channel = Self {
            sender: SignalingSender::new(sink),
            receiver: Some(stream),
        };

        channel
            .sender
            .send(OutboundMessage::connection(config.connection_info()))
            .await?;

        Ok(channel)
    }

    /// Cloneable handle for sending; safe to use from any task.
    pub fn sender(&self) -> SignalingSender {
        self.sender.clone()
    }

    /// Sends `{message: message_type, data: payload}`.
    pub async fn send(&self, message_type: &str, payload: Vec<Value>) -> Result<(), SignalingError> {
        self.sender.send_envelope(message_type, payload).await
    }

    /// Takes the inbound message sequence. Can only be taken once.
    pub fn receive(&mut self) -> Result<InboundStream, SignalingError> {
        let stream = self
            .receiver
            .take()
            .ok_or(SignalingError::AlreadyReceiving)?;
        Ok(inbound_text(stream))
    }
}

/// Sending half of [`SignalingChannel`]. Writes are serialized by a mutex.
#[derive(Clone)]
pub struct SignalingSender {
    sink: Arc<Mutex<SplitSink<WsStream, Message>>>,
}

impl SignalingSender {
    fn new(sink: SplitSink<WsStream, Message>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    pub async fn send_envelope(
        &self,
        message_type: &str,
        payload: Vec<Value>,
    ) -> Result<(), SignalingError> {
        let envelope = serde_json::json!({
            "message": message_type,
            "data": payload,
        });
        self.transmit(envelope.to_string()).await
    }

    async fn transmit(&self, json: String) -> Result<(), SignalingError> {
        info!(target: WIRE_TARGET, "-> {}", json);
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(json))
            .await
            .map_err(SignalingError::Send)
    }

    pub async fn close(&self) -> Result<(), SignalingError> {
        let mut sink = self.sink.lock().await;
        sink.close().await.map_err(SignalingError::Send)
    }
}

#[async_trait]
impl SignalingOutput for SignalingSender {
    async fn send(&self, msg: OutboundMessage) -> Result<(), SignalingError> {
        let json = msg.to_json()?;
        self.transmit(json).await
    }
}

/// Returns whether the url asks for TLS.
fn validate_url(url: &str) -> Result<bool, SignalingError> {
    let uri: Uri = url.parse().map_err(|e: tungstenite::http::uri::InvalidUri| {
        SignalingError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    })?;

    match uri.scheme_str() {
        Some("wss") => Ok(true),
        Some("ws") => Ok(false),
        other => Err(SignalingError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("expected ws:// or wss://, got {:?}", other.unwrap_or("")),
        }),
    }
}

fn tls_connector(skip_certificate_validation: bool) -> Result<Connector, SignalingError> {
    let mut builder = native_tls::TlsConnector::builder();
    if skip_certificate_validation {
        warn!("TLS certificate validation is DISABLED; the signaling server is not authenticated");
        builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }
    Ok(Connector::NativeTls(builder.build()?))
}

fn inbound_text<S>(stream: S) -> InboundStream
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Send + Unpin + 'static,
{
    stream::unfold(stream, |mut stream| async move {
        loop {
            let item = match stream.next().await? {
                Ok(Message::Text(text)) => {
                    info!(target: WIRE_TARGET, "<- {}", text);
                    Ok(text)
                }
                Ok(Message::Close(frame)) => {
                    info!("Signaling server closed the connection: {:?}", frame);
                    return None;
                }
                Ok(Message::Binary(data)) => {
                    warn!("Ignoring {} byte binary frame", data.len());
                    continue;
                }
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return None;
                }
                Err(e) => Err(SignalingError::Receive(e)),
            };
            return Some((item, stream));
        }
    })
    .boxed()
}
