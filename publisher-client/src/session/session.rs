use crate::error::ClientError;
use crate::media::{
    EndpointField, MediaEndpoint, MediaPipeline, PadDirection, PipelineEvent, RemotePad, SinkKind,
};
use crate::session::repair_answer;
use crate::signaling::{InboundStream, SignalingOutput};
use futures::StreamExt;
use publisher_core::{
    Identity, InboundMessage, MediaSessionId, OutboundMessage, PublishStream, SessionDescription,
    SessionState, StreamStatus,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const EVENT_QUEUE_SIZE: usize = 256;

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The signaling server closed the connection.
    StreamEnded,
    /// The server reported the stream as `UNPUBLISHED`.
    Unpublished,
}

/// One publishing session: owns the session state and drives the media
/// pipeline from the signaling messages.
///
/// Everything that mutates state happens on the loop in [`Session::run`].
/// The pipeline and spawned tasks talk back through a [`PipelineEvent`] queue.
pub struct Session {
    identity: Identity,
    media_session_id: MediaSessionId,
    state: SessionState,
    signaling: Arc<dyn SignalingOutput>,
    pipeline: Arc<dyn MediaPipeline>,
    endpoint: Option<Arc<dyn MediaEndpoint>>,
    // Replaced on every pipeline start so that events of a closed
    // endpoint can never reach its successor.
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
    event_rx: Option<mpsc::Receiver<PipelineEvent>>,
}

impl Session {
    pub fn new(
        identity: Identity,
        signaling: Arc<dyn SignalingOutput>,
        pipeline: Arc<dyn MediaPipeline>,
    ) -> Self {
        Self {
            identity,
            media_session_id: MediaSessionId::new(),
            state: SessionState::Init,
            signaling,
            pipeline,
            endpoint: None,
            event_tx: None,
            event_rx: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn media_session_id(&self) -> &MediaSessionId {
        &self.media_session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handles inbound messages and pipeline events until the server closes
    /// the connection or unpublishes the stream. The endpoint is closed on
    /// every way out.
    pub async fn run(mut self, mut inbound: InboundStream) -> Result<SessionExit, ClientError> {
        self.state = SessionState::Connected;
        info!(
            "Session {} started as {}",
            self.media_session_id, self.identity
        );

        let result = self.event_loop(&mut inbound).await;

        self.close_endpoint().await;
        match &result {
            Ok(exit) => info!("Session finished: {:?}", exit),
            Err(e) => error!("Session failed: {}", e),
        }
        result
    }

    async fn event_loop(&mut self, inbound: &mut InboundStream) -> Result<SessionExit, ClientError> {
        loop {
            tokio::select! {
                msg = inbound.next() => {
                    match msg {
                        Some(Ok(text)) => {
                            if let Some(exit) = self.handle_text(&text).await? {
                                return Ok(exit);
                            }
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            info!("Signaling stream ended");
                            return Ok(SessionExit::StreamEnded);
                        }
                    }
                }

                Some(event) = next_event(&mut self.event_rx) => {
                    self.handle_pipeline_event(event).await?;
                }
            }
        }
    }

    async fn handle_text(&mut self, text: &str) -> Result<Option<SessionExit>, ClientError> {
        match InboundMessage::parse(text) {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                warn!("Dropping malformed message: {}", e);
                Ok(None)
            }
        }
    }

    async fn handle_message(
        &mut self,
        msg: InboundMessage,
    ) -> Result<Option<SessionExit>, ClientError> {
        match msg {
            InboundMessage::GetUserData | InboundMessage::GetVersion => {}

            InboundMessage::Ping => {
                self.report_status();
                self.signaling.send(OutboundMessage::pong()).await?;
                self.publish().await?;
            }

            InboundMessage::SetRemoteSdp { sdp } => self.apply_remote_sdp(sdp),

            InboundMessage::NotifyStreamStatus { status } => {
                return Ok(self.apply_stream_status(status));
            }

            InboundMessage::Unknown(tag) => debug!("Ignoring message {:?}", tag),
        }
        Ok(None)
    }

    fn report_status(&self) {
        let Some(endpoint) = &self.endpoint else {
            info!("WebRTC endpoint not initialized");
            return;
        };
        for field in EndpointField::ALL {
            info!("{}: {}", field.name(), endpoint.endpoint_state(field));
        }
    }

    /// Starts the pipeline unless this connected period already did.
    async fn publish(&mut self) -> Result<(), ClientError> {
        if matches!(self.state, SessionState::Publish | SessionState::Streaming) {
            return Ok(());
        }
        self.state = SessionState::Publish;

        // Left over from a FAILED attempt.
        self.close_endpoint().await;

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);
        self.event_rx = Some(rx);
        let endpoint = self.pipeline.start(tx.clone()).await?;
        self.event_tx = Some(tx);
        self.endpoint = Some(endpoint);

        info!("Publishing as {}", self.identity);
        Ok(())
    }

    fn apply_remote_sdp(&mut self, sdp: Option<String>) {
        if self.state != SessionState::Publish {
            debug!("Dropping setRemoteSDP in state {}", self.state);
            return;
        }
        let Some(endpoint) = self.endpoint.clone() else {
            debug!("Dropping setRemoteSDP without an endpoint");
            return;
        };
        let Some(text) = sdp else {
            warn!("setRemoteSDP carries no SDP");
            return;
        };

        let answer = match repair_answer(&text) {
            Ok(answer) => answer,
            Err(e) => {
                error!("Cannot use remote SDP: {}", e);
                return;
            }
        };

        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let Err(e) = endpoint.set_remote_description(answer).await else {
                debug!("Remote description applied");
                return;
            };
            report_failure(events, "set remote description", e.to_string()).await;
        });
    }

    fn apply_stream_status(&mut self, status: Option<StreamStatus>) -> Option<SessionExit> {
        match status {
            Some(StreamStatus::Publishing) => {
                info!("Stream is live");
                self.state = SessionState::Streaming;
            }
            Some(StreamStatus::Failed) => {
                warn!("Server reported the stream as failed, will publish again");
                self.state = SessionState::Connected;
            }
            Some(StreamStatus::Unpublished) => {
                info!("Stream unpublished");
                return Some(SessionExit::Unpublished);
            }
            other => debug!("Ignoring stream status {:?}", other),
        }
        None
    }

    async fn handle_pipeline_event(&mut self, event: PipelineEvent) -> Result<(), ClientError> {
        let Some(endpoint) = self.endpoint.clone() else {
            debug!("No endpoint for {:?}", event);
            return Ok(());
        };

        match event {
            PipelineEvent::NegotiationNeeded => {
                let events = self.event_tx.clone();
                tokio::spawn(async move {
                    match endpoint.create_offer().await {
                        Ok(offer) => {
                            if let Some(tx) = events {
                                let _ = tx.send(PipelineEvent::OfferCreated(offer)).await;
                            }
                        }
                        Err(e) => report_failure(events, "create offer", e.to_string()).await,
                    }
                });
            }

            PipelineEvent::OfferCreated(offer) => self.on_offer_created(endpoint, offer).await?,

            PipelineEvent::PadAdded(pad) => {
                if pad.direction != PadDirection::Src {
                    debug!("Ignoring {:?} pad {}", pad.direction, pad.id);
                    return Ok(());
                }
                if let Err(e) = endpoint.attach_demuxer(&pad).await {
                    error!("Failed to demux pad {}: {}", pad.id, e);
                }
            }

            PipelineEvent::DemuxedPadAdded(pad) => Self::link_sink(endpoint.as_ref(), &pad).await,

            PipelineEvent::Failed { context, error } => error!("{} failed: {}", context, error),
        }
        Ok(())
    }

    async fn on_offer_created(
        &mut self,
        endpoint: Arc<dyn MediaEndpoint>,
        offer: SessionDescription,
    ) -> Result<(), ClientError> {
        debug!("Offer created:\n{}", offer.sdp);
        let sdp = offer.sdp.clone();
        endpoint.set_local_description(offer).await?;

        let stream = PublishStream::pending(&self.media_session_id, &self.identity, sdp);
        self.signaling
            .send(OutboundMessage::publish_stream(stream))
            .await?;
        Ok(())
    }

    async fn link_sink(endpoint: &dyn MediaEndpoint, pad: &RemotePad) {
        let Some(caps) = pad.caps.as_deref() else {
            info!("Pad {} has no caps, ignoring", pad.id);
            return;
        };
        let Some(kind) = SinkKind::for_caps(caps) else {
            info!("Unknown pad {} with caps {}, ignoring", pad.id, caps);
            return;
        };

        match endpoint.attach_sink(pad, kind).await {
            Ok(()) => info!("Linked {} pad {} to {} sink", caps, pad.id, kind),
            Err(e) => error!("Failed to link pad {} to {} sink: {}", pad.id, kind, e),
        }
    }

    async fn close_endpoint(&mut self) {
        self.event_tx = None;
        self.event_rx = None;
        let Some(endpoint) = self.endpoint.take() else {
            return;
        };
        if let Err(e) = endpoint.close().await {
            warn!("Failed to close endpoint: {}", e);
        }
    }
}

async fn next_event(events: &mut Option<mpsc::Receiver<PipelineEvent>>) -> Option<PipelineEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn report_failure(
    events: Option<mpsc::Sender<PipelineEvent>>,
    context: &'static str,
    error: String,
) {
    match events {
        Some(tx) => {
            if tx
                .send(PipelineEvent::Failed {
                    context,
                    error: error.clone(),
                })
                .await
                .is_err()
            {
                warn!("{} failed after the pipeline was replaced: {}", context, error);
            }
        }
        None => warn!("{} failed: {}", context, error),
    }
}
