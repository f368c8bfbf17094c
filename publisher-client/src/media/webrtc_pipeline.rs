use crate::error::MediaError;
use crate::media::{
    EndpointField, MediaEndpoint, MediaPipeline, PipelineEvent, RemotePad, RemoteSink, SinkKind,
    SyntheticSource, TestPattern, TransportConfig,
};
use anyhow::Context;
use async_trait::async_trait;
use publisher_core::{SdpType, SessionDescription};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::policy::bundle_policy::RTCBundlePolicy;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Caps of a fresh inbound pad, before the demuxer has looked at it.
pub const RTP_CAPS: &str = "application/x-rtp";

const STREAM_ID: &str = "publisher";

/// webrtc-rs backed pipeline: a sendrecv peer connection with a synthetic
/// VP8 video track and a synthetic Opus audio track.
#[derive(Debug, Clone, Default)]
pub struct WebRtcPipeline {
    config: TransportConfig,
}

impl WebRtcPipeline {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

/// Media engine with the default codecs and the default interceptors (NACK, RTCP reports).
pub(crate) fn build_api() -> anyhow::Result<API> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .context("Failed to register default codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .context("Failed to register interceptors")?;

    Ok(APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .build())
}

pub(crate) fn rtc_config(config: &TransportConfig) -> RTCConfiguration {
    let ice_servers = if config.ice_servers.is_empty() {
        vec![]
    } else {
        vec![RTCIceServer {
            urls: config.ice_servers.clone(),
            ..Default::default()
        }]
    };

    RTCConfiguration {
        ice_servers,
        bundle_policy: RTCBundlePolicy::MaxBundle,
        ..Default::default()
    }
}

/// The outgoing video and audio tracks, in that order.
pub(crate) fn local_tracks() -> [(Arc<TrackLocalStaticSample>, TestPattern); 2] {
    let video = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            ..Default::default()
        },
        "video".to_owned(),
        STREAM_ID.to_owned(),
    ));
    let audio = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            ..Default::default()
        },
        "audio".to_owned(),
        STREAM_ID.to_owned(),
    ));
    [(video, TestPattern::Ball), (audio, TestPattern::Silence)]
}

/// Reads RTCP for a sender; interceptors only run while someone reads.
async fn drain_rtcp(sender: Arc<RTCRtpSender>) {
    let mut buf = vec![0u8; 1500];
    while let Ok((_, _)) = sender.read(&mut buf).await {}
}

#[async_trait]
impl MediaPipeline for WebRtcPipeline {
    async fn start(
        &self,
        events: mpsc::Sender<PipelineEvent>,
    ) -> Result<Arc<dyn MediaEndpoint>, MediaError> {
        info!("Starting pipeline");

        let api = build_api()?;
        let peer_connection = Arc::new(api.new_peer_connection(rtc_config(&self.config)).await?);
        let pads: Arc<Mutex<HashMap<String, Arc<TrackRemote>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                })
            },
        ));

        let negotiation_tx = events.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                debug!("Negotiation needed");
                let _ = tx.send(PipelineEvent::NegotiationNeeded).await;
            })
        }));

        let track_tx = events.clone();
        let track_pads = Arc::clone(&pads);
        let pad_counter = Arc::new(AtomicU64::new(0));
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let pads = Arc::clone(&track_pads);
                let n = pad_counter.fetch_add(1, Ordering::Relaxed);

                Box::pin(async move {
                    let id = format!("src_{}_{}", n, track.ssrc());
                    pads.lock().await.insert(id.clone(), track);
                    let _ = tx
                        .send(PipelineEvent::PadAdded(RemotePad::src(
                            id,
                            Some(RTP_CAPS.to_owned()),
                        )))
                        .await;
                })
            },
        ));

        let mut tasks = Vec::new();
        for (track, pattern) in local_tracks() {
            let sender = peer_connection
                .add_track(Arc::clone(&track) as Arc<dyn TrackLocal + Send + Sync>)
                .await?;
            tasks.push(tokio::spawn(drain_rtcp(sender)));
            tasks.push(tokio::spawn(SyntheticSource::new(track, pattern).run()));
        }

        Ok(Arc::new(WebRtcEndpoint {
            peer_connection,
            pads,
            events,
            tasks: Mutex::new(tasks),
        }))
    }
}

pub struct WebRtcEndpoint {
    peer_connection: Arc<RTCPeerConnection>,
    pads: Arc<Mutex<HashMap<String, Arc<TrackRemote>>>>,
    events: mpsc::Sender<PipelineEvent>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WebRtcEndpoint {
    async fn track_for(&self, pad: &RemotePad) -> Result<Arc<TrackRemote>, MediaError> {
        self.pads
            .lock()
            .await
            .get(&pad.id)
            .cloned()
            .ok_or_else(|| MediaError::UnknownPad(pad.id.clone()))
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, MediaError> {
    let rtc = match desc.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(rtc)
}

#[async_trait]
impl MediaEndpoint for WebRtcEndpoint {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), MediaError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), MediaError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn attach_demuxer(&self, pad: &RemotePad) -> Result<(), MediaError> {
        let track = self.track_for(pad).await?;
        let mime_type = track.codec().capability.mime_type.to_lowercase();
        let caps = (!mime_type.is_empty()).then_some(mime_type);
        debug!("Demuxer on {} found caps {:?}", pad.id, caps);

        let demuxed = RemotePad::src(pad.id.clone(), caps);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(PipelineEvent::DemuxedPadAdded(demuxed)).await;
        });
        Ok(())
    }

    async fn attach_sink(&self, pad: &RemotePad, kind: SinkKind) -> Result<(), MediaError> {
        let track = self
            .pads
            .lock()
            .await
            .remove(&pad.id)
            .ok_or_else(|| MediaError::UnknownPad(pad.id.clone()))?;

        let handle = tokio::spawn(RemoteSink::new(kind, track).run());
        self.tasks.lock().await.push(handle);
        Ok(())
    }

    fn endpoint_state(&self, field: EndpointField) -> String {
        let pc = &self.peer_connection;
        match field {
            EndpointField::ConnectionState => pc.connection_state().to_string(),
            EndpointField::SignalingState => pc.signaling_state().to_string(),
            EndpointField::IceGatheringState => pc.ice_gathering_state().to_string(),
            EndpointField::IceConnectionState => pc.ice_connection_state().to_string(),
        }
    }

    async fn close(&self) -> Result<(), MediaError> {
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.pads.lock().await.clear();
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection: {}", e);
            return Err(e.into());
        }
        info!("Pipeline stopped");
        Ok(())
    }
}
