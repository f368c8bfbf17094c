use crate::media::RemotePad;
use publisher_core::SessionDescription;

/// Events the media pipeline posts into the session's queue.
///
/// Pipeline callbacks run on webrtc's own tasks; they never touch session
/// state directly, they only enqueue one of these.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The endpoint wants a (re)negotiation.
    NegotiationNeeded,

    /// Offer creation requested on `NegotiationNeeded` has completed.
    OfferCreated(SessionDescription),

    /// A new inbound pad appeared on the endpoint.
    PadAdded(RemotePad),

    /// The demuxer attached to an inbound pad has found its media type.
    /// `caps` is `None` when it could not be determined.
    DemuxedPadAdded(RemotePad),

    /// An operation that nobody awaits has failed.
    Failed { context: &'static str, error: String },
}
