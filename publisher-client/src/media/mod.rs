mod media_endpoint;
mod pipeline_event;
mod preflight;
mod remote_sink;
mod synthetic_source;
mod transport_config;
mod webrtc_pipeline;

pub use media_endpoint::*;
pub use pipeline_event::*;
pub use preflight::*;
pub use remote_sink::*;
pub use synthetic_source::*;
pub use transport_config::*;
pub use webrtc_pipeline::*;
