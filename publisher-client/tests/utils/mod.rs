pub mod fake_server;
pub mod mock_signaling;

pub use fake_pipeline::*;
pub use fake_server::*;
pub use mock_signaling::*;
pub use sdp_fixtures::*;
