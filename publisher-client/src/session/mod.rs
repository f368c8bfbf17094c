mod sdp_repair;
mod session;

pub use sdp_repair::*;
pub use session::*;
