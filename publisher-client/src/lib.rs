mod config;
mod error;
mod media;
mod session;
mod signaling;

pub use config::*;
pub use error::*;
pub use media::*;
pub use session::*;
pub use signaling::*;
