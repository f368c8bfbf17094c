mod signaling_channel;
mod signaling_output;

pub use signaling_channel::*;
pub use signaling_output::*;

/// Log target of the raw envelope trace (`-> ...` / `<- ...`).
pub const WIRE_TARGET: &str = "publisher::wire";
