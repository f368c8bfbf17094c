pub mod test_ping_publishes;
pub mod test_unknown_messages;
