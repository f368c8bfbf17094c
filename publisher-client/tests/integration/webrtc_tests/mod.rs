pub mod test_session_with_endpoint;
