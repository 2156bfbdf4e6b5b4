//! Integration tests for the SpotLight server.
//!
//! Each test builds the real router over in-memory collaborators; WebSocket
//! tests serve it on an ephemeral port.

mod api_test;
mod helpers;
mod ws_test;
