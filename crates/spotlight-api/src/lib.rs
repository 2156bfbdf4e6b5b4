//! # spotlight-api
//!
//! HTTP API layer for SpotLight built on Axum.
//!
//! Provides the WebSocket upgrade into the real-time router, login and
//! message-history endpoints, health checks, CORS and request logging,
//! DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
