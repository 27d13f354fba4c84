//! HTTP Module
//!
//! Redirect serving over Axum.
//!
//! ## Architecture
//! - Tokio runtime, one task per connection
//! - Single fallback route: each request path is a store lookup
//! - Store writes are finished before the listener is bound

mod handler;
mod server;

pub use handler::{redirect, AppState, Decision};
pub use server::{router, serve, shutdown_signal};
