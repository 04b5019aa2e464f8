//! Ratio Forge API Server module
//!
//! Provides an HTTP REST API over the calculator with per-user sessions.
//! Run with `ratio-forge-server`.

pub mod handlers;
pub mod server;
pub mod sessions;

pub use server::{router, run_api_server, AppState};
pub use sessions::SessionStore;
