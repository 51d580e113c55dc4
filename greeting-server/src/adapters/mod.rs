//! Hosting adapters. Both route to the same gate and transport.
//!
//! - [`edge`]: a single fetch-style entry point with hand-written routing,
//!   for hosts that hand over one request at a time.
//! - [`process`]: an axum router with the gate as route middleware, for a
//!   long-running server process.

pub mod edge;
pub mod process;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::state::AppState;

/// How the server is hosted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HostingProfile {
    /// Fetch-style dispatcher.
    Edge,
    /// Axum router with middleware.
    #[default]
    Process,
}

/// Serve the protected-resource metadata document. Public.
pub(crate) async fn metadata(State(state): State<AppState>) -> Response {
    Json(state.metadata.as_ref().clone()).into_response()
}
