//! OAuth-protected MCP HTTP endpoint for the greeting tools.
//!
//! Every `POST /mcp` passes an [`AuthGate`] before reaching the stateless
//! JSON-RPC transport. The gate checks for a bearer token, a configured
//! audience and, for `tools/call`, the scopes the named tool requires. Token
//! validation itself sits behind [`CredentialValidator`].
//!
//! Two hosting adapters share the gate:
//!
//! - `process`: axum routes with the gate as route middleware
//! - `edge`: a fetch-style [`EdgeWorker`] with hand-written routing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use greeting_server::{standard_registry, GreetingRouter, HostingProfile};
//! # use greeting_server::CredentialValidator;
//!
//! # async fn example(validator: Arc<dyn CredentialValidator>) -> Result<(), Box<dyn std::error::Error>> {
//! let app = GreetingRouter::new(standard_registry(false)?)
//!     .audience("https://greet.example.com")
//!     .validator(validator)
//!     .profile(HostingProfile::Edge)
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3002").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod router;
pub(crate) mod state;
pub mod telemetry;
pub mod transport;

// Re-exports
pub use adapters::edge::EdgeWorker;
pub use adapters::HostingProfile;
pub use auth::{
    AuthGate, CredentialValidator, Denial, DenyReason, IdentityProviderClient,
    IdentityProviderSettings, LazyValidator, ValidationError, ValidationOptions, Verdict,
};
pub use config::{Args, ConfigError, ServerConfig};
pub use error::{BuildError, ServerError, ServerResult};
pub use router::{standard_registry, GreetingRouter};
pub use telemetry::{init_telemetry, LogFormat};
