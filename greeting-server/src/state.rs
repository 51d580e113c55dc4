//! Application state shared by both hosting adapters.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::AuthGate;
use crate::transport::RpcTransport;

/// Cloned into every request handler; all members are shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub transport: RpcTransport,
    /// Protected-resource metadata document served on the well-known paths.
    pub metadata: Arc<Value>,
    pub body_limit: usize,
}
