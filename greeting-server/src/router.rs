//! Router builder for the greeting MCP endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use greeting_core::rpc::McpHandler;
use greeting_core::tools::{todo_tools, GreetUser, TodoStore};
use greeting_core::{RegistryError, ToolRegistry};
use serde_json::Value;

use crate::adapters::edge::{self, EdgeWorker};
use crate::adapters::{process, HostingProfile};
use crate::auth::{
    AuthGate, CredentialValidator, IdentityProviderClient, IdentityProviderSettings,
    LazyValidator, ValidationError, DEFAULT_VALIDATION_TIMEOUT,
};
use crate::config::ServerConfig;
use crate::error::BuildError;
use crate::state::AppState;
use crate::transport::{RpcTransport, DEFAULT_BODY_LIMIT};

const DEFAULT_SERVER_NAME: &str = "Greeting MCP";
const DEFAULT_SERVER_VERSION: &str = "1.0.0";

/// Registry with `greet_user` and, optionally, the todo tools over a fresh
/// in-memory store.
pub fn standard_registry(with_todos: bool) -> Result<ToolRegistry, RegistryError> {
    let builder = ToolRegistry::builder().tool(GreetUser);
    let builder = if with_todos {
        builder.tools(todo_tools(&TodoStore::new()))
    } else {
        builder
    };
    builder.build()
}

/// Builder for the authorized MCP router.
///
/// # Example
///
/// ```rust,no_run
/// use greeting_server::{standard_registry, GreetingRouter, IdentityProviderSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = GreetingRouter::new(standard_registry(false)?)
///     .audience("https://greet.example.com")
///     .identity_provider(IdentityProviderSettings {
///         env_url: "https://acme.example-idp.com".into(),
///         client_id: "client".into(),
///         client_secret: "secret".into(),
///     })
///     .build()?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3002").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct GreetingRouter {
    registry: ToolRegistry,
    audience: String,
    validator: Option<LazyValidator>,
    metadata: Value,
    profile: HostingProfile,
    server_name: String,
    server_version: String,
    instructions: Option<String>,
    validation_timeout: Duration,
    body_limit: usize,
}

impl GreetingRouter {
    /// Create a new router builder serving `registry`.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            audience: String::new(),
            validator: None,
            metadata: Value::Object(Default::default()),
            profile: HostingProfile::default(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: DEFAULT_SERVER_VERSION.to_string(),
            instructions: None,
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Builder preloaded from resolved configuration.
    ///
    /// The identity-provider client is built lazily on the first gated
    /// request, so missing credentials surface as 401s, not a startup error.
    pub fn from_config(config: &ServerConfig) -> Result<Self, BuildError> {
        let registry = standard_registry(config.enable_todo_tools)?;
        Ok(Self::new(registry)
            .audience(config.audience.clone())
            .identity_provider(config.identity_provider.clone())
            .metadata(config.metadata.clone())
            .profile(config.profile)
            .server_info(config.server_name.clone(), config.server_version.clone())
            .validation_timeout(config.validation_timeout))
    }

    /// Audience every token must carry. Left empty, gated requests get 500.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Use an already constructed validator.
    pub fn validator(mut self, validator: Arc<dyn CredentialValidator>) -> Self {
        self.validator = Some(LazyValidator::ready(validator));
        self
    }

    /// Construct the validator on first use with `factory`.
    pub fn validator_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn CredentialValidator>, ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(LazyValidator::new(factory));
        self
    }

    /// Validate against a JWKS-backed identity provider, built on first use.
    pub fn identity_provider(self, settings: IdentityProviderSettings) -> Self {
        self.validator_factory(move || {
            let client = IdentityProviderClient::new(&settings)?;
            Ok(Arc::new(client) as Arc<dyn CredentialValidator>)
        })
    }

    /// Protected-resource metadata served on the well-known paths.
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn profile(mut self, profile: HostingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Name and version reported in the `initialize` result.
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_name = name.into();
        self.server_version = version.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Build the router for the selected hosting profile.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoValidator`] if no validator source was set.
    pub fn build(self) -> Result<Router, BuildError> {
        let profile = self.profile;
        let state = self.into_state()?;

        tracing::debug!(profile = ?profile, "building router");
        Ok(match profile {
            HostingProfile::Edge => edge::router(state),
            HostingProfile::Process => process::router(state),
        })
    }

    /// Build a bare [`EdgeWorker`] for hosts that drive `fetch` directly.
    ///
    /// The hosting profile setting is ignored.
    pub fn build_edge_worker(self) -> Result<EdgeWorker, BuildError> {
        Ok(EdgeWorker::new(self.into_state()?))
    }

    fn into_state(self) -> Result<AppState, BuildError> {
        let validator = self.validator.ok_or(BuildError::NoValidator)?;

        let gate = AuthGate::new(self.audience, self.registry.clone(), validator)
            .with_timeout(self.validation_timeout);

        let mut handler = McpHandler::new(self.registry, self.server_name, self.server_version);
        if let Some(instructions) = self.instructions {
            handler = handler.with_instructions(instructions);
        }

        Ok(AppState {
            gate: Arc::new(gate),
            transport: RpcTransport::new(handler),
            metadata: Arc::new(self.metadata),
            body_limit: self.body_limit,
        })
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
