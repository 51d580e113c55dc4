//! Process configuration: command-line flags with environment fallbacks,
//! resolved once at startup into an immutable [`ServerConfig`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;

use crate::adapters::HostingProfile;
use crate::auth::IdentityProviderSettings;
use crate::telemetry::LogFormat;

/// OAuth-protected MCP server exposing the greeting tools.
#[derive(Debug, Clone, Parser)]
#[command(name = "greeting-server", version, about)]
pub struct Args {
    /// Identity-provider environment URL
    #[arg(long, env = "SK_ENV_URL", default_value = "")]
    pub sk_env_url: String,

    /// Identity-provider client id
    #[arg(long, env = "SK_CLIENT_ID", default_value = "")]
    pub sk_client_id: String,

    /// Identity-provider client secret
    #[arg(long, env = "SK_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub sk_client_secret: String,

    /// Audience tokens must be issued for. Empty fails every gated request
    #[arg(long, env = "EXPECTED_AUDIENCE", default_value = "")]
    pub expected_audience: String,

    /// Protected-resource metadata as inline JSON
    #[arg(long, env = "PROTECTED_RESOURCE_METADATA", default_value = "")]
    pub protected_resource_metadata: String,

    /// Path to a protected-resource metadata JSON file, read when no inline
    /// metadata is given
    #[arg(long, env = "PROTECTED_RESOURCE_METADATA_FILE")]
    pub protected_resource_metadata_file: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3002)]
    pub port: u16,

    /// Server name reported by `initialize`
    #[arg(long, env = "MCP_SERVER_NAME", default_value = "Greeting MCP")]
    pub server_name: String,

    /// Server version reported by `initialize`
    #[arg(long, env = "MCP_SERVER_VERSION", default_value = "1.0.0")]
    pub server_version: String,

    /// Hosting adapter
    #[arg(long, env = "HOSTING_PROFILE", value_enum, default_value_t = HostingProfile::Process)]
    pub hosting_profile: HostingProfile,

    /// Register the todo tools alongside `greet_user`
    #[arg(
        long,
        env = "ENABLE_TODO_TOOLS",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub enable_todo_tools: bool,

    /// Upper bound on one token validation, in seconds
    #[arg(long, env = "VALIDATION_TIMEOUT_SECS", default_value_t = 10)]
    pub validation_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Protected-resource metadata is not valid JSON: {0}")]
    InvalidMetadata(#[source] serde_json::Error),

    #[error("Protected-resource metadata must be a JSON object")]
    MetadataNotObject,

    #[error("Failed to read metadata file {path}: {source}")]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation timeout must be at least one second")]
    ZeroTimeout,
}

/// Resolved, immutable server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub identity_provider: IdentityProviderSettings,
    pub audience: String,
    pub metadata: Value,
    pub bind: SocketAddr,
    pub server_name: String,
    pub server_version: String,
    pub profile: HostingProfile,
    pub enable_todo_tools: bool,
    pub validation_timeout: Duration,
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.validation_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let metadata = load_metadata(
            &args.protected_resource_metadata,
            args.protected_resource_metadata_file.as_deref(),
        )?;

        Ok(Self {
            identity_provider: IdentityProviderSettings {
                env_url: args.sk_env_url,
                client_id: args.sk_client_id,
                client_secret: args.sk_client_secret,
            },
            audience: args.expected_audience.trim().to_string(),
            metadata,
            bind: SocketAddr::new(args.host, args.port),
            server_name: args.server_name,
            server_version: args.server_version,
            profile: args.hosting_profile,
            enable_todo_tools: args.enable_todo_tools,
            validation_timeout: Duration::from_secs(args.validation_timeout_secs),
            log_format: args.log_format,
        })
    }
}

/// Inline JSON wins; otherwise the file if it exists; otherwise `{}`.
pub fn load_metadata(inline: &str, file: Option<&std::path::Path>) -> Result<Value, ConfigError> {
    let raw = if !inline.trim().is_empty() {
        inline.to_string()
    } else {
        match file {
            Some(path) if path.exists() => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::ReadMetadata {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            _ => return Ok(Value::Object(Default::default())),
        }
    };

    let value: Value = serde_json::from_str(&raw).map_err(ConfigError::InvalidMetadata)?;
    if !value.is_object() {
        return Err(ConfigError::MetadataNotObject);
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
