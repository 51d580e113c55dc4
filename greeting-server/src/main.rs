use anyhow::Context;
use clap::Parser;
use greeting_server::{init_telemetry, Args, GreetingRouter, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_telemetry(args.log_format)?;

    let config = ServerConfig::from_args(args)?;

    if config.audience.is_empty() {
        tracing::warn!("EXPECTED_AUDIENCE is not set; every /mcp request will fail with 500");
    }
    if !config.identity_provider.is_complete() {
        tracing::warn!(
            "identity provider credentials are incomplete; /mcp requests will be rejected"
        );
    }

    let app = GreetingRouter::from_config(&config)?.build()?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        profile = ?config.profile,
        todo_tools = config.enable_todo_tools,
        server = %config.server_name,
        "greeting MCP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not listen for ctrl-c; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
