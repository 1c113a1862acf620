//! Serve command - runs the agent pool behind the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use tether_agent::{AgentFactory, MockBackend, ModelCatalog, OpenAiBackend, OpenAiConfig, SharedBackend};
use tether_config::{BackendKind, BackendSection, TetherConfig};
use tether_pool::KeyedPool;
use tether_server::{AgentPool, Server, ServerConfig};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Run the server until Ctrl+C.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let (mut config, source) = tether_config::load_config(ctx.config_path.as_deref())?;
    match &source {
        Some(path) => info!(path = %path.display(), "Loaded config"),
        None => info!("No config file found, using defaults"),
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    let backend = build_backend(&config.backend)?;
    let pool = build_pool(&config, backend);
    let server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_default_provider(config.agent.default_provider.clone());

    if ctx.verbose {
        println!("Backend: {:?}", config.backend.kind);
        println!("Session dir: {}", config.agent.session_dir.display());
        println!(
            "Pool: max {} agents, ttl {} min",
            config.pool.max_agents, config.pool.ttl_minutes
        );
    }

    pool.start();

    println!("Tether server starting on http://{}", addr);
    println!("Press Ctrl+C to stop");

    let result = Server::new(pool.clone(), server_config)
        .run(shutdown_signal())
        .await;

    pool.stop().await;
    result?;
    Ok(())
}

/// Build the LLM backend shared by every agent.
pub fn build_backend(section: &BackendSection) -> Result<SharedBackend> {
    match section.kind {
        BackendKind::Mock => {
            warn!("Using the mock backend; replies echo the user's message");
            Ok(Arc::new(MockBackend::echo()))
        }
        BackendKind::OpenAi => {
            let mut openai = match &section.base_url {
                Some(url) => OpenAiConfig::new(url.clone()),
                None => OpenAiConfig::default(),
            }
            .with_timeout(section.timeout())
            .with_max_retries(section.max_retries);

            match std::env::var(&section.api_key_env) {
                Ok(key) if !key.is_empty() => openai = openai.with_api_key(key),
                _ => warn!(
                    env_var = %section.api_key_env,
                    "No API key set, sending unauthenticated requests"
                ),
            }

            Ok(Arc::new(OpenAiBackend::new(openai)?))
        }
    }
}

/// Build the agent pool described by `config`. The pool is not started.
pub fn build_pool(config: &TetherConfig, backend: SharedBackend) -> AgentPool {
    let catalog = ModelCatalog::default().extend(config.models.clone());
    let factory = AgentFactory::new(backend)
        .with_catalog(catalog)
        .with_session_dir(config.agent.session_dir.clone())
        .with_window_size(config.agent.window_size)
        .with_system_prompt(config.agent.system_prompt.clone())
        .with_max_tokens(config.agent.max_tokens);

    KeyedPool::new(config.pool.to_pool_config(), factory)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
