use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{AppState, build_router};
use shared::config::{ApiConfig, LogFormat, load_dotenv};
use shared::llm::OpenAiChatGateway;
use shared::service::{CompletionSettings, MindMapService, SERVICE_VERSION};
use shared::sessions::InMemorySessionStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let config = ApiConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|config| config.log_format)
            .unwrap_or(LogFormat::Text),
    );

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load api config");
            std::process::exit(1);
        }
    };

    let api_configured = config.openai.has_credential();
    if !api_configured {
        warn!("OPENAI_API_KEY is not configured; /ask will answer with fallback replies");
    }

    let gateway = match OpenAiChatGateway::new(config.openai.clone()) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!(error = %err, "failed to initialize completion gateway");
            std::process::exit(1);
        }
    };

    let service = MindMapService::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(gateway),
        CompletionSettings::from(&config.openai),
        api_configured,
    );
    let app = build_router(AppState { service });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, bind_addr = %config.bind_addr, "invalid bind addr");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, bind_addr = %addr, "failed to bind api listener");
            std::process::exit(1);
        }
    };

    info!(
        bind_addr = %listener.local_addr().unwrap_or(addr),
        version = SERVICE_VERSION,
        model = %config.openai.model,
        api_configured,
        "mind map api listening"
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "mind map api failed");
        std::process::exit(1);
    }
}

fn init_tracing(log_format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("api_server=info,shared=info,axum=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
