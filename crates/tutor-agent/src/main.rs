//! # tutor-agent
//!
//! Tutor engine server binary — wires the stores, the browser-bridge and
//! generation clients, the orchestrator, the assessment engine, and the RPC
//! registry into one HTTP server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tutor_assess::engine::{AssessmentEngine, EngineConfig};
use tutor_assess::training::TrainingSession;
use tutor_browser::remote::RemoteDriver;
use tutor_core::corpus::KnowledgeCorpus;
use tutor_ingest::orchestrator::{IngestConfig, IngestOrchestrator};
use tutor_ingest::session::ProcessingSession;
use tutor_llm::http::HttpGenerator;
use tutor_rpc::context::RpcContext;
use tutor_rpc::registry::MethodRegistry;
use tutor_server::config::{self, ServerConfig};
use tutor_server::server::TutorServer;
use tutor_store::MemoryStore;

/// Tutor engine server.
#[derive(Parser, Debug)]
#[command(name = "tutor-agent", about = "Course ingestion and adaptive assessment server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Base URL of the generation service (overrides settings).
    #[arg(long)]
    generator_url: Option<String>,

    /// Base URL of the browser-bridge service (overrides settings).
    #[arg(long)]
    browser_url: Option<String>,
}

fn default_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tutor").join("settings.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let settings_path = cli.settings.unwrap_or_else(default_settings_path);
    let mut settings = config::load_settings_from_path(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(url) = cli.generator_url {
        settings.generator_url = Some(url);
    }
    if let Some(url) = cli.browser_url {
        settings.browser_url = Some(url);
    }

    let generator_url = settings
        .generator_url
        .clone()
        .context("no generation service configured (set generatorUrl or --generator-url)")?;
    let browser_url = settings
        .browser_url
        .clone()
        .context("no browser bridge configured (set browserUrl or --browser-url)")?;

    let generator = Arc::new(HttpGenerator::new(generator_url));
    let driver = Arc::new(RemoteDriver::new(browser_url));

    let corpora: Arc<MemoryStore<KnowledgeCorpus>> = Arc::new(MemoryStore::new());
    let processing: Arc<MemoryStore<ProcessingSession>> = Arc::new(MemoryStore::new());
    let trainings: Arc<MemoryStore<TrainingSession>> = Arc::new(MemoryStore::new());

    let orchestrator = IngestOrchestrator::new(
        driver,
        generator.clone(),
        processing,
        corpora.clone(),
        IngestConfig {
            retry: settings.retry.clone(),
            ..IngestConfig::default()
        },
    );
    let engine = Arc::new(AssessmentEngine::new(
        generator,
        trainings,
        corpora.clone(),
        EngineConfig {
            retry: settings.retry.clone(),
            ..EngineConfig::default()
        },
    ));

    let context = RpcContext {
        orchestrator,
        engine,
        corpora,
    };

    let mut registry = MethodRegistry::new();
    tutor_rpc::handlers::register_all(&mut registry);
    info!(methods = registry.methods().len(), "rpc registry ready");

    let server_config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
    };
    let server = TutorServer::new(server_config, registry, context);
    server.shutdown().listen_for_ctrl_c();
    server.serve().await.context("server error")?;

    info!("tutor-agent exited cleanly");
    Ok(())
}
