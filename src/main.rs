use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use cookbook_recipe_service::args::CliArgs;
use cookbook_recipe_service::config::ServiceConfig;
use cookbook_recipe_service::coordinator::Coordinator;
use cookbook_recipe_service::{http_client, server, AppState};
use recipe_cache::{InMemoryCacheStore, SingleFlight};
use recipe_cleanup::CleanupEngine;
use recipe_filestore::LocalDiskFileStore;
use recipe_llm::{HttpGenerativeModel, Orchestrator};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.debug_trace);

    let config = ServiceConfig::load(&args).context("loading configuration")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(run(config))
}

fn init_tracing(debug_trace: bool) {
    if debug_trace {
        tracing_subscriber::fmt()
            .compact()
            .with_max_level(tracing::Level::TRACE)
            .with_span_events(
                tracing_subscriber::fmt::format::FmtSpan::CLOSE
                    | tracing_subscriber::fmt::format::FmtSpan::NEW,
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }
}

async fn run(config: ServiceConfig) -> Result<()> {
    let config = Arc::new(config);

    let http_client = http_client::build_client().context("building outbound http client")?;

    let model = HttpGenerativeModel::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
    );
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(model),
        config.llm.orchestrator.clone(),
    ));

    let cleanup = Arc::new(CleanupEngine::new(config.cleanup.clone()));
    let cache: Arc<dyn recipe_cache::CacheStore> = Arc::new(InMemoryCacheStore::new());
    let single_flight = Arc::new(SingleFlight::new());
    let filestore: Arc<dyn recipe_filestore::FileStore> =
        Arc::new(LocalDiskFileStore::new(config.filestore.root_dir.clone()));

    let coordinator = Arc::new(Coordinator {
        cache,
        single_flight,
        cleanup,
        orchestrator,
        filestore,
        http_client,
        default_folder_name: config.filestore.default_folder_name.clone(),
        cache_enabled: config.cache.enabled,
        cache_lookup_timeout: std::time::Duration::from_millis(config.cache.lookup_timeout_ms),
        cache_save_timeout: std::time::Duration::from_millis(config.cache.save_timeout_ms),
    });

    let state = AppState {
        config: config.clone(),
        coordinator,
    };

    server::run(state, &config.server.host, config.server.port).await
}
