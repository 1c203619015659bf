// Copyright 2026 Drawbridge Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use drawbridge::cache::ResultCache;
use drawbridge::config::Config;
use drawbridge::reconcile::ReconcileEngine;
use drawbridge::renderer::chromium::ChromiumRenderer;
use drawbridge::renderer::{NoopRenderer, Renderer};
use drawbridge::rest::{self, AppState};
use drawbridge::service::QueryService;
use drawbridge::sources::http_client::HttpClient;
use drawbridge::sources::{DynamicSource, StaticSource};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "drawbridge",
    about = "Drawbridge — reconciled NY lottery draw results over HTTP",
    version
)]
struct Cli {
    /// Listening port (overrides DRAWBRIDGE_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "drawbridge=debug"
    } else {
        "drawbridge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!("starting drawbridge v{}", env!("CARGO_PKG_VERSION"));

    let renderer: Arc<dyn Renderer> = match ChromiumRenderer::discover() {
        Ok(renderer) => {
            info!("Chromium found, dynamic fallback enabled");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("Chromium unavailable: {e}");
            warn!("Running static-only: the dynamic fallback will report no data");
            Arc::new(NoopRenderer)
        }
    };

    let static_source = StaticSource::new(
        HttpClient::new(config.page_timeout),
        config.feeds.clone(),
    );
    let dynamic_source = DynamicSource::new(
        renderer,
        config.pages.clone(),
        config.nav_timeout,
        config.response_timeout,
    );

    let engine = Arc::new(ReconcileEngine::new(
        Arc::new(static_source),
        Arc::new(dynamic_source),
    ));
    let service = QueryService::new(ResultCache::new(config.cache_ttl), engine);

    rest::serve(config.port, Arc::new(AppState { service })).await
}
