use std::sync::Arc;

use tracing::info;
use vanguide_agent::SupportSummarizer;
use vanguide_core::config::AppConfig;
use vanguide_core::GuidedSessionService;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "starting application bootstrap"
    );

    let service = GuidedSessionService::default();
    let seed = service.seed_state_summary();
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        session_id = "unknown",
        van_count = seed.van_count,
        option_count = seed.option_count,
        "catalog seeded"
    );

    let summarizer = SupportSummarizer::from_config(&config.summarizer);
    let summarizer_backed = summarizer.is_model_backed();
    info!(
        event_name = "system.bootstrap.summarizer_ready",
        correlation_id = "bootstrap",
        session_id = "unknown",
        mode = if summarizer_backed { "model" } else { "fallback" },
        model = %config.summarizer.model,
        "summarizer initialized"
    );

    let state = AppState::new(service, Arc::new(summarizer), summarizer_backed);
    Application { config, state }
}
