use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub summarizer: HealthCheck,
    pub now: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (catalog, active_sessions) = {
        let service = state.service.lock().await;
        let summary = service.seed_state_summary();
        (catalog_check(summary.van_count, summary.option_count), summary.active_sessions)
    };
    let ready = catalog.status == "ok";

    let summarizer = if state.summarizer_backed {
        HealthCheck { status: "ok", detail: "model-backed summaries enabled".to_string() }
    } else {
        HealthCheck { status: "ok", detail: "deterministic fallback summaries".to_string() }
    };

    let payload = HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        service: HealthCheck {
            status: "ok",
            detail: format!("vanguide-server running with {active_sessions} active sessions"),
        },
        catalog,
        summarizer,
        now: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(van_count: usize, option_count: usize) -> HealthCheck {
    if van_count == 0 {
        return HealthCheck { status: "degraded", detail: "catalog has no vans".to_string() };
    }
    HealthCheck { status: "ok", detail: format!("{van_count} vans, {option_count} options loaded") }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use vanguide_core::{FallbackSummarizer, GuidedSessionService};

    use super::{catalog_check, health};
    use crate::routes::AppState;

    #[tokio::test]
    async fn health_reports_ok_with_seeded_catalog() {
        let state =
            AppState::new(GuidedSessionService::default(), Arc::new(FallbackSummarizer), false);

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.catalog.detail, "6 vans, 8 options loaded");
        assert_eq!(payload.summarizer.detail, "deterministic fallback summaries");
    }

    #[test]
    fn empty_catalog_is_degraded() {
        assert_eq!(catalog_check(0, 3).status, "degraded");
        assert_eq!(catalog_check(1, 0).status, "ok");
    }
}
