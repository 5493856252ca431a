use std::sync::Arc;

use serde_json::Value;
use shuttle_axum::axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::dispatcher::{AnalysisDispatcher, AnalysisResponse};
use crate::recommend::BackendKind;
use crate::schema::{input_schema, InputSchema};

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<AnalysisDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: AnalysisDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// State bound to the process-wide ranking backend.
    pub fn shared() -> Self {
        Self::new(AnalysisDispatcher::shared())
    }
}

pub fn create_router() -> Router {
    router(AppState::shared())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/availability", get(availability))
        .route("/input_schema", get(schema))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Opaque purchaser id: strings pass through, any other JSON value is rendered as text.
fn purchaser_of(body: &Value) -> Option<String> {
    match body.get("identifier_from_purchaser") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Always 200: failures are reported in the envelope's `status`.
async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<AnalysisResponse> {
    let mut body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable /analyze body");
            return Json(AnalysisResponse::Failed {
                error: format!("Invalid request body: {}", rejection.body_text()),
                purchaser: None,
            });
        }
    };
    let purchaser = purchaser_of(&body);
    let input_data = body
        .get_mut("input_data")
        .map(Value::take)
        .unwrap_or(Value::Null);
    let dispatcher = Arc::clone(&state.dispatcher);
    let task_purchaser = purchaser.clone();

    // Analyzers are CPU-bound on up to 100k characters; keep them off the reactor.
    let joined = tokio::task::spawn_blocking(move || {
        dispatcher.analyze(task_purchaser.as_deref(), &input_data)
    })
    .await;

    match joined {
        Ok(resp) => Json(resp),
        Err(e) => {
            error!(error = %e, "analysis task aborted");
            Json(AnalysisResponse::Failed {
                error: format!("analysis task aborted: {e}"),
                purchaser,
            })
        }
    }
}

#[derive(serde::Serialize)]
struct AvailabilityOut {
    status: &'static str,
    model_ready: bool,
    backend: BackendKind,
}

async fn availability(State(state): State<AppState>) -> Json<AvailabilityOut> {
    Json(AvailabilityOut {
        status: "available",
        model_ready: state.dispatcher.model_ready(),
        backend: state.dispatcher.backend_kind(),
    })
}

async fn schema() -> Json<&'static InputSchema> {
    Json(input_schema())
}
