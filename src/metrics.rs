use axum::{extract::State, routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only one recorder per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe_counter!("analysis_requests_total", "Completed analyses by mode");
        describe_counter!("analysis_failures_total", "Failed analyses by error kind");
        describe_counter!(
            "model_backend_fallbacks_total",
            "Learned-model failures answered by the heuristic scorer"
        );
        describe_histogram!("analysis_duration_ms", "Wall time of one analyze call");

        Ok(Self { handle })
    }

    /// `/metrics` in Prometheus text format, mergeable into the API router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render))
            .with_state(self.handle.clone())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
