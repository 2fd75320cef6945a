use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const MODALITIES: [&str; 2] = ["text", "binary"];

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))?;

    register_metrics();
    Ok(handle)
}

/// Pre-register metrics so they appear even before the first request.
pub fn register_metrics() {
    for modality in MODALITIES {
        counter!("probability_fallback_total", "modality" => modality).absolute(0);
        // Histogram is lazily created on first record; force creation.
        histogram!("inference_latency_seconds", "modality" => modality).record(0.0);
    }
    counter!("extraction_failures_total").absolute(0);
    counter!("unsupported_inputs_total").absolute(0);
}
