pub mod api;
pub mod config;
pub mod errors;
pub mod inference;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod provisioning;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::ModelProvenance;
use crate::pipeline::ClassificationPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<ClassificationPipeline>,
    pub provenance: ModelProvenance,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
