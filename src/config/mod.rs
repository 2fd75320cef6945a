use std::env;
use std::path::PathBuf;

use crate::provisioning::{ModelSource, ModelSpec, ProvisioningConfig, DEFAULT_HUB_REVISION};

const DEFAULT_TEXT_MODEL_FILE: &str = "phishing_model.json";
const DEFAULT_BINARY_MODEL_FILE: &str = "malware_model.json";
const DEFAULT_CACHE_DIR: &str = ".model-cache";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,https://xtra-secure.netlify.app";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Model provisioning
    pub models: ProvisioningConfig,

    // HTTP surface
    /// Bearer token guarding the classification routes; `None` disables auth.
    pub api_token: Option<String>,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,

    // Logging
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key → value lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let cors_raw = var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into());
        let cors_allowed_origins: Vec<String> = cors_raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect();

        let cache_dir = PathBuf::from(var("MODEL_CACHE_DIR").unwrap_or_else(|| DEFAULT_CACHE_DIR.into()));

        let source = match (var("MODEL_DIR"), var("MODEL_BASE_URL"), var("MODEL_HUB_REPO")) {
            (Some(dir), None, None) => ModelSource::Local {
                dir: PathBuf::from(dir),
            },
            (None, Some(base_url), None) => ModelSource::Http {
                base_url,
                cache_dir,
            },
            (None, None, Some(repo)) => ModelSource::Hub {
                repo,
                revision: var("MODEL_HUB_REVISION").unwrap_or_else(|| DEFAULT_HUB_REVISION.into()),
                cache_dir,
            },
            (None, None, None) => {
                anyhow::bail!("one of MODEL_DIR, MODEL_BASE_URL or MODEL_HUB_REPO must be set")
            }
            _ => anyhow::bail!(
                "only one of MODEL_DIR, MODEL_BASE_URL or MODEL_HUB_REPO may be set"
            ),
        };

        let models = ProvisioningConfig {
            source,
            text: ModelSpec {
                file: var("TEXT_MODEL_FILE").unwrap_or_else(|| DEFAULT_TEXT_MODEL_FILE.into()),
                sha256: var("TEXT_MODEL_SHA256"),
            },
            binary: ModelSpec {
                file: var("BINARY_MODEL_FILE").unwrap_or_else(|| DEFAULT_BINARY_MODEL_FILE.into()),
                sha256: var("BINARY_MODEL_SHA256"),
            },
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: var("PORT")
                .unwrap_or_else(|| "8080".into())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is not a valid port: {e}"))?,

            models,

            api_token: var("API_TOKEN"),
            cors_allowed_origins,
            max_upload_bytes: match var("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("MAX_UPLOAD_BYTES is not a byte count: {e}"))?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },

            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Returns true if the classification routes require a bearer token.
    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }
}
