use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use super::source::{ModelSource, ModelSpec, ProvisioningConfig};
use crate::inference::{BinaryModel, Classifiers, ModelArtifact, TextModel, FEATURE_DIM};
use crate::models::ModelProvenance;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{file} is not a valid model artifact: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file} holds a {actual} model, expected {expected}")]
    WrongKind {
        file: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{file} is unusable: {reason}")]
    Invalid { file: String, reason: String },
}

/// Both classifiers, ready to serve, plus a record of where they came from.
#[derive(Debug, Clone)]
pub struct LoadedModels {
    pub classifiers: Classifiers,
    pub provenance: ModelProvenance,
}

/// Fetch, verify and deserialize both artifacts. Either both load or
/// provisioning fails.
pub async fn provision(
    config: &ProvisioningConfig,
    http: &Client,
) -> Result<LoadedModels, ProvisioningError> {
    tracing::info!(source = %config.source, "Provisioning classifiers");

    let text = fetch_artifact(&config.source, &config.text, http, parse_text_model).await?;
    let binary = fetch_artifact(&config.source, &config.binary, http, parse_binary_model).await?;

    tracing::info!(
        text_model = %text.name,
        vocabulary = text.vocabulary.len(),
        text_probability = text.probability,
        binary_model = %binary.name,
        binary_probability = binary.probability,
        "Classifiers loaded"
    );

    let provenance = ModelProvenance {
        text: text.name.clone(),
        binary: binary.name.clone(),
        source: config.source.to_string(),
        loaded_at: Utc::now(),
    };

    Ok(LoadedModels {
        classifiers: Classifiers::new(Arc::new(text), Arc::new(binary)),
        provenance,
    })
}

/// Load one artifact. Remote artifacts are served from the cache when the
/// cached copy still verifies; otherwise they are downloaded, verified,
/// parsed and only then written to the cache.
async fn fetch_artifact<T>(
    source: &ModelSource,
    spec: &ModelSpec,
    http: &Client,
    parse: fn(&str, &[u8]) -> Result<T, ProvisioningError>,
) -> Result<T, ProvisioningError> {
    let path = source.local_path(&spec.file);

    let Some(url) = source.remote_url(&spec.file) else {
        let bytes = read_file(&path).await?;
        return check_artifact(spec, &bytes, parse);
    };

    if path.exists() {
        let bytes = read_file(&path).await?;
        match check_artifact(spec, &bytes, parse) {
            Ok(model) => {
                tracing::debug!(path = %path.display(), "Using cached artifact");
                return Ok(model);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding cached artifact");
                remove_file(&path).await?;
            }
        }
    }

    let bytes = download(http, &url).await?;
    let model = check_artifact(spec, &bytes, parse)?;
    write_cache(&path, &bytes).await?;
    tracing::info!(url = %url, path = %path.display(), size = bytes.len(), "Artifact downloaded");
    Ok(model)
}

fn check_artifact<T>(
    spec: &ModelSpec,
    bytes: &[u8],
    parse: fn(&str, &[u8]) -> Result<T, ProvisioningError>,
) -> Result<T, ProvisioningError> {
    if let Some(expected) = &spec.sha256 {
        verify_checksum(&spec.file, bytes, expected)?;
    }
    parse(&spec.file, bytes)
}

async fn download(http: &Client, url: &str) -> Result<Vec<u8>, ProvisioningError> {
    let to_err = |source| ProvisioningError::Http {
        url: url.to_string(),
        source,
    };

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(to_err)?
        .error_for_status()
        .map_err(to_err)?;

    let bytes = resp.bytes().await.map_err(to_err)?;
    Ok(bytes.to_vec())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProvisioningError {
    let path = path.to_path_buf();
    move |source| ProvisioningError::Io { path, source }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ProvisioningError> {
    tokio::fs::read(path).await.map_err(io_error(path))
}

async fn remove_file(path: &Path) -> Result<(), ProvisioningError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path)(e)),
    }
}

/// Write `bytes` next to `path` under a unique name, then rename into place.
async fn write_cache(path: &Path, bytes: &[u8]) -> Result<(), ProvisioningError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error(parent))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(".{file_name}.{}.part", Uuid::new_v4()));

    tokio::fs::write(&partial, bytes).await.map_err(io_error(&partial))?;
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(io_error(path)(e));
    }
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn verify_checksum(file: &str, bytes: &[u8], expected: &str) -> Result<(), ProvisioningError> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ProvisioningError::Checksum {
            file: file.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

fn parse_artifact(file: &str, bytes: &[u8]) -> Result<ModelArtifact, ProvisioningError> {
    serde_json::from_slice(bytes).map_err(|source| ProvisioningError::Parse {
        file: file.to_string(),
        source,
    })
}

pub fn parse_text_model(file: &str, bytes: &[u8]) -> Result<TextModel, ProvisioningError> {
    let model = match parse_artifact(file, bytes)? {
        ModelArtifact::TextLinear(model) => model,
        other => {
            return Err(ProvisioningError::WrongKind {
                file: file.to_string(),
                expected: "text_linear",
                actual: other.kind(),
            })
        }
    };

    model.validate().map_err(|e| ProvisioningError::Invalid {
        file: file.to_string(),
        reason: e.to_string(),
    })?;
    Ok(model)
}

pub fn parse_binary_model(file: &str, bytes: &[u8]) -> Result<BinaryModel, ProvisioningError> {
    let model = match parse_artifact(file, bytes)? {
        ModelArtifact::BinaryLinear(model) => model,
        other => {
            return Err(ProvisioningError::WrongKind {
                file: file.to_string(),
                expected: "binary_linear",
                actual: other.kind(),
            })
        }
    };

    let invalid = |reason: String| ProvisioningError::Invalid {
        file: file.to_string(),
        reason,
    };

    if model.feature_dim != FEATURE_DIM {
        return Err(invalid(format!(
            "model expects {} features, extractor produces {FEATURE_DIM}",
            model.feature_dim
        )));
    }
    model.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(model)
}
