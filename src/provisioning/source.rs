use std::fmt;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

pub const HUB_BASE: &str = "https://huggingface.co";
pub const DEFAULT_HUB_REVISION: &str = "main";

/// Where model artifacts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Artifacts already on local disk.
    Local { dir: PathBuf },
    /// Plain HTTP(S) directory listing: `{base_url}/{file}`.
    Http { base_url: String, cache_dir: PathBuf },
    /// Model-hub repository: `{hub}/{repo}/resolve/{revision}/{file}`.
    Hub {
        repo: String,
        revision: String,
        cache_dir: PathBuf,
    },
}

impl ModelSource {
    /// Remote URL for `file`, or `None` for local sources.
    pub fn remote_url(&self, file: &str) -> Option<String> {
        match self {
            ModelSource::Local { .. } => None,
            ModelSource::Http { base_url, .. } => {
                Some(format!("{}/{}", base_url.trim_end_matches('/'), file))
            }
            ModelSource::Hub { repo, revision, .. } => {
                Some(format!("{HUB_BASE}/{repo}/resolve/{revision}/{file}"))
            }
        }
    }

    /// Where `file` lives (local sources) or is cached (remote sources).
    pub fn local_path(&self, file: &str) -> PathBuf {
        match self {
            ModelSource::Local { dir } => dir.join(file),
            ModelSource::Http {
                base_url,
                cache_dir,
            } => cache_dir
                .join("http")
                .join(url_key(base_url))
                .join(file),
            ModelSource::Hub {
                repo,
                revision,
                cache_dir,
            } => cache_dir
                .join(repo.replace('/', "--"))
                .join(revision)
                .join(file),
        }
    }
}

/// Short stable directory name for a base URL, so artifacts fetched from
/// different servers never share a cache slot.
fn url_key(base_url: &str) -> String {
    let digest = Sha256::digest(base_url.trim_end_matches('/').as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Local { dir } => write!(f, "local:{}", dir.display()),
            ModelSource::Http { base_url, .. } => write!(f, "http:{base_url}"),
            ModelSource::Hub { repo, revision, .. } => write!(f, "hub:{repo}@{revision}"),
        }
    }
}

/// One artifact to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub file: String,
    /// Expected lowercase hex SHA-256 of the artifact bytes.
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
    pub source: ModelSource,
    pub text: ModelSpec,
    pub binary: ModelSpec,
}
