pub mod loader;
pub mod source;

pub use loader::{provision, LoadedModels, ProvisioningError};
pub use source::{ModelSource, ModelSpec, ProvisioningConfig, DEFAULT_HUB_REVISION};
