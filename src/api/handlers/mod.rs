pub mod email;
pub mod health;
pub mod malware;
pub mod metrics;
pub mod root;
pub mod upload;
