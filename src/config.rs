//! Application configuration.
//!
//! All settings are read from the environment exactly once at startup into
//! an explicit value passed to construction sites. Required settings that
//! are absent fail fast with a clear error instead of surfacing later as a
//! dead client.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct AppConfig {
    /// Service account key file for the Vision recognition collaborator.
    pub credentials_path: PathBuf,
    /// Where uploaded documents are kept for the human review step.
    pub upload_dir: PathBuf,
    /// Listen address for the HTTP host.
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let credentials_path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
            .context("GOOGLE_APPLICATION_CREDENTIALS must point at a Vision service account key")?
            .into();

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string())
            .into();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            credentials_path,
            upload_dir,
            bind_addr,
        })
    }
}
