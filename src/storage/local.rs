//! Local filesystem / stdout writer.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{Config, CrawlResult};
use crate::storage::Destination;

/// Writes results and profile reports to their configured destinations.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    result: Destination,
    profile: Destination,
}

impl LocalStorage {
    pub fn new(result: Destination, profile: Destination) -> Self {
        Self { result, profile }
    }

    /// Destinations from `result_path` and `profile_output_path`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Destination::from_path(&config.result_path),
            Destination::from_path(&config.profile_output_path),
        )
    }

    /// Write the result as pretty JSON followed by a newline.
    pub async fn write_result(&self, result: &CrawlResult) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(result)?;
        bytes.push(b'\n');
        self.write(&self.result, &bytes).await
    }

    /// Write a rendered profile report.
    pub async fn write_profile(&self, report: &str) -> Result<()> {
        self.write(&self.profile, report.as_bytes()).await
    }

    async fn write(&self, destination: &Destination, bytes: &[u8]) -> Result<()> {
        match destination {
            Destination::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(bytes).await?;
                stdout.flush().await?;
            }
            Destination::File(path) => {
                Self::append(path, bytes).await?;
                log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
        }
        Ok(())
    }

    /// Append bytes, creating the file and its parent directory if needed.
    async fn append(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
}
