//! On-disk session state.
//!
//! Holds the resource's field map and the local control plane's inventory
//! so consecutive invocations see the same world.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use lbsync::clients::memory::Inventory;
use lbsync::ResourceData;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StateFile {
    pub resource: ResourceData,
    pub inventory: Inventory,
}

impl StateFile {
    /// Load from `path`. A missing file is an empty session.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Saved state file");
        Ok(())
    }
}
