use std::path::{Path, PathBuf};

use crate::usage_store::{StoreError, UsageMap, UsagePersistence};

/// Usage map stored as a single JSON object keyed by item id.
#[derive(Debug, Clone)]
pub struct JsonUsagePersistence {
    path: PathBuf,
}

impl JsonUsagePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsagePersistence for JsonUsagePersistence {
    fn load(&self) -> Result<UsageMap, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UsageMap::new())
            }
            Err(error) => return Err(error.into()),
        };
        if raw.trim().is_empty() {
            return Ok(UsageMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, records: &UsageMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string(records)?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, encoded)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
