//! Applied state: what apply last recorded for each resource

use anyhow::{Context, Result};
use appversion::{DesiredConfiguration, ResourceRecord};
use chrono::{DateTime, Utc};
use declarative::{ExecuteOutcome, Prior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// The state file
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StateFile {
    /// Last time the state was written
    pub last_updated: Option<DateTime<Utc>>,

    /// Applied resources by name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

/// State for one applied resource
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResourceState {
    /// When the record was produced
    pub applied_at: DateTime<Utc>,

    /// Configuration the record was produced from
    pub config: DesiredConfiguration,

    /// Persisted identity and computed attributes
    pub record: ResourceRecord,
}

// ============================================================================
// StateFile Implementation
// ============================================================================

impl StateFile {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Some(Utc::now());

        let content = toml::to_string_pretty(self).context("Failed to serialize state")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Recorded state in the shape the planner expects
    pub fn prior(&self) -> BTreeMap<String, Prior<DesiredConfiguration, ResourceRecord>> {
        self.resources
            .iter()
            .map(|(name, state)| {
                (
                    name.clone(),
                    Prior {
                        config: state.config.clone(),
                        record: state.record.clone(),
                    },
                )
            })
            .collect()
    }

    /// Merge the results of an execution
    ///
    /// Applied records are stored with the configuration they were produced
    /// from; removed resources are forgotten. Failed resources keep their
    /// previous record.
    pub fn merge(
        &mut self,
        desired: &BTreeMap<String, DesiredConfiguration>,
        outcome: &ExecuteOutcome<ResourceRecord>,
    ) {
        let now = Utc::now();

        for (name, record) in &outcome.applied {
            let Some(config) = desired.get(name) else {
                log::warn!("Applied resource '{name}' has no configuration, not recording it");
                continue;
            };
            self.resources.insert(
                name.clone(),
                ResourceState {
                    applied_at: now,
                    config: config.clone(),
                    record: record.clone(),
                },
            );
        }

        for name in &outcome.removed {
            self.resources.remove(name);
        }
    }
}
