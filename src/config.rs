//! Project file: provider settings and configured application versions
//!
//! Resource blocks use the engine-visible field names and are mapped onto
//! [`DesiredConfiguration`] by hand, so a rename on either side is a
//! compile error rather than a silent schema change.

use anyhow::{Context, Result};
use appversion::DesiredConfiguration;
use appversion::backend::DEFAULT_ACCOUNT_ID;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Region used when neither the project nor the environment names one
pub const DEFAULT_REGION: &str = "ap-southeast-2";

const REGION_ENV_VARS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Supported project file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by the file extension; anything but `.json` is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// A loaded project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub resources: BTreeMap<String, ResourceBlock>,
}

/// Provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Region; see [`ProviderConfig::resolve_region`]
    #[serde(default)]
    pub region: Option<String>,

    /// Account id used when minting version ARNs
    #[serde(default)]
    pub account_id: Option<String>,

    /// Root directory of the local store and registry
    #[serde(default)]
    pub root: Option<String>,
}

/// One `[resources.<name>]` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBlock {
    pub application_name: String,
    pub application_store_bucket_name: String,
    #[serde(default)]
    pub application_store_key_prefix: Option<String>,
    pub application_version_filename: String,
}

impl ResourceBlock {
    /// Map onto the typed configuration and validate it
    pub fn to_desired(&self) -> appversion::Result<DesiredConfiguration> {
        let mut desired = DesiredConfiguration::new(
            self.application_name.clone(),
            self.application_store_bucket_name.clone(),
            self.application_version_filename.clone(),
        );
        if let Some(prefix) = &self.application_store_key_prefix {
            desired = desired.with_key_prefix(prefix.clone());
        }
        desired.validate()?;
        Ok(desired)
    }
}

impl ProviderConfig {
    /// Region from the project, then `AWS_REGION`, then
    /// `AWS_DEFAULT_REGION`, then [`DEFAULT_REGION`]
    pub fn resolve_region(&self) -> String {
        self.resolve_region_with(|name| std::env::var(name).ok())
    }

    fn resolve_region_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        non_empty(self.region.clone())
            .or_else(|| {
                REGION_ENV_VARS
                    .into_iter()
                    .find_map(|name| non_empty(lookup(name)))
            })
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn account_id(&self) -> &str {
        self.account_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(DEFAULT_ACCOUNT_ID)
    }

    /// Backend root, expanded
    pub fn root(&self) -> Result<PathBuf> {
        match non_empty(self.root.clone()) {
            Some(root) => Ok(paths::expand_path(&root)),
            None => paths::data_dir(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProjectConfig {
    /// Load a project file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read project file {}", path.display()))?;
        Self::parse(&content, ConfigFormat::from_path(path))
            .with_context(|| format!("Invalid project file {}", path.display()))
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Validated desired configurations by resource name
    pub fn desired(&self) -> Result<BTreeMap<String, DesiredConfiguration>> {
        self.resources
            .iter()
            .map(|(name, block)| -> Result<(String, DesiredConfiguration)> {
                let desired = block
                    .to_desired()
                    .with_context(|| format!("Invalid resource '{name}'"))?;
                Ok((name.clone(), desired))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appversion::ErrorCategory;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[provider]
region = "us-east-1"

[resources.web]
application_name = "shop"
application_store_bucket_name = "builds"
application_store_key_prefix = "bundles"
application_version_filename = "release-1.2.zip"

[resources.worker]
application_name = "shop-worker"
application_store_bucket_name = "builds"
application_version_filename = "worker.tar.gz"
"#;

    #[test]
    fn test_parse_toml_project() {
        let config = ProjectConfig::parse(PROJECT, ConfigFormat::Toml).unwrap();
        assert_eq!(config.provider.region.as_deref(), Some("us-east-1"));

        let desired = config.desired().unwrap();
        assert_eq!(desired.len(), 2);

        let web = &desired["web"];
        assert_eq!(web.storage_key(), "shop/bundles/release-1.2.zip");
        assert_eq!(web.version_label(), "release-1.2");

        let worker = &desired["worker"];
        assert_eq!(worker.store_key_prefix, appversion::DEFAULT_KEY_PREFIX);
        assert_eq!(worker.version_label(), "worker.tar");
    }

    #[test]
    fn test_parse_json_project() {
        let json = r#"{
            "resources": {
                "web": {
                    "application_name": "shop",
                    "application_store_bucket_name": "builds",
                    "application_version_filename": "a.zip"
                }
            }
        }"#;
        let config = ProjectConfig::parse(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.desired().unwrap()["web"].version_label(), "a");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let toml = r#"
[resources.web]
application_name = "shop"
application_store_bucket_name = "builds"
application_version_filename = "a.zip"
application_version_description = "nope"
"#;
        assert!(ProjectConfig::parse(toml, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let toml = r#"
[resources.web]
application_name = "shop"
application_version_filename = "a.zip"
"#;
        assert!(ProjectConfig::parse(toml, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_invalid_resource_reports_config_error() {
        let toml = r#"
[resources.web]
application_name = "shop"
application_store_bucket_name = "builds"
application_version_filename = ".zip"
"#;
        let config = ProjectConfig::parse(toml, ConfigFormat::Toml).unwrap();
        let err = config.desired().unwrap_err();

        assert!(format!("{err:#}").contains("web"));
        let core = err.downcast_ref::<appversion::Error>().unwrap();
        assert_eq!(core.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("appver.json")),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("appver.toml")),
            ConfigFormat::Toml
        );
        assert_eq!(ConfigFormat::from_path(Path::new("appver")), ConfigFormat::Toml);
    }

    #[test]
    fn test_region_resolution_order() {
        let env: HashMap<&str, &str> = [
            ("AWS_REGION", "eu-west-1"),
            ("AWS_DEFAULT_REGION", "us-west-2"),
        ]
        .into_iter()
        .collect();
        let lookup = |name: &str| env.get(name).map(ToString::to_string);

        let explicit = ProviderConfig {
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        assert_eq!(explicit.resolve_region_with(lookup), "us-east-1");

        let implicit = ProviderConfig::default();
        assert_eq!(implicit.resolve_region_with(lookup), "eu-west-1");
        assert_eq!(
            implicit.resolve_region_with(|name| {
                (name == "AWS_DEFAULT_REGION").then(|| "us-west-2".to_string())
            }),
            "us-west-2"
        );
        assert_eq!(implicit.resolve_region_with(|_| None), DEFAULT_REGION);

        let blank = ProviderConfig {
            region: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.resolve_region_with(|_| None), DEFAULT_REGION);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("appver.toml");
        fs::write(&path, PROJECT).unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.resources.len(), 2);

        let missing = ProjectConfig::load(&dir.path().join("nope.toml"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_provider_defaults() {
        let provider = ProviderConfig {
            root: Some("/srv/appver".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.account_id(), DEFAULT_ACCOUNT_ID);
        assert_eq!(provider.root().unwrap(), PathBuf::from("/srv/appver"));
    }
}
