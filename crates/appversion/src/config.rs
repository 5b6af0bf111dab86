//! Desired configuration of an application version resource.

use crate::error::{Error, Result};
use crate::label::derive_label;
use serde::{Deserialize, Serialize};

/// Default namespacing segment for stored bundle keys.
pub const DEFAULT_KEY_PREFIX: &str = "application_version_source_bundles";

/// Caller-supplied configuration for one application version.
///
/// Immutable for the duration of an apply. Construct it at the boundary
/// and call [`DesiredConfiguration::validate`] once; the reconciler trusts
/// a validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredConfiguration {
    /// Target application in the deployment service
    pub application_name: String,
    /// Artifact store bucket receiving the bundle
    pub store_bucket_name: String,
    /// Key segment between the application name and the filename
    #[serde(default = "default_key_prefix")]
    pub store_key_prefix: String,
    /// Local path of the bundle to upload
    pub version_filename: String,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl DesiredConfiguration {
    /// Create a configuration using the default key prefix.
    pub fn new(
        application_name: impl Into<String>,
        store_bucket_name: impl Into<String>,
        version_filename: impl Into<String>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            store_bucket_name: store_bucket_name.into(),
            store_key_prefix: default_key_prefix(),
            version_filename: version_filename.into(),
        }
    }

    /// Replace the key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.store_key_prefix = prefix.into();
        self
    }

    /// The version label derived from the bundle filename.
    pub fn version_label(&self) -> String {
        derive_label(&self.version_filename)
    }

    /// Where the bundle bytes are written in the bucket.
    pub fn storage_key(&self) -> String {
        join_key([
            self.application_name.as_str(),
            self.store_key_prefix.as_str(),
            self.version_filename.as_str(),
        ])
    }

    /// Check required fields.
    ///
    /// The key prefix may be empty; the bundle filename must yield a
    /// non-empty label. `..` segments in the prefix or filename must not
    /// climb out of the application's key namespace.
    pub fn validate(&self) -> Result<()> {
        require("application_name", &self.application_name)?;
        require("application_store_bucket_name", &self.store_bucket_name)?;
        require("application_version_filename", &self.version_filename)?;

        if self.version_label().trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "application_version_filename",
                message: format!(
                    "'{}' does not yield a version label",
                    self.version_filename
                ),
            });
        }

        self.check_key_namespace()
    }

    fn check_key_namespace(&self) -> Result<()> {
        let mut depth = 0usize;
        for (field, segment) in [
            ("application_store_key_prefix", &self.store_key_prefix),
            ("application_version_filename", &self.version_filename),
        ] {
            for part in segment.split('/') {
                match part {
                    "" | "." => {}
                    ".." => {
                        depth = depth.checked_sub(1).ok_or_else(|| Error::InvalidConfig {
                            field,
                            message: format!(
                                "'{segment}' climbs out of the '{}' key namespace",
                                self.application_name
                            ),
                        })?;
                    }
                    _ => depth += 1,
                }
            }
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Join object-key segments with `/`.
///
/// Empty and `.` segments are dropped and `..` removes the previous
/// segment, so the result never starts or ends with `/` and never holds
/// doubled separators. A `..` with nothing left to remove is dropped;
/// [`DesiredConfiguration::validate`] rejects keys that would need one.
pub fn join_key<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in segments {
        for part in segment.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                _ => parts.push(part),
            }
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> DesiredConfiguration {
        DesiredConfiguration::new("shop", "builds", "release-1.2.zip").with_key_prefix("bundles")
    }

    #[test]
    fn test_derived_attributes() {
        let config = shop();
        assert_eq!(config.version_label(), "release-1.2");
        assert_eq!(config.storage_key(), "shop/bundles/release-1.2.zip");
    }

    #[test]
    fn test_default_prefix() {
        let config = DesiredConfiguration::new("shop", "builds", "app.zip");
        assert_eq!(
            config.storage_key(),
            "shop/application_version_source_bundles/app.zip"
        );
    }

    #[test]
    fn test_join_key_semantics() {
        assert_eq!(join_key(["shop", "", "app.zip"]), "shop/app.zip");
        assert_eq!(join_key(["shop/", "/bundles/", "app.zip"]), "shop/bundles/app.zip");
        assert_eq!(join_key(["shop", "bundles", "./dist/app.zip"]), "shop/bundles/dist/app.zip");
        assert_eq!(join_key(["shop", "bundles", "../app.zip"]), "shop/app.zip");
        assert_eq!(join_key(["shop", "bundles", "/tmp/app.zip"]), "shop/bundles/tmp/app.zip");
    }

    #[test]
    fn test_validate() {
        assert!(shop().validate().is_ok());
        assert!(shop().with_key_prefix("").validate().is_ok());

        let mut config = shop();
        config.application_name = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("application_name"));

        let mut config = shop();
        config.store_bucket_name = String::new();
        assert!(config.validate().is_err());

        let mut config = shop();
        config.version_filename = ".zip".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not yield a version label"));
    }

    #[test]
    fn test_validate_rejects_key_escaping_application() {
        let mut config = shop();
        config.version_filename = "../../../x.zip".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "application_version_filename",
                ..
            }
        ));
        assert!(err.to_string().contains("climbs out of the 'shop' key namespace"));

        let config = shop().with_key_prefix("..");
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "application_store_key_prefix",
                ..
            }
        ));

        // Leaving the prefix but staying under the application is allowed
        let mut config = shop();
        config.version_filename = "../dist/app.zip".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key(), "shop/dist/app.zip");
    }

    #[test]
    fn test_deserialize_default_prefix() {
        let json = r#"{
            "application_name": "shop",
            "store_bucket_name": "builds",
            "version_filename": "app.zip"
        }"#;
        let config: DesiredConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(config.store_key_prefix, DEFAULT_KEY_PREFIX);
    }
}
