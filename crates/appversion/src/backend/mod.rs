//! Capabilities consumed by the reconciler.
//!
//! The reconciler never talks to a concrete service; its bundle source,
//! artifact store and version registry are handed in at construction time.
//! Tests substitute [`MockStore`] and [`MockRegistry`].
//!
//! # Testing
//!
//! ```
//! use appversion::backend::{ArtifactStore, MockRegistry, MockStore, VersionInfo, VersionRegistry};
//!
//! let store = MockStore::new();
//! store.put_object("builds", "shop/app.zip", b"bytes").unwrap();
//! assert_eq!(store.put_count(), 1);
//!
//! let registry = MockRegistry::new();
//! registry.add_version(VersionInfo::new("arn:existing", "shop", "app"));
//! assert_eq!(registry.find_versions("shop", "app").unwrap().len(), 1);
//! ```

pub mod local;

pub use local::{DEFAULT_ACCOUNT_ID, FileRegistry, FsBundles, LocalStore};

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of local bundle bytes.
pub trait BundleSource: Send + Sync {
    /// Read the whole bundle named by `filename`.
    fn read_bundle(&self, filename: &str) -> Result<Vec<u8>>;
}

/// Durable key-addressed blob storage.
///
/// An upload is all-or-nothing from the caller's perspective.
pub trait ArtifactStore: Send + Sync {
    /// Write `body` at `(bucket, key)`, replacing any previous object.
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()>;
}

/// Authoritative store of named, immutable application versions.
pub trait VersionRegistry: Send + Sync {
    /// Versions of `application` registered under `label`, in registry order.
    fn find_versions(&self, application: &str, label: &str) -> Result<Vec<VersionInfo>>;

    /// Register a new version.
    fn create_version(&self, request: &CreateVersionRequest) -> Result<VersionInfo>;
}

impl<T: ArtifactStore + ?Sized> ArtifactStore for Arc<T> {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        (**self).put_object(bucket, key, body)
    }
}

impl<T: VersionRegistry + ?Sized> VersionRegistry for Arc<T> {
    fn find_versions(&self, application: &str, label: &str) -> Result<Vec<VersionInfo>> {
        (**self).find_versions(application, label)
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<VersionInfo> {
        (**self).create_version(request)
    }
}

/// Location of a source bundle in the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    pub bucket: String,
    pub key: String,
}

/// A registered application version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Opaque registry identifier
    pub arn: String,
    pub application_name: String,
    pub version_label: String,
    #[serde(default)]
    pub source: Option<SourceBundle>,
    pub created_at: DateTime<Utc>,
}

impl VersionInfo {
    /// Create a version without a recorded source bundle.
    pub fn new(
        arn: impl Into<String>,
        application_name: impl Into<String>,
        version_label: impl Into<String>,
    ) -> Self {
        Self {
            arn: arn.into(),
            application_name: application_name.into(),
            version_label: version_label.into(),
            source: None,
            created_at: Utc::now(),
        }
    }
}

/// Parameters for registering a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVersionRequest {
    pub application_name: String,
    pub version_label: String,
    pub source_bucket: String,
    pub source_key: String,
    pub description: String,
    /// Create the application if it does not exist yet
    pub auto_create_application: bool,
}

impl CreateVersionRequest {
    /// The version this request would register, with the given ARN.
    pub fn to_version(&self, arn: impl Into<String>) -> VersionInfo {
        VersionInfo {
            arn: arn.into(),
            application_name: self.application_name.clone(),
            version_label: self.version_label.clone(),
            source: Some(SourceBundle {
                bucket: self.source_bucket.clone(),
                key: self.source_key.clone(),
            }),
            created_at: Utc::now(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A recorded [`ArtifactStore::put_object`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
}

/// In-memory artifact store that records every upload.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    calls: Arc<Mutex<Vec<PutCall>>>,
    failure: Option<String>,
}

impl MockStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose uploads always fail with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// All upload attempts, including failed ones.
    pub fn calls(&self) -> Vec<PutCall> {
        lock(&self.calls).clone()
    }

    /// Number of upload attempts.
    pub fn put_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Stored bytes at `(bucket, key)`.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

impl ArtifactStore for MockStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        lock(&self.calls).push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: body.to_vec(),
        });

        if let Some(message) = &self.failure {
            return Err(Error::storage(bucket, key, message.clone()));
        }

        lock(&self.objects).insert((bucket.to_string(), key.to_string()), body.to_vec());
        Ok(())
    }
}

/// In-memory version registry that records lookups and creations.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    versions: Arc<Mutex<Vec<VersionInfo>>>,
    find_calls: Arc<Mutex<Vec<(String, String)>>>,
    create_calls: Arc<Mutex<Vec<CreateVersionRequest>>>,
    find_failure: Option<String>,
    create_failure: Option<String>,
}

impl MockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every lookup fail with `message`.
    #[must_use]
    pub fn with_find_failure(mut self, message: impl Into<String>) -> Self {
        self.find_failure = Some(message.into());
        self
    }

    /// Make every creation fail with `message`.
    #[must_use]
    pub fn with_create_failure(mut self, message: impl Into<String>) -> Self {
        self.create_failure = Some(message.into());
        self
    }

    /// Seed an existing version.
    pub fn add_version(&self, version: VersionInfo) {
        lock(&self.versions).push(version);
    }

    /// All registered versions, in creation order.
    pub fn versions(&self) -> Vec<VersionInfo> {
        lock(&self.versions).clone()
    }

    /// Recorded `(application, label)` lookups.
    pub fn find_calls(&self) -> Vec<(String, String)> {
        lock(&self.find_calls).clone()
    }

    /// Recorded creation requests, including failed ones.
    pub fn create_calls(&self) -> Vec<CreateVersionRequest> {
        lock(&self.create_calls).clone()
    }

    /// Total number of calls of either kind.
    pub fn call_count(&self) -> usize {
        lock(&self.find_calls).len() + lock(&self.create_calls).len()
    }
}

impl VersionRegistry for MockRegistry {
    fn find_versions(&self, application: &str, label: &str) -> Result<Vec<VersionInfo>> {
        lock(&self.find_calls).push((application.to_string(), label.to_string()));

        if let Some(message) = &self.find_failure {
            return Err(Error::registry(application, label, message.clone()));
        }

        Ok(lock(&self.versions)
            .iter()
            .filter(|v| v.application_name == application && v.version_label == label)
            .cloned()
            .collect())
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<VersionInfo> {
        lock(&self.create_calls).push(request.clone());

        if let Some(message) = &self.create_failure {
            return Err(Error::registry(
                &request.application_name,
                &request.version_label,
                message.clone(),
            ));
        }

        let version = request.to_version(format!(
            "arn:mock:applicationversion/{}/{}",
            request.application_name, request.version_label
        ));
        lock(&self.versions).push(version.clone());
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(label: &str) -> CreateVersionRequest {
        CreateVersionRequest {
            application_name: "shop".to_string(),
            version_label: label.to_string(),
            source_bucket: "builds".to_string(),
            source_key: format!("shop/{label}.zip"),
            description: String::new(),
            auto_create_application: false,
        }
    }

    #[test]
    fn test_mock_store_records_and_stores() {
        let store = MockStore::new();
        store.put_object("builds", "a", b"one").unwrap();
        store.put_object("builds", "a", b"two").unwrap();

        assert_eq!(store.put_count(), 2);
        assert_eq!(store.object("builds", "a"), Some(b"two".to_vec()));
        assert_eq!(store.object("builds", "b"), None);
    }

    #[test]
    fn test_mock_store_failure() {
        let store = MockStore::failing("access denied");
        let err = store.put_object("builds", "a", b"x").unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(store.put_count(), 1);
        assert_eq!(store.object("builds", "a"), None);
    }

    #[test]
    fn test_mock_registry_find_preserves_order() {
        let registry = MockRegistry::new();
        registry.add_version(VersionInfo::new("arn:1", "shop", "v1"));
        registry.add_version(VersionInfo::new("arn:2", "shop", "v1"));
        registry.add_version(VersionInfo::new("arn:3", "other", "v1"));

        let found = registry.find_versions("shop", "v1").unwrap();
        let arns: Vec<&str> = found.iter().map(|v| v.arn.as_str()).collect();
        assert_eq!(arns, ["arn:1", "arn:2"]);
        assert!(registry.find_versions("shop", "v2").unwrap().is_empty());
    }

    #[test]
    fn test_mock_registry_create() {
        let registry = MockRegistry::new();
        let version = registry.create_version(&request("v1")).unwrap();

        assert_eq!(version.arn, "arn:mock:applicationversion/shop/v1");
        assert_eq!(
            version.source,
            Some(SourceBundle {
                bucket: "builds".to_string(),
                key: "shop/v1.zip".to_string(),
            })
        );
        assert_eq!(registry.find_versions("shop", "v1").unwrap(), vec![version]);
    }

    #[test]
    fn test_mock_registry_failures() {
        let registry = MockRegistry::new().with_create_failure("application not found");
        assert!(registry.create_version(&request("v1")).is_err());
        assert!(registry.versions().is_empty());

        let registry = MockRegistry::new().with_find_failure("throttled");
        let err = registry.find_versions("shop", "v1").unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }
}
