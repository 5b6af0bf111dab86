//! Filesystem-backed capabilities.
//!
//! [`FsBundles`] reads bundles from disk, [`LocalStore`] keeps each bucket as a directory under a root, and
//! [`FileRegistry`] keeps registered versions in a JSON file. Both write
//! through a temporary file and rename, so a reader never observes a
//! half-written object or registry.

use super::{ArtifactStore, BundleSource, CreateVersionRequest, VersionInfo, VersionRegistry};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Account placeholder used when none is configured.
pub const DEFAULT_ACCOUNT_ID: &str = "000000000000";

/// Reads bundles from the filesystem.
///
/// Relative filenames resolve against the base directory when one is set,
/// otherwise against the working directory.
#[derive(Debug, Clone, Default)]
pub struct FsBundles {
    base_dir: Option<PathBuf>,
}

impl FsBundles {
    /// Resolve relative filenames against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative filenames against `base_dir`.
    pub fn rooted(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: Some(base_dir.as_ref().to_path_buf()),
        }
    }

    /// Path that `filename` resolves to.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(filename),
            None => PathBuf::from(filename),
        }
    }
}

impl BundleSource for FsBundles {
    fn read_bundle(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.resolve(filename);
        fs::read(&path).map_err(|source| Error::Io { path, source })
    }
}

/// Artifact store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`. Buckets are created on first upload.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `(bucket, key)`.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.root.join(bucket), |path, part| path.join(part))
    }
}

impl ArtifactStore for LocalStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(Error::storage(bucket, key, "invalid bucket name"));
        }
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(Error::storage(bucket, key, "invalid object key"));
        }

        let path = self.object_path(bucket, key);
        let parent = path
            .parent()
            .ok_or_else(|| Error::storage(bucket, key, "object path has no parent"))?;

        fs::create_dir_all(parent).map_err(|e| Error::storage(bucket, key, e.to_string()))?;
        write_atomic(parent, &path, body).map_err(|e| Error::storage(bucket, key, e.to_string()))?;

        log::debug!("Stored {} bytes at {}", body.len(), path.display());
        Ok(())
    }
}

/// On-disk layout of the registry file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    versions: Vec<VersionInfo>,
}

/// Version registry persisted as a JSON file.
///
/// ARNs follow the deployment service's format for the configured region
/// and account. Creating a label that already exists for an application
/// fails, so two racing first-time reconciliations cannot both register.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    region: String,
    account_id: String,
    guard: Mutex<()>,
}

impl FileRegistry {
    /// Create a registry stored at `path` for `region`.
    pub fn new(path: impl AsRef<Path>, region: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            region: region.into(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            guard: Mutex::new(()),
        }
    }

    /// Use a specific account id in minted ARNs.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ARN for a version of `application` labelled `label`.
    pub fn version_arn(&self, application: &str, label: &str) -> String {
        format!(
            "arn:aws:elasticbeanstalk:{}:{}:applicationversion/{}/{}",
            self.region, self.account_id, application, label
        )
    }

    fn load(&self) -> std::io::Result<RegistryFile> {
        if !self.path.exists() {
            return Ok(RegistryFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn save(&self, file: &RegistryFile) -> std::io::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let content = serde_json::to_vec_pretty(file)?;
        write_atomic(dir, &self.path, &content)
    }
}

impl VersionRegistry for FileRegistry {
    fn find_versions(&self, application: &str, label: &str) -> Result<Vec<VersionInfo>> {
        let _guard = self.guard.lock().unwrap_or_else(|p| p.into_inner());
        let file = self
            .load()
            .map_err(|e| Error::registry(application, label, e.to_string()))?;

        Ok(file
            .versions
            .into_iter()
            .filter(|v| v.application_name == application && v.version_label == label)
            .collect())
    }

    fn create_version(&self, request: &CreateVersionRequest) -> Result<VersionInfo> {
        let application = request.application_name.as_str();
        let label = request.version_label.as_str();

        let _guard = self.guard.lock().unwrap_or_else(|p| p.into_inner());
        let mut file = self
            .load()
            .map_err(|e| Error::registry(application, label, e.to_string()))?;

        if file
            .versions
            .iter()
            .any(|v| v.application_name == application && v.version_label == label)
        {
            return Err(Error::registry(
                application,
                label,
                "application version already exists",
            ));
        }

        let version = request.to_version(self.version_arn(application, label));
        file.versions.push(version.clone());
        self.save(&file)
            .map_err(|e| Error::registry(application, label, e.to_string()))?;

        log::debug!("Registered {} in {}", version.arn, self.path.display());
        Ok(version)
    }
}

fn write_atomic(dir: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(label: &str) -> CreateVersionRequest {
        CreateVersionRequest {
            application_name: "shop".to_string(),
            version_label: label.to_string(),
            source_bucket: "builds".to_string(),
            source_key: format!("shop/bundles/{label}.zip"),
            description: format!("Version {label}"),
            auto_create_application: false,
        }
    }

    #[test]
    fn test_fs_bundles_resolution() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.zip"), b"zip").unwrap();

        let bundles = FsBundles::rooted(temp.path());
        assert_eq!(bundles.read_bundle("app.zip").unwrap(), b"zip");

        let absolute = temp.path().join("app.zip");
        assert_eq!(
            FsBundles::new().read_bundle(&absolute.to_string_lossy()).unwrap(),
            b"zip"
        );

        let err = bundles.read_bundle("missing.zip").unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("missing.zip")));
    }

    #[test]
    fn test_local_store_writes_object() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());

        store.put_object("builds", "shop/bundles/a.zip", b"first").unwrap();
        store.put_object("builds", "shop/bundles/a.zip", b"second").unwrap();

        let path = temp.path().join("builds").join("shop").join("bundles").join("a.zip");
        assert_eq!(store.object_path("builds", "shop/bundles/a.zip"), path);
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_local_store_rejects_escaping_keys() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());

        assert!(store.put_object("builds", "../escape", b"x").is_err());
        assert!(store.put_object("builds", "a//b", b"x").is_err());
        assert!(store.put_object("../builds", "a", b"x").is_err());
        assert!(store.put_object("builds", "", b"x").is_err());
    }

    #[test]
    fn test_file_registry_create_and_find() {
        let temp = TempDir::new().unwrap();
        let registry = FileRegistry::new(temp.path().join("registry.json"), "ap-southeast-2")
            .with_account_id("123456789012");

        assert!(registry.find_versions("shop", "v1").unwrap().is_empty());

        let created = registry.create_version(&request("v1")).unwrap();
        assert_eq!(
            created.arn,
            "arn:aws:elasticbeanstalk:ap-southeast-2:123456789012:applicationversion/shop/v1"
        );

        let found = registry.find_versions("shop", "v1").unwrap();
        assert_eq!(found, vec![created]);
        assert!(registry.find_versions("other", "v1").unwrap().is_empty());
    }

    #[test]
    fn test_file_registry_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("registry.json");

        FileRegistry::new(&path, "us-east-1")
            .create_version(&request("v1"))
            .unwrap();

        let reopened = FileRegistry::new(&path, "us-east-1");
        assert_eq!(reopened.find_versions("shop", "v1").unwrap().len(), 1);
    }

    #[test]
    fn test_file_registry_rejects_duplicate_label() {
        let temp = TempDir::new().unwrap();
        let registry = FileRegistry::new(temp.path().join("registry.json"), "us-east-1");

        registry.create_version(&request("v1")).unwrap();
        let err = registry.create_version(&request("v1")).unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));
        assert_eq!(registry.find_versions("shop", "v1").unwrap().len(), 1);
    }

    #[test]
    fn test_file_registry_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");
        fs::write(&path, "not json").unwrap();

        let registry = FileRegistry::new(&path, "us-east-1");
        let err = registry.find_versions("shop", "v1").unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Registry);
    }
}
