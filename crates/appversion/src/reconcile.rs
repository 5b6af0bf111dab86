//! Create-or-update convergence for an application version.
//!
//! One call to [`Reconciler::reconcile`] runs, in order and without
//! retries:
//!
//! 1. derive the version label and storage key
//! 2. read the bundle into memory
//! 3. upload it (unconditionally, so the stored object always holds the
//!    latest local bytes for its key)
//! 4. look the label up in the registry and adopt the first match, or
//!    register a new version when there is none
//!
//! Any failure aborts the whole call and no record is returned. A bundle
//! uploaded before a registry failure stays in the store; the next attempt
//! writes the same key.

use crate::backend::{ArtifactStore, BundleSource, CreateVersionRequest, FsBundles, VersionRegistry};
use crate::config::DesiredConfiguration;
use crate::error::Result;
use crate::record::ResourceRecord;

/// Reconciles desired configuration against the store and registry.
pub struct Reconciler<S, R, B = FsBundles> {
    store: S,
    registry: R,
    bundles: B,
}

impl<S, R> Reconciler<S, R> {
    /// Create a reconciler reading bundles relative to the working directory.
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store,
            registry,
            bundles: FsBundles::new(),
        }
    }
}

impl<S, R, B> Reconciler<S, R, B> {
    /// Replace the bundle source.
    pub fn with_bundles<B2>(self, bundles: B2) -> Reconciler<S, R, B2> {
        Reconciler {
            store: self.store,
            registry: self.registry,
            bundles,
        }
    }
}

impl<S: ArtifactStore, R: VersionRegistry, B: BundleSource> Reconciler<S, R, B> {
    /// The artifact store in use.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The version registry in use.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Converge one application version.
    ///
    /// `identity_hint` is the previously persisted ARN, if any. It does not
    /// influence the outcome; the registry is the authority.
    pub fn reconcile(
        &self,
        config: &DesiredConfiguration,
        identity_hint: Option<&str>,
    ) -> Result<ResourceRecord> {
        let version_label = config.version_label();
        let storage_key = config.storage_key();
        let application = config.application_name.as_str();
        let bucket = config.store_bucket_name.as_str();

        let bundle = self.bundles.read_bundle(&config.version_filename)?;

        log::info!(
            "Uploading {} ({} bytes) to {}/{}",
            config.version_filename,
            bundle.len(),
            bucket,
            storage_key
        );
        self.store.put_object(bucket, &storage_key, &bundle)?;

        let existing = self.registry.find_versions(application, &version_label)?;

        let version_arn = match existing.into_iter().next() {
            Some(version) => {
                log::info!("Adopting existing version {}", version.arn);
                version.arn
            }
            None => {
                let request = CreateVersionRequest {
                    application_name: application.to_string(),
                    version_label: version_label.clone(),
                    source_bucket: bucket.to_string(),
                    source_key: storage_key.clone(),
                    description: format!("Version {version_label} of {application}"),
                    auto_create_application: false,
                };
                let created = self.registry.create_version(&request)?;
                log::info!("Created version {}", created.arn);
                created.arn
            }
        };

        if let Some(previous) = identity_hint
            && previous != version_arn
        {
            log::info!("Identity changed: {} -> {}", previous, version_arn);
        }

        Ok(ResourceRecord {
            version_arn,
            version_label,
        })
    }
}
