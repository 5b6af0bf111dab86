//! The application version resource as seen by the orchestration engine.
//!
//! Engine-visible attribute names are fixed here; everything below this
//! adapter works on [`DesiredConfiguration`] and [`ResourceRecord`].

use crate::backend::{ArtifactStore, BundleSource, FsBundles, VersionRegistry};
use crate::config::DesiredConfiguration;
use crate::diff::predict_diff;
use crate::reconcile::Reconciler;
use crate::record::ResourceRecord;
use anyhow::Result;
use declarative::{AttributeChange, AttributeDiff, Resource};

/// Resource type name.
pub const RESOURCE_TYPE: &str = "application_version";

pub const ATTR_APPLICATION_NAME: &str = "application_name";
pub const ATTR_STORE_BUCKET_NAME: &str = "application_store_bucket_name";
pub const ATTR_STORE_KEY_PREFIX: &str = "application_store_key_prefix";
pub const ATTR_VERSION_FILENAME: &str = "application_version_filename";
pub const ATTR_VERSION_ARN: &str = "application_version_arn";
pub const ATTR_VERSION_LABEL: &str = "application_version_label";

/// Lifecycle hooks for application versions.
///
/// `create` and `update` both reconcile; `read` and `delete` are no-ops
/// because registered versions are immutable history.
pub struct ApplicationVersion<S, R, B = FsBundles> {
    reconciler: Reconciler<S, R, B>,
}

impl<S, R, B> ApplicationVersion<S, R, B> {
    pub fn new(reconciler: Reconciler<S, R, B>) -> Self {
        Self { reconciler }
    }

    pub fn reconciler(&self) -> &Reconciler<S, R, B> {
        &self.reconciler
    }
}

impl<S, R, B> Resource for ApplicationVersion<S, R, B>
where
    S: ArtifactStore,
    R: VersionRegistry,
    B: BundleSource,
{
    type Config = DesiredConfiguration;
    type Record = ResourceRecord;

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn describe(&self, config: &DesiredConfiguration) -> String {
        format!(
            "Version {} of {}",
            config.version_label(),
            config.application_name
        )
    }

    fn attributes(&self, config: &DesiredConfiguration) -> Vec<(&'static str, String)> {
        vec![
            (ATTR_APPLICATION_NAME, config.application_name.clone()),
            (ATTR_STORE_BUCKET_NAME, config.store_bucket_name.clone()),
            (ATTR_STORE_KEY_PREFIX, config.store_key_prefix.clone()),
            (ATTR_VERSION_FILENAME, config.version_filename.clone()),
        ]
    }

    fn record_id(&self, record: &ResourceRecord) -> String {
        record.id().to_string()
    }

    fn record_attributes(&self, record: &ResourceRecord) -> Vec<(&'static str, String)> {
        vec![
            (ATTR_VERSION_ARN, record.version_arn.clone()),
            (ATTR_VERSION_LABEL, record.version_label.clone()),
        ]
    }

    fn create(&self, config: &DesiredConfiguration) -> Result<ResourceRecord> {
        Ok(self.reconciler.reconcile(config, None)?)
    }

    fn read(
        &self,
        _config: &DesiredConfiguration,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord> {
        Ok(record.clone())
    }

    fn update(
        &self,
        _old: &DesiredConfiguration,
        new: &DesiredConfiguration,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord> {
        Ok(self.reconciler.reconcile(new, Some(record.id()))?)
    }

    fn delete(&self, record: &ResourceRecord) -> Result<()> {
        log::info!("Leaving {} registered", record.id());
        Ok(())
    }

    fn plan_create(&self, config: &DesiredConfiguration) -> Vec<AttributeDiff> {
        vec![
            AttributeDiff::new(ATTR_VERSION_ARN, None, AttributeChange::Computed),
            AttributeDiff::new(
                ATTR_VERSION_LABEL,
                None,
                AttributeChange::Known(config.version_label()),
            ),
        ]
    }

    fn plan_diff(
        &self,
        old: &DesiredConfiguration,
        record: &ResourceRecord,
        new: &DesiredConfiguration,
    ) -> Vec<AttributeDiff> {
        let diff = predict_diff(old, new);
        [
            (ATTR_VERSION_ARN, &record.version_arn, diff.version_arn),
            (ATTR_VERSION_LABEL, &record.version_label, diff.version_label),
        ]
        .into_iter()
        .filter(|(_, _, change)| !change.is_unchanged())
        .map(|(name, old, change)| AttributeDiff::new(name, Some(old.clone()), change))
        .collect()
    }

    fn conflict_key(&self, config: &DesiredConfiguration) -> Option<String> {
        Some(format!(
            "{}/{}",
            config.application_name,
            config.version_label()
        ))
    }
}
