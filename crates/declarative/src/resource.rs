//! Resource trait for declarative lifecycle management
//!
//! A Resource is a kind of remote object the engine manages on the
//! caller's behalf. The engine owns the desired configuration and the
//! persisted record; the resource implements the lifecycle hooks that
//! turn one into the other.

use crate::types::{AttributeChange, AttributeDiff};
use anyhow::Result;
use std::fmt;

/// Lifecycle hooks for one resource type
///
/// Every hook receives typed values; the mapping from engine-visible
/// attribute names to fields happens in [`Resource::attributes`] and
/// [`Resource::record_attributes`].
///
/// # Example
///
/// ```ignore
/// use declarative::{AttributeChange, AttributeDiff, Resource};
///
/// struct Marker;
///
/// impl Resource for Marker {
///     type Config = String;
///     type Record = String;
///
///     fn resource_type(&self) -> &'static str { "marker" }
///     fn describe(&self, config: &String) -> String { format!("Marker {config}") }
///     fn attributes(&self, config: &String) -> Vec<(&'static str, String)> {
///         vec![("value", config.clone())]
///     }
///     fn record_id(&self, record: &String) -> String { record.clone() }
///     fn record_attributes(&self, record: &String) -> Vec<(&'static str, String)> {
///         vec![("id", record.clone())]
///     }
///     fn create(&self, config: &String) -> anyhow::Result<String> { Ok(config.clone()) }
///     fn delete(&self, _record: &String) -> anyhow::Result<()> { Ok(()) }
///     fn plan_create(&self, _config: &String) -> Vec<AttributeDiff> {
///         vec![AttributeDiff::new("id", None, AttributeChange::Computed)]
///     }
///     fn plan_diff(&self, _old: &String, _record: &String, _new: &String) -> Vec<AttributeDiff> {
///         Vec::new()
///     }
/// }
/// ```
pub trait Resource: Send + Sync {
    /// Desired configuration, supplied by the caller
    type Config: Clone + PartialEq + fmt::Debug + Send + Sync;

    /// Persisted identity and computed attributes
    type Record: Clone + fmt::Debug + Send + Sync;

    /// Resource type name, e.g. "application_version"
    fn resource_type(&self) -> &'static str;

    /// Human-readable description of a configured instance
    fn describe(&self, config: &Self::Config) -> String;

    /// Configuration as engine-visible `(name, value)` pairs
    fn attributes(&self, config: &Self::Config) -> Vec<(&'static str, String)>;

    /// Identity of a persisted record
    fn record_id(&self, record: &Self::Record) -> String;

    /// Computed attributes as engine-visible `(name, value)` pairs
    fn record_attributes(&self, record: &Self::Record) -> Vec<(&'static str, String)>;

    /// Bring the resource into existence
    fn create(&self, config: &Self::Config) -> Result<Self::Record>;

    /// Refresh a record after create or update
    ///
    /// The default returns the record unchanged.
    fn read(&self, _config: &Self::Config, record: &Self::Record) -> Result<Self::Record> {
        Ok(record.clone())
    }

    /// Converge an existing resource to a new configuration
    ///
    /// The default runs [`Resource::create`] with the new configuration.
    fn update(
        &self,
        _old: &Self::Config,
        new: &Self::Config,
        _record: &Self::Record,
    ) -> Result<Self::Record> {
        self.create(new)
    }

    /// Remove the resource
    fn delete(&self, record: &Self::Record) -> Result<()>;

    /// Computed attributes a create is expected to produce
    fn plan_create(&self, config: &Self::Config) -> Vec<AttributeDiff>;

    /// Predicted computed attribute changes for an update
    ///
    /// Must not perform remote calls.
    fn plan_diff(
        &self,
        old: &Self::Config,
        record: &Self::Record,
        new: &Self::Config,
    ) -> Vec<AttributeDiff>;

    /// Key under which two configured instances would collide remotely
    ///
    /// The planner refuses a plan in which two instances share a key.
    fn conflict_key(&self, _config: &Self::Config) -> Option<String> {
        None
    }
}

/// Configuration attribute changes between two configurations
///
/// Only attributes whose value differs are returned.
pub fn config_changes<R: Resource + ?Sized>(
    resource: &R,
    old: &R::Config,
    new: &R::Config,
) -> Vec<AttributeDiff> {
    let before = resource.attributes(old);
    resource
        .attributes(new)
        .into_iter()
        .filter_map(|(name, value)| {
            let prior = before.iter().find(|(n, _)| *n == name).map(|(_, v)| v);
            if prior == Some(&value) {
                None
            } else {
                Some(AttributeDiff::new(
                    name,
                    prior.cloned(),
                    AttributeChange::Known(value),
                ))
            }
        })
        .collect()
}
