//! # appversion
//!
//! Declarative provisioning of application versions for a
//! platform-as-a-service deployment.
//!
//! A version is provisioned by uploading a local bundle to an artifact
//! store and registering it under a label derived from the bundle
//! filename. Registration is idempotent: when the label already exists the
//! existing version is adopted instead of created.
//!
//! ## Example
//!
//! ```no_run
//! use appversion::backend::{FileRegistry, LocalStore};
//! use appversion::{DesiredConfiguration, Reconciler};
//!
//! let reconciler = Reconciler::new(
//!     LocalStore::new("/var/lib/appver/store"),
//!     FileRegistry::new("/var/lib/appver/registry.json", "ap-southeast-2"),
//! );
//!
//! let config = DesiredConfiguration::new("shop", "builds", "release-1.2.zip")
//!     .with_key_prefix("bundles");
//! config.validate().expect("invalid configuration");
//!
//! let record = reconciler.reconcile(&config, None).expect("reconcile failed");
//! println!("{} -> {}", record.version_label, record.version_arn);
//! ```
//!
//! ## Plan without side effects
//!
//! [`predict_diff`] tells ahead of apply which computed attributes will
//! change. Only a different bundle filename moves them.
//!
//! ```
//! use appversion::{predict_diff, DesiredConfiguration};
//! use declarative::AttributeChange;
//!
//! let old = DesiredConfiguration::new("shop", "builds", "a.zip");
//! let new = DesiredConfiguration::new("shop", "builds", "b.tar.gz");
//!
//! let diff = predict_diff(&old, &new);
//! assert_eq!(diff.version_label, AttributeChange::Known("b.tar".into()));
//! assert_eq!(diff.version_arn, AttributeChange::Computed);
//! ```

#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod diff;
pub mod error;
pub mod label;
pub mod reconcile;
pub mod record;
pub mod resource;

pub use config::{DEFAULT_KEY_PREFIX, DesiredConfiguration};
pub use diff::{DiffResult, predict_diff};
pub use error::{Error, ErrorCategory, Result};
pub use label::derive_label;
pub use reconcile::Reconciler;
pub use record::ResourceRecord;
pub use resource::ApplicationVersion;
