pub mod apply;
pub mod destroy;
pub mod label;
pub mod plan;
pub mod show;

mod display;

use anyhow::Result;
use appversion::backend::{FileRegistry, FsBundles, LocalStore};
use appversion::{ApplicationVersion, DesiredConfiguration, Reconciler};
use declarative::ExecutionPlan;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::config::{ProjectConfig, ProviderConfig};
use crate::paths;
use crate::state::StateFile;

/// The resource type driven by the CLI: local store, file registry,
/// bundles resolved against the project directory
pub type LocalVersion = ApplicationVersion<LocalStore, FileRegistry, FsBundles>;

/// Everything a command needs about the current project
pub struct Project {
    pub config: ProjectConfig,
    pub desired: BTreeMap<String, DesiredConfiguration>,
    pub state_path: PathBuf,
    pub state: StateFile,
}

impl Project {
    /// Load the project file and the state file
    pub fn load(ctx: &Context) -> Result<Self> {
        let config = ProjectConfig::load(&ctx.config)?;
        let desired = config.desired()?;
        let state_path = paths::state_file(&ctx.config, ctx.state.as_deref());
        let state = StateFile::load(&state_path)?;

        log::debug!(
            "Loaded {} resource(s) from {}, {} recorded in {}",
            desired.len(),
            ctx.config.display(),
            state.resources.len(),
            state_path.display()
        );

        Ok(Self {
            config,
            desired,
            state_path,
            state,
        })
    }

    /// Build the resource backed by the local store and registry
    pub fn resource(&self, ctx: &Context) -> Result<LocalVersion> {
        build_resource(&self.config.provider, &paths::project_dir(&ctx.config))
    }

    /// Plan the configured resources against the recorded state
    pub fn plan(
        &self,
        resource: &LocalVersion,
        target: Option<&str>,
    ) -> Result<ExecutionPlan<LocalVersion>> {
        let plan = ExecutionPlan::build(resource, &self.desired, &self.state.prior())?;
        Ok(plan.filter_by_target(resource, target))
    }

    pub fn save_state(&mut self) -> Result<()> {
        self.state.save(&self.state_path)
    }
}

/// Wire the local backends for a provider configuration
pub fn build_resource(provider: &ProviderConfig, project_dir: &Path) -> Result<LocalVersion> {
    let root = provider.root()?;
    let region = provider.resolve_region();
    log::info!("Using region {} with backend root {}", region, root.display());

    let store = LocalStore::new(root.join("store"));
    let registry = FileRegistry::new(root.join("registry").join(format!("{region}.json")), region)
        .with_account_id(provider.account_id());
    let reconciler =
        Reconciler::new(store, registry).with_bundles(FsBundles::rooted(project_dir));

    Ok(ApplicationVersion::new(reconciler))
}
