//! Execution planner - decides what apply will do per named resource

use crate::diff::DiffSummary;
use crate::resource::{Resource, config_changes};
use crate::types::{Action, AttributeDiff};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that make a plan impossible to build
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Two configured resources would converge onto the same remote object
    #[error("resources '{first}' and '{second}' both manage {key}")]
    Conflict {
        key: String,
        first: String,
        second: String,
    },
}

/// What apply last recorded for a resource
#[derive(Debug, Clone, PartialEq)]
pub struct Prior<C, R> {
    /// Configuration the record was produced from
    pub config: C,
    /// Persisted record
    pub record: R,
}

/// The planned change for one named resource
pub struct PlannedChange<R: Resource> {
    /// Name of the resource in the project
    pub name: String,
    /// Planned action
    pub action: Action,
    /// Desired configuration (absent for deletes)
    pub desired: Option<R::Config>,
    /// Recorded state (absent for creates)
    pub prior: Option<Prior<R::Config, R::Record>>,
    /// Configuration and computed attribute changes
    pub attributes: Vec<AttributeDiff>,
}

impl<R: Resource> PlannedChange<R> {
    /// Whether apply has anything to do for this resource
    pub fn is_pending(&self) -> bool {
        self.action != Action::NoChange
    }
}

/// An execution plan: one planned change per known resource, sorted by name
pub struct ExecutionPlan<R: Resource> {
    pub changes: Vec<PlannedChange<R>>,
}

impl<R: Resource> ExecutionPlan<R> {
    /// Build a plan from desired configurations and recorded state
    ///
    /// Never performs remote calls; computed attributes come from the
    /// resource's plan hooks.
    pub fn build(
        resource: &R,
        desired: &BTreeMap<String, R::Config>,
        prior: &BTreeMap<String, Prior<R::Config, R::Record>>,
    ) -> Result<Self, PlanError> {
        check_conflicts(resource, desired)?;

        let mut changes = Vec::new();

        for (name, config) in desired {
            let change = match prior.get(name) {
                None => PlannedChange {
                    name: name.clone(),
                    action: Action::Create,
                    desired: Some(config.clone()),
                    prior: None,
                    attributes: resource.plan_create(config),
                },
                Some(recorded) if recorded.config == *config => PlannedChange {
                    name: name.clone(),
                    action: Action::NoChange,
                    desired: Some(config.clone()),
                    prior: Some(recorded.clone()),
                    attributes: Vec::new(),
                },
                Some(recorded) => {
                    let mut attributes = config_changes(resource, &recorded.config, config);
                    attributes.extend(resource.plan_diff(
                        &recorded.config,
                        &recorded.record,
                        config,
                    ));
                    PlannedChange {
                        name: name.clone(),
                        action: Action::Update,
                        desired: Some(config.clone()),
                        prior: Some(recorded.clone()),
                        attributes,
                    }
                }
            };
            changes.push(change);
        }

        for (name, recorded) in prior {
            if !desired.contains_key(name) {
                changes.push(PlannedChange {
                    name: name.clone(),
                    action: Action::Delete,
                    desired: None,
                    prior: Some(recorded.clone()),
                    attributes: Vec::new(),
                });
            }
        }

        changes.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("Planned {} resources", changes.len());
        Ok(Self { changes })
    }

    /// Filter plan to only include changes matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlannedChange<R>) -> bool,
    {
        Self {
            changes: self.changes.into_iter().filter(|c| predicate(c)).collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "name" or "type.name"
    pub fn filter_by_target(self, resource: &R, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                if resource_type.is_some_and(|rt| rt != resource.resource_type()) {
                    return Self {
                        changes: Vec::new(),
                    };
                }
                self.filter(|c| c.name == name)
            }
        }
    }

    /// Changes apply has to perform
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange<R>> {
        self.changes.iter().filter(|c| c.is_pending())
    }

    /// Number of changes apply has to perform
    pub fn total_changes(&self) -> usize {
        self.summary().total()
    }

    /// Check if apply has nothing to do
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    /// Counts per action
    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_actions(self.changes.iter().map(|c| c.action))
    }
}

fn check_conflicts<R: Resource>(
    resource: &R,
    desired: &BTreeMap<String, R::Config>,
) -> Result<(), PlanError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for (name, config) in desired {
        let Some(key) = resource.conflict_key(config) else {
            continue;
        };
        if let Some(first) = seen.get(&key) {
            return Err(PlanError::Conflict {
                key,
                first: (*first).to_string(),
                second: name.clone(),
            });
        }
        seen.insert(key, name);
    }
    Ok(())
}

/// Parse a target string like "type.name" into (type, name)
pub fn parse_target(target: &str) -> (Option<&str>, &str) {
    match target.split_once('.') {
        Some((resource_type, name)) => (Some(resource_type), name),
        None => (None, target),
    }
}
