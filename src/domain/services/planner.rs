//! Deployment planning service
//!
//! Pure domain logic: compares the declared resources with the last-applied
//! state snapshot and decides, per resource, whether to create, update,
//! replace, leave alone or delete it. No provider calls happen here.
//!
//! Values that reference outputs of a resource which is itself changing in
//! the same run are unknown until apply; an unknown value always counts as a
//! change.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{ResolvedResource, Resource, ResourceState, StateSnapshot};
use crate::domain::value_objects::{Fingerprint, OutputRef, StepOp, Urn};
use crate::error::StackResult;

use super::graph::ResourceGraph;

/// Pseudo-key recorded when the physical name changes
pub const NAME_KEY: &str = "name";

/// One input that differs from the last-applied state
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub key: String,
    /// Last-applied fingerprint; `None` if the input is new
    pub old: Option<Fingerprint>,
    /// Desired fingerprint; `None` if removed or not yet known
    pub new: Option<Fingerprint>,
    /// The new value is only known after dependencies are applied
    pub computed: bool,
}

impl PropertyChange {
    fn known(key: &str, old: Option<&Fingerprint>, new: Option<Fingerprint>) -> Self {
        Self {
            key: key.to_string(),
            old: old.cloned(),
            new,
            computed: false,
        }
    }

    fn computed(key: &str, old: Option<&Fingerprint>) -> Self {
        Self {
            key: key.to_string(),
            old: old.cloned(),
            new: None,
            computed: true,
        }
    }
}

/// A planned action for a single resource
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub urn: Urn,
    /// Physical name (desired for apply steps, recorded for deletes)
    pub name: String,
    pub op: StepOp,
    pub changes: Vec<PropertyChange>,
}

impl PlannedStep {
    pub fn is_change(&self) -> bool {
        self.op.is_change()
    }
}

/// Ordered steps of a run
#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: PlannedStep) {
        self.steps.push(step);
    }

    /// All steps in execution order, including unchanged resources
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn step(&self, urn: &Urn) -> Option<&PlannedStep> {
        self.steps.iter().find(|s| &s.urn == urn)
    }

    pub fn op(&self, urn: &Urn) -> Option<StepOp> {
        self.step(urn).map(|s| s.op)
    }

    /// Steps that do something
    pub fn changes(&self) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(|s| s.is_change())
    }

    pub fn count(&self, op: StepOp) -> usize {
        self.steps.iter().filter(|s| s.op == op).count()
    }

    pub fn change_count(&self) -> usize {
        self.changes().count()
    }

    pub fn has_changes(&self) -> bool {
        self.steps.iter().any(|s| s.is_change())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Pure planning service
pub struct Planner;

impl Planner {
    /// Plan bringing `state` to the `desired` resources.
    ///
    /// Apply steps come first in dependency order, followed by deletions of
    /// resources that are no longer declared (dependents first).
    pub fn plan(desired: &[Resource], state: &StateSnapshot) -> StackResult<Plan> {
        let order = ResourceGraph::from_resources(desired).apply_order()?;
        let by_urn: HashMap<&Urn, &Resource> = desired.iter().map(|r| (r.urn(), r)).collect();

        let mut plan = Plan::new();
        let mut ops: HashMap<Urn, StepOp> = HashMap::new();

        for urn in &order {
            let Some(resource) = by_urn.get(urn) else {
                continue;
            };
            let known = |r: &OutputRef| -> Option<Fingerprint> {
                match ops.get(&r.urn) {
                    Some(StepOp::Same) => state.get(&r.urn)?.outputs.get(&r.key).cloned(),
                    _ => None,
                }
            };
            let (op, changes) = Self::diff(resource, state.get(urn), &known);

            ops.insert(urn.clone(), op);
            plan.push(PlannedStep {
                urn: urn.clone(),
                name: resource.name().to_string(),
                op,
                changes,
            });
        }

        let orphans: Vec<&ResourceState> = state
            .resources()
            .filter(|rs| !by_urn.contains_key(&rs.urn))
            .collect();
        for urn in ResourceGraph::from_state(orphans.iter().copied()).destroy_order()? {
            if let Some(prior) = state.get(&urn) {
                plan.push(Self::delete_step(prior));
            }
        }

        Ok(plan)
    }

    /// Plan deleting everything in `state`, dependents and `deleted_with`
    /// holders first
    pub fn plan_destroy(state: &StateSnapshot) -> StackResult<Plan> {
        let mut plan = Plan::new();
        for urn in ResourceGraph::from_state(state.resources()).destroy_order()? {
            if let Some(prior) = state.get(&urn) {
                plan.push(Self::delete_step(prior));
            }
        }
        Ok(plan)
    }

    /// Decide the op for one resource against its prior state.
    ///
    /// `known` resolves output references whose value is already settled.
    pub fn diff(
        resource: &Resource,
        prior: Option<&ResourceState>,
        known: &impl Fn(&OutputRef) -> Option<Fingerprint>,
    ) -> (StepOp, Vec<PropertyChange>) {
        let Some(prior) = prior else {
            let changes = resource
                .inputs()
                .iter()
                .map(|(key, value)| match value.fingerprint_with(known) {
                    Some(fp) => PropertyChange::known(key, None, Some(fp)),
                    None => PropertyChange::computed(key, None),
                })
                .collect();
            return (StepOp::Create, changes);
        };

        let mut changes = Vec::new();
        if prior.name != resource.name() {
            changes.push(PropertyChange::known(
                NAME_KEY,
                Some(&Fingerprint::from(prior.name.as_str())),
                Some(Fingerprint::from(resource.name())),
            ));
        }

        let keys: BTreeSet<&String> = resource.inputs().keys().chain(prior.inputs.keys()).collect();
        for key in keys {
            let old = prior.inputs.get(key);
            match resource.inputs().get(key) {
                None => changes.push(PropertyChange::known(key, old, None)),
                Some(value) => match value.fingerprint_with(known) {
                    None => changes.push(PropertyChange::computed(key, old)),
                    Some(fp) if old != Some(&fp) => {
                        changes.push(PropertyChange::known(key, old, Some(fp)))
                    }
                    Some(_) => {}
                },
            }
        }

        let replace_keys = resource.kind().replace_keys();
        let op = if changes.is_empty() {
            StepOp::Same
        } else if changes
            .iter()
            .any(|c| !c.computed && (c.key == NAME_KEY || replace_keys.contains(&c.key.as_str())))
        {
            StepOp::Replace
        } else {
            StepOp::Update
        };

        (op, changes)
    }

    /// Re-check a planned update once every reference has been resolved:
    /// a replace-forcing input that turned out different upgrades it to a
    /// replace.
    pub fn refine(op: StepOp, resolved: &ResolvedResource, prior: &ResourceState) -> StepOp {
        if op != StepOp::Update {
            return op;
        }
        let current = resolved.fingerprints();
        let forces_replace = resolved
            .kind()
            .replace_keys()
            .iter()
            .any(|key| current.get(*key) != prior.inputs.get(*key));
        if forces_replace {
            StepOp::Replace
        } else {
            op
        }
    }

    fn delete_step(prior: &ResourceState) -> PlannedStep {
        PlannedStep {
            urn: prior.urn.clone(),
            name: prior.name.clone(),
            op: StepOp::Delete,
            changes: Vec::new(),
        }
    }
}
