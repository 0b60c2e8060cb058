//! Resource graph
//!
//! Orders resources so every resource comes after what it depends on
//! (apply order), or before it (destroy order). Ties keep insertion order so
//! plans are stable from run to run.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{Resource, ResourceState};
use crate::domain::value_objects::Urn;
use crate::error::{StackError, StackResult};

#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<Urn>,
    edges: HashMap<Urn, Vec<Urn>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `urn` with the urns it depends on
    pub fn add(&mut self, urn: Urn, dependencies: Vec<Urn>) {
        if !self.edges.contains_key(&urn) {
            self.nodes.push(urn.clone());
        }
        self.edges.insert(urn, dependencies);
    }

    /// Graph of declared resources (data references plus `depends_on`)
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut graph = Self::new();
        for resource in resources {
            graph.add(resource.urn().clone(), resource.dependencies());
        }
        graph
    }

    /// Graph of recorded resources; `deleted_with` counts as a dependency so
    /// the holder is removed before its target
    pub fn from_state<'a>(states: impl IntoIterator<Item = &'a ResourceState>) -> Self {
        let mut graph = Self::new();
        for state in states {
            let mut deps = state.dependencies.clone();
            if let Some(target) = &state.deleted_with {
                if !deps.contains(target) {
                    deps.push(target.clone());
                }
            }
            graph.add(state.urn.clone(), deps);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependencies first. Fails on edges to undeclared resources and cycles.
    pub fn apply_order(&self) -> StackResult<Vec<Urn>> {
        for urn in &self.nodes {
            for dep in &self.edges[urn] {
                if !self.edges.contains_key(dep) {
                    return Err(StackError::UnknownDependency {
                        urn: urn.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        self.sort()
    }

    /// Dependents first. Edges to resources outside the graph are ignored,
    /// since those resources are not being deleted.
    pub fn destroy_order(&self) -> StackResult<Vec<Urn>> {
        let mut order = self.sort()?;
        order.reverse();
        Ok(order)
    }

    fn sort(&self) -> StackResult<Vec<Urn>> {
        let mut emitted: HashSet<&Urn> = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let next = self.nodes.iter().find(|urn| {
                !emitted.contains(urn)
                    && self.edges[*urn]
                        .iter()
                        .filter(|dep| self.edges.contains_key(*dep))
                        .all(|dep| emitted.contains(dep))
            });

            match next {
                Some(urn) => {
                    emitted.insert(urn);
                    order.push(urn.clone());
                }
                None => {
                    let members = self
                        .nodes
                        .iter()
                        .filter(|urn| !emitted.contains(urn))
                        .map(|urn| urn.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(StackError::DependencyCycle { members });
                }
            }
        }

        Ok(order)
    }
}
