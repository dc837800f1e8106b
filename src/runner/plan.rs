//! Dependency-ordered step sequences.

use std::collections::{HashMap, HashSet};

use crate::error::{OutpostError, Result};
use crate::steps::Step;

use super::dependency::DependencyGraph;

/// Steps ordered so every prerequisite precedes its dependents.
///
/// Derived fresh for each run; construction fails on duplicate names,
/// unknown prerequisites, and cycles.
#[derive(Debug)]
pub struct Plan {
    steps: Vec<Step>,
    graph: DependencyGraph,
}

impl Plan {
    /// Order `steps` by their prerequisites.
    ///
    /// Steps with no ordering constraint between them keep the order in
    /// which they were declared.
    pub fn build(steps: Vec<Step>) -> Result<Self> {
        let graph = steps
            .iter()
            .fold(DependencyGraph::builder(), |builder, step| {
                builder.add_step(step.name(), step.prerequisites().to_vec())
            })
            .build()?;

        let order = graph.topological_order()?;
        tracing::debug!(order = ?order, "plan ordered");

        let mut by_name: HashMap<String, Step> = steps
            .into_iter()
            .map(|step| (step.name().to_string(), step))
            .collect();
        let steps = order
            .iter()
            .filter_map(|name| by_name.remove(name))
            .collect();

        Ok(Self { steps, graph })
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Position of a step in the execution order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name() == name)
    }

    /// Look up a step by name.
    pub fn get(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name() == name)
    }

    /// The prerequisite graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Restrict the plan to `names` plus everything they transitively need.
    pub fn select(self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut keep: HashSet<String> = HashSet::new();
        for name in names {
            if !self.graph.contains(name) {
                return Err(OutpostError::ConfigValidationError {
                    message: format!("Unknown step '{}'", name),
                });
            }
            keep.insert(name.clone());
            keep.extend(self.graph.transitive_dependencies(name));
        }

        let steps = self
            .steps
            .into_iter()
            .filter(|step| keep.contains(step.name()))
            .collect();
        Self::build(steps)
    }
}
