//! Dependency graph for step execution ordering.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::{OutpostError, Result};

/// Represents the prerequisite relationships between steps.
///
/// Steps are indexed by declaration order, which is also the tie-break
/// used by [`topological_order`](DependencyGraph::topological_order).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Step names in declaration order.
    names: Vec<String>,
    /// Name to declaration index.
    index: HashMap<String, usize>,
    /// Direct prerequisites of each step, by index.
    dependencies: Vec<Vec<usize>>,
    /// Steps that list each step as a prerequisite, by index.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Get the direct prerequisites of a step.
    pub fn dependencies_of(&self, step: &str) -> Option<Vec<&str>> {
        let idx = *self.index.get(step)?;
        Some(self.dependencies[idx].iter().map(|&d| self.names[d].as_str()).collect())
    }

    /// Get steps that list the given step as a prerequisite.
    pub fn dependents_of(&self, step: &str) -> Option<Vec<&str>> {
        let idx = *self.index.get(step)?;
        Some(self.dependents[idx].iter().map(|&d| self.names[d].as_str()).collect())
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.index.contains_key(step)
    }

    /// Get all step names in declaration order.
    pub fn steps(&self) -> &[String] {
        &self.names
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns steps in topological order (prerequisites before dependents).
    ///
    /// Among steps with no ordering constraint between them, declaration
    /// order is preserved. Returns `CycleDetected` if a cycle exists.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        // Min-heap on declaration index keeps the sort stable
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut result = Vec::with_capacity(self.names.len());

        while let Some(Reverse(idx)) = ready.pop() {
            result.push(self.names[idx].clone());

            for &dependent in &self.dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if result.len() != self.names.len() {
            let cycle = self.find_cycle().unwrap_or_else(|| {
                // Kahn's leftovers: every node still waiting on an edge
                in_degree
                    .iter()
                    .enumerate()
                    .filter(|(_, &d)| d > 0)
                    .map(|(idx, _)| self.names[idx].clone())
                    .collect()
            });
            return Err(OutpostError::CycleDetected { cycle });
        }

        Ok(result)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same step, e.g. `[a, b, a]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&n| graph.names[n].clone())
                            .collect();
                        cycle.push(graph.names[dep].clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.names.len()];
        let mut path = Vec::new();

        for node in 0..self.names.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// Get all transitive dependents of a step.
    pub fn transitive_dependents(&self, step: &str) -> HashSet<String> {
        self.walk(step, &self.dependents)
    }

    /// Get all transitive prerequisites of a step.
    pub fn transitive_dependencies(&self, step: &str) -> HashSet<String> {
        self.walk(step, &self.dependencies)
    }

    fn walk(&self, step: &str, edges: &[Vec<usize>]) -> HashSet<String> {
        let mut result = HashSet::new();
        let Some(&start) = self.index.get(step) else {
            return result;
        };

        let mut to_visit = vec![start];
        while let Some(current) = to_visit.pop() {
            for &next in &edges[current] {
                if result.insert(self.names[next].clone()) {
                    to_visit.push(next);
                }
            }
        }

        result
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    steps: Vec<(String, Vec<String>)>,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step with its prerequisites.
    pub fn add_step(mut self, name: impl Into<String>, depends_on: Vec<String>) -> Self {
        self.steps.push((name.into(), depends_on));
        self
    }

    /// Build the dependency graph.
    ///
    /// Returns `DuplicateName` if two steps share a name and
    /// `UnknownPrerequisite` if a prerequisite is not declared.
    pub fn build(self) -> Result<DependencyGraph> {
        let mut index = HashMap::with_capacity(self.steps.len());
        for (idx, (name, _)) in self.steps.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(OutpostError::DuplicateName { name: name.clone() });
            }
        }

        let mut dependencies = vec![Vec::new(); self.steps.len()];
        let mut dependents = vec![Vec::new(); self.steps.len()];

        for (idx, (name, deps)) in self.steps.iter().enumerate() {
            for dep in deps {
                let Some(&dep_idx) = index.get(dep) else {
                    return Err(OutpostError::UnknownPrerequisite {
                        step: name.clone(),
                        prerequisite: dep.clone(),
                    });
                };
                if !dependencies[idx].contains(&dep_idx) {
                    dependencies[idx].push(dep_idx);
                    dependents[dep_idx].push(idx);
                }
            }
        }

        Ok(DependencyGraph {
            names: self.steps.into_iter().map(|(name, _)| name).collect(),
            index,
            dependencies,
            dependents,
        })
    }
}
