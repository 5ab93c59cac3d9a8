//! Dependency graph over registered plugins: cycle detection, weight-ordered
//! topological sort, and conflict discovery (version, missing, resource).
use std::collections::{BinaryHeap, HashMap, HashSet};

use semver::{Op, Version, VersionReq};

use crate::plugin_system::dependency::{Dependency, DependencyError, DependencyType};
use crate::plugin_system::version::ApiVersion;

/// A node's resolved version-compatible bounds, derived from a `VersionReq`.
/// Used only to test whether two requirements on the same plugin can ever be
/// satisfied simultaneously; it is a coarse approximation, not a solver.
#[derive(Debug, Clone, Copy)]
struct EffectiveBounds {
    min: Option<Version>,
    min_inclusive: bool,
    max: Option<Version>,
    max_inclusive: bool,
}

fn get_effective_bounds_from_req(req: &VersionReq) -> EffectiveBounds {
    let mut bounds = EffectiveBounds {
        min: None,
        min_inclusive: true,
        max: None,
        max_inclusive: true,
    };
    for comparator in &req.comparators {
        let v = Version::new(
            comparator.major,
            comparator.minor.unwrap_or(0),
            comparator.patch.unwrap_or(0),
        );
        match comparator.op {
            Op::Exact | Op::Caret | Op::Tilde | Op::Wildcard => {
                bounds.min = Some(bounds.min.map_or(v.clone(), |m| m.max(v.clone())));
                bounds.max = Some(bounds.max.map_or(v, |m| m.min(v.clone())));
            }
            Op::Greater => {
                if bounds.min.as_ref().is_none_or(|m| v >= *m) {
                    bounds.min = Some(v);
                    bounds.min_inclusive = false;
                }
            }
            Op::GreaterEq => {
                if bounds.min.as_ref().is_none_or(|m| v >= *m) {
                    bounds.min = Some(v);
                    bounds.min_inclusive = true;
                }
            }
            Op::Less => {
                if bounds.max.as_ref().is_none_or(|m| v <= *m) {
                    bounds.max = Some(v);
                    bounds.max_inclusive = false;
                }
            }
            Op::LessEq => {
                if bounds.max.as_ref().is_none_or(|m| v <= *m) {
                    bounds.max = Some(v);
                    bounds.max_inclusive = true;
                }
            }
            _ => {}
        }
    }
    bounds
}

fn are_bounds_disjoint(a: &EffectiveBounds, b: &EffectiveBounds) -> bool {
    if let (Some(a_max), Some(b_min)) = (&a.max, &b.min) {
        if a_max < b_min || (a_max == b_min && (!a.max_inclusive || !b.min_inclusive)) {
            return true;
        }
    }
    if let (Some(b_max), Some(a_min)) = (&b.max, &a.min) {
        if b_max < a_min || (b_max == a_min && (!b.max_inclusive || !a.min_inclusive)) {
            return true;
        }
    }
    false
}

/// Ordering wrapper so `BinaryHeap` (a max-heap) pops the highest-weight
/// plugin first, breaking ties by ascending id.
#[derive(Eq, PartialEq, Clone)]
struct PrioritizedNode {
    weight: i32,
    id: String,
}

impl Ord for PrioritizedNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for PrioritizedNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Why a dependency's version constraint rejected the candidate version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMismatchReason {
    ExactVersionMismatch,
    ExcludedVersion,
    VersionTooLow,
    VersionTooHigh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphConflict {
    VersionIncompatible {
        plugin_id: String,
        depends_on: String,
        requirement: String,
        reason: VersionMismatchReason,
    },
    MissingDependency {
        plugin_id: String,
        depends_on: String,
    },
    ResourceConflict {
        resource: String,
        plugin_ids: Vec<String>,
    },
}

#[derive(Debug, Default, Clone)]
struct Node {
    weight: i32,
    version: Option<ApiVersion>,
    dependencies: Vec<Dependency>,
    resources: Vec<String>,
}

/// Directed graph of plugin dependencies, keyed by plugin id.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: HashMap<String, Node>,
    /// plugin_id -> ids it depends on (edges).
    edges: HashMap<String, HashSet<String>>,
    /// plugin_id -> ids that depend on it (reverse edges).
    dependents: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin node. `weight` breaks sort-order ties (higher runs
    /// earlier); `version` is the plugin's own version, used to evaluate
    /// other plugins' constraints against it.
    pub fn add_plugin(
        &mut self,
        id: impl Into<String>,
        weight: i32,
        version: Option<ApiVersion>,
        resources: Vec<String>,
    ) {
        let id = id.into();
        self.nodes.entry(id.clone()).or_default();
        self.edges.entry(id.clone()).or_default();
        self.dependents.entry(id.clone()).or_default();
        let node = self.nodes.get_mut(&id).expect("just inserted");
        node.weight = weight;
        node.version = version;
        node.resources = resources;
    }

    pub fn remove_plugin(&mut self, id: &str) {
        self.nodes.remove(id);
        if let Some(deps) = self.edges.remove(id) {
            for dep in deps {
                if let Some(set) = self.dependents.get_mut(&dep) {
                    set.remove(id);
                }
            }
        }
        if let Some(dependents) = self.dependents.remove(id) {
            for dependent in dependents {
                if let Some(set) = self.edges.get_mut(&dependent) {
                    set.remove(id);
                }
            }
        }
    }

    /// Record `dependency` as an edge from `plugin_id` to `dependency.id`.
    pub fn add_dependency(&mut self, plugin_id: impl Into<String>, dependency: Dependency) {
        let plugin_id = plugin_id.into();
        let dep_id = dependency.id.clone();
        self.edges.entry(plugin_id.clone()).or_default();
        self.dependents.entry(plugin_id.clone()).or_default();
        if matches!(
            dependency.kind,
            DependencyType::Required | DependencyType::Optional
        ) {
            self.dependents
                .entry(dep_id.clone())
                .or_default()
                .insert(plugin_id.clone());
            self.edges
                .get_mut(&plugin_id)
                .expect("just inserted")
                .insert(dep_id);
        }
        self.nodes
            .entry(plugin_id)
            .or_default()
            .dependencies
            .push(dependency);
    }

    pub fn remove_dependency(&mut self, plugin_id: &str, dependency_id: &str) {
        if let Some(edges) = self.edges.get_mut(plugin_id) {
            edges.remove(dependency_id);
        }
        if let Some(set) = self.dependents.get_mut(dependency_id) {
            set.remove(plugin_id);
        }
        if let Some(node) = self.nodes.get_mut(plugin_id) {
            node.dependencies.retain(|d| d.id != dependency_id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Depth-first cycle search. Returns the first cycle found as an ordered
    /// path that repeats its first node at the end, or `None` if acyclic.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut stack: Vec<String> = Vec::new();

        fn visit<'a>(
            graph: &'a DependencyGraph,
            id: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
            stack: &mut Vec<String>,
        ) -> Option<Vec<String>> {
            match marks.get(id) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|n| n == id).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..].to_vec();
                    cycle.push(id.to_string());
                    return Some(cycle);
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            stack.push(id.to_string());
            if let Some(deps) = graph.edges.get(id) {
                let mut sorted_deps: Vec<&String> = deps.iter().collect();
                sorted_deps.sort();
                for dep in sorted_deps {
                    if let Some(cycle) = visit(graph, dep.as_str(), marks, stack) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            marks.insert(id, Mark::Done);
            None
        }

        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        for id in ids {
            if let Some(cycle) = visit(self, id.as_str(), &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    /// Kahn's algorithm over the current node set, breaking ties among nodes
    /// with equal in-degree by descending weight then ascending id so the
    /// order is deterministic across runs.
    pub fn topological_sort(&self) -> Result<Vec<String>, DependencyError> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for id in self.nodes.keys() {
            in_degree.insert(id.as_str(), 0);
        }
        for (id, deps) in &self.edges {
            if !self.nodes.contains_key(id) {
                continue;
            }
            for dep in deps {
                if self.nodes.contains_key(dep) {
                    *in_degree.entry(id.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut heap = BinaryHeap::new();
        for (id, degree) in &in_degree {
            if *degree == 0 {
                let weight = self.nodes.get(*id).map(|n| n.weight).unwrap_or(0);
                heap.push(PrioritizedNode {
                    weight,
                    id: (*id).to_string(),
                });
            }
        }

        let mut sorted = Vec::new();
        while let Some(PrioritizedNode { id, .. }) = heap.pop() {
            sorted.push(id.clone());
            if let Some(dependents) = self.dependents.get(&id) {
                let mut dependents: Vec<&String> = dependents.iter().collect();
                dependents.sort();
                for dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        if *degree == 0 {
                            continue;
                        }
                        *degree -= 1;
                        if *degree == 0 {
                            let weight = self.nodes.get(dependent.as_str()).map(|n| n.weight).unwrap_or(0);
                            heap.push(PrioritizedNode {
                                weight,
                                id: dependent.clone(),
                            });
                        }
                    }
                }
            }
        }

        if sorted.len() == self.nodes.len() {
            Ok(sorted)
        } else {
            let cycle_nodes: Vec<String> = self
                .nodes
                .keys()
                .filter(|id| !sorted.contains(id))
                .cloned()
                .collect();
            Err(DependencyError::CyclicDependency(cycle_nodes))
        }
    }

    /// Find missing-dependency, version-incompatible, and same-resource
    /// conflicts across the current graph. Call again after each resolution
    /// step to confirm the fix actually cleared the conflict.
    pub fn find_conflicts(&self) -> Vec<GraphConflict> {
        let mut conflicts = Vec::new();

        for (plugin_id, node) in &self.nodes {
            for dep in &node.dependencies {
                let Some(dep_node) = self.nodes.get(&dep.id) else {
                    if dep.required {
                        conflicts.push(GraphConflict::MissingDependency {
                            plugin_id: plugin_id.clone(),
                            depends_on: dep.id.clone(),
                        });
                    }
                    continue;
                };
                if let (Some(constraint), Some(dep_version)) = (&dep.version_constraint, &dep_node.version) {
                    if !constraint.satisfies(dep_version) {
                        let reason = if constraint.exact_version.is_some() {
                            VersionMismatchReason::ExactVersionMismatch
                        } else if constraint.exclude_versions.iter().any(|v| v == dep_version) {
                            VersionMismatchReason::ExcludedVersion
                        } else if constraint.min_version.as_ref().is_some_and(|m| dep_version < m) {
                            VersionMismatchReason::VersionTooLow
                        } else {
                            VersionMismatchReason::VersionTooHigh
                        };
                        conflicts.push(GraphConflict::VersionIncompatible {
                            plugin_id: plugin_id.clone(),
                            depends_on: dep.id.clone(),
                            requirement: constraint.to_string(),
                            reason,
                        });
                    }
                }
            }
        }

        let mut by_resource: HashMap<&str, Vec<&str>> = HashMap::new();
        for (id, node) in &self.nodes {
            for resource in &node.resources {
                by_resource.entry(resource.as_str()).or_default().push(id.as_str());
            }
        }
        for (resource, owners) in by_resource {
            if owners.len() > 1 {
                let mut owners: Vec<String> = owners.into_iter().map(str::to_string).collect();
                owners.sort();
                conflicts.push(GraphConflict::ResourceConflict {
                    resource: resource.to_string(),
                    plugin_ids: owners,
                });
            }
        }

        conflicts
    }

    /// Test whether two `VersionReq`s on the same dependency can ever both
    /// be satisfied. Used by the conflict resolver when proposing a shared
    /// version to pin a contested dependency to.
    pub fn requirements_disjoint(a: &VersionReq, b: &VersionReq) -> bool {
        are_bounds_disjoint(&get_effective_bounds_from_req(a), &get_effective_bounds_from_req(b))
    }
}
