//! Turns raw graph conflicts into ranked, human-readable resolution reports.
use std::hash::Hash;

use crate::plugin_system::graph::{GraphConflict, VersionMismatchReason};

/// Unique identifier for a resource contended over by plugins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub kind: String,
    pub id: String,
}

/// How a plugin intends to use a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
pub enum ResourceAccessType {
    ExclusiveRead,
    ExclusiveWrite,
    SharedRead,
    SharedWrite,
    ProvidesUniqueId,
}

impl ResourceAccessType {
    /// Whether two claims on the same resource instance conflict, per the
    /// access-type compatibility matrix.
    pub fn conflicts_with(self, other: ResourceAccessType) -> bool {
        use ResourceAccessType::*;
        !matches!(
            (self, other),
            (SharedRead, SharedRead) | (SharedRead, ProvidesUniqueId) | (ProvidesUniqueId, SharedRead)
        )
    }
}

/// The kind of conflict found while resolving the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictKind {
    Version {
        depends_on: String,
        requirement: String,
        reason: VersionMismatchReason,
    },
    Circular {
        cycle: Vec<String>,
    },
    Missing {
        depends_on: String,
    },
    Incompatible {
        reason: String,
    },
    Resource {
        resource: ResourceIdentifier,
        first_access: ResourceAccessType,
        second_access: ResourceAccessType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionAction {
    Upgrade,
    Downgrade,
    Replace,
    Remove,
    Configure,
    Install,
    Merge,
    Rename,
    RemoveDependency,
    Restructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// One candidate fix for a conflict, ranked against its siblings by
/// ascending priority then ascending risk.
#[derive(Debug, Clone)]
pub struct Solution {
    pub action: SolutionAction,
    pub target_plugin: String,
    pub description: String,
    pub risk: Risk,
    pub priority: u8,
}

/// A fully described conflict between one or more plugins, with candidate
/// fixes ranked best-first.
#[derive(Debug, Clone)]
pub struct ConflictReport {
    pub plugins: Vec<String>,
    pub kind: ConflictKind,
    pub severity: Severity,
    pub summary: String,
    pub solutions: Vec<Solution>,
}

impl ConflictReport {
    pub fn is_critical(&self) -> bool {
        self.severity >= Severity::High
    }
}

fn severity_for(kind: &ConflictKind) -> Severity {
    match kind {
        ConflictKind::Circular { .. } => Severity::Critical,
        ConflictKind::Missing { .. } => Severity::High,
        ConflictKind::Version { .. } => Severity::High,
        ConflictKind::Incompatible { .. } => Severity::Critical,
        ConflictKind::Resource { first_access, second_access, .. } => {
            if first_access.conflicts_with(*second_access) {
                match (first_access, second_access) {
                    (ResourceAccessType::ExclusiveWrite, _) | (_, ResourceAccessType::ExclusiveWrite) => {
                        Severity::Critical
                    }
                    _ => Severity::Medium,
                }
            } else {
                Severity::Low
            }
        }
    }
}

fn solutions_for(plugin_id: &str, kind: &ConflictKind) -> Vec<Solution> {
    match kind {
        ConflictKind::Version { depends_on, reason, .. } => {
            let (action, description) = match reason {
                VersionMismatchReason::VersionTooLow => (
                    SolutionAction::Upgrade,
                    format!("upgrade '{}' to satisfy {}'s requirement", depends_on, plugin_id),
                ),
                VersionMismatchReason::VersionTooHigh => (
                    SolutionAction::Downgrade,
                    format!("downgrade '{}' to satisfy {}'s requirement", depends_on, plugin_id),
                ),
                VersionMismatchReason::ExcludedVersion | VersionMismatchReason::ExactVersionMismatch => (
                    SolutionAction::Replace,
                    format!("replace the installed '{}' with a version {} accepts", depends_on, plugin_id),
                ),
            };
            vec![
                Solution { action, target_plugin: depends_on.clone(), description, risk: Risk::Medium, priority: 1 },
                Solution {
                    action: SolutionAction::RemoveDependency,
                    target_plugin: plugin_id.to_string(),
                    description: format!("relax or drop {}'s dependency on '{}'", plugin_id, depends_on),
                    risk: Risk::High,
                    priority: 2,
                },
            ]
        }
        ConflictKind::Missing { depends_on } => vec![Solution {
            action: SolutionAction::Install,
            target_plugin: depends_on.clone(),
            description: format!("install missing dependency '{}'", depends_on),
            risk: Risk::Low,
            priority: 1,
        }],
        ConflictKind::Circular { cycle } => vec![Solution {
            action: SolutionAction::Restructure,
            target_plugin: cycle.first().cloned().unwrap_or_default(),
            description: format!("break the dependency cycle {}", cycle.join(" -> ")),
            risk: Risk::High,
            priority: 1,
        }],
        ConflictKind::Incompatible { reason } => vec![Solution {
            action: SolutionAction::Remove,
            target_plugin: plugin_id.to_string(),
            description: format!("disable one of the incompatible plugins ({})", reason),
            risk: Risk::Medium,
            priority: 1,
        }],
        ConflictKind::Resource { resource, .. } => vec![
            Solution {
                action: SolutionAction::Configure,
                target_plugin: plugin_id.to_string(),
                description: format!("reconfigure access to '{}' ({}) to a non-conflicting mode", resource.id, resource.kind),
                risk: Risk::Low,
                priority: 1,
            },
            Solution {
                action: SolutionAction::Rename,
                target_plugin: plugin_id.to_string(),
                description: format!("claim a distinct resource instead of sharing '{}'", resource.id),
                risk: Risk::Medium,
                priority: 2,
            },
        ],
    }
}

/// Turns raw `GraphConflict`s into ranked `ConflictReport`s: assigns
/// severity, attaches candidate solutions, and computes a summary line.
pub fn build_reports(conflicts: Vec<GraphConflict>) -> Vec<ConflictReport> {
    let mut reports: Vec<ConflictReport> = conflicts
        .into_iter()
        .map(|c| match c {
            GraphConflict::VersionIncompatible { plugin_id, depends_on, requirement, reason } => {
                let kind = ConflictKind::Version { depends_on, requirement, reason };
                let severity = severity_for(&kind);
                let solutions = solutions_for(&plugin_id, &kind);
                let summary = format!("{} has an unsatisfiable version requirement", plugin_id);
                ConflictReport { plugins: vec![plugin_id], kind, severity, summary, solutions }
            }
            GraphConflict::MissingDependency { plugin_id, depends_on } => {
                let kind = ConflictKind::Missing { depends_on };
                let severity = severity_for(&kind);
                let solutions = solutions_for(&plugin_id, &kind);
                let summary = format!("{} depends on a plugin that is not registered", plugin_id);
                ConflictReport { plugins: vec![plugin_id], kind, severity, summary, solutions }
            }
            GraphConflict::ResourceConflict { resource, plugin_ids } => {
                let kind = ConflictKind::Resource {
                    resource: ResourceIdentifier { kind: "named".to_string(), id: resource.clone() },
                    first_access: ResourceAccessType::ExclusiveWrite,
                    second_access: ResourceAccessType::ExclusiveWrite,
                };
                let severity = severity_for(&kind);
                let lead = plugin_ids.first().cloned().unwrap_or_default();
                let solutions = solutions_for(&lead, &kind);
                let summary = format!("{} plugins claim the same resource '{}'", plugin_ids.len(), resource);
                ConflictReport { plugins: plugin_ids, kind, severity, summary, solutions }
            }
        })
        .collect();

    for report in &mut reports {
        report.solutions.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.risk.cmp(&b.risk)));
    }
    reports.sort_by(|a, b| b.severity.cmp(&a.severity));
    reports
}

/// Adds a cycle found separately (graph cycle detection returns at most one
/// path at a time) as a `ConflictReport`.
pub fn report_cycle(cycle: Vec<String>) -> ConflictReport {
    let kind = ConflictKind::Circular { cycle: cycle.clone() };
    let severity = severity_for(&kind);
    let lead = cycle.first().cloned().unwrap_or_default();
    let solutions = solutions_for(&lead, &kind);
    let summary = format!("circular dependency: {}", cycle.join(" -> "));
    ConflictReport { plugins: cycle, kind, severity, summary, solutions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_write_is_critical() {
        let report = build_reports(vec![GraphConflict::ResourceConflict {
            resource: "shared.lock".to_string(),
            plugin_ids: vec!["a".to_string(), "b".to_string()],
        }])
        .pop()
        .unwrap();
        assert!(report.is_critical());
        assert_eq!(report.severity, Severity::Critical);
    }

    #[test]
    fn missing_dependency_suggests_install() {
        let report = build_reports(vec![GraphConflict::MissingDependency {
            plugin_id: "a".to_string(),
            depends_on: "ghost".to_string(),
        }])
        .pop()
        .unwrap();
        assert_eq!(report.solutions[0].action, SolutionAction::Install);
    }

    #[test]
    fn version_too_low_suggests_upgrade_before_removal() {
        let report = build_reports(vec![GraphConflict::VersionIncompatible {
            plugin_id: "a".to_string(),
            depends_on: "b".to_string(),
            requirement: ">= 2.0.0".to_string(),
            reason: VersionMismatchReason::VersionTooLow,
        }])
        .pop()
        .unwrap();
        assert_eq!(report.solutions[0].action, SolutionAction::Upgrade);
        assert!(report.solutions[0].risk <= report.solutions[1].risk);
    }

    #[test]
    fn reports_sort_by_descending_severity() {
        let reports = build_reports(vec![
            GraphConflict::MissingDependency { plugin_id: "a".to_string(), depends_on: "b".to_string() },
            GraphConflict::ResourceConflict {
                resource: "lock".to_string(),
                plugin_ids: vec!["c".to_string(), "d".to_string()],
            },
        ]);
        assert_eq!(reports[0].severity, Severity::Critical);
    }

    #[test]
    fn cycle_report_names_the_loop() {
        let report = report_cycle(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(report.severity, Severity::Critical);
        assert!(report.summary.contains("a -> b -> a"));
    }
}
