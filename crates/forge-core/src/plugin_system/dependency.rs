use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::plugin_system::version::VersionConstraint;

/// What kind of relationship a dependency edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Conflicts,
    Provides,
}

/// An edge from a plugin to another plugin (or capability) it depends on.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DependencyType,
    pub required: bool,
    pub version_constraint: Option<VersionConstraint>,
    /// Opaque free-form checker identifier; the resolver does not interpret it,
    /// hosts may use it to run an out-of-band compatibility check.
    pub checker: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("required plugin not found: {0}")]
    MissingPlugin(String),

    #[error("plugin version mismatch: '{plugin_name}' requires '{required}' but found '{actual_version}'")]
    IncompatibleVersion {
        plugin_name: String,
        required: String,
        actual_version: String,
    },

    #[error("circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("dependency error: {0}")]
    Other(String),
}

impl Dependency {
    pub fn required(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: DependencyType::Required,
            required: true,
            version_constraint: None,
            checker: None,
            metadata: HashMap::new(),
        }
    }

    pub fn optional(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: DependencyType::Optional,
            required: false,
            version_constraint: None,
            checker: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_version_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.version_constraint = Some(constraint);
        self
    }

    pub fn with_checker(mut self, checker: impl Into<String>) -> Self {
        self.checker = Some(checker.into());
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DependencyType::Required => "requires",
            DependencyType::Optional => "optionally requires",
            DependencyType::Conflicts => "conflicts with",
            DependencyType::Provides => "provides",
        };
        match &self.version_constraint {
            Some(c) => write!(f, "{} {} ({})", kind, self.name, c),
            None => write!(f, "{} {} (any version)", kind, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin_system::version::ApiVersion;

    #[test]
    fn required_dependency_defaults() {
        let dep = Dependency::required("core.plugin.logging.v1", "logging");
        assert!(dep.required);
        assert_eq!(dep.kind, DependencyType::Required);
        assert!(dep.version_constraint.is_none());
    }

    #[test]
    fn version_constraint_attaches() {
        let dep = Dependency::required("core.plugin.logging.v1", "logging")
            .with_version_constraint(VersionConstraint::min(ApiVersion::new(1, 0, 0)));
        assert!(dep.version_constraint.unwrap().satisfies(&ApiVersion::new(1, 2, 0)));
    }
}
