use std::fmt;
use std::str::FromStr;

use crate::plugin_system::version::{ApiVersion, VersionError};

/// A canonical plugin identifier: `<org>.plugin.<name>.v<major>[.<minor>.<patch>]`.
///
/// Legacy bare names (anything not matching the grammar) are accepted
/// everywhere a `PluginId` is used as a map key; validation only happens
/// when explicitly requested via [`PluginId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginId {
    raw: String,
}

/// The parsed components of a canonical id, once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPluginId {
    pub org: String,
    pub name: String,
    pub version: ApiVersion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginIdError {
    Malformed(String),
    InvalidOrg(String),
    InvalidName(String),
    InvalidVersion(VersionError),
}

impl fmt::Display for PluginIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginIdError::Malformed(id) => write!(f, "malformed plugin id '{}'", id),
            PluginIdError::InvalidOrg(org) => write!(f, "invalid org segment '{}'", org),
            PluginIdError::InvalidName(name) => write!(f, "invalid name segment '{}'", name),
            PluginIdError::InvalidVersion(e) => write!(f, "invalid version segment: {}", e),
        }
    }
}

impl std::error::Error for PluginIdError {}

impl PluginId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Validates and decomposes the id against the canonical grammar.
    /// Org segments are word characters and hyphens; name segments are
    /// lowercase letters, digits, and hyphens.
    pub fn parse(&self) -> Result<ParsedPluginId, PluginIdError> {
        let mid = self.raw.find(".plugin.").ok_or_else(|| PluginIdError::Malformed(self.raw.clone()))?;
        let org = &self.raw[..mid];
        let rest = &self.raw[mid + ".plugin.".len()..];

        if org.is_empty() || !org.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(PluginIdError::InvalidOrg(org.to_string()));
        }

        let (name, version_part) = rest.split_once(".v").ok_or_else(|| PluginIdError::Malformed(self.raw.clone()))?;
        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(PluginIdError::InvalidName(name.to_string()));
        }

        let version = ApiVersion::parse(version_part).map_err(PluginIdError::InvalidVersion)?;

        Ok(ParsedPluginId { org: org.to_string(), name: name.to_string(), version })
    }

    /// Whether this id is well-formed per the canonical grammar.
    pub fn is_canonical(&self) -> bool {
        self.parse().is_ok()
    }

    /// Two canonical ids with the same org/name and the same major version
    /// are considered mutually upgradable. Non-canonical ids are compared
    /// by raw equality, since they carry no embedded version to compare.
    pub fn matches_major(&self, other: &PluginId) -> bool {
        match (self.parse(), other.parse()) {
            (Ok(a), Ok(b)) => a.org == b.org && a.name == b.name && a.version.major == b.version.major,
            _ => self.raw == other.raw,
        }
    }

    pub fn build(org: &str, name: &str, version: &ApiVersion) -> Self {
        Self { raw: format!("{}.plugin.{}.v{}", org, name, version) }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for PluginId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PluginId::new(s))
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        PluginId::new(s)
    }
}

impl From<String> for PluginId {
    fn from(s: String) -> Self {
        PluginId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_id() {
        let id = PluginId::new("acme-corp.plugin.logger.v1.2.3");
        let parsed = id.parse().unwrap();
        assert_eq!(parsed.org, "acme-corp");
        assert_eq!(parsed.name, "logger");
        assert_eq!(parsed.version, ApiVersion::new(1, 2, 3));
    }

    #[test]
    fn legacy_bare_name_is_accepted_but_not_canonical() {
        let id = PluginId::new("environment-check");
        assert!(!id.is_canonical());
        assert!(id.parse().is_err());
    }

    #[test]
    fn same_major_matches() {
        let a = PluginId::new("acme.plugin.logger.v1.0.0");
        let b = PluginId::new("acme.plugin.logger.v1.5.2");
        let c = PluginId::new("acme.plugin.logger.v2.0.0");
        assert!(a.matches_major(&b));
        assert!(!a.matches_major(&c));
    }
}
