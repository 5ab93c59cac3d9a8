use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use semver::{Version, VersionReq};

/// Error type for version parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    InvalidFormat,
    ParseError(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidFormat => write!(f, "invalid version format"),
            VersionError::ParseError(msg) => write!(f, "version parse error: {}", msg),
        }
    }
}

impl std::error::Error for VersionError {}

/// A single dot-separated prerelease segment: either numeric or alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreReleaseSegment {
    Numeric(u64),
    Alnum(String),
}

impl fmt::Display for PreReleaseSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseSegment::Numeric(n) => write!(f, "{}", n),
            PreReleaseSegment::Alnum(s) => write!(f, "{}", s),
        }
    }
}

impl PartialOrd for PreReleaseSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreReleaseSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreReleaseSegment::Numeric(a), PreReleaseSegment::Numeric(b)) => a.cmp(b),
            (PreReleaseSegment::Alnum(a), PreReleaseSegment::Alnum(b)) => a.cmp(b),
            // Numeric identifiers always have lower precedence than alphanumeric ones.
            (PreReleaseSegment::Numeric(_), PreReleaseSegment::Alnum(_)) => Ordering::Less,
            (PreReleaseSegment::Alnum(_), PreReleaseSegment::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// A parsed `[v]MAJOR[.MINOR[.PATCH]][-PRE][+BUILD]` version. Missing minor
/// and patch default to zero; build metadata is accepted but discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<PreReleaseSegment>,
}

impl ApiVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, pre: Vec::new() }
    }

    /// Parses a version string of the form `[v]MAJOR[.MINOR[.PATCH]][-PRE][+BUILD]`.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let v = version.strip_prefix('v').unwrap_or(version);
        if v.is_empty() {
            return Err(VersionError::InvalidFormat);
        }
        let core_and_pre = match v.split_once('+') {
            Some((a, _)) => a,
            None => v,
        };
        let (core, pre) = match core_and_pre.split_once('-') {
            Some((a, b)) => (a, Some(b)),
            None => (core_and_pre, None),
        };

        let mut parts = core.split('.');
        let major = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or(VersionError::InvalidFormat)?
            .parse::<u64>()
            .map_err(|e| VersionError::ParseError(e.to_string()))?;
        let minor = match parts.next() {
            Some(s) => s.parse::<u64>().map_err(|e| VersionError::ParseError(e.to_string()))?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(s) => s.parse::<u64>().map_err(|e| VersionError::ParseError(e.to_string()))?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(VersionError::InvalidFormat);
        }

        let pre = match pre {
            Some(p) if !p.is_empty() => p
                .split('.')
                .map(|seg| match seg.parse::<u64>() {
                    Ok(n) => PreReleaseSegment::Numeric(n),
                    Err(_) => PreReleaseSegment::Alnum(seg.to_string()),
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self { major, minor, patch, pre })
    }

    /// Whether this version is API-compatible with `other` (same major).
    pub fn is_compatible_with(&self, other: &ApiVersion) -> bool {
        self.major == other.major
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(s)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-")?;
            for (i, seg) in self.pre.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", seg)?;
            }
        }
        Ok(())
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(&self.pre, &other.pre))
    }
}

/// Release outranks prerelease; between two prereleases, compare segmentwise.
fn compare_prerelease(a: &[PreReleaseSegment], b: &[PreReleaseSegment]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// A semver-range expression (`"^1.2.3"`, `">=2.0"`, ...) wrapping
/// `semver::VersionReq` for parsing and matching against `semver::Version`.
#[derive(Debug, Clone)]
pub struct VersionRange {
    constraint: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint)
            .map_err(|e| VersionError::ParseError(format!("invalid version constraint '{}': {}", constraint, e)))?;
        Ok(Self { constraint: constraint.to_string(), req })
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    pub fn semver_req(&self) -> &VersionReq {
        &self.req
    }

    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

/// A dependency version requirement shaped as min/max/exact/exclude-list,
/// independent of `semver::VersionReq` (which has no exclude-list equivalent).
#[derive(Debug, Clone, Default)]
pub struct VersionConstraint {
    pub min_version: Option<ApiVersion>,
    pub max_version: Option<ApiVersion>,
    pub exact_version: Option<ApiVersion>,
    pub exclude_versions: Vec<ApiVersion>,
}

impl VersionConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(version: ApiVersion) -> Self {
        Self { exact_version: Some(version), ..Default::default() }
    }

    pub fn min(version: ApiVersion) -> Self {
        Self { min_version: Some(version), ..Default::default() }
    }

    pub fn range(min: ApiVersion, max: ApiVersion) -> Self {
        Self { min_version: Some(min), max_version: Some(max), ..Default::default() }
    }

    /// Parses range expressions `">= X"`, `"<= X"`, `"> X"`, `"< X"`, `"X - Y"`,
    /// falling back to an exact match for a bare version string.
    pub fn parse(expr: &str) -> Result<Self, VersionError> {
        let expr = expr.trim();
        if let Some(rest) = expr.strip_prefix(">=") {
            return Ok(Self::min(ApiVersion::parse(rest.trim())?));
        }
        if let Some(rest) = expr.strip_prefix("<=") {
            return Ok(Self { max_version: Some(ApiVersion::parse(rest.trim())?), ..Default::default() });
        }
        if let Some(rest) = expr.strip_prefix('>') {
            let mut v = ApiVersion::parse(rest.trim())?;
            v.patch += 1;
            return Ok(Self::min(v));
        }
        if let Some(rest) = expr.strip_prefix('<') {
            return Ok(Self { max_version: Some(ApiVersion::parse(rest.trim())?), ..Default::default() });
        }
        if let Some((lo, hi)) = expr.split_once('-') {
            return Ok(Self::range(ApiVersion::parse(lo.trim())?, ApiVersion::parse(hi.trim())?));
        }
        Ok(Self::exact(ApiVersion::parse(expr)?))
    }

    /// A version satisfies this constraint iff: if `exact_version` is set,
    /// the two compare equal; otherwise it is not excluded and falls within
    /// `[min_version, max_version]`.
    pub fn satisfies(&self, version: &ApiVersion) -> bool {
        if let Some(exact) = &self.exact_version {
            return version.cmp(exact) == Ordering::Equal;
        }
        if self.exclude_versions.iter().any(|v| v.cmp(version) == Ordering::Equal) {
            return false;
        }
        if let Some(min) = &self.min_version {
            if version.cmp(min) == Ordering::Less {
                return false;
            }
        }
        if let Some(max) = &self.max_version {
            if version.cmp(max) == Ordering::Greater {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(exact) = &self.exact_version {
            return write!(f, "= {}", exact);
        }
        match (&self.min_version, &self.max_version) {
            (Some(min), Some(max)) => write!(f, ">= {} , <= {}", min, max),
            (Some(min), None) => write!(f, ">= {}", min),
            (None, Some(max)) => write!(f, "<= {}", max),
            (None, None) => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_round_trip() {
        let v = ApiVersion::parse("1.2.3-beta.1").unwrap();
        assert_eq!(v.to_string(), "1.2.3-beta.1");
        let reparsed = ApiVersion::parse(&v.to_string()).unwrap();
        assert_eq!(v.cmp(&reparsed), Ordering::Equal);
    }

    #[test]
    fn missing_components_default_to_zero() {
        let v = ApiVersion::parse("2").unwrap();
        assert_eq!(v, ApiVersion::new(2, 0, 0));
    }

    #[test]
    fn release_outranks_prerelease() {
        let release = ApiVersion::parse("1.0.0").unwrap();
        let pre = ApiVersion::parse("1.0.0-rc.1").unwrap();
        assert!(release > pre);
    }

    #[test]
    fn numeric_prerelease_segments_compare_numerically() {
        let a = ApiVersion::parse("1.0.0-alpha.2").unwrap();
        let b = ApiVersion::parse("1.0.0-alpha.10").unwrap();
        assert!(a < b);
    }

    #[test]
    fn constraint_min_max_bounds() {
        let c = VersionConstraint::range(ApiVersion::new(1, 0, 0), ApiVersion::new(2, 0, 0));
        assert!(c.satisfies(&ApiVersion::new(1, 5, 0)));
        assert!(!c.satisfies(&ApiVersion::new(2, 0, 1)));
        assert!(!c.satisfies(&ApiVersion::new(0, 9, 9)));
    }

    #[test]
    fn constraint_exclude_list() {
        let mut c = VersionConstraint::min(ApiVersion::new(1, 0, 0));
        c.exclude_versions.push(ApiVersion::new(1, 5, 0));
        assert!(!c.satisfies(&ApiVersion::new(1, 5, 0)));
        assert!(c.satisfies(&ApiVersion::new(1, 6, 0)));
    }

    #[test]
    fn range_expression_parses() {
        let c = VersionConstraint::parse(">= 2.0.0").unwrap();
        assert!(c.satisfies(&ApiVersion::new(2, 0, 0)));
        assert!(!c.satisfies(&ApiVersion::new(1, 9, 0)));
    }
}
