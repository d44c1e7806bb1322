//! model version strings and field-wise comparison.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// a dot-separated numeric model version, e.g. "1.2.0".
///
/// comparison is field-wise on the numeric components; missing trailing
/// components are treated as 0, so "1.2" and "1.2.0" compare equal.
/// non-numeric components also compare as 0.
///
/// `Ord` is not implemented: derived equality is string equality
/// ("1.2" != "1.2.0") and would disagree with the component-wise ordering.
/// use [`ModelVersion::compare`] or [`ModelVersion::is_newer_than`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelVersion(String);

impl ModelVersion {
    /// create a version from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// the underlying version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn components(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.split('.').map(|c| c.trim().parse().unwrap_or(0))
    }

    /// compare two versions component by component.
    pub fn compare(&self, other: &ModelVersion) -> Ordering {
        let mut ours = self.components();
        let mut theirs = other.components();
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return Ordering::Equal,
                (a, b) => {
                    let ord = a.unwrap_or(0).cmp(&b.unwrap_or(0));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
    }

    /// true if `self` is strictly newer than `other`.
    pub fn is_newer_than(&self, other: &ModelVersion) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(a: &str, b: &str) -> Ordering {
        ModelVersion::from(a).compare(&ModelVersion::from(b))
    }

    #[test]
    fn test_missing_trailing_components_are_zero() {
        assert_eq!(compare("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare("1.2.0", "1.2"), Ordering::Equal);
        assert_eq!(compare("1", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_first_differing_component_decides() {
        assert_eq!(compare("2.0", "1.9"), Ordering::Greater);
        assert_eq!(compare("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare("1.10", "1.9"), Ordering::Greater);
    }

    #[test]
    fn test_non_numeric_components_compare_as_zero() {
        assert_eq!(compare("1.x", "1.0"), Ordering::Equal);
        assert_eq!(compare("1.x.1", "1.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_is_newer_than_is_strict() {
        let current = ModelVersion::from("1.2");
        let same = ModelVersion::from("1.2.0");
        let newer = ModelVersion::from("1.2.1");
        assert!(!same.is_newer_than(&current));
        assert!(newer.is_newer_than(&current));
        assert!(!current.is_newer_than(&newer));
    }
}
