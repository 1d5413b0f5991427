//! Zone restriction constraint.

use std::collections::BTreeSet;

/// Forbids visiting any of a set of excluded zones.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ZoneRestrictionConstraint;
///
/// let c = ZoneRestrictionConstraint::new(["airport"]);
/// assert!(c.validate(&["downtown", "harbor"]));
/// assert!(!c.validate(&["downtown", "airport"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneRestrictionConstraint {
    excluded: BTreeSet<String>,
}

impl ZoneRestrictionConstraint {
    /// Creates a constraint excluding the given zones.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Excluded zone identifiers.
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// Returns `false` if any visited zone is excluded.
    pub fn validate<S: AsRef<str>>(&self, zones: &[S]) -> bool {
        !zones.iter().any(|z| self.excluded.contains(z.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_exclusions() {
        assert!(ZoneRestrictionConstraint::default().validate(&["a", "b"]));
    }

    #[test]
    fn test_excluded_visit_fails() {
        let c = ZoneRestrictionConstraint::new(vec!["z1".to_string(), "z2".to_string()]);
        assert!(!c.validate(&["z0", "z2"]));
        assert!(c.validate(&["z0", "z3"]));
        assert_eq!(c.excluded().len(), 2);
    }

    #[test]
    fn test_empty_route_passes() {
        let c = ZoneRestrictionConstraint::new(["z1"]);
        let none: [&str; 0] = [];
        assert!(c.validate(&none));
    }
}
