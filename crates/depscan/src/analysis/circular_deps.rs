//! Circular dependency types
//!
//! A [`Cycle`] is stored as a closed walk: `[a, b, c, a]` for `a -> b -> c -> a`.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cycle(Vec<String>);

impl Cycle {
    /// Build a cycle from its members in walk order, without the closing repeat
    pub fn from_members(members: Vec<String>) -> Option<Self> {
        let first = members.first()?.clone();
        let mut path = members;
        path.push(first);
        Some(Self(path))
    }

    /// Members in walk order, without the closing repeat
    pub fn members(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }

    /// The closed walk, last element repeating the first
    pub fn path(&self) -> &[String] {
        &self.0
    }

    /// Number of distinct modules in the cycle
    pub fn size(&self) -> usize {
        self.0.len() - 1
    }

    /// Rotation of this cycle starting at its lexicographically smallest member
    pub fn normalized(&self) -> Self {
        let mut members = self.members().to_vec();
        let start = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map_or(0, |(idx, _)| idx);
        members.rotate_left(start);
        let first = members[0].clone();
        members.push(first);
        Self(members)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}

/// Result of circular dependency analysis over a module graph
#[derive(Debug, Clone, Default)]
pub struct CircularDependencyAnalysis {
    /// Normalized, deduplicated cycles in discovery order
    pub cycles: Vec<Cycle>,
    /// Strongly connected components containing a cycle
    pub components: Vec<Vec<String>>,
    /// Member count of the longest cycle found
    pub largest_cycle_size: usize,
}

impl CircularDependencyAnalysis {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn total_cycles_detected(&self) -> usize {
        self.cycles.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cycle(members: &[&str]) -> Cycle {
        Cycle::from_members(members.iter().map(|m| (*m).to_owned()).collect())
            .expect("non-empty cycle")
    }

    #[test]
    fn test_closed_path_representation() {
        let cycle = cycle(&["b", "c", "a"]);
        assert_eq!(cycle.path(), &["b", "c", "a", "b"]);
        assert_eq!(cycle.members(), &["b", "c", "a"]);
        assert_eq!(cycle.size(), 3);
        assert_eq!(cycle.to_string(), "b -> c -> a -> b");
    }

    #[test]
    fn test_empty_members_are_not_a_cycle() {
        assert!(Cycle::from_members(Vec::new()).is_none());
    }

    #[test]
    fn test_normalization_starts_at_smallest_member() {
        let normalized = cycle(&["c", "a", "b"]).normalized();
        assert_eq!(normalized.path(), &["a", "b", "c", "a"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalized = cycle(&["pkg.b", "pkg.a", "pkg.c"]).normalized();
        assert_eq!(normalized.normalized(), normalized);
    }

    #[test]
    fn test_every_rotation_normalizes_identically() {
        let members = ["m3", "m1", "m4", "m2"];
        let expected = cycle(&members).normalized();
        for shift in 0..members.len() {
            let mut rotated = members.to_vec();
            rotated.rotate_left(shift);
            assert_eq!(cycle(&rotated).normalized(), expected);
        }
    }

    #[test]
    fn test_self_cycle() {
        let cycle = cycle(&["a"]);
        assert_eq!(cycle.path(), &["a", "a"]);
        assert_eq!(cycle.normalized(), cycle);
    }

    #[test]
    fn test_serializes_as_closed_list() -> serde_json::Result<()> {
        let json = serde_json::to_string(&cycle(&["a", "b"]))?;
        assert_eq!(json, r#"["a","b","a"]"#);
        Ok(())
    }
}
