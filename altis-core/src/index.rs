use serde::{Deserialize, Serialize};

/// Equality contract for members of a secondary index collection.
pub trait IndexMember {
    type Identity: Eq;

    fn identity(&self) -> Self::Identity;
}

/// Deduplicated collection stored under one index key (an origin port, a
/// segment id). Membership is decided by [`IndexMember::identity`]; iteration
/// follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexSet<T> {
    members: Vec<T>,
}

impl<T> Default for IndexSet<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T: IndexMember> IndexSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    /// Member with the same identity as `candidate`, if any
    pub fn find(&self, candidate: &T) -> Option<&T> {
        let identity = candidate.identity();
        self.members.iter().find(|m| m.identity() == identity)
    }

    pub fn contains(&self, candidate: &T) -> bool {
        self.find(candidate).is_some()
    }

    /// Adds `member` unless an equal one is already present.
    /// Returns whether the set changed.
    pub fn insert(&mut self, member: T) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }
}

impl<T: IndexMember> FromIterator<T> for IndexSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = IndexSet::new();
        for member in iter {
            set.insert(member);
        }
        set
    }
}

impl<T> IntoIterator for IndexSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a IndexSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FlightSegment;

    #[test]
    fn test_insert_skips_equal_member() {
        let mut set = IndexSet::new();
        assert!(set.insert(FlightSegment::new("AA101", "JFK", "LAX", 2475)));
        // Same identity, different informational field
        assert!(!set.insert(FlightSegment::new("AA101", "JFK", "LAX", 0)));
        assert!(set.insert(FlightSegment::new("AA102", "JFK", "SFO", 2586)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let set: IndexSet<FlightSegment> =
            vec![FlightSegment::new("AA101", "JFK", "LAX", 2475)].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.is_array());
        let back: IndexSet<FlightSegment> = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
