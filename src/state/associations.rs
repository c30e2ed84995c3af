//! # Association Index
//!
//! Directed many-to-one relation from issuers (sources) to certificates
//! (destinations). A certificate belongs to at most one issuer at a time.

use super::{lock, ObjectName, ObjectNameSet};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct Associations {
    /// issuer -> certificates
    forward: HashMap<ObjectName, ObjectNameSet>,
    /// certificate -> issuer, authoritative for ownership
    reverse: HashMap<ObjectName, ObjectName>,
}

impl Associations {
    /// Drops `dest` from the forward set of `src`, discarding the set once empty.
    fn detach(&mut self, src: &ObjectName, dest: &ObjectName) {
        if let Some(dests) = self.forward.get_mut(src) {
            dests.remove(dest);
            if dests.is_empty() {
                self.forward.remove(src);
            }
        }
    }
}

/// Concurrency-safe issuer to certificate index.
///
/// Both directions live behind one mutex; every mutation updates the reverse
/// map first and then the forward sets, so `forward[issuer]` always equals
/// `{cert : reverse[cert] == issuer}` when the lock is released.
#[derive(Debug, Default)]
pub struct AssociationIndex {
    inner: Mutex<Associations>,
}

impl AssociationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `dest` with `src`, moving it away from any previous source.
    pub fn add(&self, src: &ObjectName, dest: &ObjectName) {
        let mut inner = lock(&self.inner);
        match inner.reverse.insert(dest.clone(), src.clone()) {
            Some(old) if old == *src => return,
            Some(old) => {
                debug!(certificate = %dest, from = %old, to = %src, "certificate moved to another issuer");
                inner.detach(&old, dest);
            }
            None => {}
        }
        inner
            .forward
            .entry(src.clone())
            .or_default()
            .insert(dest.clone());
    }

    /// Detaches `dest` from its current source. No-op for unknown destinations.
    pub fn remove_by_destination(&self, dest: &ObjectName) {
        let mut inner = lock(&self.inner);
        if let Some(src) = inner.reverse.remove(dest) {
            inner.detach(&src, dest);
        }
    }

    /// Removes `src` and every destination associated with it.
    ///
    /// Returns `true` if the source had any association.
    pub fn remove_by_source(&self, src: &ObjectName) -> bool {
        let mut inner = lock(&self.inner);
        let Some(dests) = inner.forward.remove(src) else {
            return false;
        };
        for dest in &dests {
            inner.reverse.remove(dest);
        }
        true
    }

    /// Snapshot of the destinations of `src`, in name order.
    #[must_use]
    pub fn destinations_for(&self, src: &ObjectName) -> Vec<ObjectName> {
        lock(&self.inner)
            .forward
            .get(src)
            .map(ObjectNameSet::to_vec)
            .unwrap_or_default()
    }

    /// Number of destinations of `src`; zero for unknown sources.
    #[must_use]
    pub fn destination_count(&self, src: &ObjectName) -> usize {
        lock(&self.inner)
            .forward
            .get(src)
            .map_or(0, ObjectNameSet::len)
    }

    /// Current source of `dest`, if any.
    #[must_use]
    pub fn source_of(&self, dest: &ObjectName) -> Option<ObjectName> {
        lock(&self.inner).reverse.get(dest).cloned()
    }

    /// All sources with at least one destination, in name order.
    #[must_use]
    pub fn sources(&self) -> Vec<ObjectName> {
        let mut sources: Vec<_> = lock(&self.inner).forward.keys().cloned().collect();
        sources.sort();
        sources
    }

    /// All sources with their destination counts, in name order, read under one lock.
    #[must_use]
    pub fn source_counts(&self) -> Vec<(ObjectName, usize)> {
        let mut counts: Vec<_> = lock(&self.inner)
            .forward
            .iter()
            .map(|(src, dests)| (src.clone(), dests.len()))
            .collect();
        counts.sort();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(name: &str) -> ObjectName {
        ObjectName::new("issuers", name)
    }

    fn cert(name: &str) -> ObjectName {
        ObjectName::new("default", name)
    }

    #[test]
    fn test_add_and_enumerate() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("b"));
        index.add(&issuer("le"), &cert("a"));

        assert_eq!(index.destinations_for(&issuer("le")), vec![cert("a"), cert("b")]);
        assert_eq!(index.destination_count(&issuer("le")), 2);
        assert_eq!(index.sources(), vec![issuer("le")]);
        assert_eq!(index.source_of(&cert("a")), Some(issuer("le")));
    }

    #[test]
    fn test_add_is_idempotent() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("le"), &cert("a"));
        assert_eq!(index.destination_count(&issuer("le")), 1);
    }

    #[test]
    fn test_add_moves_between_sources() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("le"), &cert("b"));
        index.add(&issuer("zerossl"), &cert("a"));

        assert_eq!(index.destinations_for(&issuer("le")), vec![cert("b")]);
        assert_eq!(index.destinations_for(&issuer("zerossl")), vec![cert("a")]);
        assert_eq!(index.source_of(&cert("a")), Some(issuer("zerossl")));
    }

    #[test]
    fn test_moving_last_destination_drops_source() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("zerossl"), &cert("a"));

        assert_eq!(index.sources(), vec![issuer("zerossl")]);
        assert_eq!(index.destination_count(&issuer("le")), 0);
    }

    #[test]
    fn test_remove_by_destination() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("le"), &cert("b"));

        index.remove_by_destination(&cert("a"));
        assert_eq!(index.destinations_for(&issuer("le")), vec![cert("b")]);
        assert_eq!(index.source_of(&cert("a")), None);

        // unknown destination is a no-op
        index.remove_by_destination(&cert("missing"));
        assert_eq!(index.destination_count(&issuer("le")), 1);
    }

    #[test]
    fn test_remove_by_source_clears_reverse_entries() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("le"), &cert("b"));
        index.add(&issuer("zerossl"), &cert("c"));

        assert!(index.remove_by_source(&issuer("le")));
        assert!(index.destinations_for(&issuer("le")).is_empty());
        assert_eq!(index.source_of(&cert("a")), None);
        assert_eq!(index.source_of(&cert("b")), None);
        assert_eq!(index.sources(), vec![issuer("zerossl")]);

        assert!(!index.remove_by_source(&issuer("le")));
    }

    #[test]
    fn test_reassociate_after_source_removal() {
        let index = AssociationIndex::new();
        index.add(&issuer("le"), &cert("a"));
        index.remove_by_source(&issuer("le"));
        index.add(&issuer("zerossl"), &cert("a"));

        assert_eq!(index.destinations_for(&issuer("zerossl")), vec![cert("a")]);
        assert_eq!(index.destination_count(&issuer("le")), 0);
    }

    #[test]
    fn test_source_counts_match_forward_sets() {
        let index = AssociationIndex::new();
        index.add(&issuer("zerossl"), &cert("c"));
        index.add(&issuer("le"), &cert("a"));
        index.add(&issuer("le"), &cert("b"));
        index.add(&issuer("zerossl"), &cert("a"));

        assert_eq!(
            index.source_counts(),
            vec![(issuer("le"), 1), (issuer("zerossl"), 2)]
        );
        index.remove_by_source(&issuer("le"));
        assert_eq!(index.source_counts(), vec![(issuer("zerossl"), 2)]);
    }

    #[test]
    fn test_unknown_source_reads_as_empty() {
        let index = AssociationIndex::new();
        assert!(index.destinations_for(&issuer("missing")).is_empty());
        assert_eq!(index.destination_count(&issuer("missing")), 0);
        assert!(index.sources().is_empty());
    }
}
