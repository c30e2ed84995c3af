//! Forward and reverse maps of the relational indexes stay inverse of each
//! other for arbitrary operation sequences, sequential and concurrent.

use cert_management_controller::state::{AssociationIndex, ObjectName, SecretReferenceIndex};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const ISSUERS: u8 = 4;
const CERTS: u8 = 12;
const SECRETS: u8 = 5;

fn issuer(i: u8) -> ObjectName {
    ObjectName::new("issuers", format!("issuer-{i}"))
}

fn cert(c: u8) -> ObjectName {
    ObjectName::new("default", format!("cert-{c}"))
}

fn secret(s: u8) -> ObjectName {
    ObjectName::new("issuers", format!("secret-{s}"))
}

#[derive(Debug, Clone)]
enum AssocOp {
    Add(u8, u8),
    RemoveByDestination(u8),
    RemoveBySource(u8),
}

#[derive(Debug, Clone)]
enum SecretOp {
    Remember(u8, u8, u8),
    RemoveIssuer(u8),
}

fn assoc_op() -> impl Strategy<Value = AssocOp> {
    prop_oneof![
        3 => (0..ISSUERS, 0..CERTS).prop_map(|(i, c)| AssocOp::Add(i, c)),
        1 => (0..CERTS).prop_map(AssocOp::RemoveByDestination),
        1 => (0..ISSUERS).prop_map(AssocOp::RemoveBySource),
    ]
}

fn secret_op() -> impl Strategy<Value = SecretOp> {
    prop_oneof![
        3 => (0..ISSUERS, 0..SECRETS, 0..3u8).prop_map(|(i, s, h)| SecretOp::Remember(i, s, h)),
        1 => (0..ISSUERS).prop_map(SecretOp::RemoveIssuer),
    ]
}

/// Checks `forward[i] == {c : reverse[c] == i}` using only the public accessors.
fn assert_associations_inverse(index: &AssociationIndex) {
    let mut owned = 0;
    for c in 0..CERTS {
        if let Some(src) = index.source_of(&cert(c)) {
            owned += 1;
            assert!(index.destinations_for(&src).contains(&cert(c)));
        }
    }
    let mut listed = 0;
    for src in index.sources() {
        let dests = index.destinations_for(&src);
        assert!(!dests.is_empty());
        assert_eq!(index.destination_count(&src), dests.len());
        for dest in &dests {
            assert_eq!(index.source_of(dest).as_ref(), Some(&src));
        }
        listed += dests.len();
    }
    assert_eq!(owned, listed);
}

fn assert_secret_bindings_inverse(index: &SecretReferenceIndex) {
    for i in 0..ISSUERS {
        if let Some(binding) = index.binding_for(&issuer(i)) {
            assert!(index.issuers_referencing(&binding.secret).contains(&issuer(i)));
        }
    }
    for s in 0..SECRETS {
        for bound in &index.issuers_referencing(&secret(s)) {
            let binding = index.binding_for(bound).expect("reverse entry without binding");
            assert_eq!(binding.secret, secret(s));
        }
    }
}

proptest! {
    #[test]
    fn test_association_index_matches_model(ops in prop::collection::vec(assoc_op(), 0..64)) {
        let index = AssociationIndex::new();
        let mut model: HashMap<u8, u8> = HashMap::new();

        for op in ops {
            match op {
                AssocOp::Add(i, c) => {
                    index.add(&issuer(i), &cert(c));
                    model.insert(c, i);
                }
                AssocOp::RemoveByDestination(c) => {
                    index.remove_by_destination(&cert(c));
                    model.remove(&c);
                }
                AssocOp::RemoveBySource(i) => {
                    let had = model.values().any(|owner| *owner == i);
                    prop_assert_eq!(index.remove_by_source(&issuer(i)), had);
                    model.retain(|_, owner| *owner != i);
                }
            }
        }

        for c in 0..CERTS {
            prop_assert_eq!(index.source_of(&cert(c)), model.get(&c).map(|i| issuer(*i)));
        }
        for i in 0..ISSUERS {
            let expected: Vec<ObjectName> = model
                .iter()
                .filter(|(_, owner)| **owner == i)
                .map(|(c, _)| cert(*c))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            prop_assert_eq!(index.destination_count(&issuer(i)), expected.len());
            prop_assert_eq!(index.destinations_for(&issuer(i)), expected);
        }
        let sources: Vec<ObjectName> = model
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(issuer)
            .collect();
        prop_assert_eq!(index.sources(), sources);
        assert_associations_inverse(&index);
    }

    #[test]
    fn test_secret_reference_index_matches_model(ops in prop::collection::vec(secret_op(), 0..64)) {
        let index = SecretReferenceIndex::new();
        let mut model: HashMap<u8, (u8, String)> = HashMap::new();

        for op in ops {
            match op {
                SecretOp::Remember(i, s, h) => {
                    let hash = format!("hash-{h}");
                    index.remember(&issuer(i), &secret(s), &hash);
                    model.insert(i, (s, hash));
                }
                SecretOp::RemoveIssuer(i) => {
                    prop_assert_eq!(index.remove_issuer(&issuer(i)), model.remove(&i).is_some());
                }
            }
        }

        for i in 0..ISSUERS {
            let expected = model.get(&i);
            prop_assert_eq!(index.hash_for(&issuer(i)), expected.map(|(_, h)| h.clone()));
            prop_assert_eq!(
                index.binding_for(&issuer(i)).map(|b| b.secret),
                expected.map(|(s, _)| secret(*s))
            );
        }
        for s in 0..SECRETS {
            let expected: Vec<ObjectName> = model
                .iter()
                .filter(|(_, (bound, _))| *bound == s)
                .map(|(i, _)| issuer(*i))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            prop_assert_eq!(index.issuers_referencing(&secret(s)).to_vec(), expected);
        }
        let secrets: BTreeSet<u8> = model.values().map(|(s, _)| *s).collect();
        prop_assert_eq!(index.secret_count(), secrets.len());
        assert_secret_bindings_inverse(&index);
    }
}

/// Small deterministic generator so every thread runs a different sequence.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u8) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        u8::try_from((self.0 >> 33) % u64::from(bound)).unwrap()
    }
}

#[test]
fn test_association_index_under_concurrent_mutation() {
    let index = AssociationIndex::new();
    std::thread::scope(|scope| {
        for seed in 0..8u64 {
            let index = &index;
            scope.spawn(move || {
                let mut rng = Lcg(seed + 1);
                for _ in 0..5_000 {
                    match rng.next(5) {
                        0..=2 => index.add(&issuer(rng.next(ISSUERS)), &cert(rng.next(CERTS))),
                        3 => index.remove_by_destination(&cert(rng.next(CERTS))),
                        _ => {
                            index.remove_by_source(&issuer(rng.next(ISSUERS)));
                        }
                    }
                }
            });
        }
    });
    assert_associations_inverse(&index);
}

#[test]
fn test_secret_reference_index_under_concurrent_mutation() {
    let index = SecretReferenceIndex::new();
    std::thread::scope(|scope| {
        for seed in 0..8u64 {
            let index = &index;
            scope.spawn(move || {
                let mut rng = Lcg(seed + 101);
                for _ in 0..5_000 {
                    if rng.next(4) == 0 {
                        index.remove_issuer(&issuer(rng.next(ISSUERS)));
                    } else {
                        let hash = format!("hash-{}", rng.next(3));
                        index.remember(&issuer(rng.next(ISSUERS)), &secret(rng.next(SECRETS)), &hash);
                    }
                }
            });
        }
    });
    assert_secret_bindings_inverse(&index);
}
