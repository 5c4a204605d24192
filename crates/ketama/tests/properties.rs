//! Property tests for ring lookups.
//!
//! Each ring is checked against a plain `BTreeMap` model of the same
//! placement: every id placed at `crc32("<id>-<i>")`, later ids overwriting
//! earlier ones on an exact collision.

use std::collections::{BTreeMap, HashSet};

use ketama::{key_hash, HashRing, Node, VirtualNode};
use proptest::prelude::*;

fn build(ids: &[String], virtual_nodes: usize) -> HashRing<usize> {
    HashRing::new(
        ids.iter()
            .enumerate()
            .map(|(index, id)| Node::new(id.as_str(), index)),
        virtual_nodes,
    )
}

fn model(ids: &[String], virtual_nodes: usize) -> BTreeMap<u32, String> {
    let mut points = BTreeMap::new();
    for id in ids {
        for replica in 0..virtual_nodes {
            points.insert(VirtualNode::hash_for(id, replica), id.clone());
        }
    }
    points
}

fn model_lookup(points: &BTreeMap<u32, String>, key: &str) -> Option<String> {
    let hash = key_hash(key.as_bytes());
    points
        .range(hash..)
        .chain(points.iter())
        .next()
        .map(|(_, id)| id.clone())
}

fn lookup_all(ring: &HashRing<usize>, keys: &[String]) -> Vec<Option<String>> {
    keys.iter()
        .map(|key| ring.get_node(key).map(|node| node.id))
        .collect()
}

fn ids_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z0-9.:-]{1,16}", 1..8).prop_map(|ids| ids.into_iter().collect())
}

fn keys_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("\\PC{0,32}", 1..64)
}

// =============================================================================
// Property Tests - Lookup
// =============================================================================

proptest! {
    /// Property: lookups agree with a nearest-successor walk over the model.
    #[test]
    fn prop_matches_model(
        ids in ids_strategy(),
        virtual_nodes in 1usize..32,
        keys in keys_strategy()
    ) {
        let ring = build(&ids, virtual_nodes);
        let points = model(&ids, virtual_nodes);

        prop_assert_eq!(ring.len(), points.len());
        for key in &keys {
            prop_assert_eq!(ring.get_node(key).map(|node| node.id), model_lookup(&points, key));
        }
    }

    /// Property: same key, same ring, same answer.
    #[test]
    fn prop_deterministic(
        ids in ids_strategy(),
        virtual_nodes in 1usize..32,
        keys in keys_strategy()
    ) {
        let ring = build(&ids, virtual_nodes);
        prop_assert_eq!(lookup_all(&ring, &keys), lookup_all(&ring, &keys));
    }

    /// Property: the payload returned is the one registered under that id.
    #[test]
    fn prop_payload_round_trips(
        ids in ids_strategy(),
        virtual_nodes in 1usize..32,
        key in "\\PC{0,32}"
    ) {
        let ring = build(&ids, virtual_nodes);
        let node = ring.get_node(&key).unwrap();
        prop_assert_eq!(&ids[node.value], &node.id);
    }
}

// =============================================================================
// Property Tests - Membership
// =============================================================================

proptest! {
    /// Property: N nodes with V replicas occupy N * V positions.
    #[test]
    fn prop_position_count(
        ids in ids_strategy(),
        virtual_nodes in 0usize..32
    ) {
        let distinct: HashSet<u32> = ids
            .iter()
            .flat_map(|id| (0..virtual_nodes).map(move |replica| VirtualNode::hash_for(id, replica)))
            .collect();
        prop_assume!(distinct.len() == ids.len() * virtual_nodes);

        let ring = build(&ids, virtual_nodes);
        prop_assert_eq!(ring.len(), ids.len() * virtual_nodes);
        prop_assert_eq!(ring.node_count(), if virtual_nodes == 0 { 0 } else { ids.len() });
    }

    /// Property: adding then removing a node restores every lookup.
    #[test]
    fn prop_add_remove_round_trip(
        ids in ids_strategy(),
        extra in "[A-Z]{1,12}",
        virtual_nodes in 1usize..32,
        keys in keys_strategy()
    ) {
        let existing: HashSet<u32> = model(&ids, virtual_nodes).into_keys().collect();
        prop_assume!(
            (0..virtual_nodes).all(|replica| !existing.contains(&VirtualNode::hash_for(&extra, replica)))
        );

        let ring = build(&ids, virtual_nodes);
        let before = lookup_all(&ring, &keys);

        ring.add_node(Node::new(extra.as_str(), usize::MAX));
        prop_assert!(ring.remove_node(&extra));

        prop_assert_eq!(lookup_all(&ring, &keys), before);
    }

    /// Property: removing an id that was never added changes nothing.
    #[test]
    fn prop_remove_unknown_is_noop(
        ids in ids_strategy(),
        unknown in "[A-Z]{1,12}",
        virtual_nodes in 1usize..32,
        keys in keys_strategy()
    ) {
        let ring = build(&ids, virtual_nodes);
        let before = lookup_all(&ring, &keys);
        let positions = ring.positions();

        prop_assert!(!ring.remove_node(&unknown));
        prop_assert_eq!(ring.positions(), positions);
        prop_assert_eq!(lookup_all(&ring, &keys), before);
    }

    /// Property: after removal no key resolves to the removed node.
    #[test]
    fn prop_removed_node_unreachable(
        ids in ids_strategy(),
        virtual_nodes in 1usize..32,
        keys in keys_strategy()
    ) {
        let ring = build(&ids, virtual_nodes);
        let victim = &ids[0];
        ring.remove_node(victim);

        prop_assert!(!ring.contains_node(victim));
        for key in &keys {
            let resolved = ring.get_node(key).map(|node| node.id);
            prop_assert_ne!(resolved.as_ref(), Some(victim));
        }
    }
}
