//! Hash ring data structure.
//!
//! Holds an ascending `Vec<u32>` of virtual-node positions next to a
//! `HashMap<u32, Arc<Node<T>>>` of their owners, both behind one
//! `parking_lot::RwLock`. Lookups binary-search the vector; membership changes
//! rebuild it under the write lock and re-sort before releasing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::node::Node;
use crate::vnode::{key_hash, VirtualNode};

/// Virtual nodes per physical node when none is configured.
pub const DEFAULT_VIRTUAL_NODES: usize = 256;

/// Size of the 32-bit hash space.
const RING_SPAN: f64 = 4_294_967_296.0;

/// Ring contents guarded by the lock.
///
/// # Invariants
///
/// - `sorted` is ascending and holds no duplicates
/// - the values in `sorted` are exactly the keys of `owners`
struct RingState<T> {
    sorted: Vec<u32>,
    owners: HashMap<u32, Arc<Node<T>>>,
}

impl<T> RingState<T> {
    fn new() -> Self {
        Self {
            sorted: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Place `virtual_nodes` replicas of `node`. Leaves `sorted` unsorted.
    ///
    /// Returns the number of new positions.
    fn insert(&mut self, node: Node<T>, virtual_nodes: usize) -> usize {
        let node = Arc::new(node);
        let mut added = 0;

        for replica in 0..virtual_nodes {
            let hash = VirtualNode::hash_for(&node.id, replica);
            match self.owners.insert(hash, Arc::clone(&node)) {
                None => {
                    self.sorted.push(hash);
                    added += 1;
                }
                Some(previous) if previous.id != node.id => {
                    warn!(
                        hash,
                        node_id = %node.id,
                        displaced = %previous.id,
                        "virtual node hash collision, last writer wins"
                    );
                }
                // Re-add of the same id: payload replaced in place.
                Some(_) => {}
            }
        }

        added
    }

    /// Drop every position of `node_id` that it still owns.
    ///
    /// Returns the number of positions removed.
    fn remove(&mut self, node_id: &str, virtual_nodes: usize) -> usize {
        let RingState { sorted, owners } = self;
        let mut removed = 0;

        for replica in 0..virtual_nodes {
            let hash = VirtualNode::hash_for(node_id, replica);
            // A slot taken over by a colliding node belongs to that node now.
            if owners.get(&hash).is_some_and(|owner| owner.id == node_id) {
                owners.remove(&hash);
                removed += 1;
            }
        }

        if removed > 0 {
            sorted.retain(|hash| owners.contains_key(hash));
        }
        removed
    }

    /// Owner of the first position at or after `hash`, wrapping around.
    fn successor(&self, hash: u32) -> Option<&Arc<Node<T>>> {
        if self.sorted.is_empty() {
            return None;
        }

        let idx = self.sorted.partition_point(|&point| point < hash);
        let idx = if idx == self.sorted.len() { 0 } else { idx };
        self.owners.get(&self.sorted[idx])
    }

    /// Any position still owned by `node_id`.
    fn find(&self, node_id: &str, virtual_nodes: usize) -> Option<&Arc<Node<T>>> {
        (0..virtual_nodes).find_map(|replica| {
            self.owners
                .get(&VirtualNode::hash_for(node_id, replica))
                .filter(|owner| owner.id == node_id)
        })
    }

    fn positions(&self) -> Vec<VirtualNode> {
        self.sorted
            .iter()
            .filter_map(|hash| {
                self.owners
                    .get(hash)
                    .map(|owner| VirtualNode::new(*hash, owner.id.as_str()))
            })
            .collect()
    }
}

/// Consistent hash ring mapping string keys to physical nodes.
///
/// Every node is placed `virtual_nodes` times at `crc32("<id>-<i>")`. A key
/// resolves to the owner of the first position clockwise from `crc32(key)`.
///
/// The ring is meant to be shared (usually as `Arc<HashRing<T>>`): lookups take
/// a shared lock and run concurrently, `add_node` / `remove_node` take the
/// exclusive lock. Nothing is ever handed out by reference; lookups return
/// clones.
///
/// # Duplicates and collisions
///
/// Adding an id that is already present replaces its payload and keeps its
/// positions. If two different ids hash to the same position the later one
/// wins that slot; removing the earlier one later leaves the slot alone.
///
/// # Example
///
/// ```rust
/// use ketama::{HashRing, Node};
///
/// let ring = HashRing::new(
///     vec![
///         Node::new("cache-a", "10.0.0.1:11211"),
///         Node::new("cache-b", "10.0.0.2:11211"),
///     ],
///     160,
/// );
///
/// let node = ring.get_node("user:42").unwrap();
/// assert!(node.id == "cache-a" || node.id == "cache-b");
///
/// ring.remove_node("cache-a");
/// assert_eq!(ring.get_node("user:42").unwrap().id, "cache-b");
/// ```
pub struct HashRing<T = ()> {
    state: RwLock<RingState<T>>,
    virtual_nodes: usize,
}

impl<T> HashRing<T> {
    /// Build a ring holding `nodes`, each placed `virtual_nodes` times.
    ///
    /// `virtual_nodes == 0` is accepted: nothing is ever placed and every
    /// lookup returns `None`.
    pub fn new(nodes: impl IntoIterator<Item = Node<T>>, virtual_nodes: usize) -> Self {
        if virtual_nodes == 0 {
            warn!("hash ring built with zero virtual nodes, lookups will never resolve");
        }

        let mut state = RingState::new();
        for node in nodes {
            state.insert(node, virtual_nodes);
        }
        state.sorted.sort_unstable();

        debug!(
            virtual_nodes,
            positions = state.sorted.len(),
            "built hash ring"
        );

        Self {
            state: RwLock::new(state),
            virtual_nodes,
        }
    }

    /// Add a physical node.
    ///
    /// All of its positions are reachable once this returns.
    pub fn add_node(&self, node: Node<T>) {
        let node_id = node.id.clone();

        let mut state = self.state.write();
        let added = state.insert(node, self.virtual_nodes);
        state.sorted.sort_unstable();
        let positions = state.sorted.len();
        drop(state);

        debug!(%node_id, added, positions, "added node to ring");
    }

    /// Remove a physical node by id.
    ///
    /// Unknown ids are a no-op. Returns whether any position was removed.
    pub fn remove_node(&self, node_id: &str) -> bool {
        let mut state = self.state.write();
        let removed = state.remove(node_id, self.virtual_nodes);
        let positions = state.sorted.len();
        drop(state);

        if removed > 0 {
            debug!(%node_id, removed, positions, "removed node from ring");
        } else {
            trace!(%node_id, "remove of unknown node ignored");
        }
        removed > 0
    }

    /// Resolve `key` to the owning node.
    ///
    /// Returns `None` only when the ring has no positions.
    pub fn get_node(&self, key: impl AsRef<[u8]>) -> Option<Node<T>>
    where
        T: Clone,
    {
        let hash = key_hash(key.as_ref());
        let state = self.state.read();
        let owner = state.successor(hash)?;
        trace!(hash, node_id = %owner.id, "resolved key");
        Some(owner.as_ref().clone())
    }

    /// Replica count per physical node.
    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }

    /// Number of positions on the ring.
    pub fn len(&self) -> usize {
        self.state.read().sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().sorted.is_empty()
    }

    /// Number of distinct physical nodes holding at least one position.
    pub fn node_count(&self) -> usize {
        let state = self.state.read();
        state
            .owners
            .values()
            .map(|owner| owner.id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.state.read().find(node_id, self.virtual_nodes).is_some()
    }

    /// Fetch a registered node by id.
    pub fn node(&self, node_id: &str) -> Option<Node<T>>
    where
        T: Clone,
    {
        let state = self.state.read();
        state
            .find(node_id, self.virtual_nodes)
            .map(|owner| owner.as_ref().clone())
    }

    /// All registered nodes, ordered by id.
    pub fn nodes(&self) -> Vec<Node<T>>
    where
        T: Clone,
    {
        let state = self.state.read();
        state
            .owners
            .values()
            .map(|owner| (owner.id.as_str(), owner))
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .map(|owner| owner.as_ref().clone())
            .collect()
    }

    /// Snapshot of every position in ascending order.
    pub fn positions(&self) -> Vec<VirtualNode> {
        self.state.read().positions()
    }

    /// Fraction of the hash space each node owns.
    ///
    /// A position owns the arc from the previous position (exclusive) up to
    /// itself. Fractions sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> BTreeMap<String, f64> {
        let positions = self.positions();
        let mut shares = BTreeMap::new();

        let Some(last) = positions.last() else {
            return shares;
        };

        let mut previous = last;
        for vnode in &positions {
            let span = if positions.len() == 1 {
                RING_SPAN
            } else {
                f64::from(previous.distance_to(vnode))
            };
            *shares.entry(vnode.node_id.clone()).or_insert(0.0) += span / RING_SPAN;
            previous = vnode;
        }

        shares
    }
}

impl<T> Default for HashRing<T> {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_VIRTUAL_NODES)
    }
}

impl<T> fmt::Debug for HashRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("virtual_nodes", &self.virtual_nodes)
            .field("positions", &self.len())
            .finish()
    }
}

/// Builder for a [`HashRing`].
///
/// ```rust
/// use ketama::{Node, RingBuilder};
///
/// let ring = RingBuilder::new()
///     .with_vnodes(64)
///     .add_node(Node::bare("a"))
///     .add_node(Node::bare("b"))
///     .build();
///
/// assert_eq!(ring.len(), 128);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<T = ()> {
    virtual_nodes: usize,
    nodes: Vec<Node<T>>,
}

impl<T> RingBuilder<T> {
    /// Start with [`DEFAULT_VIRTUAL_NODES`] and no nodes.
    pub fn new() -> Self {
        Self {
            virtual_nodes: DEFAULT_VIRTUAL_NODES,
            nodes: Vec::new(),
        }
    }

    pub fn with_vnodes(mut self, virtual_nodes: usize) -> Self {
        self.virtual_nodes = virtual_nodes;
        self
    }

    pub fn add_node(mut self, node: Node<T>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn add_nodes(mut self, nodes: impl IntoIterator<Item = Node<T>>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn build(self) -> HashRing<T> {
        HashRing::new(self.nodes, self.virtual_nodes)
    }
}

impl<T> Default for RingBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
