//! Virtual node placement and key hashing.
//!
//! # Virtual Nodes
//!
//! Each physical node is placed on the ring `virtual_nodes` times. Replica `i`
//! of node `id` sits at `crc32("<id>-<i>")`. With more placements per node the
//! arcs between positions shrink and keys spread more evenly.
//!
//! The placement is a pure function of `(id, replica)`. The ring relies on
//! this to remove a node: it regenerates the same hashes instead of keeping a
//! per-node list of them.
//!
//! Keys are hashed with the same CRC-32 (IEEE) checksum, so a key and a
//! virtual node live in one 32-bit space.

use std::fmt;

/// Hash an arbitrary key onto the ring.
#[inline]
pub fn key_hash(key: &[u8]) -> u32 {
    crc32fast::hash(key)
}

/// A single position on the ring owned by a physical node.
///
/// Returned by [`HashRing::positions`](crate::HashRing::positions) as a
/// snapshot; holding one does not keep anything alive inside the ring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Position on the ring.
    pub hash: u32,
    /// The physical node occupying this position.
    pub node_id: String,
}

impl VirtualNode {
    pub fn new(hash: u32, node_id: impl Into<String>) -> Self {
        Self {
            hash,
            node_id: node_id.into(),
        }
    }

    /// Ring position of replica `replica` of `node_id`.
    ///
    /// Must stay identical between add and remove.
    pub fn hash_for(node_id: &str, replica: usize) -> u32 {
        key_hash(format!("{node_id}-{replica}").as_bytes())
    }

    /// Build the virtual node for replica `replica` of `node_id`.
    pub fn from_index(node_id: &str, replica: usize) -> Self {
        Self::new(Self::hash_for(node_id, replica), node_id)
    }

    /// Clockwise distance from this position to `other`, modulo 2^32.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u32 {
        other.hash.wrapping_sub(self.hash)
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(hash={:08x}, node={})", self.hash, self.node_id)
    }
}
