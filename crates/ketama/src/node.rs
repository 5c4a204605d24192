//! Physical node records.
//!
//! A [`Node`] is what callers hand to the ring and what lookups hand back.
//! The ring only ever looks at `id`; `weight` and `value` ride along untouched.

use serde::{Deserialize, Serialize};

/// A physical backend participating in the ring.
///
/// `T` is an opaque payload (an address, a connection handle, a shard index)
/// that the ring stores and returns unchanged. It is never hashed, compared or
/// interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<T = ()> {
    /// Caller-supplied identifier, unique among registered nodes.
    pub id: String,
    /// Declared weight.
    ///
    /// Stored and returned, but placement ignores it: every node gets the
    /// ring's fixed virtual-node count regardless of weight.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Opaque payload returned on lookup.
    pub value: T,
}

fn default_weight() -> u32 {
    1
}

impl<T> Node<T> {
    /// Construct a node with weight 1.
    pub fn new(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            weight: 1,
            value,
        }
    }

    pub fn with_weight(id: impl Into<String>, weight: u32, value: T) -> Self {
        Self {
            id: id.into(),
            weight,
            value,
        }
    }
}

impl Node<()> {
    /// Node with no payload, for callers that only route by identifier.
    pub fn bare(id: impl Into<String>) -> Self {
        Self::new(id, ())
    }
}
