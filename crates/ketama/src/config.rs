//! Ring configuration.
//!
//! Lets an owning service describe its ring in a config document instead of
//! code:
//!
//! ```json
//! {
//!   "virtual_nodes": 160,
//!   "nodes": [
//!     { "id": "cache-a", "value": "10.0.0.1:11211" },
//!     { "id": "cache-b", "weight": 2, "value": "10.0.0.2:11211" }
//!   ]
//! }
//! ```
//!
//! Both fields are optional. Unlike [`HashRing::new`], loading rejects a zero
//! replica count and duplicate node ids, since a config containing either is
//! almost certainly a mistake.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::Node;
use crate::ring::{HashRing, DEFAULT_VIRTUAL_NODES};

fn default_virtual_nodes() -> usize {
    DEFAULT_VIRTUAL_NODES
}

/// Declarative description of a ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingConfig<T = ()> {
    /// Virtual nodes per physical node.
    #[serde(default = "default_virtual_nodes")]
    pub virtual_nodes: usize,
    /// Initial membership.
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Node<T>>,
}

impl<T> Default for RingConfig<T> {
    fn default() -> Self {
        Self {
            virtual_nodes: DEFAULT_VIRTUAL_NODES,
            nodes: Vec::new(),
        }
    }
}

impl<T: DeserializeOwned> RingConfig<T> {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl<T> RingConfig<T> {
    pub fn validate(&self) -> Result<()> {
        if self.virtual_nodes == 0 {
            return Err(Error::InvalidConfig(
                "virtual_nodes must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(Error::InvalidConfig("node id must not be empty".to_string()));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate node id {:?}",
                    node.id
                )));
            }
        }

        Ok(())
    }

    /// Build the ring described by this config.
    pub fn build(self) -> HashRing<T> {
        HashRing::new(self.nodes, self.virtual_nodes)
    }
}
