//! Ketama-style consistent hashing.
//!
//! This crate provides a thread-safe hash ring for routing string keys to a
//! changing set of backends:
//! - Physical node records carrying an opaque payload
//! - CRC-32 virtual-node placement
//! - Nearest-successor lookup with wrap-around
//! - Config loading for ring membership
//!
//! The ring is a passive in-process structure. Discovering nodes, health
//! checking them and dispatching requests belong to the embedding service.

pub mod config;
pub mod error;
pub mod node;
pub mod ring;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use node::Node;
pub use ring::{HashRing, RingBuilder, DEFAULT_VIRTUAL_NODES};
pub use vnode::{key_hash, VirtualNode};
