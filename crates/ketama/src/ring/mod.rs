//! Consistent hash ring implementation.
//!
//! The ring manages virtual-node positions and resolves keys to the physical
//! node owning the nearest position clockwise.

#[allow(clippy::module_inception)]
pub mod ring;

pub use ring::{HashRing, RingBuilder, DEFAULT_VIRTUAL_NODES};
