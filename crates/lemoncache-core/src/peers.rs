//! Capability traits for peer routing.
//!
//! The transport layer implements both sides: a pool that picks the owning
//! node for a key, and a client stub that fetches a value from that node.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Client-side stub for one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches the value for `key` from the peer's `group` namespace.
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

/// Selects which peer owns a given key.
pub trait PeerPicker: Send + Sync {
    /// Returns the stub for the owning peer, or `None` when the key should
    /// be handled locally (empty ring, or the ring picked this node itself).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
