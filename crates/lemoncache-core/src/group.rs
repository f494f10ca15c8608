//! Group orchestration: the end-to-end load path.
//!
//! A [`Group`] is a named cache namespace binding a user loader, the guarded
//! LRU cache, an optional peer picker and the single-flight gate. Every miss
//! funnels through the gate, then tries the owning peer (if any) before the
//! local loader.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, MainCache};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::SingleFlight;
use crate::{ByteView, Error, Result};

/// Capability that fetches source data on a cache miss.
///
/// Must be safe for concurrent invocation across distinct keys; calls for
/// the same key are already collapsed by the group's single-flight gate, so
/// the loader need not deduplicate itself.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Loads the value for `key` from the backing source.
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapter letting a plain function act as a [`Loader`].
pub struct FnLoader<F>(F);

impl<F> FnLoader<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    /// Wraps `f` as a loader.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for FnLoader<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}

struct GroupInner {
    name: String,
    loader: Arc<dyn Loader>,
    cache: MainCache,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
    flight: SingleFlight<Result<ByteView>>,
}

/// A named cache namespace.
///
/// Cheap to clone; clones share the same cache, loader and in-flight calls.
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

impl Group {
    /// Creates a group named `name` with a `cache_bytes` budget.
    ///
    /// A budget of zero or below leaves the cache unbounded. The name must
    /// be non-empty and must not contain `/`, which the wire protocol uses
    /// to separate the namespace from the key.
    pub fn new(name: impl Into<String>, cache_bytes: i64, loader: Arc<dyn Loader>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Config("group name must not be empty".into()));
        }
        if name.contains('/') {
            return Err(Error::Config(format!(
                "group name '{name}' must not contain '/'"
            )));
        }
        Ok(Self {
            inner: Arc::new(GroupInner {
                name,
                loader,
                cache: MainCache::new(cache_bytes),
                peers: RwLock::new(None),
                flight: SingleFlight::new(),
            }),
        })
    }

    /// The group's namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Hit/miss counters for this group's cache.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Attaches the peer picker. Late-bound because the transport pool is
    /// typically built after the group; attaching twice is a configuration
    /// error.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        let mut slot = self.inner.peers.write();
        if slot.is_some() {
            return Err(Error::Config(
                "register_peers called more than once".into(),
            ));
        }
        *slot = Some(picker);
        Ok(())
    }

    /// Looks up `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        if let Some(view) = self.inner.cache.get(key) {
            debug!(group = %self.inner.name, key, "cache hit");
            return Ok(view);
        }
        self.load(key).await
    }

    /// Miss path. All concurrent callers for one key share a single
    /// execution; within it, a selected peer is tried first and any peer
    /// failure falls back to the local loader.
    async fn load(&self, key: &str) -> Result<ByteView> {
        let this = self.clone();
        let key_owned = key.to_owned();
        self.inner
            .flight
            .run(key, async move {
                let picker = this.inner.peers.read().clone();
                if let Some(picker) = picker {
                    if let Some(peer) = picker.pick_peer(&key_owned) {
                        match this.get_from_peer(peer.as_ref(), &key_owned).await {
                            Ok(view) => return Ok(view),
                            Err(err) => {
                                warn!(
                                    group = %this.inner.name,
                                    key = %key_owned,
                                    error = %err,
                                    "failed to get from peer, falling back to local loader"
                                );
                            }
                        }
                    }
                }
                this.load_locally(&key_owned).await
            })
            .await
    }

    /// Invokes the user loader and populates the local cache on success.
    /// Failed keys are never cached.
    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.inner.loader.load(key).await?;
        let view = ByteView::from(bytes);
        self.inner.cache.add(key, view.clone());
        Ok(view)
    }

    /// Remote fetch. The value is owned (and cached) by the remote peer's
    /// own group, so it is not re-inserted into the local cache.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.inner.name, key).await?;
        Ok(ByteView::from(bytes))
    }
}
