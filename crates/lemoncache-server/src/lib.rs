//! HTTP peer transport for `lemoncache`.
//!
//! [`HttpPool`] is both sides of the wire protocol for one node: an axum
//! router serving `GET <base>/<group>/<key>` to other peers, and a
//! [`PeerPicker`] that routes outbound lookups through a consistent-hash
//! ring to per-peer [`HttpPeer`] client stubs.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use lemoncache_core::ring::{HashRing, DEFAULT_REPLICAS};
use lemoncache_core::wire::{self, PeerResponse};
use lemoncache_core::{Error, PeerGetter, PeerPicker, Registry, Result};

/// Path prefix every peer endpoint is mounted under.
pub const DEFAULT_BASE_PATH: &str = "/_lemoncache/";

/// Ring plus client-stub directory, swapped wholesale on reconfiguration so
/// a concurrent pick sees either the old peer set or the new one, never a
/// half-built ring.
struct PoolState {
    ring: HashRing,
    peers: FxHashMap<String, Arc<HttpPeer>>,
}

/// One node's view of the peer set.
pub struct HttpPool {
    /// This node's own address, e.g. `http://localhost:8001`. A ring pick
    /// that lands here means "handle locally".
    self_addr: String,
    base_path: String,
    registry: Arc<Registry>,
    client: reqwest::Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    /// Creates a pool for the node at `self_addr`, serving groups out of
    /// `registry`. The peer set starts empty; call [`HttpPool::set_peers`].
    #[must_use]
    pub fn new(self_addr: impl Into<String>, registry: Arc<Registry>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: DEFAULT_BASE_PATH.to_owned(),
            registry,
            client: reqwest::Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS),
                peers: FxHashMap::default(),
            }),
        }
    }

    /// Replaces the full peer set, rebuilding the ring and the client-stub
    /// directory atomically.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        let mut ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(peers.iter().cloned());
        let mut stubs = FxHashMap::default();
        for peer in peers {
            let stub = Arc::new(HttpPeer::new(
                format!("{peer}{}", self.base_path),
                self.client.clone(),
            ));
            stubs.insert(peer, stub);
        }
        *self.state.write() = PoolState { ring, peers: stubs };
    }

    /// Axum router exposing the peer endpoint under the pool's base path.
    #[must_use]
    pub fn router(self: &Arc<Self>) -> Router {
        let route = format!("{}{{*rest}}", self.base_path);
        Router::new()
            .route(&route, get(serve_peer))
            .with_state(Arc::clone(self))
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let node = state.ring.get(key)?;
        if node == self.self_addr {
            return None;
        }
        debug!(self_addr = %self.self_addr, peer = %node, key, "pick peer");
        state
            .peers
            .get(node)
            .map(|stub| Arc::clone(stub) as Arc<dyn PeerGetter>)
    }
}

/// Peer request handler: `<base>/<group>/<key>` (the key may contain `/`;
/// the namespace is split off at the first separator only).
async fn serve_peer(
    State(pool): State<Arc<HttpPool>>,
    Path(rest): Path<String>,
) -> Response {
    let Some((group_name, key)) = rest.split_once('/') else {
        return (
            StatusCode::BAD_REQUEST,
            "bad request: expected <group>/<key>",
        )
            .into_response();
    };

    let Some(group) = pool.registry.get(group_name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such group: {group_name}"),
        )
            .into_response();
    };

    let view = match group.get(key).await {
        Ok(view) => view,
        Err(err) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    match wire::encode_response(&PeerResponse {
        value: view.to_vec(),
    }) {
        Ok(body) => ([(header::CONTENT_TYPE, wire::CONTENT_TYPE)], body).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// Client stub for one remote peer.
pub struct HttpPeer {
    /// Peer address plus base path, e.g. `http://localhost:8002/_lemoncache/`.
    base_url: String,
    client: reqwest::Client,
}

impl HttpPeer {
    /// Creates a stub that issues requests against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl PeerGetter for HttpPeer {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key),
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::PeerTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PeerTransport(format!("peer returned: {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::PeerTransport(format!("reading response body: {e}")))?;

        let envelope = wire::decode_response(&body)?;
        Ok(envelope.value)
    }
}
