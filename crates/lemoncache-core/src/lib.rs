//! # `lemoncache` Core
//!
//! Embeddable, horizontally-shardable lookaside cache.
//!
//! A process keeps a bounded LRU cache in front of a slow backing source;
//! multiple processes shard key ownership over a consistent-hash ring and
//! fetch each other's keys over a lightweight wire protocol. Concurrent
//! requests for the same missing key collapse into a single load
//! (single-flight), so a stampede on one hot key costs one trip to the
//! source.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lemoncache_core::{FnLoader, Group, Registry};
//!
//! let loader = Arc::new(FnLoader::new(|key: &str| {
//!     // hit the real backing store here
//!     Ok(format!("value-for-{key}").into_bytes())
//! }));
//!
//! let group = Group::new("scores", 2 << 10, loader)?;
//! let registry = Arc::new(Registry::new());
//! registry.register(group.clone())?;
//!
//! let view = group.get("Tom").await?;
//! assert_eq!(view.to_string(), "value-for-Tom");
//! ```
//!
//! The HTTP transport (peer pool, client stub, node binary) lives in the
//! `lemoncache-server` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // Acceptable for hit-rate calculation
#![allow(clippy::cast_possible_wrap)] // Byte budgets fit i64 by construction
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

mod byteview;
mod cache;
mod error;
mod group;
pub mod lru;
#[cfg(test)]
mod lru_tests;
mod peers;
mod registry;
pub mod ring;
pub mod singleflight;
pub mod wire;

pub use byteview::ByteView;
pub use cache::CacheStats;
pub use error::{Error, Result};
pub use group::{FnLoader, Group, Loader};
pub use peers::{PeerGetter, PeerPicker};
pub use registry::Registry;
