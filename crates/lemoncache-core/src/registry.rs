//! Namespace registry.
//!
//! Explicitly constructed and owned by the host process (no hidden global
//! state), handed to the transport layer so inbound peer requests can be
//! routed to their group. Populated during startup; no deregistration.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{Error, Group, Result};

/// Maps namespace names to groups.
///
/// Registrations take the write lock; lookups take the read lock and never
/// block each other.
#[derive(Default)]
pub struct Registry {
    groups: RwLock<FxHashMap<String, Group>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `group` under its name.
    ///
    /// Registering a second group under the same name is a configuration
    /// error; the registry is append-only for the process lifetime.
    pub fn register(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write();
        let name = group.name().to_owned();
        if groups.contains_key(&name) {
            return Err(Error::Config(format!(
                "group '{name}' is already registered"
            )));
        }
        groups.insert(name, group);
        Ok(())
    }

    /// Looks up the group registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Group> {
        self.groups.read().get(name).cloned()
    }

    /// Number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
