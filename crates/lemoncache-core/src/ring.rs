//! Consistent-hash ring mapping keys to peer nodes.
//!
//! Each real node is projected onto the ring as `replicas` virtual nodes to
//! smooth the key distribution across a small peer set. Lookups walk
//! clockwise to the first virtual node at or past the key's hash, wrapping at
//! the top of the ring.

use rustc_hash::FxHashMap;

/// Pluggable ring hash. Defaults to CRC-32 (IEEE); tests inject stub hashes
/// for deterministic placement.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Default number of virtual nodes per real node.
pub const DEFAULT_REPLICAS: usize = 50;

/// Consistent-hash ring over a fixed set of node identifiers.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Virtual-node hashes, kept sorted ascending after every `add`.
    keys: Vec<u32>,
    /// Virtual-node hash -> real node identifier.
    nodes: FxHashMap<u32, String>,
}

impl HashRing {
    /// Creates a ring using the default CRC-32 hash.
    #[must_use]
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, Box::new(crc32))
    }

    /// Creates a ring with a custom hash function.
    #[must_use]
    pub fn with_hash(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            nodes: FxHashMap::default(),
        }
    }

    /// Adds real nodes to the ring, `replicas` virtual nodes each.
    ///
    /// Re-adding a node duplicates its virtual nodes; callers rebuild the
    /// ring from scratch when the peer set changes.
    pub fn add<I, S>(&mut self, node_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for node in node_ids {
            let node = node.into();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{i}{node}").as_bytes());
                self.keys.push(hash);
                self.nodes.insert(hash, node.clone());
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the node that owns `key`, or `None` on an empty ring.
    ///
    /// Deterministic for an unchanged ring: repeated calls with the same key
    /// always return the same node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        // First virtual node at or past the key's hash, wrapping to index 0.
        let idx = self.keys.partition_point(|&h| h < hash) % self.keys.len();
        self.nodes.get(&self.keys[idx]).map(String::as_str)
    }

    /// Returns true if no nodes have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// CRC-32 (IEEE) over `data`.
#[inline]
#[allow(clippy::cast_possible_truncation)] // Table index always 0-255
fn crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                crc = if crc & 1 == 1 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = u32::MAX;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

#[cfg(test)]
mod crc_tests {
    use super::crc32;

    #[test]
    fn known_vectors() {
        // Standard CRC-32 (IEEE) check values.
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b"The quick brown fox jumps over the lazy dog"), 0x414F_A339);
    }
}
