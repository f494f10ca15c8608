//! Wire envelope for peer responses.
//!
//! A peer answers a `GET <base>/<group>/<key>` with a bincode-encoded
//! envelope holding the raw value bytes, served as
//! `application/octet-stream`. Both the server handler and the client stub
//! go through the helpers here so the two sides cannot drift.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Content type of every peer response body.
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Response envelope: a single byte-sequence field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    /// The cached value's bytes.
    pub value: Vec<u8>,
}

/// Encodes a response envelope.
pub fn encode_response(response: &PeerResponse) -> Result<Vec<u8>> {
    bincode::serialize(response).map_err(|e| Error::Encode(e.to_string()))
}

/// Decodes a response envelope; malformed input is a [`Error::Decode`].
pub fn decode_response(body: &[u8]) -> Result<PeerResponse> {
    bincode::deserialize(body).map_err(|e| Error::Decode(e.to_string()))
}
