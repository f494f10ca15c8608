//! Error types for `lemoncache`.
//!
//! One unified error enum shared by the core engine and the transport layer.
//! Error codes follow the pattern `LEMON-XXX` for easy debugging.

use thiserror::Error;

/// Result type alias for `lemoncache` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `lemoncache` operations.
///
/// The enum is `Clone` because a single in-flight load fans its result out to
/// every waiter that joined the call; each waiter gets its own copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty key rejected before any lookup (LEMON-001).
    #[error("[LEMON-001] key is required")]
    EmptyKey,

    /// No group registered under the requested namespace (LEMON-002).
    #[error("[LEMON-002] no such group: '{0}'")]
    GroupNotFound(String),

    /// The user-supplied loader failed; propagated verbatim to the caller (LEMON-003).
    #[error("[LEMON-003] loader error: {0}")]
    Loader(String),

    /// Network or status failure contacting a peer (LEMON-004).
    ///
    /// Never surfaced to `Group::get` callers; the load path falls back to
    /// the local loader instead.
    #[error("[LEMON-004] peer transport error: {0}")]
    PeerTransport(String),

    /// Malformed response envelope from a peer (LEMON-005).
    #[error("[LEMON-005] decoding response body: {0}")]
    Decode(String),

    /// Response envelope could not be serialized (LEMON-006).
    #[error("[LEMON-006] encoding response body: {0}")]
    Encode(String),

    /// Setup-time misconfiguration, e.g. a peer picker attached twice (LEMON-007).
    #[error("[LEMON-007] configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "LEMON-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyKey => "LEMON-001",
            Self::GroupNotFound(_) => "LEMON-002",
            Self::Loader(_) => "LEMON-003",
            Self::PeerTransport(_) => "LEMON-004",
            Self::Decode(_) => "LEMON-005",
            Self::Encode(_) => "LEMON-006",
            Self::Config(_) => "LEMON-007",
        }
    }

    /// Returns true if the load path may recover from this error by falling
    /// back to the local loader.
    #[must_use]
    pub const fn is_peer_recoverable(&self) -> bool {
        matches!(self, Self::PeerTransport(_) | Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(Error::EmptyKey.code(), "LEMON-001");
        assert_eq!(Error::GroupNotFound("scores".into()).code(), "LEMON-002");
        assert_eq!(Error::Config("x".into()).code(), "LEMON-007");
    }

    #[test]
    fn peer_errors_are_recoverable() {
        assert!(Error::PeerTransport("refused".into()).is_peer_recoverable());
        assert!(Error::Decode("truncated".into()).is_peer_recoverable());
        assert!(!Error::Loader("missing".into()).is_peer_recoverable());
        assert!(!Error::EmptyKey.is_peer_recoverable());
    }

    #[test]
    fn display_includes_code() {
        let err = Error::GroupNotFound("scores".into());
        assert!(err.to_string().contains("LEMON-002"));
        assert!(err.to_string().contains("scores"));
    }
}
