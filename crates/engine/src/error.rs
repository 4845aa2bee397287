//! Engine error taxonomy.
//!
//! Only two failure classes ever reach a user: transport failures (keep
//! local state, session preserved) and terminal authorization failures
//! (session cleared by the auth layer). Not-found/method-mismatch statuses
//! drive endpoint-variant fallback instead of surfacing, and malformed
//! payloads are never errors at all - normalization degrades to defaults.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors the reconciliation engine can surface.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Network unreachable, DNS, TLS, or the connection dropped.
    /// Local state is NOT cleared and the session is preserved.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the call with 401/403.
    #[error("authorization rejected (status {status})")]
    Unauthorized {
        /// The rejecting HTTP status.
        status: u16,
    },

    /// Every endpoint variant in the fallback chain failed.
    #[error("all endpoint variants failed (last status {last_status})")]
    EndpointExhausted {
        /// Status returned by the last variant tried.
        last_status: u16,
    },

    /// Any other non-success HTTP status.
    #[error("unexpected status {status}")]
    Status {
        /// The HTTP status.
        status: u16,
    },

    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            _ => Self::Status { status },
        }
    }

    /// Whether this is a transport (network/CORS) failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this is a terminal authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Short human-readable message for the presentation layer.
    ///
    /// Never exposes a raw error object.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Transport(_) => "No se pudo conectar con el servidor (CORS o red).",
            Self::Unauthorized { .. } => "Usuario o sesión inválidos.",
            Self::EndpointExhausted { .. } | Self::Status { .. } | Self::Config(_) => {
                "Ocurrió un problema. Intenta de nuevo."
            }
        }
    }
}

/// Whether a status should trigger the next endpoint variant rather than
/// surfacing (route not mapped / wrong method on this backend build).
#[must_use]
pub const fn is_variant_miss(status: u16) -> bool {
    matches!(status, 404 | 405)
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(EngineError::from_status(401).is_unauthorized());
        assert!(EngineError::from_status(403).is_unauthorized());
        assert!(!EngineError::from_status(500).is_unauthorized());
    }

    #[test]
    fn test_variant_miss_statuses() {
        assert!(is_variant_miss(404));
        assert!(is_variant_miss(405));
        assert!(!is_variant_miss(500));
        assert!(!is_variant_miss(200));
    }

    #[test]
    fn test_user_message_never_raw() {
        let err = EngineError::Status { status: 500 };
        assert_eq!(err.user_message(), "Ocurrió un problema. Intenta de nuevo.");
        assert!(!err.user_message().contains("500"));
    }

    #[test]
    fn test_display() {
        let err = EngineError::EndpointExhausted { last_status: 405 };
        assert_eq!(
            err.to_string(),
            "all endpoint variants failed (last status 405)"
        );
    }
}
