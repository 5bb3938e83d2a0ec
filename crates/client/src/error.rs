//! Error taxonomy for store access.

use thiserror::Error;

/// Errors that can occur when talking to the WooCommerce REST API.
#[derive(Debug, Error)]
pub enum WooError {
    /// No usable credentials are stored. Raised before any network I/O.
    #[error("WooCommerce not configured")]
    NotConfigured,

    /// Network-level failure before an HTTP response was obtained
    /// (DNS, connection refused, TLS, client-side timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success HTTP status.
    #[error("Upstream error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// The body was not the JSON shape we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Reading or writing the durable credential record failed.
    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The configured store URL does not form a valid request URL.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

impl WooError {
    /// HTTP status for [`WooError::Upstream`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The store reported 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// The store rejected the credentials (401 or 403).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_woo_error_display() {
        assert_eq!(
            WooError::NotConfigured.to_string(),
            "WooCommerce not configured"
        );

        let err = WooError::Upstream {
            status: 404,
            message: "Invalid ID.".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream error: 404 - Invalid ID.");
    }

    #[test]
    fn test_status_helpers() {
        let not_found = WooError::Upstream {
            status: 404,
            message: String::new(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_unauthorized());

        let unauthorized = WooError::Upstream {
            status: 401,
            message: String::new(),
        };
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.status(), Some(401));

        assert_eq!(WooError::NotConfigured.status(), None);
    }
}
