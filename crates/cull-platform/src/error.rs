//! Error types for the platform boundary.

use thiserror::Error;

/// Result alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors produced by the platform cookie store.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A cookie read or removal failed in the platform
    #[error("platform I/O failed: {0}")]
    Io(String),

    /// Required cookie access has not been granted
    #[error("cookie access not granted: {0}")]
    PermissionDenied(String),

    /// A removal addressed a cookie that does not exist
    #[error("no cookie named '{name}' at {url}")]
    NotFound {
        /// Synthesized cookie URL the removal addressed
        url: String,
        /// Cookie name the removal addressed
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::NotFound {
            url: "http://example.com/".to_string(),
            name: "session".to_string(),
        };
        assert_eq!(err.to_string(), "no cookie named 'session' at http://example.com/");
    }

    #[test]
    fn test_permission_error() {
        let err = PlatformError::PermissionDenied("<all_urls> not granted".to_string());
        assert!(err.to_string().contains("not granted"));
    }
}
