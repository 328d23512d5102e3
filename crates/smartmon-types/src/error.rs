use thiserror::Error;

/// Errors that can occur while collecting, storing, or querying SMART data.
#[derive(Debug, Clone, Error)]
pub enum SmartError {
    /// The node did not accept the collection request.
    #[error("node {node} unreachable: {reason}")]
    NodeUnreachable { node: String, reason: String },

    /// The node did not answer within the transport's deadline.
    #[error("timeout waiting for node {0}")]
    Timeout(String),

    /// The node answered, but the payload could not be decoded as a SMART
    /// report document.
    #[error("malformed response from node {node}: {reason}")]
    MalformedResponse { node: String, reason: String },

    /// No identity metadata (hostname) is known for the node.
    #[error("metadata unavailable for node {0}")]
    MetadataUnavailable(String),

    /// The backing object namespace cannot be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A reading could not be encoded to, or decoded from, its stored form.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The backend read operation itself failed for the named object.
    #[error("not found: {0}")]
    NotFound(String),

    /// The schedule configuration could not be parsed. Callers fall back to
    /// the documented defaults rather than aborting.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

/// The standard result type used throughout smartmon.
pub type Result<T> = std::result::Result<T, SmartError>;

impl SmartError {
    /// Build a `NodeUnreachable` error.
    pub fn unreachable(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NodeUnreachable {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Build a `MalformedResponse` error.
    pub fn malformed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            node: node.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SmartError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unreachable() {
        let err = SmartError::unreachable("osd.3", "connection refused");
        assert_eq!(
            err.to_string(),
            "node osd.3 unreachable: connection refused"
        );
    }

    #[test]
    fn test_display_timeout() {
        let err = SmartError::Timeout("osd.1".into());
        assert!(err.to_string().contains("osd.1"));
    }

    #[test]
    fn test_json_error_conversion() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SmartError = bad.unwrap_err().into();
        assert!(matches!(err, SmartError::Serialization(_)));
    }

    #[test]
    fn test_errors_are_cloneable() {
        // Per-node outcomes are collected into summaries, so errors must clone.
        let err = SmartError::StorageUnavailable("pool gone".into());
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }
}
