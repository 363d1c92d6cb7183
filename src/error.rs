//! Error types for provisioning operations.

use thiserror::Error;

/// Result type alias using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can occur while running the provisioning workflow.
///
/// Nothing in this crate recovers from these; they are propagated to the
/// caller with enough context to tell which step failed.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A required configuration value is absent.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token acquisition with the configured credentials failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The management API answered with a non-success status.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error code (e.g. "Conflict", "QuotaExceeded")
        code: String,
        /// Provider error message
        message: String,
    },

    /// The resource addressed by a call does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A resource name violates the provider's naming rules.
    #[error("invalid resource name: {0}")]
    InvalidName(String),

    /// A remote operation failed, with context about the call.
    #[error("{client}: {operation} {target}: {source}")]
    RemoteOperation {
        /// Collaborator name ("resources", "vaults")
        client: String,
        /// Operation name (register, create_or_update, list, delete)
        operation: String,
        /// Resource the operation addressed
        target: String,
        /// Underlying error
        #[source]
        source: Box<ProvisionError>,
    },

    /// I/O error occurred (reading the confirmation gate, writing output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[cfg(feature = "azure")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProvisionError {
    /// Wraps an underlying error with the collaborator, operation and target
    /// that produced it.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultprov::ProvisionError;
    ///
    /// let err = ProvisionError::NotFound("KeyVaultSample123".to_string());
    /// let wrapped = ProvisionError::remote_op("vaults", "delete", "KeyVaultSample123", err);
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "vaults: delete KeyVaultSample123: resource not found: KeyVaultSample123"
    /// );
    /// ```
    pub fn remote_op(
        client: impl Into<String>,
        operation: impl Into<String>,
        target: impl Into<String>,
        err: ProvisionError,
    ) -> Self {
        Self::RemoteOperation {
            client: client.into(),
            operation: operation.into(),
            target: target.into(),
            source: Box::new(err),
        }
    }
}
