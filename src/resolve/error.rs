//! Field-level resolution errors.

/// Boxed cause of an upstream failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a single field could not be resolved.
///
/// Each becomes a `null` field value plus an entry in the response's
/// `errors` list; sibling fields are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Malformed caller input, rejected before any lookup.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The metadata provider call failed.
    #[error("Upstream fetch failed for {target}: {message}")]
    UpstreamFetch {
        target: String,
        message: String,
        #[source]
        source: BoxError,
    },

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ResolveError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Wrap a provider failure, keeping the full context chain in the message.
    pub fn upstream(target: impl Into<String>, err: anyhow::Error) -> Self {
        Self::UpstreamFetch {
            target: target.into(),
            message: format!("{err:#}"),
            source: err.into(),
        }
    }

    /// Stable machine-readable code reported in `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::UpstreamFetch { .. } => "UPSTREAM_FETCH_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<wishlist_common::Error> for ResolveError {
    fn from(err: wishlist_common::Error) -> Self {
        match err {
            wishlist_common::Error::InvalidInput(msg) => Self::InvalidArgument(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Result alias for resolver functions.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
