//! # Error Handling
//!
//! Two policies coexist in the adapter:
//!
//! - **Propagate**: `create` returns its [`AdapterError`] to the caller.
//! - **Suppress-and-default**: every filter-based operation swallows the
//!   error and returns `None`, an empty list or `0`. The failure is logged
//!   through `tracing` and, when `debug_logs` is enabled, the host's debug hook.
//!
//! Internally, single-record lookups are modeled with [`Lookup`] so that
//! "nothing matched" and "the backend failed" stay distinguishable until the
//! public boundary collapses them.
//!
//! ## Logging
//!
//! Suppressed failures are emitted at `debug` level. To see them, set up
//! tracing in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("pbauth_adapter=debug")
//!     .init();
//! ```

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from PocketBase
    #[error("PocketBase responded with {status}: {message}")]
    Backend {
        status: u16,
        message: String,
        /// Field-level details from the error body, `Value::Null` when absent
        data: Value,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid PocketBase URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Record from collection '{collection}' has no string `id` field")]
    MissingRecordId { collection: String },

    #[error("Admin authentication failed: {0}")]
    Unauthenticated(String),

    /// The conditions could not be compiled; no request was sent
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    /// A sequential bulk write stopped part-way. Records before the failure
    /// stay written.
    #[error("Bulk operation stopped after {completed} of {matched} records: {source}")]
    PartialBulk {
        completed: u64,
        matched: u64,
        #[source]
        source: Box<AdapterError>,
    },
}

/// A condition that cannot be written safely in PocketBase's filter grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("field name '{0}' is not a plain identifier")]
    InvalidField(String),

    /// PocketBase treats a `"` preceded by `\` as escaped, so a quoted
    /// literal can never end in a backslash.
    #[error("value for '{field}' ends with a backslash")]
    TrailingBackslash { field: String },
}

/// PocketBase error body: `{"code": 404, "message": "...", "data": {}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl AdapterError {
    /// Create a backend error without field-level details
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Build a backend error from a raw response body, falling back to the
    /// body text when it is not a PocketBase error document.
    pub(crate) fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => Self::Backend {
                status,
                message: parsed.message,
                data: parsed.data,
            },
            _ => Self::backend(status, body.trim()),
        }
    }

    /// HTTP status reported by the backend, if this error came from a response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            Self::PartialBulk { source, .. } => source.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Outcome of a single-record lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(AdapterError),
}

impl<T> Lookup<T> {
    /// Collapse into the public contract: failures read as "nothing found"
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Failed(_) => None,
        }
    }

    /// # Errors
    ///
    /// Returns the backend error when the lookup failed.
    pub fn into_result(self) -> Result<Option<T>, AdapterError> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::NotFound => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

impl<T> From<Result<Option<T>, AdapterError>> for Lookup<T> {
    fn from(result: Result<Option<T>, AdapterError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }
}
