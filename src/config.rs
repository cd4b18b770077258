use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Raw parameters for building a backend handle and its admin session.
///
/// Empty strings are treated like absent values.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParams {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl ConnectionParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_admin_credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self.admin_password = Some(password.into());
        self
    }

    /// Configured token, if non-empty
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }

    /// Admin email and password, if both are non-empty
    #[must_use]
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        non_empty(self.admin_email.as_deref()).zip(non_empty(self.admin_password.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where the adapter's backend handle comes from.
pub enum ConnectionSource<B> {
    /// An already-live handle; the caller owns its session lifecycle.
    Client(Arc<B>),
    /// Parameters the adapter uses to build a handle and bootstrap an admin session.
    Params(ConnectionParams),
}

impl<B> fmt::Debug for ConnectionSource<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(_) => f.write_str("Client(..)"),
            Self::Params(params) => f.debug_tuple("Params").field(params).finish(),
        }
    }
}

/// Options echoed back to the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterOptions {
    #[serde(default = "default_use_plural")]
    pub use_plural: bool,
    #[serde(default)]
    pub debug_logs: bool,
}

const fn default_use_plural() -> bool {
    true
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            use_plural: default_use_plural(),
            debug_logs: false,
        }
    }
}

/// Adapter configuration. Fixed once the adapter is built.
#[derive(Debug)]
pub struct AdapterConfig<B> {
    pub connection: ConnectionSource<B>,
    pub options: AdapterOptions,
}

impl<B> AdapterConfig<B> {
    pub fn new(connection: ConnectionSource<B>) -> Self {
        Self {
            connection,
            options: AdapterOptions::default(),
        }
    }

    /// Configuration wrapping a caller-managed handle
    pub fn from_client(client: Arc<B>) -> Self {
        Self::new(ConnectionSource::Client(client))
    }

    /// Configuration from raw connection parameters
    pub fn from_params(params: ConnectionParams) -> Self {
        Self::new(ConnectionSource::Params(params))
    }

    #[must_use]
    pub fn with_use_plural(mut self, use_plural: bool) -> Self {
        self.options.use_plural = use_plural;
        self
    }

    #[must_use]
    pub fn with_debug_logs(mut self, debug_logs: bool) -> Self {
        self.options.debug_logs = debug_logs;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }
}
