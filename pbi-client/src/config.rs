use crate::error::Result;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Base URL of the Power BI REST API for the signed-in organization
pub const DEFAULT_API_URL: &str = "https://api.powerbi.com/v1.0/myorg/";

/// Connection settings for [`crate::HttpClient`].
///
/// `timeout` is `None` by default: the client applies no request timeout of its
/// own unless one is configured here.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL that resource paths are appended to
    pub base_url: Url,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
    /// Optional per-request timeout
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            access_token: None,
            timeout: None,
            user_agent: format!("pbi-reconcile/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ..Default::default()
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
