use std::time::Duration;

/// Admin API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-10";

/// Transport timeout of a single GraphQL request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one store.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Store host, e.g. `my-shop.myshopify.com`.
    pub store_domain: String,
    pub access_token: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ShopifyConfig {
    pub fn new(store_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        let store_domain = store_domain.into();
        let store_domain = store_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        Self {
            store_domain,
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GraphQL endpoint of the Admin API.
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"***")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
