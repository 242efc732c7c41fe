use bugless_common::{IssueView, OrderBy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest page the model service hands out in one request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Client-side settings for issue queries.
///
/// Every field has a default, so a partial JSON document is valid:
///
/// ```rust
/// use bugless_client::ClientConfig;
///
/// let config = ClientConfig::from_json(r#"{ "page_size": 25 }"#).unwrap();
/// assert_eq!(config.page_size, 25);
/// assert_eq!(config.rpc_endpoint, "rpc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Path or URL of the RPC endpoint, relative to the page.
    pub rpc_endpoint: String,
    /// View used when a filter does not pick one.
    pub default_view: IssueView,
    /// Ordering used when a filter does not pick one.
    pub default_order: OrderBy,
    /// Page size for search queries without explicit pagination. Clamped to `1..=100`.
    pub page_size: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "rpc".to_string(),
            default_view: IssueView::Full,
            default_order: OrderBy::LastUpdate,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// Builder for [`ClientConfig`].
///
/// ```rust
/// use bugless_client::ClientConfig;
/// use bugless_common::IssueView;
///
/// let config = ClientConfig::builder()
///     .rpc_endpoint("wss://bugless.example/rpc")
///     .default_view(IssueView::Summary)
///     .page_size(500)
///     .build();
/// assert_eq!(config.page_size, 100);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn rpc_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.rpc_endpoint = endpoint.into();
        self
    }

    pub fn default_view(mut self, view: IssueView) -> Self {
        self.config.default_view = view;
        self
    }

    pub fn default_order(mut self, order: OrderBy) -> Self {
        self.config.default_order = order;
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_json_overrides() {
        let config = ClientConfig::from_json(
            r#"{ "rpc_endpoint": "/api/rpc", "default_view": "Summary", "default_order": "Created", "page_size": 0 }"#,
        )
        .unwrap();
        assert_eq!(config.rpc_endpoint, "/api/rpc");
        assert_eq!(config.default_view, IssueView::Summary);
        assert_eq!(config.default_order, OrderBy::Created);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ClientConfig::from_json(r#"{ "page_size": "many" }"#),
            Err(ConfigError::Json(_))
        ));
    }
}
