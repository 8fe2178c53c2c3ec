//! HTTP client for the hierarchy storage service
//!
//! Wraps the two remote operations and folds every transport or status
//! problem into [`Error::StoreFailure`] / [`Error::FetchFailure`], so callers
//! never see reqwest types.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::config::Config;
use crate::common::{Error, Result};

/// Acknowledgement of a successful store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreAck {
    /// HTTP status code returned by the service
    pub status: u16,
}

/// The two operations the harness needs from a storage service
#[async_trait]
pub trait HierarchyService: Send + Sync {
    /// Submit a hierarchy for storage
    async fn store(&self, hierarchy: &Value) -> Result<StoreAck>;

    /// Retrieve the hierarchy rooted at `root_id`
    async fn fetch(&self, root_id: i64) -> Result<Value>;
}

/// [`HierarchyService`] backed by the service's HTTP API
#[derive(Debug, Clone)]
pub struct HierarchyClient {
    http: reqwest::Client,
    endpoint_url: String,
}

impl HierarchyClient {
    /// Create a client for `{base_url}/{endpoint}`
    pub fn new(base_url: &str, endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                endpoint.trim_matches('/')
            ),
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.service.validate()?;
        Self::new(
            &config.service.base_url(),
            &config.service.endpoint,
            config.timeouts.request(),
        )
    }

    /// URL used for store requests
    pub fn store_url(&self) -> &str {
        &self.endpoint_url
    }

    /// URL used to fetch the hierarchy rooted at `root_id`
    pub fn fetch_url(&self, root_id: i64) -> String {
        format!("{}/{}", self.endpoint_url, root_id)
    }
}

#[async_trait]
impl HierarchyService for HierarchyClient {
    async fn store(&self, hierarchy: &Value) -> Result<StoreAck> {
        let url = self.store_url();
        tracing::debug!(%url, "POST hierarchy");

        let response = self
            .http
            .post(url)
            .json(hierarchy)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::StoreFailure(describe(&e)))?;

        let status = response.status().as_u16();
        tracing::debug!(%url, status, "store acknowledged");
        Ok(StoreAck { status })
    }

    async fn fetch(&self, root_id: i64) -> Result<Value> {
        let url = self.fetch_url(root_id);
        tracing::debug!(%url, "GET hierarchy");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::FetchFailure(describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::FetchFailure(describe(&e)))?;
        tracing::debug!(%url, status, bytes = body.len(), "fetch returned");

        serde_json::from_str(&body)
            .map_err(|e| Error::FetchFailure(format!("response body is not JSON: {}", e)))
    }
}

/// Human-readable cause for a transport error
fn describe(error: &reqwest::Error) -> String {
    if let Some(status) = error.status() {
        return format!("HTTP {}", status);
    }
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_decode() || error.is_body() {
        "malformed response"
    } else {
        "request failed"
    };
    match error.url() {
        Some(url) => format!("{} for {}: {}", kind, url, error),
        None => format!("{}: {}", kind, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_without_double_slashes() {
        let client = HierarchyClient::new("http://localhost:8080/", "/hierarchy/", None).unwrap();
        assert_eq!(client.store_url(), "http://localhost:8080/hierarchy");
        assert_eq!(client.fetch_url(42), "http://localhost:8080/hierarchy/42");
    }

    #[test]
    fn test_from_config_uses_service_settings() {
        let config = Config::parse(
            r#"
[service]
host = "store.internal"
port = 9000
endpoint = "trees"
"#,
        )
        .unwrap();
        let client = HierarchyClient::from_config(&config).unwrap();
        assert_eq!(client.fetch_url(-7), "http://store.internal:9000/trees/-7");
    }

    #[test]
    fn test_from_config_rejects_port_zero() {
        let config = Config::parse("[service]\nport = 0\n").unwrap();
        assert!(matches!(
            HierarchyClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_store_failure() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HierarchyClient::new(
            &format!("http://127.0.0.1:{}", port),
            "hierarchy",
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let err = client.store(&serde_json::json!({"id": 1})).await.unwrap_err();
        assert!(matches!(err, Error::StoreFailure(_)), "got {:?}", err);

        let err = client.fetch(1).await.unwrap_err();
        assert!(matches!(err, Error::FetchFailure(_)), "got {:?}", err);
    }
}
