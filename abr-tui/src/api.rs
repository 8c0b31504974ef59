//! HTTP tab-order backend talking to abr-server

use std::time::Duration;

use abr_core::{AbrError, ReplaceOrderRequest, TabOrderBackend, TabOrderDocument, TabOrderKey};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

/// Error body returned by abr-server
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// `TabOrderBackend` over the preference service's JSON API
#[derive(Debug, Clone)]
pub struct HttpTabOrderBackend {
    client: Client,
    base_url: Url,
}

impl HttpTabOrderBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API URL cannot hold a path: {}", base_url);
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Resource URL with `user_id` and `page` percent-encoded as path segments
    fn url(&self, key: &TabOrderKey) -> abr_core::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AbrError::backend(format!("{} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["users", key.user_id.as_str(), "tab-orders", key.page.as_str()]);
        Ok(url)
    }
}

/// Turn a non-success response into a backend error
async fn error_from(response: Response) -> AbrError {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => AbrError::backend(format!("{}: {} ({})", status, body.message, body.error)),
        Err(_) => AbrError::backend(format!("{}: {}", status, text)),
    }
}

async fn document(response: Response) -> abr_core::Result<TabOrderDocument> {
    response
        .json::<TabOrderDocument>()
        .await
        .map_err(AbrError::payload)
}

#[async_trait]
impl TabOrderBackend for HttpTabOrderBackend {
    async fn fetch_order(&self, key: &TabOrderKey) -> abr_core::Result<Option<Vec<String>>> {
        let response = self
            .client
            .get(self.url(key)?)
            .send()
            .await
            .map_err(AbrError::backend)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(document(response).await?.order)),
            _ => Err(error_from(response).await),
        }
    }

    async fn replace_order(&self, key: &TabOrderKey, order: &[String]) -> abr_core::Result<Vec<String>> {
        let response = self
            .client
            .put(self.url(key)?)
            .json(&ReplaceOrderRequest {
                order: order.to_vec(),
            })
            .send()
            .await
            .map_err(AbrError::backend)?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(document(response).await?.order)
    }

    async fn clear_order(&self, key: &TabOrderKey) -> abr_core::Result<()> {
        let response = self
            .client
            .delete(self.url(key)?)
            .send()
            .await
            .map_err(AbrError::backend)?;

        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            _ => Err(error_from(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_resource_urls() {
        let backend = HttpTabOrderBackend::new("http://127.0.0.1:3030/").unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:3030");
        assert_eq!(
            backend.url(&TabOrderKey::new("user1", "work-orders")).unwrap().as_str(),
            "http://127.0.0.1:3030/users/user1/tab-orders/work-orders"
        );
    }

    #[test]
    fn reserved_characters_stay_inside_their_segment() {
        let backend = HttpTabOrderBackend::new("http://127.0.0.1:3030").unwrap();
        let url = backend.url(&TabOrderKey::new("ops#1?x", "a/b")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3030/users/ops%231%3Fx/tab-orders/a%2Fb"
        );
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn base_path_is_kept() {
        let backend = HttpTabOrderBackend::new("http://example.test/api/").unwrap();
        assert_eq!(
            backend.url(&TabOrderKey::new("user1", "tasks")).unwrap().as_str(),
            "http://example.test/api/users/user1/tab-orders/tasks"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(HttpTabOrderBackend::new("not a url").is_err());
        assert!(HttpTabOrderBackend::new("mailto:ops@abr.example").is_err());
    }

    #[tokio::test]
    async fn unreachable_server_is_backend_error() {
        // port 9 (discard) is closed on test machines
        let backend = HttpTabOrderBackend::new("http://127.0.0.1:9").unwrap();
        let err = backend
            .fetch_order(&TabOrderKey::new("user1", "tasks"))
            .await
            .unwrap_err();
        assert!(matches!(err, AbrError::Backend { .. }));
    }
}
