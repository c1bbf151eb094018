//! Thin reqwest wrapper used by the ESI client.
//!
//! Adds the datasource query parameter, a user agent and a request timeout,
//! and turns non-success statuses into [`GuessError::Upstream`].

use crate::config::{AppConfig, NetworkConfig};
use crate::{GuessError, Result};
use reqwest::{header::HeaderMap, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP client bound to one ESI base URL.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(AppConfig::USER_AGENT)
            .build()
            .map_err(|e| GuessError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an ESI path such as `/universe/regions/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and decode the JSON body, returning the response headers too.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, HeaderMap)> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("datasource", NetworkConfig::ESI_DATASOURCE)])
            .query(query)
            .send()
            .await?;

        let response = Self::check_status(response, &url)?;
        let headers = response.headers().clone();
        let body = response.json::<T>().await?;
        Ok((body, headers))
    }

    /// POST a JSON body to a path and decode the JSON answer.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("datasource", NetworkConfig::ESI_DATASOURCE)])
            .json(body)
            .send()
            .await?;

        let response = Self::check_status(response, &url)?;
        Ok(response.json::<T>().await?)
    }

    fn check_status(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(GuessError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

/// Read the page count ESI reports for paged collections.
pub fn page_count(headers: &HeaderMap) -> u32 {
    headers
        .get(NetworkConfig::PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = HttpClient::new("https://esi.evetech.net/latest/").unwrap();
        assert_eq!(
            client.url("/universe/regions/"),
            "https://esi.evetech.net/latest/universe/regions/"
        );
    }

    #[test]
    fn test_page_count() {
        let mut headers = HeaderMap::new();
        assert_eq!(page_count(&headers), 1);

        headers.insert("x-pages", HeaderValue::from_static("48"));
        assert_eq!(page_count(&headers), 48);

        headers.insert("x-pages", HeaderValue::from_static("many"));
        assert_eq!(page_count(&headers), 1);
    }
}
