use crate::network::errors::ProviderError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

// * Bodies shorter than this cannot hold a JSON completion payload.
const MIN_BODY_BYTES: usize = 2;

// * Maximum error-body excerpt carried into RequestFailed messages.
const ERROR_EXCERPT_CHARS: usize = 300;

const CLIENT_USER_AGENT: &str = concat!("pagecraft/", env!("CARGO_PKG_VERSION"));

// * JSON-over-HTTPS transport shared by every vendor provider.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    timeout: Duration,
}

impl HttpTransport {
    // * Builds a client with a bounded per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // * POSTs a JSON body and decodes the JSON response.
    // * Non-2xx -> RequestFailed; empty or non-JSON body -> InvalidResponse.
    pub async fn post_json<B, T>(
        &self,
        url: Url,
        headers: &[(&'static str, String)],
        body: &B,
    ) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let header_map = build_headers(headers)?;
        let resp = self
            .inner
            .post(url.clone())
            .headers(header_map)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url.host_str().unwrap_or("provider"),
                excerpt(&text)
            )));
        }

        if text.trim().len() < MIN_BODY_BYTES {
            return Err(ProviderError::InvalidResponse(format!(
                "empty response body ({} bytes)",
                text.len()
            )));
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            ProviderError::InvalidResponse(format!("{} (body: {})", e, excerpt(&text)))
        })
    }
}

// * Ensures the base URL ends with '/' so Url::join appends instead of replacing.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url, ProviderError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
}

fn build_headers(headers: &[(&'static str, String)]) -> Result<HeaderMap, ProviderError> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    map.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    for (name, value) in headers {
        let value = HeaderValue::from_str(value).map_err(|_| {
            ProviderError::RequestFailed(format!("invalid value for header '{}'", name))
        })?;
        map.insert(HeaderName::from_static(name), value);
    }
    Ok(map)
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= ERROR_EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(ERROR_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join_with_and_without_slash() {
        let a = endpoint("https://api.openai.com/v1", "chat/completions").unwrap();
        let b = endpoint("https://api.openai.com/v1/", "/chat/completions").unwrap();
        assert_eq!(a.as_str(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(a, b);
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint("not a url", "x"),
            Err(ProviderError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(1000);
        let out = excerpt(&long);
        assert_eq!(out.chars().count(), ERROR_EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_invalid_header_value() {
        let result = build_headers(&[("authorization", "bad\nvalue".to_string())]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_failed() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let url = endpoint("http://127.0.0.1:1", "chat/completions").unwrap();
        let result: Result<serde_json::Value, _> = transport
            .post_json(url, &[], &serde_json::json!({"ping": true}))
            .await;
        assert!(matches!(result, Err(ProviderError::RequestFailed(_))));
    }
}
