use crate::fetch::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// Header name and value are validated once at construction, so every
/// request can carry them without re-parsing.
pub struct ApiKey<C> {
    pub inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())?;
        let mut value = HeaderValue::from_str(key)?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Convenience constructor that uses `Authorization: Bearer <key>`, the
    /// scheme OpenF1 uses for authenticated access.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the headers of the last request instead of sending it.
    struct Capture(Mutex<Option<reqwest::header::HeaderMap>>);

    #[async_trait]
    impl HttpClient for Capture {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            *self.0.lock().unwrap() = Some(req.headers().clone());
            Ok(reqwest::Response::from(
                axum::http::Response::builder().status(200).body("").unwrap(),
            ))
        }
    }

    #[tokio::test]
    async fn test_bearer_header_injected() {
        let client = ApiKey::bearer(Capture(Mutex::new(None)), "s3cret").unwrap();
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://api.openf1.org/v1/laps".parse().unwrap(),
        );

        client.execute(req).await.unwrap();

        let headers = client.inner.0.lock().unwrap().clone().unwrap();
        assert_eq!(headers["authorization"], "Bearer s3cret");
    }

    #[test]
    fn test_invalid_header_rejected() {
        assert!(ApiKey::new((), "bad header", "x").is_err());
        assert!(ApiKey::new((), "X-Key", "line\nbreak").is_err());
    }
}
