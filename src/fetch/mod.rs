mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, anyhow};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, Request, Url};

/// Longest error body quoted back in an error message.
const MAX_ERROR_BODY: usize = 200;

/// GETs `url` as JSON and returns the raw body, failing on non-2xx statuses.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &Url) -> Result<Vec<u8>> {
    let mut req = Request::new(Method::GET, url.clone());
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let resp = client.execute(req).await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(anyhow!("GET {} returned status {}: {}", url, status, body));
    }

    Ok(resp.bytes().await?.to_vec())
}
