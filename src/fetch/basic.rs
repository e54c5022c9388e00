use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("laptrace/", env!("CARGO_PKG_VERSION"));

/// Plain reqwest client; telemetry pages can be several megabytes, hence the
/// generous overall timeout.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
