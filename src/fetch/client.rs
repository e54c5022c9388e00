use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request.
///
/// [`BasicClient`](super::BasicClient) does the actual I/O; the
/// [`auth`](super::auth) wrappers decorate requests before passing them on.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
