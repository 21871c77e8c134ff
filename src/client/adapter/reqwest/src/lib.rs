/* src/client/adapter/reqwest/src/lib.rs */

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vitrine_client::{BoxFuture, Fetch, FetchError, FetchResponse, or_cancel};

const USER_AGENT: &str = concat!("vitrine/", env!("CARGO_PKG_VERSION"));

/// `Fetch` over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  /// Client with an optional whole-request timeout.
  pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self { client: builder.build()? })
  }

  pub fn from_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

fn transport(url: &str, err: &reqwest::Error) -> FetchError {
  let reason = if err.is_timeout() { "request timed out".to_string() } else { err.to_string() };
  FetchError::Transport { url: url.to_string(), reason }
}

impl Fetch for HttpFetcher {
  fn get(
    &self,
    url: &str,
    cancel: CancellationToken,
  ) -> BoxFuture<Result<FetchResponse, FetchError>> {
    let client = self.client.clone();
    let url = url.to_string();
    Box::pin(async move {
      let request = async {
        let response = client
          .get(&url)
          .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
          .send()
          .await
          .map_err(|e| transport(&url, &e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport(&url, &e))?;
        debug!(%url, status, bytes = body.len(), "fetched");
        Ok(FetchResponse { status, body })
      };
      or_cancel(request, &cancel).await.and_then(|result| result)
    })
  }
}
