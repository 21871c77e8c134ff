/* src/client/core/rust/src/fetch.rs */

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::FetchError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Raw HTTP response: status plus the undecoded body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
  pub status: u16,
  pub body: String,
}

impl FetchResponse {
  pub fn new(status: u16, body: impl Into<String>) -> Self {
    Self { status, body: body.into() }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// GET transport used for both page fragments and section data.
///
/// Implementations must resolve to `FetchError::Cancelled` once `cancel` fires
/// instead of waiting for the network.
pub trait Fetch: Send + Sync {
  fn get(&self, url: &str, cancel: CancellationToken)
  -> BoxFuture<Result<FetchResponse, FetchError>>;
}

/// Race `fut` against `token`, returning `FetchError::Cancelled` if the token fires first.
pub async fn or_cancel<F>(fut: F, token: &CancellationToken) -> Result<F::Output, FetchError>
where
  F: Future,
{
  tokio::select! {
    biased;
    _ = token.cancelled() => Err(FetchError::Cancelled),
    out = fut => Ok(out),
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[test]
  fn success_range() {
    assert!(FetchResponse::new(200, "").is_success());
    assert!(FetchResponse::new(204, "").is_success());
    assert!(!FetchResponse::new(304, "").is_success());
    assert!(!FetchResponse::new(422, "").is_success());
  }

  #[tokio::test]
  async fn or_cancel_completes_when_not_cancelled() {
    let token = CancellationToken::new();
    assert_eq!(or_cancel(async { 7 }, &token).await, Ok(7));
  }

  #[tokio::test]
  async fn or_cancel_returns_cancelled_first() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(5)).await;
      trigger.cancel();
    });
    let slow = async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      1
    };
    assert_eq!(or_cancel(slow, &token).await, Err(FetchError::Cancelled));
  }

  #[tokio::test]
  async fn or_cancel_prefers_cancellation_when_both_ready() {
    let token = CancellationToken::new();
    token.cancel();
    assert_eq!(or_cancel(async { 1 }, &token).await, Err(FetchError::Cancelled));
  }
}
