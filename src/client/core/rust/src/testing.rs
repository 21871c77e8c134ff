/* src/client/core/rust/src/testing.rs */

//! Scripted `Fetch` double shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::errors::FetchError;
use crate::fetch::{BoxFuture, Fetch, FetchResponse, or_cancel};
use crate::sync::lock;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
  Json(u16, Value),
  Text(u16, String),
  Fail(String),
}

/// Holds matching requests until released.
#[derive(Debug, Clone)]
pub(crate) struct Gate(Arc<watch::Sender<bool>>);

impl Gate {
  pub fn release(&self) {
    self.0.send_replace(true);
  }
}

/// Replies are chosen by the longest matching URL prefix. Replies are not
/// raced against cancellation unless `racing_cancel` is set, so late results
/// reach the caller and must be discarded by its guards.
#[derive(Default)]
pub(crate) struct StubFetcher {
  replies: Mutex<Vec<(String, Reply)>>,
  gates: Mutex<Vec<(String, watch::Receiver<bool>)>>,
  calls: Mutex<Vec<String>>,
  race_cancel: bool,
}

fn longest<'a, T>(entries: &'a [(String, T)], url: &str) -> Option<&'a T> {
  entries
    .iter()
    .filter(|(p, _)| url.starts_with(p.as_str()))
    .max_by_key(|(p, _)| p.len())
    .map(|(_, t)| t)
}

impl StubFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn racing_cancel(mut self) -> Self {
    self.race_cancel = true;
    self
  }

  pub fn json(self, prefix: &str, body: Value) -> Self {
    self.reply(prefix, Reply::Json(200, body));
    self
  }

  pub fn reply(&self, prefix: &str, reply: Reply) {
    let mut replies = lock(&self.replies);
    replies.retain(|(p, _)| p != prefix);
    replies.push((prefix.to_string(), reply));
  }

  pub fn gate(&self, prefix: &str) -> Gate {
    let (tx, rx) = watch::channel(false);
    lock(&self.gates).push((prefix.to_string(), rx));
    Gate(Arc::new(tx))
  }

  pub fn calls(&self) -> Vec<String> {
    lock(&self.calls).clone()
  }

  pub fn calls_to(&self, prefix: &str) -> usize {
    lock(&self.calls).iter().filter(|u| u.starts_with(prefix)).count()
  }

  /// Wait until a request matching `prefix` has been issued.
  pub async fn requested(&self, prefix: &str) {
    while self.calls_to(prefix) == 0 {
      tokio::time::sleep(Duration::from_millis(1)).await;
    }
  }
}

impl Fetch for StubFetcher {
  fn get(
    &self,
    url: &str,
    cancel: CancellationToken,
  ) -> BoxFuture<Result<FetchResponse, FetchError>> {
    lock(&self.calls).push(url.to_string());
    let reply = longest(lock(&self.replies).as_slice(), url).cloned();
    let gate = longest(lock(&self.gates).as_slice(), url).cloned();
    let race = self.race_cancel;
    let url = url.to_string();
    Box::pin(async move {
      let respond = async move {
        if let Some(mut rx) = gate {
          let _ = rx.wait_for(|open| *open).await;
        }
        match reply {
          Some(Reply::Json(status, body)) => Ok(FetchResponse::new(status, body.to_string())),
          Some(Reply::Text(status, body)) => Ok(FetchResponse::new(status, body)),
          Some(Reply::Fail(reason)) => Err(FetchError::Transport { url, reason }),
          None => Err(FetchError::Transport { url, reason: "no stub reply".into() }),
        }
      };
      if race { or_cancel(respond, &cancel).await.and_then(|r| r) } else { respond.await }
    })
  }
}
