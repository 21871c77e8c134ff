/* src/client/adapter/reqwest/tests/http.rs */

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use url::Url;
use vitrine_client::{
  CommitGuard, Endpoints, Fetch, FetchError, HydrateOutcome, Hydrator, SharedSurface, Surface,
};
use vitrine_fetch_reqwest::HttpFetcher;

async fn produtos(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
  let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
  let items: Vec<Value> =
    (0..limit * 2).map(|i| json!({ "title": format!("Produto {i}"), "price": 10.0 })).collect();
  Json(json!({ "ok": true, "items": items }))
}

async fn cache_header(headers: HeaderMap) -> String {
  headers.get("cache-control").and_then(|v| v.to_str().ok()).unwrap_or("").to_string()
}

async fn spawn_server() -> SocketAddr {
  let app = Router::new()
    .route("/api/listar-produtos.php", get(produtos))
    .route("/api/recusa.php", get(|| async {
      let body = json!({ "ok": false, "message": "Categoria inválida." });
      (StatusCode::UNPROCESSABLE_ENTITY, Json(body))
    }))
    .route("/pages/inicio.html", get(|| async { "<h1>Início</h1>" }))
    .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
    .route("/headers", get(cache_header))
    .route("/slow", get(|| async {
      tokio::time::sleep(Duration::from_secs(30)).await;
      "late"
    }));
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  addr
}

fn fetcher() -> HttpFetcher {
  HttpFetcher::new(Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn returns_status_and_body() {
  let addr = spawn_server().await;
  let url = format!("http://{addr}/pages/inicio.html");
  let res = fetcher().get(&url, CancellationToken::new()).await.unwrap();
  assert_eq!(res.status, 200);
  assert_eq!(res.body, "<h1>Início</h1>");
}

#[tokio::test]
async fn non_success_status_is_a_response() {
  let addr = spawn_server().await;
  let url = format!("http://{addr}/missing");
  let res = fetcher().get(&url, CancellationToken::new()).await.unwrap();
  assert_eq!(res.status, 404);
  assert!(!res.is_success());
  assert_eq!(res.body, "nope");
}

#[tokio::test]
async fn sends_no_store() {
  let addr = spawn_server().await;
  let url = format!("http://{addr}/headers");
  let res = fetcher().get(&url, CancellationToken::new()).await.unwrap();
  assert_eq!(res.body, "no-store");
}

#[tokio::test]
async fn cancellation_aborts_pending_request() {
  let addr = spawn_server().await;
  let token = CancellationToken::new();
  let trigger = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(50)).await;
    trigger.cancel();
  });
  let started = std::time::Instant::now();
  let res = fetcher().get(&format!("http://{addr}/slow"), token).await;
  assert_eq!(res, Err(FetchError::Cancelled));
  assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  let res = fetcher().get(&format!("http://{addr}/"), CancellationToken::new()).await;
  assert!(matches!(res, Err(FetchError::Transport { .. })), "{res:?}");
}

#[tokio::test]
async fn timeout_is_transport_error() {
  let addr = spawn_server().await;
  let fetcher = HttpFetcher::new(Some(Duration::from_millis(50))).unwrap();
  let res = fetcher.get(&format!("http://{addr}/slow"), CancellationToken::new()).await;
  match res {
    Err(FetchError::Transport { reason, .. }) => assert_eq!(reason, "request timed out"),
    other => panic!("expected transport error, got {other:?}"),
  }
}

#[tokio::test]
async fn hydrates_sections_over_http() {
  let addr = spawn_server().await;
  let base = Url::parse(&format!("http://{addr}/")).unwrap();
  let endpoints = Endpoints {
    products_api: Some(format!("http://{addr}/api/listar-produtos.php")),
    base_url: Some(base),
    ..Default::default()
  };
  let hydrator =
    Hydrator::new(SharedSurface::new(Surface::new()), Arc::new(fetcher()), endpoints);
  let ids = hydrator.surface().with(|s| {
    s.mount(concat!(
      r#"<section data-main="Saúde" data-sub="Whey" data-limit="3"></section>"#,
      r#"<section data-api="api/recusa.php"></section>"#,
    ))
  });

  let report = hydrator.hydrate_all(&vitrine_client::Scope::All, &CommitGuard::detached()).await;
  match report.get(ids[0]) {
    Some(HydrateOutcome::Rendered { cards, url }) => {
      assert_eq!(*cards, 3);
      assert!(url.contains("limit=3"), "{url}");
    }
    other => panic!("expected rendered, got {other:?}"),
  }
  let declined = hydrator.surface().with(|s| s.placeholder(ids[1]).map(|p| p.content.clone()));
  assert!(declined.unwrap().contains("Categoria inválida."));
}
