/* src/cli/core/src/render.rs */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::debug;
use vitrine_client::{Hydrator, NavigationOutcome, Router, SharedSurface, Surface};
use vitrine_fetch_reqwest::HttpFetcher;

use crate::config::VitrineConfig;

#[derive(Debug)]
pub struct Rendered {
  pub path: String,
  pub title: String,
  pub html: String,
}

/// Navigate a headless router to `target` (or the default route) and
/// return the view once every section has settled.
pub async fn render(
  config: &VitrineConfig,
  target: Option<&str>,
  timeout: Duration,
) -> Result<Rendered> {
  let fetcher = HttpFetcher::new(Some(timeout)).context("failed to build HTTP client")?;
  let surface = SharedSurface::new(Surface::new());
  let hydrator = Arc::new(Hydrator::new(surface, Arc::new(fetcher), config.endpoints()?));
  let router = Router::new(config.route_table()?, config.router_config()?, hydrator)?;

  let outcome = match target {
    Some(path) => router.go(path).await,
    None => router.start().await,
  };
  debug!(?outcome, "navigation settled");

  let rendered = match outcome {
    NavigationOutcome::Mounted { path } | NavigationOutcome::Updated { path } => {
      let (title, html) = router.surface().with(|s| (s.title.clone(), s.to_html()));
      Rendered { path, title, html }
    }
    NavigationOutcome::Failed { path, error } => bail!("failed to render {path}: {error}"),
    NavigationOutcome::Cancelled => bail!("navigation was cancelled"),
  };
  router.stop();
  Ok(rendered)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::config::parse_vitrine_config;

  async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
  }

  #[tokio::test]
  async fn renders_shell_with_failed_sections_inline() {
    let port = closed_port().await;
    let config = parse_vitrine_config(&format!(
      r#"
[app]
title = "Vitrine"
base_url = "http://127.0.0.1:{port}/"

[[routes]]
path = "/inicio"
title = "Início"

[[routes.sections]]
api = "api/listar-mais-vendidos.php"
label = "Mais vendidos"
"#
    ))
    .unwrap();

    let rendered = render(&config, None, Duration::from_secs(2)).await.unwrap();
    assert_eq!(rendered.path, "/inicio");
    assert_eq!(rendered.title, "Início | Vitrine");
    assert!(rendered.html.contains("Erro ao carregar seção"), "{}", rendered.html);
  }

  #[tokio::test]
  async fn unreachable_fragment_is_an_error() {
    let port = closed_port().await;
    let config = parse_vitrine_config(&format!(
      r#"
[app]
base_url = "http://127.0.0.1:{port}/"

[[routes]]
path = "/inicio"
title = "Início"
html = "pages/inicio.html"
"#
    ))
    .unwrap();

    let err = render(&config, Some("/inicio"), Duration::from_secs(2)).await.unwrap_err();
    assert!(err.to_string().starts_with("failed to render /inicio"), "{err}");
  }
}
