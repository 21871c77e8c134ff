/* src/cli/core/src/config/tests/parsing.rs */

use pretty_assertions::assert_eq;

use super::*;

const MINIMAL: &str = r#"
[[routes]]
path = "/inicio"
title = "Início"
"#;

#[test]
fn parse_minimal_config() {
  let config = parse_vitrine_config(MINIMAL).unwrap();
  assert_eq!(config.app.title, "Vitrine dos Links");
  assert_eq!(config.app.default_route, "/inicio");
  assert!(config.app.cache_html);
  assert!(config.app.not_found_route.is_none());
  assert!(config.aliases.is_empty());

  let router = config.router_config().unwrap();
  assert_eq!(router.app_title, "Vitrine dos Links");
  assert!(router.html_base.is_none());
}

#[test]
fn parse_full_config() {
  let config = parse_vitrine_config(
    r##"
[app]
title = "Vitrine"
default_route = "/home"
not_found_route = "/404"
cache_html = false
base_url = "https://vitrine.test/"
products_api = "https://vitrine.test/app/api/listar-produtos.php"
html_base = "https://cdn.vitrine.test/"

[aliases]
"/" = "/home"
"inicio" = "/home"

[[routes]]
path = "/home"
title = "Home"

[[routes.sections]]
api = "app/api/listar-mais-vendidos.php"
limit = 8
title = "Mais vendidos"
buttonText = "Ver todos"
link = "#/maisvendidos"

[[routes]]
path = "/404"
title = "Não encontrado"
"##,
  )
  .unwrap();

  assert_eq!(config.app.title, "Vitrine");
  assert!(!config.app.cache_html);
  let section = &config.routes[0].sections[0];
  assert_eq!(section.limit, 8);
  assert_eq!(section.label.as_deref(), Some("Mais vendidos"));
  assert_eq!(section.button_text.as_deref(), Some("Ver todos"));

  let endpoints = config.endpoints().unwrap();
  assert_eq!(endpoints.base_url.unwrap().as_str(), "https://vitrine.test/");
  let router = config.router_config().unwrap();
  assert_eq!(router.html_base.unwrap().as_str(), "https://cdn.vitrine.test/");
  assert_eq!(router.not_found_route.as_deref(), Some("/404"));

  let table = config.route_table().unwrap();
  assert_eq!(table.canonicalize("/inicio"), "/home");
  assert_eq!(table.canonicalize("/"), "/home");
}

#[test]
fn html_base_defaults_to_base_url() {
  let config = parse_vitrine_config(
    r#"
[app]
base_url = "https://vitrine.test/app/"

[[routes]]
path = "/inicio"
title = "Início"
"#,
  )
  .unwrap();
  let html_base = config.router_config().unwrap().html_base.unwrap();
  assert_eq!(html_base.as_str(), "https://vitrine.test/app/");
}

#[test]
fn rejects_empty_routes() {
  let err = parse_vitrine_config("[app]\ntitle = \"x\"\n").unwrap_err();
  assert!(format!("{err:#}").contains("no [[routes]] defined"));
}

#[test]
fn rejects_unknown_default_route() {
  let err = parse_vitrine_config(
    r#"
[app]
default_route = "/nada"

[[routes]]
path = "/inicio"
title = "Início"
"#,
  )
  .unwrap_err();
  assert!(format!("{err:#}").contains("app.default_route \"/nada\""), "{err:#}");
}

#[test]
fn rejects_unknown_not_found_route() {
  let err =
    parse_vitrine_config(&format!("[app]\nnot_found_route = \"/404\"\n{MINIMAL}")).unwrap_err();
  assert!(format!("{err:#}").contains("app.not_found_route"), "{err:#}");
}

#[test]
fn rejects_alias_cycle() {
  let err = parse_vitrine_config(&format!("[aliases]\n\"/a\" = \"/b\"\n\"/b\" = \"/a\"\n{MINIMAL}"))
    .unwrap_err();
  assert!(format!("{err:#}").starts_with("invalid route table"), "{err:#}");
}

#[test]
fn rejects_relative_base_url() {
  let err = parse_vitrine_config(&format!("[app]\nbase_url = \"app/\"\n{MINIMAL}")).unwrap_err();
  assert!(format!("{err:#}").contains("app.base_url is not an absolute URL"), "{err:#}");
}

#[test]
fn rejects_malformed_toml() {
  let err = parse_vitrine_config("[[routes]\npath =").unwrap_err();
  assert!(format!("{err:#}").starts_with("failed to parse config"), "{err:#}");
}

const FEEDS: &str = r#"
[app]
base_url = "https://vitrine.test/"

[feeds.mais-vendidos]
url = "app/api/listar-mais-vendidos.php"
title = "Mais vendidos"
loader = "Carregando mais vendidos..."

[feeds.frete-gratis]
url = "https://vitrine.test/app/api/listar-frete-gratis.php"

[[routes]]
path = "/inicio"
title = "Início"

[[routes.sections]]
type = "mais-vendidos"
limit = 12
"#;

#[test]
fn parse_feeds() {
  let config = parse_vitrine_config(FEEDS).unwrap();
  assert_eq!(config.routes[0].sections[0].feed.as_deref(), Some("mais-vendidos"));

  let endpoints = config.endpoints().unwrap();
  let feed = endpoints.feed("mais-vendidos").unwrap();
  assert_eq!(feed.title.as_deref(), Some("Mais vendidos"));
  assert_eq!(feed.loader.as_deref(), Some("Carregando mais vendidos..."));
  assert!(endpoints.feed("frete-gratis").unwrap().title.is_none());

  let url = config.routes[0].sections[0].resolve_url(&endpoints).unwrap();
  assert_eq!(url.as_str(), "https://vitrine.test/app/api/listar-mais-vendidos.php?limit=12");
}

#[test]
fn rejects_section_with_unregistered_feed() {
  let config = FEEDS.replace("type = \"mais-vendidos\"", "type = \"lancamentos\"");
  let err = parse_vitrine_config(&config).unwrap_err();
  assert!(format!("{err:#}").contains("feed \"lancamentos\""), "{err:#}");
}
