/* src/client/core/rust/src/router/shell.rs */

//! Markup the router writes itself: declarative route shells and status
//! messages.

use vitrine_card::escape_html;

use crate::route::{RouteDescriptor, RouteTable};

const BACK_TEXT: &str = "Voltar";

pub(crate) fn loading(title: &str) -> String {
  format!(r#"<div style="padding:16px;color:#aaa;">Carregando {}...</div>"#, escape_html(title))
}

pub(crate) fn load_error() -> String {
  concat!(
    r#"<div style="padding:16px;"><h2>Erro ao carregar</h2>"#,
    "<p>Não foi possível abrir esta página.</p></div>",
  )
  .to_string()
}

fn breadcrumb(table: &RouteTable, path: &str) -> String {
  let trail = table.trail(path);
  let Some((current, ancestors)) = trail.split_last() else {
    return String::new();
  };
  let mut parts: Vec<String> = ancestors
    .iter()
    .map(|r| {
      format!(
        r##"<a class="vd-bc-link" href="#{}" data-link="1">{}</a>"##,
        escape_html(&r.path),
        escape_html(&r.title)
      )
    })
    .collect();
  parts.push(format!(r#"<span class="vd-bc-current">{}</span>"#, escape_html(&current.title)));
  format!(
    r#"<nav class="vd-breadcrumb" aria-label="breadcrumb">{}</nav>"#,
    parts.join(r#"<span class="vd-bc-sep">/</span>"#)
  )
}

/// Back link: explicit header link, then the parent route, else none.
fn back_href(route: &RouteDescriptor) -> Option<String> {
  let explicit = route.header.as_ref().and_then(|h| h.link.as_deref()).map(str::trim);
  match explicit.filter(|l| !l.is_empty()) {
    Some(link) => Some(link.to_string()),
    None => route.parent.as_ref().map(|p| format!("#{p}")),
  }
}

fn header(table: &RouteTable, route: &RouteDescriptor) -> String {
  let back_text = route.header.as_ref().and_then(|h| h.button_text.as_deref()).unwrap_or(BACK_TEXT);
  let back = back_href(route)
    .map(|href| {
      format!(
        r#"<a href="{}" data-link="1" class="btn btn-outline-warning btn-sm vd-route-btn">{}</a>"#,
        escape_html(&href),
        escape_html(back_text)
      )
    })
    .unwrap_or_default();
  let crumbs = breadcrumb(table, &route.path);

  if route.is_parent() {
    let title =
      route.header.as_ref().and_then(|h| h.title.as_deref()).unwrap_or(route.title.as_str());
    format!(
      concat!(
        r#"<header class="vd-route-head"><div class="vd-route-meta">{crumbs}"#,
        r#"<h1 class="vd-route-title">{title}</h1></div>"#,
        r#"<div class="vd-route-actions">{back}</div></header>"#,
      ),
      crumbs = crumbs,
      title = escape_html(title),
      back = back,
    )
  } else {
    format!(
      concat!(
        r#"<header class="vd-route-head vd-route-head--compact">"#,
        r#"<div class="vd-route-meta">{crumbs}</div>"#,
        r#"<div class="vd-route-actions">{back}</div></header>"#,
      ),
      crumbs = crumbs,
      back = back,
    )
  }
}

/// Shell for a route without a server fragment: header plus one empty
/// placeholder per section. Parent routes group their sections.
pub(crate) fn render(table: &RouteTable, route: &RouteDescriptor) -> String {
  let sections: String =
    route.sections.iter().map(|s| format!("<section{}></section>", s.to_attrs())).collect();
  let top = header(table, route);
  if route.is_parent() {
    format!(
      concat!(
        r#"{top}<div class="vd-group"><div class="vd-group__bar" aria-hidden="true"></div>"#,
        r#"<div class="vd-group__content">{sections}</div></div>"#,
      ),
      top = top,
      sections = sections,
    )
  } else {
    format!("{top}{sections}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::descriptor::SectionDescriptor;
  use crate::route::RouteHeader;
  use pretty_assertions::assert_eq;

  fn table() -> RouteTable {
    let inicio = RouteDescriptor::new("/inicio", "Início");
    let mut sup = RouteDescriptor::new("/suplementos", "Suplementos");
    sup.parent = Some("/inicio".into());
    sup.children = vec!["/whey".into()];
    sup.header = Some(RouteHeader { title: Some("SUPLEMENTOS".into()), ..Default::default() });
    sup.sections = vec![SectionDescriptor {
      api: Some("https://vitrine.test/p.php".into()),
      main: Some("suplementos".into()),
      divider: true,
      ..Default::default()
    }];
    let mut whey = RouteDescriptor::new("/whey", "Whey");
    whey.parent = Some("/suplementos".into());
    RouteTable::new(vec![inicio, sup, whey], []).unwrap()
  }

  #[test]
  fn child_route_gets_compact_header() {
    let table = table();
    let html = render(&table, table.get("/whey").unwrap());
    assert_eq!(
      html,
      concat!(
        r#"<header class="vd-route-head vd-route-head--compact"><div class="vd-route-meta">"#,
        r#"<nav class="vd-breadcrumb" aria-label="breadcrumb">"#,
        r##"<a class="vd-bc-link" href="#/inicio" data-link="1">Início</a><span class="vd-bc-sep">/</span>"##,
        r##"<a class="vd-bc-link" href="#/suplementos" data-link="1">Suplementos</a><span class="vd-bc-sep">/</span>"##,
        r#"<span class="vd-bc-current">Whey</span></nav></div>"#,
        r##"<div class="vd-route-actions"><a href="#/suplementos" data-link="1" class="btn btn-outline-warning btn-sm vd-route-btn">Voltar</a></div></header>"##,
      )
    );
  }

  #[test]
  fn parent_route_gets_title_and_group() {
    let table = table();
    let html = render(&table, table.get("/suplementos").unwrap());
    assert!(html.contains(r#"<h1 class="vd-route-title">SUPLEMENTOS</h1>"#));
    assert!(html.contains(r#"<div class="vd-group__content"><section data-api="https://vitrine.test/p.php" data-limit="10" data-main="suplementos" data-divider="1"></section></div>"#));
  }

  #[test]
  fn root_route_has_no_back_button() {
    let table = table();
    let html = render(&table, table.get("/inicio").unwrap());
    assert!(html.contains(r#"<div class="vd-route-actions"></div>"#));
    assert!(html.contains(r#"<span class="vd-bc-current">Início</span>"#));
  }

  #[test]
  fn explicit_back_link_wins() {
    let mut route = RouteDescriptor::new("/x", "X");
    route.parent = Some("/inicio".into());
    route.header = Some(RouteHeader { link: Some("#/busca".into()), ..Default::default() });
    assert_eq!(back_href(&route).as_deref(), Some("#/busca"));
    route.header = None;
    assert_eq!(back_href(&route).as_deref(), Some("#/inicio"));
  }

  #[test]
  fn status_messages() {
    assert_eq!(
      loading("Início"),
      r#"<div style="padding:16px;color:#aaa;">Carregando Início...</div>"#
    );
    assert!(load_error().contains("Não foi possível abrir esta página."));
  }
}
