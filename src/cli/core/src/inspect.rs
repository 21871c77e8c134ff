/* src/cli/core/src/inspect.rs */

//! Text views of a validated route table for `check` and `routes`.

use vitrine_client::{RouteContent, RouteDescriptor, RouteTable};

use crate::config::VitrineConfig;

fn content_label(route: &RouteDescriptor) -> String {
  let mut label = match route.content() {
    RouteContent::Fragment(html) => format!("html {html}"),
    RouteContent::Sections(sections) => match sections.len() {
      1 => "1 section".to_string(),
      n => format!("{n} sections"),
    },
  };
  if let Some(controller) = &route.controller {
    label.push_str(&format!(", controller {controller}"));
  }
  if !route.css.is_empty() {
    label.push_str(&format!(", {} css", route.css.len()));
  }
  label
}

/// One line per fact `check` reports.
pub fn summary(config: &VitrineConfig, table: &RouteTable) -> Vec<String> {
  let fragments =
    table.routes().filter(|r| matches!(r.content(), RouteContent::Fragment(_))).count();
  let sections: usize = table
    .routes()
    .map(|r| match r.content() {
      RouteContent::Sections(s) => s.len(),
      RouteContent::Fragment(_) => 0,
    })
    .sum();
  let mut lines = vec![
    format!("{} routes ({fragments} fragment, {} shell)", table.len(), table.len() - fragments),
    format!("{sections} declared sections"),
    format!("{} aliases", table.aliases().count()),
    format!("default route {}", config.app.default_route),
  ];
  if let Some(nf) = &config.app.not_found_route {
    lines.push(format!("not-found route {nf}"));
  }
  if !config.feeds.is_empty() {
    let keys: Vec<&str> = config.feeds.keys().map(String::as_str).collect();
    lines.push(format!("feeds {}", keys.join(", ")));
  }
  lines
}

/// Indented route tree: roots in declaration order, then their children.
pub fn tree(table: &RouteTable) -> Vec<String> {
  fn walk(table: &RouteTable, route: &RouteDescriptor, depth: usize, out: &mut Vec<String>) {
    out.push(format!(
      "{}{}  {}  [{}]",
      "  ".repeat(depth),
      route.path,
      route.title,
      content_label(route)
    ));
    for child in table.children_of(&route.path) {
      walk(table, child, depth + 1, out);
    }
  }

  let mut out = Vec::new();
  for root in table.roots() {
    walk(table, root, 0, &mut out);
  }
  let aliases: Vec<String> = table.aliases().map(|(from, to)| format!("{from} -> {to}")).collect();
  if !aliases.is_empty() {
    out.push(String::new());
    out.extend(aliases);
  }
  out
}
