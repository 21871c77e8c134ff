/* src/client/core/rust/src/hydrator/render.rs */

use vitrine_card::escape_html;

pub(crate) const DEFAULT_SEE_ALL_TEXT: &str = "Mostrar todos";

pub(crate) fn loader(text: &str) -> String {
  format!(
    concat!(
      r#"<div class="section-loader"><div class="spinner" aria-hidden="true"></div>"#,
      r#"<div><div class="loader-text">{}</div></div></div>"#,
    ),
    escape_html(text)
  )
}

fn notice(color: &str, body: &str) -> String {
  format!(r#"<p style="padding:10px 0; color:{color};">{body}</p>"#)
}

pub(crate) fn invalid_section() -> String {
  notice(
    "#ff6b6b",
    concat!(
      "Section inválida: informe <code>data-api</code>, <code>data-type</code> ",
      "ou <code>data-main</code> + <code>data-sub</code>.",
    ),
  )
}

pub(crate) fn unknown_feed(key: &str) -> String {
  notice("#ff6b6b", &format!("Tipo \"{}\" não cadastrado.", escape_html(key)))
}

pub(crate) fn section_error(name: &str) -> String {
  notice("#ff6b6b", &format!("Erro ao carregar seção: {}", escape_html(name)))
}

pub(crate) fn missing_renderer(key: &str) -> String {
  notice("#ff6b6b", &format!("Erro: card component {} não carregou.", escape_html(key)))
}

pub(crate) fn declined(message: &str) -> String {
  notice("#aaa", &escape_html(message))
}

pub(crate) fn empty_grid() -> String {
  notice("#aaa", "Nenhum produto encontrado.")
}

/// "See all" button; internal targets carry the router's link marker.
pub(crate) fn see_all(href: &str, text: &str, internal: bool) -> String {
  let marker = if internal { r#" data-link="1""# } else { r#" target="_blank""# };
  format!(
    r#"<a href="{}"{marker} class="btn btn-warning ms-3" rel="noopener">{}</a>"#,
    escape_html(href),
    escape_html(text)
  )
}

pub(crate) fn is_internal_link(href: &str) -> bool {
  href.starts_with("#/") || href.starts_with('/')
}

pub(crate) fn section_body(title: &str, button: &str, cards: &str) -> String {
  format!(
    concat!(
      r#"<div class="vd-section-head">"#,
      r#"<h2 class="section-title text-center fade-in flex-grow-1 mb-0">{}{button}</h2></div>"#,
      r#"<div class="product-grid mt-3">{cards}</div>"#,
    ),
    escape_html(title),
    button = button,
    cards = cards,
  )
}
