/* src/client/card/rust/src/card.rs */

use serde_json::Value;

use crate::escape::escape_html;
use crate::format::{discount, first_text, flag, installments, money, text};

/// Class carried by every product cell; also used to count rendered cards.
pub const CARD_CLASS: &str = "product-cell";

const BADGES: &[(&str, &str)] = &[
  ("badge_top_seller", "Top vendas"),
  ("badge_mercado_lider", "Mercado Líder"),
  ("badge_oficial", "Loja oficial"),
  ("badge_em_alta", "Em alta"),
];

/// Render one product record into a self-contained grid cell.
///
/// Every field is optional. Missing values render as empty text and every
/// interpolated value is HTML-escaped, so untrusted backend content cannot
/// inject markup.
pub fn render_card(item: &Value) -> String {
  let href = match first_text(item, &["affiliate_url", "product_url"]) {
    s if s.is_empty() => "#".to_string(),
    s => s,
  };
  let title = escape_html(&text(item.get("title")));
  let image = escape_html(&first_text(item, &["source_image_url", "local_image_path"]));
  let shipping = text(item.get("shipping_label"));
  let rating_avg = escape_html(&text(item.get("rating_avg")));
  let rating_count = escape_html(&text(item.get("rating_count")));
  let price_original = money(item.get("price_original"));
  let price_current = escape_html(&money(item.get("price_current")));
  let discount = discount(item.get("discount_percent"));
  let installments_max = installments(item.get("installments_max"));
  let installment_value = money(item.get("installment_value"));
  let marketplace = text(item.get("marketplace"));

  let badge_html = if shipping.is_empty() {
    String::new()
  } else {
    format!(r#"<span class="product-badge product-badge--frete">{}</span>"#, escape_html(&shipping))
  };

  let price_row = if price_original.is_empty() && discount.is_empty() {
    String::new()
  } else {
    format!(
      r#"<div class="price-row">{}{}</div>"#,
      format_args!(r#"<span class="price-old">{}</span>"#, escape_html(&price_original)),
      format_args!(r#"<span class="price-pill">{}</span>"#, escape_html(&discount)),
    )
  };

  let installments_html = if installments_max.is_empty() || installment_value.is_empty() {
    String::new()
  } else {
    format!(
      "ou <strong>{}</strong> de <strong>R$ {}</strong>",
      escape_html(&installments_max),
      escape_html(&installment_value),
    )
  };

  let seller_html = if marketplace.is_empty() {
    String::new()
  } else {
    format!(
      r#"<div class="product-seller">Vendido por: <strong>{}</strong></div>"#,
      escape_html(&marketplace)
    )
  };

  let tags: String = BADGES
    .iter()
    .filter(|(key, _)| flag(item.get(*key)))
    .map(|(_, label)| format!(r#"<span class="tag">{}</span>"#, escape_html(label)))
    .collect();
  let tags_html = if tags.is_empty() {
    String::new()
  } else {
    format!(r#"<div class="product-tags">{tags}</div>"#)
  };

  let mut out = String::with_capacity(1024);
  out.push_str(&format!(r#"<div class="{CARD_CLASS} fade-in">"#));
  out.push_str(&format!(
    r#"<a href="{}" target="_blank" rel="noopener" class="product-link" "#,
    escape_html(&href),
  ));
  out.push_str(&format!(r#"aria-label="Abrir produto: {title}">"#));
  out.push_str(r#"<div class="product-card">"#);
  out.push_str(&format!(r#"<div class="product-badges">{badge_html}</div>"#));
  out.push_str(r#"<div class="product-media">"#);
  out.push_str(&format!(
    r#"<img src="{image}" class="product-img" alt="{title}" loading="lazy" /></div>"#
  ));
  out.push_str(r#"<div class="product-body">"#);
  out.push_str(&format!(r#"<h3 class="product-title">{title}</h3>"#));
  out.push_str(r#"<div class="product-prices">"#);
  out.push_str(r#"<span class="rating-stars">★★★★☆</span>"#);
  out.push_str(&format!(
    r#"<span class="rating-text" data-count="{rating_count}">{rating_avg}</span>"#
  ));
  out.push_str(&price_row);
  out.push_str(&format!(r#"<div class="price-main">R$ {price_current}</div>"#));
  out.push_str(r#"<div class="price-meta">"#);
  out.push_str(&format!(
    r#"<div class="price-pix">À vista: <strong>R$ {price_current}</strong></div>"#
  ));
  out.push_str(&format!(r#"<div class="price-installments">{installments_html}</div></div>"#));
  out.push_str("</div>");
  out.push_str(&seller_html);
  out.push_str(&tags_html);
  out.push_str("</div></div></a></div>");
  out
}
