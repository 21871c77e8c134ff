/* src/client/core/rust/src/surface.rs */

//! The view container: markup blocks interleaved with section placeholders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio::sync::mpsc;

use crate::descriptor::SectionDescriptor;
use crate::errors::DescriptorError;
use crate::fragment::{self, Piece};
use crate::sync::lock;

const DIVIDER: &str = r#"<hr class="gc-divider"/>"#;
const DIVIDER_HIDDEN: &str = r#"<hr class="gc-divider" hidden/>"#;

/// Stable handle to a placeholder. Never reused within one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

/// Marks left on a placeholder by its last successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRenderRecord {
  pub last_resolved_url: String,
  pub last_rendered_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
  pub descriptor: Result<SectionDescriptor, DescriptorError>,
  /// Source attribute text, re-emitted verbatim by `Surface::to_html`.
  pub attrs: String,
  pub content: String,
  pub hidden: bool,
  /// Owned by a page controller; generic hydration leaves it alone.
  pub managed: bool,
  pub revealed: bool,
  /// URL of a hydration currently in flight.
  pub pending: Option<String>,
  pub record: Option<SectionRenderRecord>,
}

impl Placeholder {
  fn from_tag(tag: fragment::SectionTag) -> Self {
    let descriptor = SectionDescriptor::from_attrs(tag.attr_pairs());
    Self {
      descriptor,
      attrs: tag.raw_attrs,
      content: tag.inner,
      hidden: false,
      managed: false,
      revealed: false,
      pending: None,
      record: None,
    }
  }

  /// Replace the inner markup; a new render must be revealed again.
  pub fn set_content(&mut self, html: impl Into<String>) {
    self.content = html.into();
    self.revealed = false;
  }

  /// Trigger entrance animations for the current content.
  pub fn reveal(&mut self) {
    if !self.revealed {
      self.content = reveal_classes(&self.content);
      self.revealed = true;
    }
  }

  fn divider(&self) -> bool {
    self.descriptor.as_ref().is_ok_and(|d| d.divider)
  }

  fn write_html(&self, out: &mut String) {
    let hr = if self.hidden { DIVIDER_HIDDEN } else { DIVIDER };
    if self.divider() {
      out.push_str(hr);
    }
    out.push_str("<section");
    out.push_str(&self.attrs);
    if self.hidden {
      out.push_str(" hidden");
    }
    out.push('>');
    out.push_str(&self.content);
    out.push_str("</section>");
    if self.divider() {
      out.push_str(hr);
    }
  }
}

/// Add `visible` after every `fade-in` class token. Only `class="..."`
/// attribute values are touched; escaped text and other attributes are
/// copied as-is.
fn reveal_classes(html: &str) -> String {
  const ATTR: &str = "class=\"";
  let mut out = String::with_capacity(html.len() + 32);
  let mut rest = html;
  while let Some(at) = rest.find(ATTR) {
    let value_start = at + ATTR.len();
    let is_attr = at > 0 && rest.as_bytes()[at - 1].is_ascii_whitespace();
    out.push_str(&rest[..value_start]);
    rest = &rest[value_start..];
    if !is_attr {
      continue;
    }
    let end = rest.find('"').unwrap_or(rest.len());
    let value = &rest[..end];
    let tokens: Vec<&str> = value.split_ascii_whitespace().collect();
    if tokens.contains(&"fade-in") {
      let mut revealed = Vec::with_capacity(tokens.len() + 1);
      for (i, token) in tokens.iter().enumerate() {
        revealed.push(*token);
        if *token == "fade-in" && tokens.get(i + 1) != Some(&"visible") {
          revealed.push("visible");
        }
      }
      out.push_str(&revealed.join(" "));
    } else {
      out.push_str(value);
    }
    rest = &rest[end..];
  }
  out.push_str(rest);
  out
}

/// Which placeholders an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
  All,
  Slots(Vec<SlotId>),
}

impl Scope {
  fn contains(&self, id: SlotId) -> bool {
    match self {
      Self::All => true,
      Self::Slots(ids) => ids.contains(&id),
    }
  }
}

#[derive(Debug)]
enum Block {
  Markup(String),
  Slot(SlotId),
}

/// Document state rendered by the router.
#[derive(Debug, Default)]
pub struct Surface {
  blocks: Vec<Block>,
  slots: HashMap<SlotId, Placeholder>,
  next_slot: u64,
  observers: Vec<mpsc::UnboundedSender<Vec<SlotId>>>,
  /// Visible location, hash form (`#/path?query`).
  pub location: String,
  pub title: String,
  /// ARIA busy flag of the view container.
  pub busy: bool,
  pub scroll_top: u32,
  /// Route stylesheets currently attached to the document.
  pub styles: Vec<String>,
}

impl Surface {
  pub fn new() -> Self {
    Self::default()
  }

  fn build(&mut self, html: &str) -> (Vec<Block>, Vec<SlotId>) {
    let mut blocks = Vec::new();
    let mut inserted = Vec::new();
    for piece in fragment::parse(html) {
      match piece {
        Piece::Markup(m) => blocks.push(Block::Markup(m)),
        Piece::Section(tag) => {
          self.next_slot += 1;
          let id = SlotId(self.next_slot);
          self.slots.insert(id, Placeholder::from_tag(tag));
          blocks.push(Block::Slot(id));
          inserted.push(id);
        }
      }
    }
    (blocks, inserted)
  }

  /// Replace the whole content. Observers are not notified.
  pub fn mount(&mut self, html: &str) -> Vec<SlotId> {
    self.slots.clear();
    let (blocks, inserted) = self.build(html);
    self.blocks = blocks;
    inserted
  }

  /// Replace the content with a status message (loading, error).
  pub fn set_message(&mut self, html: &str) {
    self.slots.clear();
    self.blocks = vec![Block::Markup(html.to_string())];
  }

  /// Append content and notify observers of any placeholders it carries.
  pub fn inject(&mut self, html: &str) -> Vec<SlotId> {
    let (blocks, inserted) = self.build(html);
    self.blocks.extend(blocks);
    if !inserted.is_empty() {
      self.observers.retain(|tx| tx.send(inserted.clone()).is_ok());
    }
    inserted
  }

  pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Vec<SlotId>> {
    let (tx, rx) = mpsc::unbounded_channel();
    self.observers.push(tx);
    rx
  }

  pub fn placeholder(&self, id: SlotId) -> Option<&Placeholder> {
    self.slots.get(&id)
  }

  pub fn placeholder_mut(&mut self, id: SlotId) -> Option<&mut Placeholder> {
    self.slots.get_mut(&id)
  }

  /// Placeholders in `scope`, in document order.
  pub fn slots(&self, scope: &Scope) -> Vec<SlotId> {
    self
      .blocks
      .iter()
      .filter_map(|b| match b {
        Block::Slot(id) if scope.contains(*id) => Some(*id),
        _ => None,
      })
      .collect()
  }

  /// Forget render records so the next hydration pass fetches again.
  pub fn reset_hydration(&mut self, scope: &Scope) {
    for id in self.slots(scope) {
      if let Some(p) = self.slots.get_mut(&id) {
        p.record = None;
      }
    }
  }

  pub fn attach_style(&mut self, href: &str) {
    if !self.styles.iter().any(|s| s == href) {
      self.styles.push(href.to_string());
    }
  }

  pub fn detach_styles(&mut self, hrefs: &[String]) {
    self.styles.retain(|s| !hrefs.contains(s));
  }

  pub fn to_html(&self) -> String {
    let mut out = String::new();
    for block in &self.blocks {
      match block {
        Block::Markup(m) => out.push_str(m),
        Block::Slot(id) => {
          if let Some(p) = self.slots.get(id) {
            p.write_html(&mut out);
          }
        }
      }
    }
    out
  }
}

/// A `Surface` shared between the router, the hydrator and controllers.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface(Arc<Mutex<Surface>>);

impl SharedSurface {
  pub fn new(surface: Surface) -> Self {
    Self(Arc::new(Mutex::new(surface)))
  }

  /// Run `f` with exclusive access. Never call across an `.await`.
  pub fn with<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> R {
    f(&mut *lock(&self.0))
  }

  pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<SlotId>> {
    self.with(Surface::subscribe)
  }

  pub fn to_html(&self) -> String {
    self.with(|s| s.to_html())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const PAGE: &str = concat!(
    "<h1>Ofertas</h1>",
    r#"<section data-api="https://a.test/x.php" data-label="Top"></section>"#,
    r#"<section data-main="suplementos"></section>"#,
  );

  #[test]
  fn mount_creates_placeholders() {
    let mut s = Surface::new();
    let ids = s.mount(PAGE);
    assert_eq!(ids.len(), 1);
    let p = s.placeholder(ids[0]).unwrap();
    assert_eq!(p.descriptor.as_ref().unwrap().label.as_deref(), Some("Top"));
    assert_eq!(s.to_html(), PAGE);
  }

  #[test]
  fn remount_drops_old_slots_and_never_reuses_ids() {
    let mut s = Surface::new();
    let first = s.mount(PAGE);
    let second = s.mount(PAGE);
    assert_ne!(first, second);
    assert!(s.placeholder(first[0]).is_none());
    assert_eq!(s.slots(&Scope::All), second);
  }

  #[test]
  fn invalid_descriptor_is_kept_on_the_placeholder() {
    let mut s = Surface::new();
    let ids = s.mount(r#"<section data-api=" "></section>"#);
    assert_eq!(s.placeholder(ids[0]).unwrap().descriptor, Err(DescriptorError::MissingEndpoint));
  }

  #[test]
  fn inject_notifies_observers_mount_does_not() {
    let mut s = Surface::new();
    let mut rx = s.subscribe();
    s.mount(PAGE);
    assert!(rx.try_recv().is_err());
    s.inject("<p>no sections</p>");
    assert!(rx.try_recv().is_err());
    let ids = s.inject(PAGE);
    assert_eq!(rx.try_recv().unwrap(), ids);
    assert!(s.to_html().starts_with(PAGE));
  }

  #[test]
  fn dropped_observers_are_pruned() {
    let mut s = Surface::new();
    drop(s.subscribe());
    s.inject(PAGE);
    assert!(s.observers.is_empty());
  }

  #[test]
  fn hidden_and_divider_rendering() {
    let mut s = Surface::new();
    let ids = s.mount(r#"<section data-api="a" data-divider="1"></section>"#);
    assert_eq!(
      s.to_html(),
      r#"<hr class="gc-divider"/><section data-api="a" data-divider="1"></section><hr class="gc-divider"/>"#
    );
    s.placeholder_mut(ids[0]).unwrap().hidden = true;
    assert_eq!(
      s.to_html(),
      r#"<hr class="gc-divider" hidden/><section data-api="a" data-divider="1" hidden></section><hr class="gc-divider" hidden/>"#
    );
  }

  #[test]
  fn reveal_marks_fade_ins_once() {
    let mut s = Surface::new();
    let ids = s.mount(r#"<section data-api="a"></section>"#);
    let p = s.placeholder_mut(ids[0]).unwrap();
    p.set_content(r#"<div class="card fade-in"></div>"#);
    p.reveal();
    p.reveal();
    assert_eq!(p.content, r#"<div class="card fade-in visible"></div>"#);
  }

  #[test]
  fn reveal_only_touches_class_attributes() {
    let html = concat!(
      r#"<div class="product-cell fade-in"><a href="https://ml.test/fade-in-spray" data-class="fade-in">"#,
      r#"<img alt="fade-in"/><h3 class="product-title">Spray fade-in</h3>"#,
      r#"<span>class=&quot;fade-in&quot;</span></a></div>"#,
    );
    assert_eq!(
      reveal_classes(html),
      concat!(
        r#"<div class="product-cell fade-in visible"><a href="https://ml.test/fade-in-spray" data-class="fade-in">"#,
        r#"<img alt="fade-in"/><h3 class="product-title">Spray fade-in</h3>"#,
        r#"<span>class=&quot;fade-in&quot;</span></a></div>"#,
      )
    );
  }

  #[test]
  fn reveal_keeps_token_order_and_is_idempotent() {
    let html = r#"<h2 class="section-title fade-in mb-0">x</h2>"#;
    let once = reveal_classes(html);
    assert_eq!(once, r#"<h2 class="section-title fade-in visible mb-0">x</h2>"#);
    assert_eq!(reveal_classes(&once), once);
  }

  #[test]
  fn reset_hydration_respects_scope() {
    let mut s = Surface::new();
    let ids = s.mount(r#"<section data-api="a"></section><section data-api="b"></section>"#);
    for id in &ids {
      s.placeholder_mut(*id).unwrap().record =
        Some(SectionRenderRecord {
          last_resolved_url: "u".into(),
          last_rendered_at: SystemTime::now(),
        });
    }
    s.reset_hydration(&Scope::Slots(vec![ids[1]]));
    assert!(s.placeholder(ids[0]).unwrap().record.is_some());
    assert!(s.placeholder(ids[1]).unwrap().record.is_none());
  }

  #[test]
  fn styles_attach_once_and_detach() {
    let mut s = Surface::new();
    s.attach_style("/pages/a.css");
    s.attach_style("/pages/a.css");
    s.attach_style("/pages/b.css");
    s.detach_styles(&["/pages/a.css".to_string()]);
    assert_eq!(s.styles, vec!["/pages/b.css".to_string()]);
  }

  #[test]
  fn message_replaces_content() {
    let mut s = Surface::new();
    s.mount(PAGE);
    s.set_message("<p>Carregando</p>");
    assert_eq!(s.to_html(), "<p>Carregando</p>");
    assert!(s.slots(&Scope::All).is_empty());
  }
}
