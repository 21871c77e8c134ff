/* src/client/core/rust/src/fragment.rs */

//! Single-pass scan of a page fragment for section placeholders.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
  Markup(String),
  Section(SectionTag),
}

/// A `<section>` element recognised as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionTag {
  /// Decoded attributes, names lower-cased, in source order.
  pub attrs: Vec<(String, String)>,
  /// Attribute text exactly as written, leading whitespace included.
  pub raw_attrs: String,
  pub inner: String,
}

impl SectionTag {
  fn is_placeholder(&self) -> bool {
    let has = |name: &str| self.attrs.iter().any(|(n, _)| n == name);
    has("data-api") || has("data-type") || (has("data-main") && has("data-sub"))
  }

  pub fn attr_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
  }
}

/// Split `html` into verbatim markup and placeholder sections.
pub(crate) fn parse(html: &str) -> Vec<Piece> {
  let bytes = html.as_bytes();
  let mut pieces = Vec::new();
  let mut pos = 0;
  let mut markup_start = 0;

  while let Some(open) = find_open(bytes, pos) {
    let attrs_start = open + "<section".len();
    let (attrs_end, tag_end) = scan_tag_end(bytes, attrs_start);
    let raw_attrs = &html[attrs_start..attrs_end];
    let mut tag = SectionTag {
      attrs: parse_attrs(raw_attrs),
      raw_attrs: raw_attrs.to_string(),
      inner: String::new(),
    };
    if !tag.is_placeholder() {
      pos = tag_end;
      continue;
    }

    let (inner_end, close_end) = find_close(bytes, tag_end);
    tag.inner = html[tag_end..inner_end].to_string();
    if markup_start < open {
      pieces.push(Piece::Markup(html[markup_start..open].to_string()));
    }
    pieces.push(Piece::Section(tag));
    pos = close_end;
    markup_start = close_end;
  }

  if markup_start < html.len() {
    pieces.push(Piece::Markup(html[markup_start..].to_string()));
  }
  pieces
}

fn starts_with_ci(bytes: &[u8], at: usize, pat: &[u8]) -> bool {
  bytes.get(at..at + pat.len()).is_some_and(|s| s.eq_ignore_ascii_case(pat))
}

fn name_ends_at(bytes: &[u8], at: usize) -> bool {
  bytes.get(at).is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
}

/// Position just past a `<!-- ... -->` comment starting at `at`; an
/// unterminated comment runs to the end of input.
fn skip_comment(bytes: &[u8], at: usize) -> Option<usize> {
  if !bytes[at..].starts_with(b"<!--") {
    return None;
  }
  let body = at + 4;
  let end = bytes[body..].windows(3).position(|w| w == b"-->");
  Some(end.map_or(bytes.len(), |i| body + i + 3))
}

fn find_open(bytes: &[u8], from: usize) -> Option<usize> {
  let mut pos = from;
  while pos < bytes.len() {
    if let Some(end) = skip_comment(bytes, pos) {
      pos = end;
      continue;
    }
    if starts_with_ci(bytes, pos, b"<section") && name_ends_at(bytes, pos + 8) {
      return Some(pos);
    }
    pos += 1;
  }
  None
}

/// Quote-aware scan for the end of a start tag. Returns the end of the
/// attribute text and the position just past `>`.
fn scan_tag_end(bytes: &[u8], from: usize) -> (usize, usize) {
  let mut quote: Option<u8> = None;
  let mut pos = from;
  while pos < bytes.len() {
    let b = bytes[pos];
    match quote {
      Some(q) if b == q => quote = None,
      Some(_) => {}
      None if b == b'"' || b == b'\'' => quote = Some(b),
      None if b == b'>' => {
        let attrs_end = if pos > from && bytes[pos - 1] == b'/' { pos - 1 } else { pos };
        return (attrs_end, pos + 1);
      }
      None => {}
    }
    pos += 1;
  }
  (bytes.len(), bytes.len())
}

/// Depth-matched search for the `</section>` closing the element whose
/// content starts at `from`. Returns the inner end and the position past the
/// closing tag; an unclosed element runs to the end of input.
fn find_close(bytes: &[u8], from: usize) -> (usize, usize) {
  let mut depth = 0usize;
  let mut pos = from;
  while pos < bytes.len() {
    if let Some(end) = skip_comment(bytes, pos) {
      pos = end;
      continue;
    }
    if bytes[pos] == b'<' {
      if starts_with_ci(bytes, pos, b"</section") && name_ends_at(bytes, pos + 9) {
        if depth == 0 {
          let close_end =
            bytes[pos..].iter().position(|b| *b == b'>').map_or(bytes.len(), |i| pos + i + 1);
          return (pos, close_end);
        }
        depth -= 1;
      } else if starts_with_ci(bytes, pos, b"<section") && name_ends_at(bytes, pos + 8) {
        depth += 1;
      }
    }
    pos += 1;
  }
  (bytes.len(), bytes.len())
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
  let bytes = raw.as_bytes();
  let mut attrs = Vec::new();
  let mut pos = 0;
  loop {
    while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
      pos += 1;
    }
    if pos >= bytes.len() {
      return attrs;
    }
    let name_start = pos;
    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
      pos += 1;
    }
    let name = raw[name_start..pos].to_ascii_lowercase();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
      pos += 1;
    }
    if bytes.get(pos) != Some(&b'=') {
      attrs.push((name, String::new()));
      continue;
    }
    pos += 1;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
      pos += 1;
    }
    let value = match bytes.get(pos) {
      Some(&q) if q == b'"' || q == b'\'' => {
        let start = pos + 1;
        let end = bytes[start..].iter().position(|b| *b == q).map_or(bytes.len(), |i| start + i);
        pos = (end + 1).min(bytes.len());
        &raw[start..end]
      }
      _ => {
        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
          pos += 1;
        }
        &raw[start..pos]
      }
    };
    attrs.push((name, decode_entities(value)));
  }
}

const ENTITIES: &[(&str, char)] = &[
  ("&amp;", '&'),
  ("&lt;", '<'),
  ("&gt;", '>'),
  ("&quot;", '"'),
  ("&#39;", '\''),
  ("&#039;", '\''),
  ("&#x27;", '\''),
];

fn decode_entities(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(i) = rest.find('&') {
    out.push_str(&rest[..i]);
    rest = &rest[i..];
    match ENTITIES.iter().find(|(ent, _)| rest.starts_with(ent)) {
      Some((ent, ch)) => {
        out.push(*ch);
        rest = &rest[ent.len()..];
      }
      None => {
        out.push('&');
        rest = &rest[1..];
      }
    }
  }
  out.push_str(rest);
  out
}
