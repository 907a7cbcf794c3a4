// src/core/html.rs
// Tag-level tokenizer for carrier pages.
// Deliberately tolerant: unbalanced tags, unquoted attributes, stray '<' and
// inline scripts all degrade to text or get skipped, never to an error.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
}

/// Elements whose content is never visible text.
const RAW_TEXT: &[&str] = &["script", "style", "template", "noscript"];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "tfoot", "thead", "tr", "ul",
    "br", "title",
];

pub fn is_void(tag: &str) -> bool { VOID.contains(&tag) }
pub fn is_block(tag: &str) -> bool { BLOCK.contains(&tag) }
pub fn is_raw_text(tag: &str) -> bool { RAW_TEXT.contains(&tag) }

/// Fast ASCII-only lowercasing for tag/attribute matching.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

pub struct Tokens<'a> {
    s: &'a str,
    b: &'a [u8],
    i: usize,
    pending_close: Option<String>,
}

impl<'a> Tokens<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, b: s.as_bytes(), i: 0, pending_close: None }
    }

    /// Index of the '>' closing the tag opened at `self.i`, quote-aware.
    fn tag_end(&self) -> usize {
        let mut j = self.i + 1;
        let mut in_s = false; // '
        let mut in_d = false; // "
        while j < self.b.len() {
            match self.b[j] {
                b'\'' if !in_d => in_s = !in_s,
                b'"' if !in_s => in_d = !in_d,
                b'>' if !in_s && !in_d => return j,
                _ => {}
            }
            j += 1;
        }
        self.b.len()
    }

    fn skip_past(&mut self, pat: &str) {
        match self.s[self.i..].find(pat) {
            Some(p) => self.i += p + pat.len(),
            None => self.i = self.b.len(),
        }
    }

    /// Skip the body of a raw-text element up to (and including) its close tag.
    fn skip_raw(&mut self, name: &str) {
        let close = format!("</{name}");
        let lc = to_lower(&self.s[self.i..]);
        match lc.find(&close) {
            Some(p) => {
                self.i += p;
                let end = self.tag_end();
                self.i = (end + 1).min(self.b.len());
            }
            None => self.i = self.b.len(),
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_close.take() {
            return Some(Token::Close(name));
        }
        let n = self.b.len();
        while self.i < n {
            if self.b[self.i] != b'<' {
                let start = self.i;
                let end = self.s[start..].find('<').map_or(n, |p| start + p);
                self.i = end;
                return Some(Token::Text(&self.s[start..end]));
            }

            let rest = &self.s[self.i..];
            if rest.starts_with("<!--") {
                self.skip_past("-->");
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">");
                continue;
            }
            let opens_tag = matches!(self.b.get(self.i + 1), Some(c) if c.is_ascii_alphabetic() || *c == b'/');
            if !opens_tag {
                // Stray '<' is literal text up to the next candidate tag.
                let start = self.i;
                let end = self.s[start + 1..].find('<').map_or(n, |p| start + 1 + p);
                self.i = end;
                return Some(Token::Text(&self.s[start..end]));
            }

            let end = self.tag_end();
            let inner = &self.s[self.i + 1..end];
            self.i = (end + 1).min(n);

            let token = parse_tag(inner);
            if let Token::Open { name, self_closing: false, .. } = &token {
                if is_raw_text(name) {
                    let name = name.clone();
                    self.skip_raw(&name);
                    self.pending_close = Some(name);
                }
            }
            return Some(token);
        }
        None
    }
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn parse_tag(inner: &str) -> Token<'_> {
    if let Some(close) = inner.strip_prefix('/') {
        let close = close.trim_start();
        let len = close.bytes().take_while(|&c| is_name_byte(c)).count();
        return Token::Close(to_lower(&close[..len]));
    }

    let b = inner.as_bytes();
    let name_len = b.iter().take_while(|&&c| is_name_byte(c)).count();
    let name = to_lower(&inner[..name_len]);
    let self_closing = inner.trim_end().ends_with('/');

    let mut attrs = Vec::new();
    let mut i = name_len;
    while i < b.len() {
        while i < b.len() && (b[i].is_ascii_whitespace() || b[i] == b'/') { i += 1; }
        if i >= b.len() { break; }

        let start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() && b[i] != b'=' && b[i] != b'/' { i += 1; }
        let key = to_lower(&inner[start..i]);
        while i < b.len() && b[i].is_ascii_whitespace() { i += 1; }

        let mut value = String::new();
        if i < b.len() && b[i] == b'=' {
            i += 1;
            while i < b.len() && b[i].is_ascii_whitespace() { i += 1; }
            match b.get(i) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let vstart = i + 1;
                    let vend = inner[vstart..].find(q as char).map_or(b.len(), |p| vstart + p);
                    value = super::sanitize::decode_entities(&inner[vstart..vend]);
                    i = (vend + 1).min(b.len());
                }
                _ => {
                    let vstart = i;
                    while i < b.len() && !b[i].is_ascii_whitespace() { i += 1; }
                    value = super::sanitize::decode_entities(inner[vstart..i].trim_end_matches('/'));
                }
            }
        }
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }

    Token::Open { name, attrs, self_closing }
}
