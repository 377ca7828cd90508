use std::borrow::Cow;

/// Escapes `&`, `<`, `>`, `"` and `'` for use in an attribute value.
///
/// ```rust
/// use picset::markup::escape;
///
/// assert_eq!(escape("Tom & Jerry's \"<cat>\""), "Tom &amp; Jerry&#39;s &quot;&lt;cat&gt;&quot;");
/// assert_eq!(escape("/images/a-480.jpeg"), "/images/a-480.jpeg");
/// ```
pub fn escape(value: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>' | '"' | '\'');
    if !value.contains(needs_escape) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    Cow::Owned(escaped)
}

/// An attribute; `None` values are left out entirely.
pub(crate) type Attr<'a> = (&'a str, Option<&'a str>);

/// Line-per-element writer with two-space indentation per nesting level.
#[derive(Debug, Default)]
pub(crate) struct HtmlWriter {
    out: String,
    depth: usize,
}

impl HtmlWriter {
    pub fn new() -> Self {
        HtmlWriter::default()
    }

    fn line_start(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }

        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn tag(&mut self, name: &str, attrs: &[Attr<'_>]) {
        self.line_start();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            let Some(value) = value else { continue };
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }

        self.out.push('>');
    }

    /// Writes an element with no closing tag, like `<img>` or `<source>`.
    pub fn void(&mut self, name: &str, attrs: &[Attr<'_>]) {
        self.tag(name, attrs);
    }

    pub fn open(&mut self, name: &str, attrs: &[Attr<'_>]) {
        self.tag(name, attrs);
        self.depth += 1;
    }

    pub fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line_start();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// `Some(value)` unless `value` is empty.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
