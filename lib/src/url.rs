use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// An owned URL or URL path, such as the prefix variants are served under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct UrlBuf(String);

impl UrlBuf {
    pub fn new() -> UrlBuf {
        UrlBuf(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ```rust
    /// use picset::url::UrlBuf;
    ///
    /// assert_eq!(UrlBuf::from("https://cdn.example.com/images").scheme(), Some("https"));
    /// assert_eq!(UrlBuf::from("mailto:me@example.com").scheme(), Some("mailto"));
    /// assert_eq!(UrlBuf::from("/images/").scheme(), None);
    /// assert_eq!(UrlBuf::from("img#a:b").scheme(), None);
    /// assert_eq!(UrlBuf::from("img?a:b").scheme(), None);
    /// ```
    pub fn scheme(&self) -> Option<&str> {
        let bytes = self.0.as_bytes();
        match memchr::memchr3(b':', b'?', b'/', bytes) {
            Some(i) if bytes[i] == b':' => match memchr::memrchr(b'#', &bytes[..i]) {
                Some(_) => None,
                None => Some(&self.0[..i]),
            }
            _ => None,
        }
    }

    /// Returns `true` if every byte is one browsers accept in a URL.
    pub fn is_valid(&self) -> bool {
        self.0.bytes().all(|b| is_url_char(&b))
    }

    /// Appends `segment` with exactly one `/` at the seam. An absolute URL
    /// (one with a scheme) replaces `self` entirely.
    ///
    /// ```rust
    /// use picset::url::UrlBuf;
    ///
    /// let mut url = UrlBuf::from("/images/");
    /// url.append("/a1b2c3-480.jpeg");
    /// assert_eq!(url.as_str(), "/images/a1b2c3-480.jpeg");
    ///
    /// let mut url = UrlBuf::from("https://cdn.example.com");
    /// url.append("images");
    /// assert_eq!(url.as_str(), "https://cdn.example.com/images");
    ///
    /// url.append("https://elsewhere.example.com/x");
    /// assert_eq!(url.as_str(), "https://elsewhere.example.com/x");
    ///
    /// let mut url = UrlBuf::new();
    /// url.append("a.jpeg");
    /// assert_eq!(url.as_str(), "a.jpeg");
    /// ```
    pub fn append(&mut self, segment: &str) -> &mut Self {
        let segment = UrlBuf::from(segment);
        if segment.scheme().is_some() {
            *self = segment;
            return self;
        }

        match (self.0.ends_with('/'), segment.0.starts_with('/')) {
            _ if self.0.is_empty() => self.0.push_str(&segment.0),
            (true, true) => self.0.push_str(&segment.0[1..]),
            (true, false) | (false, true) => self.0.push_str(&segment.0),
            (false, false) => {
                self.0.push('/');
                self.0.push_str(&segment.0);
            }
        }

        self
    }

    pub fn join(&self, segment: &str) -> UrlBuf {
        let mut url = self.clone();
        url.append(segment);
        url
    }
}

impl From<String> for UrlBuf {
    fn from(value: String) -> Self {
        UrlBuf(value)
    }
}

impl From<&str> for UrlBuf {
    fn from(value: &str) -> Self {
        UrlBuf(value.to_owned())
    }
}

impl From<UrlBuf> for String {
    fn from(value: UrlBuf) -> Self {
        value.0
    }
}

impl Deref for UrlBuf {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for UrlBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UrlBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unreserved, percent-encoded, sub-delimiter, path, query and fragment bytes,
/// plus the handful browsers send unencoded anyway.
#[inline(always)]
pub const fn is_url_char(&c: &u8) -> bool {
    matches!(c,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
        | b'-' | b'.' | b'_' | b'~' | b'%'
        | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
        | b':' | b'@' | b'/' | b'?' | b'#'
        | b'[' | b']' | b'{' | b'}' | b'\\' | b'^' | b'`' | b'|')
}
