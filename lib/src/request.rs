use std::path::PathBuf;

use crate::error::ImageError;

/// Alt text as supplied by a directive.
///
/// `Missing` and `Text("")` are different things: an explicitly empty alt
/// marks a decorative image and is fine, an absent one is an error.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum AltText {
    #[default]
    Missing,
    Text(String),
}

impl AltText {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AltText::Missing => None,
            AltText::Text(text) => Some(text),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AltText::Missing)
    }
}

impl From<Option<String>> for AltText {
    fn from(value: Option<String>) -> Self {
        value.map_or(AltText::Missing, AltText::Text)
    }
}

impl From<String> for AltText {
    fn from(value: String) -> Self {
        AltText::Text(value)
    }
}

impl From<&str> for AltText {
    fn from(value: &str) -> Self {
        AltText::Text(value.to_owned())
    }
}

/// One occurrence of an image directive.
///
/// ```rust
/// use picset::{AltText, ImageRequest};
///
/// let request = ImageRequest::new("img/cat.jpg", "A cat", [480, 768, 1200])
///     .classes("hero rounded")
///     .link("https://example.com/cat")
///     .target("_blank");
///
/// assert_eq!(request.alt, AltText::Text("A cat".into()));
/// assert_eq!(request.widths, [480, 768, 1200]);
/// assert_eq!(request.link_target.as_deref(), Some("_blank"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub source: PathBuf,
    pub alt: AltText,
    /// Target widths in pixels, in the order variants are requested.
    pub widths: Vec<u32>,
    pub classes: String,
    /// Wraps the markup in an anchor when non-empty.
    pub link_url: String,
    /// Anchor target; the configured default applies when `None`.
    pub link_target: Option<String>,
}

impl ImageRequest {
    pub fn new<P, A, W>(source: P, alt: A, widths: W) -> Self
        where P: Into<PathBuf>, A: Into<AltText>, W: IntoIterator<Item = u32>
    {
        ImageRequest {
            source: source.into(),
            alt: alt.into(),
            widths: widths.into_iter().collect(),
            classes: String::new(),
            link_url: String::new(),
            link_target: None,
        }
    }

    pub fn classes<S: Into<String>>(mut self, classes: S) -> Self {
        self.classes = classes.into();
        self
    }

    pub fn link<S: Into<String>>(mut self, url: S) -> Self {
        self.link_url = url.into();
        self
    }

    pub fn target<S: Into<String>>(mut self, target: S) -> Self {
        self.link_target = Some(target.into());
        self
    }

    /// Checks the alt text and width list, returning both on success.
    ///
    /// Alt text is checked first: a directive missing both fails with
    /// [`ImageError::MissingAltText`].
    pub fn validate(&self) -> Result<(&str, &[u32]), ImageError> {
        let alt = self.alt.as_str()
            .ok_or_else(|| ImageError::MissingAltText { path: self.source.clone() })?;

        if self.widths.is_empty() {
            return Err(self.invalid_widths("no target widths given"));
        }

        if let Some(i) = self.widths.iter().position(|&w| w == 0) {
            return Err(self.invalid_widths(format!("width #{} is zero", i + 1)));
        }

        Ok((alt, self.widths.as_slice()))
    }

    pub(crate) fn invalid_widths<R: Into<String>>(&self, reason: R) -> ImageError {
        ImageError::InvalidWidthList { path: self.source.clone(), reason: reason.into() }
    }
}
