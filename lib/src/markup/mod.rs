//! Markup assembly strategies.
//!
//! Both strategies consume the same data: the variants produced for one
//! directive, in request order, plus the directive's alt text, classes and
//! optional link. They differ only in how the browser is told to choose.

mod html;
mod picture;
mod srcset;

pub use html::escape;
pub use picture::PictureMarkup;
pub use srcset::SrcsetMarkup;

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::config::ImageConfig;
use crate::resize::ImageVariant;

/// An assembled HTML fragment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct MarkupFragment(String);

impl MarkupFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for MarkupFragment {
    fn from(value: String) -> Self {
        MarkupFragment(value)
    }
}

impl From<MarkupFragment> for String {
    fn from(value: MarkupFragment) -> Self {
        value.0
    }
}

impl fmt::Display for MarkupFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An anchor wrapped around the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<'a> {
    pub href: &'a str,
    pub target: &'a str,
}

/// Per-directive inputs to markup assembly, besides the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupContext<'a> {
    pub alt: &'a str,
    pub classes: &'a str,
    pub link: Option<Link<'a>>,
}

/// Turns a directive's variants into markup.
///
/// `variants` is in request order and is never empty when called by the
/// renderer; implementations return an empty fragment if it is.
pub trait Markup: Send + Sync + Debug {
    fn assemble(&self, context: &MarkupContext<'_>, variants: &[ImageVariant]) -> MarkupFragment;
}

/// Which [`Markup`] strategy a renderer uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// `<picture>` with one media-conditioned `<source>` per variant.
    #[default]
    Picture,
    /// A single `<img>` with `srcset` and `sizes`.
    Srcset,
}

impl Policy {
    pub fn strategy(self, config: &ImageConfig) -> Box<dyn Markup> {
        match self {
            Policy::Picture => Box::new(PictureMarkup),
            Policy::Srcset => Box::new(SrcsetMarkup::new(config.sizes_offset)),
        }
    }
}

// Anchor attributes shared by both strategies.
const ANCHOR_CLASS: &str = "img-ref";
const ANCHOR_REL: &str = "noopener";

fn open_link(html: &mut html::HtmlWriter, link: Option<Link<'_>>) {
    if let Some(link) = link {
        html.open("a", &[
            ("href", Some(link.href)),
            ("class", Some(ANCHOR_CLASS)),
            ("target", Some(link.target)),
            ("rel", Some(ANCHOR_REL)),
        ]);
    }
}

fn close_link(html: &mut html::HtmlWriter, link: Option<Link<'_>>) {
    if link.is_some() {
        html.close("a");
    }
}
