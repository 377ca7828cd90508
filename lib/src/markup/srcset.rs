use super::html::{non_empty, HtmlWriter};
use super::{close_link, open_link, Markup, MarkupContext, MarkupFragment};
use crate::resize::ImageVariant;

/// Width-descriptor markup: one `<img>` whose `srcset` lists every variant.
///
/// `sizes` gets one `(max-width: W+offset px) Wpx` slot per variant but the
/// last, which becomes the unconditional default. The offset keeps a viewport
/// of exactly `W` pixels from flipping between candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcsetMarkup {
    offset: u32,
}

impl SrcsetMarkup {
    pub fn new(offset: u32) -> Self {
        SrcsetMarkup { offset }
    }

    /// ```rust
    /// use picset::markup::SrcsetMarkup;
    /// use picset::ImageVariant;
    ///
    /// let variants = [
    ///     ImageVariant { width: 480, url: "/i/a-480.jpeg".into(), dimensions: (480, 320) },
    ///     ImageVariant { width: 768, url: "/i/a-768.jpeg".into(), dimensions: (768, 512) },
    /// ];
    ///
    /// assert_eq!(SrcsetMarkup::srcset(&variants), "/i/a-480.jpeg 480w, /i/a-768.jpeg 768w");
    /// ```
    pub fn srcset(variants: &[ImageVariant]) -> String {
        variants.iter()
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// ```rust
    /// use picset::markup::SrcsetMarkup;
    /// use picset::ImageVariant;
    ///
    /// let variants: Vec<_> = [480, 768, 1200].into_iter()
    ///     .map(|width| ImageVariant { width, url: String::new(), dimensions: (width, 1) })
    ///     .collect();
    ///
    /// assert_eq!(
    ///     SrcsetMarkup::new(10).sizes(&variants),
    ///     "(max-width: 490px) 480px, (max-width: 778px) 768px, 1200px"
    /// );
    /// ```
    pub fn sizes(&self, variants: &[ImageVariant]) -> String {
        let Some((last, rest)) = variants.split_last() else {
            return String::new();
        };

        rest.iter()
            .map(|v| format!("(max-width: {}px) {}px", v.width.saturating_add(self.offset), v.width))
            .chain(std::iter::once(format!("{}px", last.width)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SrcsetMarkup {
    fn default() -> Self {
        SrcsetMarkup::new(10)
    }
}

impl Markup for SrcsetMarkup {
    fn assemble(&self, context: &MarkupContext<'_>, variants: &[ImageVariant]) -> MarkupFragment {
        let Some(first) = variants.first() else {
            return MarkupFragment::default();
        };

        let srcset = Self::srcset(variants);
        let sizes = self.sizes(variants);

        let mut html = HtmlWriter::new();
        open_link(&mut html, context.link);
        html.void("img", &[
            ("alt", Some(context.alt)),
            ("class", non_empty(context.classes)),
            ("src", Some(first.url.as_str())),
            ("srcset", Some(srcset.as_str())),
            ("sizes", Some(sizes.as_str())),
        ]);

        close_link(&mut html, context.link);
        html.finish().into()
    }
}
