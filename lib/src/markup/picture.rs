use super::html::{non_empty, HtmlWriter};
use super::{close_link, open_link, Markup, MarkupContext, MarkupFragment};
use crate::resize::ImageVariant;

/// Breakpoint markup: a `<picture>` with one `<source>` per variant.
///
/// Every variant but the last is selected for viewports up to its width. The
/// last one catches every viewport from its width up. A plain `<img>` using
/// the first variant is the fallback for clients without `<picture>`. Widths
/// are expected in ascending order; position, not magnitude, decides which
/// variant is "last".
///
/// For widths `[480, 768, 1200]` and no link:
///
/// ```text
/// <picture class="hero">
///   <source srcset="/images/abc-480.jpeg" media="(max-width: 480px)">
///   <source srcset="/images/abc-768.jpeg" media="(max-width: 768px)">
///   <source srcset="/images/abc-1200.jpeg" media="(min-width: 1200px)">
///   <img alt="A cat" src="/images/abc-480.jpeg">
/// </picture>
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PictureMarkup;

impl Markup for PictureMarkup {
    fn assemble(&self, context: &MarkupContext<'_>, variants: &[ImageVariant]) -> MarkupFragment {
        let (Some(fallback), Some((last, rest))) = (variants.first(), variants.split_last()) else {
            return MarkupFragment::default();
        };

        let mut html = HtmlWriter::new();
        open_link(&mut html, context.link);
        html.open("picture", &[("class", non_empty(context.classes))]);
        for variant in rest {
            let media = format!("(max-width: {}px)", variant.width);
            html.void("source", &[
                ("srcset", Some(variant.url.as_str())),
                ("media", Some(media.as_str())),
            ]);
        }

        let media = format!("(min-width: {}px)", last.width);
        html.void("source", &[
            ("srcset", Some(last.url.as_str())),
            ("media", Some(media.as_str())),
        ]);

        html.void("img", &[
            ("alt", Some(context.alt)),
            ("src", Some(fallback.url.as_str())),
        ]);

        html.close("picture");
        close_link(&mut html, context.link);
        html.finish().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tests::{variants, PLAIN};
    use crate::markup::Link;

    #[test]
    fn two_max_width_sources_and_one_min_width() {
        let context = MarkupContext { classes: "hero", ..PLAIN };
        let fragment = PictureMarkup.assemble(&context, &variants(&[480, 768, 1200]));

        assert_eq!(fragment.as_str(), "\
<picture class=\"hero\">
  <source srcset=\"/images/abc-480.jpeg\" media=\"(max-width: 480px)\">
  <source srcset=\"/images/abc-768.jpeg\" media=\"(max-width: 768px)\">
  <source srcset=\"/images/abc-1200.jpeg\" media=\"(min-width: 1200px)\">
  <img alt=\"A cat\" src=\"/images/abc-480.jpeg\">
</picture>");

        assert_eq!(fragment.as_str().matches("max-width").count(), 2);
        assert_eq!(fragment.as_str().matches("(min-width: 1200px)").count(), 1);
    }

    #[test]
    fn single_width_is_only_a_catch_all() {
        let fragment = PictureMarkup.assemble(&PLAIN, &variants(&[640]));
        assert!(!fragment.as_str().contains("max-width"));
        assert!(fragment.as_str().contains("srcset=\"/images/abc-640.jpeg\" media=\"(min-width: 640px)\""));
        assert!(fragment.as_str().contains("<img alt=\"A cat\" src=\"/images/abc-640.jpeg\">"));
    }

    #[test]
    fn link_wraps_picture() {
        let link = Link { href: "https://example.com/?a=1&b=2", target: "_blank" };
        let context = MarkupContext { link: Some(link), ..PLAIN };
        let fragment = PictureMarkup.assemble(&context, &variants(&[480, 768]));

        let text = fragment.as_str();
        assert!(text.starts_with(
            "<a href=\"https://example.com/?a=1&amp;b=2\" class=\"img-ref\" target=\"_blank\" rel=\"noopener\">\n  <picture>"
        ));
        assert!(text.contains("\n    <img alt=\"A cat\""));
        assert!(text.ends_with("  </picture>\n</a>"));
    }

    #[test]
    fn alt_text_is_escaped() {
        let context = MarkupContext { alt: "\"Quotes\" & <tags>", ..PLAIN };
        let fragment = PictureMarkup.assemble(&context, &variants(&[480]));
        assert!(fragment.as_str().contains("alt=\"&quot;Quotes&quot; &amp; &lt;tags&gt;\""));
    }
}
