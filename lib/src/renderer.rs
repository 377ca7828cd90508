use crate::config::ImageConfig;
use crate::error::{ImageError, ResizeError};
use crate::markup::{Link, Markup, MarkupContext, MarkupFragment};
use crate::request::ImageRequest;
use crate::resize::{OutputSpec, RasterResizer, Resize};

/// Renders image directives into resized variants and markup.
///
/// A renderer holds only static configuration, so one instance can serve
/// every directive of a build, concurrently if the caller wishes.
#[derive(Debug)]
pub struct ResponsiveImage {
    config: ImageConfig,
    output: OutputSpec,
    resizer: Box<dyn Resize>,
    markup: Box<dyn Markup>,
}

impl ResponsiveImage {
    /// A renderer that resizes with [`RasterResizer`] and assembles markup
    /// with the configured policy.
    pub fn new(config: ImageConfig) -> Self {
        Self::with_resizer(config, RasterResizer)
    }

    pub fn with_resizer<R: Resize + 'static>(config: ImageConfig, resizer: R) -> Self {
        ResponsiveImage {
            output: config.output_spec(),
            markup: config.policy.strategy(&config),
            resizer: Box::new(resizer),
            config,
        }
    }

    /// Replaces the configured markup policy with `markup`.
    pub fn with_markup<M: Markup + 'static>(mut self, markup: M) -> Self {
        self.markup = Box::new(markup);
        self
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Validates `request`, generates one variant per requested width and
    /// returns the assembled markup.
    ///
    /// Nothing is resized or written unless validation passes.
    pub async fn render(&self, request: &ImageRequest) -> Result<MarkupFragment, ImageError> {
        let (alt, widths) = request.validate()?;

        let failed = |cause| ImageError::ImageProcessingFailed {
            path: request.source.clone(),
            cause,
        };

        let variants = self.resizer.resize(&request.source, widths, &self.output).await
            .map_err(failed)?;

        if variants.len() != widths.len() {
            return Err(failed(ResizeError::VariantCount {
                expected: widths.len(),
                actual: variants.len(),
            }));
        }

        let link = match request.link_url.as_str() {
            "" => None,
            href => Some(Link {
                href,
                target: request.link_target.as_deref().unwrap_or(&self.config.default_target),
            }),
        };

        let context = MarkupContext { alt, classes: &request.classes, link };
        let fragment = self.markup.assemble(&context, &variants);
        log::info!("rendered {} with {} variants", request.source.display(), variants.len());
        Ok(fragment)
    }

    /// Renders every request concurrently. Results are in request order and
    /// one failure doesn't stop the others.
    pub async fn render_all(
        &self,
        requests: &[ImageRequest],
    ) -> Vec<Result<MarkupFragment, ImageError>> {
        futures::future::join_all(requests.iter().map(|r| self.render(r))).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::markup::{Policy, SrcsetMarkup};
    use crate::request::AltText;
    use crate::resize::testing::RecordingResizer;
    use crate::resize::ImageVariant;

    static_assertions::assert_impl_all!(ResponsiveImage: Send, Sync);

    /// Shares a `RecordingResizer` with the test so calls can be inspected.
    #[derive(Debug, Clone, Default)]
    struct Shared(Arc<RecordingResizer>);

    #[async_trait]
    impl Resize for Shared {
        async fn resize(
            &self,
            source: &Path,
            widths: &[u32],
            output: &OutputSpec,
        ) -> Result<Vec<ImageVariant>, ResizeError> {
            self.0.resize(source, widths, output).await
        }
    }

    fn renderer(config: ImageConfig) -> (ResponsiveImage, Shared) {
        let resizer = Shared::default();
        (ResponsiveImage::with_resizer(config, resizer.clone()), resizer)
    }

    fn urls(html: &str) -> HashSet<&str> {
        html.split('"').filter(|s| s.starts_with("/images/")).collect()
    }

    #[tokio::test]
    async fn requests_exactly_the_given_widths_in_order() {
        let (renderer, resizer) = renderer(ImageConfig::default());
        let request = ImageRequest::new("img/cat.jpg", "A cat", [768, 480, 1200]);

        let fragment = renderer.render(&request).await.unwrap();
        assert_eq!(resizer.0.calls(), [(PathBuf::from("img/cat.jpg"), vec![768, 480, 1200])]);
        assert_eq!(urls(fragment.as_str()).len(), 3);
    }

    #[tokio::test]
    async fn missing_alt_fails_before_resizing() {
        let (renderer, resizer) = renderer(ImageConfig::default());
        let request = ImageRequest::new("img/cat.jpg", AltText::Missing, [480]);

        let error = renderer.render(&request).await.unwrap_err();
        assert!(matches!(error, ImageError::MissingAltText { ref path } if path == Path::new("img/cat.jpg")));
        assert!(resizer.0.calls().is_empty());

        let request = ImageRequest::new("img/cat.jpg", "", [480]);
        assert!(renderer.render(&request).await.is_ok());
    }

    #[tokio::test]
    async fn empty_widths_fail_without_resizing() {
        let (renderer, resizer) = renderer(ImageConfig::default());
        let request = ImageRequest::new("img/cat.jpg", "A cat", Vec::new());

        let error = renderer.render(&request).await.unwrap_err();
        assert!(matches!(error, ImageError::InvalidWidthList { .. }));
        assert!(resizer.0.calls().is_empty());
    }

    #[tokio::test]
    async fn resize_failures_carry_the_source_path() {
        let renderer = ResponsiveImage::with_resizer(ImageConfig::default(), RecordingResizer::failing());
        let request = ImageRequest::new("img/missing.jpg", "gone", [480]);

        match renderer.render(&request).await {
            Err(ImageError::ImageProcessingFailed { path, cause: ResizeError::Io { .. } }) => {
                assert_eq!(path, Path::new("img/missing.jpg"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_variant_lists_are_rejected() {
        #[derive(Debug)]
        struct Lossy;

        #[async_trait]
        impl Resize for Lossy {
            async fn resize(
                &self,
                _: &Path,
                widths: &[u32],
                output: &OutputSpec,
            ) -> Result<Vec<ImageVariant>, ResizeError> {
                Ok(widths.iter().skip(1)
                    .map(|&width| ImageVariant { width, url: output.url_for("x.jpeg"), dimensions: (width, 1) })
                    .collect())
            }
        }

        let renderer = ResponsiveImage::with_resizer(ImageConfig::default(), Lossy);
        let request = ImageRequest::new("a.jpg", "a", [480, 768]);
        let error = renderer.render(&request).await.unwrap_err();
        assert!(matches!(error, ImageError::ImageProcessingFailed {
            cause: ResizeError::VariantCount { expected: 2, actual: 1 }, ..
        }));
    }

    #[tokio::test]
    async fn anchor_only_with_link_and_default_target() {
        let config = ImageConfig { default_target: "_blank".into(), ..ImageConfig::default() };
        let (renderer, _) = renderer(config);

        let plain = ImageRequest::new("a.jpg", "a", [480]);
        assert!(!renderer.render(&plain).await.unwrap().as_str().contains("<a "));

        let linked = plain.clone().link("/posts/a/");
        let html = renderer.render(&linked).await.unwrap();
        assert!(html.as_str().starts_with("<a href=\"/posts/a/\" class=\"img-ref\" target=\"_blank\""));

        let targeted = linked.target("_top");
        let html = renderer.render(&targeted).await.unwrap();
        assert!(html.as_str().contains("target=\"_top\""));
    }

    #[tokio::test]
    async fn policy_comes_from_config_and_can_be_overridden() {
        let config = ImageConfig { policy: Policy::Srcset, ..ImageConfig::default() };
        let (renderer, _) = renderer(config.clone());
        let request = ImageRequest::new("a.jpg", "a", [480, 768, 1200]);
        assert!(renderer.render(&request).await.unwrap().as_str().contains("srcset=\""));
        assert!(!renderer.render(&request).await.unwrap().as_str().contains("<picture"));

        let (renderer, _) = renderer_with_markup(config, SrcsetMarkup::new(0));
        let html = renderer.render(&request).await.unwrap();
        assert!(html.as_str().contains("(max-width: 480px) 480px"));
    }

    fn renderer_with_markup<M: Markup + 'static>(config: ImageConfig, markup: M) -> (ResponsiveImage, Shared) {
        let (renderer, resizer) = renderer(config);
        (renderer.with_markup(markup), resizer)
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_markup() {
        let (renderer, _) = renderer(ImageConfig::default());
        let request = ImageRequest::new("img/cat.jpg", "A cat", [480, 768, 1200])
            .classes("hero")
            .link("/cats/");

        let first = renderer.render(&request).await.unwrap();
        let second = renderer.render(&request).await.unwrap();
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
    }

    #[tokio::test]
    async fn render_all_keeps_request_order() {
        let (renderer, resizer) = renderer(ImageConfig::default());
        let requests = [
            ImageRequest::new("a.jpg", "a", [100]),
            ImageRequest::new("b.jpg", AltText::Missing, [200]),
            ImageRequest::new("c.jpg", "c", [300, 600]),
        ];

        let results = renderer.render_all(&requests).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().as_str().contains("-100.jpeg"));
        assert!(matches!(results[1], Err(ImageError::MissingAltText { .. })));
        assert!(results[2].as_ref().unwrap().as_str().contains("-600.jpeg"));
        assert_eq!(resizer.0.calls().len(), 2);
    }
}
