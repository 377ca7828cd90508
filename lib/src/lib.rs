#![doc = svgbobdoc::transform!(
//! Responsive images for static sites.
//!
//! # Overview
//!
//! Picset turns an image directive in a page template into a set of resized
//! image files and the HTML that lets a browser pick between them. A
//! directive names a source image, its alt text, the widths to generate and,
//! optionally, CSS classes and a link:
//!
//! ```text
//! {{ rimage("img/cat.jpg", "A cat asleep", [480, 768, 1200], "hero") }}
//! ```
//!
//! Each directive flows through the same pipeline:
//!
//! ```svgbob
//!  +-----------+     +----------+     +---------+     +--------+
//!  | directive |---->| validate |---->| resize  |---->| markup |----> HTML
//!  +-----------+     +----------+     +----+----+     +--------+
//!                                          |
//!                                          v
//!                                   output_dir/{id}-{width}.{ext}
//! ```
//!
//!   * **Validation** rejects a directive without alt text and one without
//!     usable widths before any file is touched. An empty alt is allowed and
//!     marks the image as decorative.
//!
//!   * **Resizing** decodes the source once and writes one proportionally
//!     scaled file per width, never upscaling. File names carry a hash of the
//!     source and the encoder settings, so unchanged images keep their names
//!     from one build to the next.
//!
//!   * **Markup** is assembled by one of two policies: a `<picture>` with a
//!     media-conditioned `<source>` per width ([`Policy::Picture`], the
//!     default) or a single `<img>` with `srcset` and `sizes`
//!     ([`Policy::Srcset`]). Either may be wrapped in a link.
//!
//! ## Usage
//!
//! Settings live in an `[images]` table of the site's TOML configuration; see
//! [`ImageConfig`]. A [`ResponsiveImage`] renders requests directly:
//!
//! ```rust,no_run
//! use picset::{ImageConfig, ImageRequest, ResponsiveImage};
//!
//! # async fn run() -> picset::error::Result<()> {
//! let config = ImageConfig::read("site.toml")?;
//! let renderer = ResponsiveImage::new(config);
//!
//! let request = ImageRequest::new("img/cat.jpg", "A cat asleep", [480, 768, 1200])
//!     .classes("hero")
//!     .link("/cats/");
//!
//! let html = renderer.render(&request).await?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```
//!
//! Templates reach the same renderer through
//! [`MiniJinjaEngine`](templating::minijinja::MiniJinjaEngine).
)]

#[macro_use]
pub mod error;
pub mod url;
pub mod config;
pub mod request;
pub mod resize;
pub mod markup;
pub mod renderer;
pub mod templating;

pub use config::{ImageConfig, OutputFormat, ResizeFilter};
pub use error::{ImageError, ResizeError};
pub use markup::{Markup, MarkupFragment, Policy};
pub use renderer::ResponsiveImage;
pub use request::{AltText, ImageRequest};
pub use resize::{ImageVariant, OutputSpec, RasterResizer, Resize};
