use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{Chainable, Result};
use crate::markup::Policy;
use crate::resize::OutputSpec;
use crate::url::UrlBuf;

/// The table of a site's `config.toml` that holds [`ImageConfig`].
pub const CONFIG_TABLE: &str = "images";

/// Static build-time configuration for responsive images.
///
/// Every field has a default, so an empty (or absent) `[images]` table yields
/// the behavior the blog shipped with: JPEG variants written to
/// `_site/images/`, served from `/images/`, assembled with the `<picture>`
/// policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// The single raster format every variant is encoded as.
    pub format: OutputFormat,
    /// JPEG quality, `1..=100`. Ignored for PNG.
    pub quality: u8,
    /// Directory variants are written to.
    pub output_dir: PathBuf,
    /// URL prefix variants are served under.
    pub url_path: UrlBuf,
    /// Anchor `target` used when a directive doesn't supply one.
    pub default_target: String,
    pub policy: Policy,
    /// Pixels added to each width to form the `sizes` breakpoint of the
    /// `srcset` policy.
    pub sizes_offset: u32,
    pub filter: ResizeFilter,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            format: OutputFormat::Jpeg,
            quality: 80,
            output_dir: PathBuf::from("_site/images/"),
            url_path: UrlBuf::from("/images/"),
            default_target: "_self".into(),
            policy: Policy::Picture,
            sizes_offset: 10,
            filter: ResizeFilter::Lanczos3,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::CatmullRom => "catmullrom",
            ResizeFilter::Gaussian => "gaussian",
            ResizeFilter::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl ImageConfig {
    /// Parses a standalone image configuration.
    ///
    /// ```rust
    /// use picset::{ImageConfig, OutputFormat, Policy};
    ///
    /// let config = ImageConfig::from_toml(r#"
    ///     format = "png"
    ///     policy = "srcset"
    ///     url_path = "/media/"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.format, OutputFormat::Png);
    /// assert_eq!(config.policy, Policy::Srcset);
    /// assert_eq!(config.url_path.as_str(), "/media/");
    /// assert_eq!(config.default_target, "_self");
    /// ```
    pub fn from_toml(string: &str) -> Result<Self> {
        let config: ImageConfig = toml::from_str(string)
            .chain_with(|| "invalid image configuration")?;

        config.validate()
    }

    /// Parses the `[images]` table of a site configuration, ignoring every
    /// other key. A missing table yields the defaults.
    pub fn from_site_toml(string: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Site {
            #[serde(default)]
            images: ImageConfig,
        }

        let site: Site = toml::from_str(string).chain_with(|| error! {
            "invalid site configuration",
            "table" => CONFIG_TABLE,
        })?;

        site.images.validate()
    }

    /// Reads the `[images]` table of the site configuration at `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read site configuration",
            "path" => path.display(),
        })?;

        Self::from_site_toml(&string).chain_with(|| error! {
            "failed to load image configuration",
            "path" => path.display(),
        })
    }

    fn validate(self) -> Result<Self> {
        if !(1..=100).contains(&self.quality) {
            return err!("image quality must be within 1..=100", "quality" => self.quality);
        }

        if !self.url_path.is_valid() {
            return err!(
                "image URL path contains characters that aren't valid in a URL",
                "url_path" => self.url_path,
            );
        }

        if self.default_target.trim().is_empty() {
            return err!("default link target must not be empty");
        }

        Ok(self)
    }

    /// The part of this configuration the resize primitive needs.
    pub fn output_spec(&self) -> OutputSpec {
        OutputSpec {
            format: self.format,
            quality: self.quality,
            filter: self.filter,
            output_dir: self.output_dir.clone(),
            url_path: self.url_path.clone(),
        }
    }
}
