mod raster;

pub use raster::RasterResizer;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::config::{OutputFormat, ResizeFilter};
use crate::error::ResizeError;
use crate::url::UrlBuf;

/// One generated variant of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageVariant {
    /// The width this variant was requested at.
    pub width: u32,
    pub url: String,
    /// Actual `(width, height)` in pixels. Smaller than requested when the
    /// source is narrower than `width`.
    pub dimensions: (u32, u32),
}

/// Where and how variants are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub format: OutputFormat,
    pub quality: u8,
    pub filter: ResizeFilter,
    pub output_dir: PathBuf,
    pub url_path: UrlBuf,
}

impl OutputSpec {
    /// A short content id for `source`: the first 10 hex digits of a SHA-256
    /// over the source bytes and every setting that changes the output.
    pub fn variant_id(&self, source: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source);
        hasher.update(self.format.extension());
        hasher.update([self.quality]);
        hasher.update(self.filter.as_str());
        hex::encode(&hasher.finalize()[..5])
    }

    /// `{id}-{width}.{ext}`
    pub fn file_name(&self, id: &str, width: u32) -> String {
        format!("{id}-{width}.{}", self.format.extension())
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn url_for(&self, file_name: &str) -> String {
        self.url_path.join(file_name).into()
    }
}

/// The raster resize primitive.
///
/// Implementations decode `source`, write one proportionally resized file per
/// entry of `widths` and return one [`ImageVariant`] per width, in the order
/// the widths were given. They must not upscale past the source's width.
#[async_trait]
pub trait Resize: Send + Sync + Debug {
    async fn resize(
        &self,
        source: &Path,
        widths: &[u32],
        output: &OutputSpec,
    ) -> Result<Vec<ImageVariant>, ResizeError>;
}

/// Height of a `width`-pixel-wide resize of a `source_width × source_height`
/// image, rounded to the nearest pixel and never zero.
///
/// ```rust
/// use picset::resize::proportional_height;
///
/// assert_eq!(proportional_height((1600, 900), 480), 270);
/// assert_eq!(proportional_height((1000, 333), 500), 167);
/// assert_eq!(proportional_height((4000, 1), 10), 1);
/// ```
pub fn proportional_height((source_width, source_height): (u32, u32), width: u32) -> u32 {
    if source_width == 0 {
        return 0;
    }

    let (sw, sh, w) = (source_width as u64, source_height as u64, width as u64);
    ((sh * w + sw / 2) / sw).clamp(1, u32::MAX as u64) as u32
}

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::*;

    /// A `Resize` that writes nothing, records every call and hands back
    /// deterministic URLs.
    #[derive(Debug, Default)]
    pub struct RecordingResizer {
        calls: Mutex<Vec<(PathBuf, Vec<u32>)>>,
        fail: bool,
    }

    impl RecordingResizer {
        pub fn failing() -> Self {
            RecordingResizer { fail: true, ..Default::default() }
        }

        pub fn calls(&self) -> Vec<(PathBuf, Vec<u32>)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Resize for RecordingResizer {
        async fn resize(
            &self,
            source: &Path,
            widths: &[u32],
            output: &OutputSpec,
        ) -> Result<Vec<ImageVariant>, ResizeError> {
            self.calls.lock().push((source.to_path_buf(), widths.to_vec()));
            if self.fail {
                let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
                return Err(ResizeError::io(source, error));
            }

            let id = output.variant_id(source.to_string_lossy().as_bytes());
            Ok(widths.iter()
                .map(|&width| ImageVariant {
                    width,
                    url: output.url_for(&output.file_name(&id, width)),
                    dimensions: (width, width / 2),
                })
                .collect())
        }
    }
}
