use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder};

use crate::config::OutputFormat;
use crate::error::ResizeError;
use super::{proportional_height, ImageVariant, OutputSpec, Resize};

/// Resizes with the `image` crate on tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterResizer;

#[async_trait]
impl Resize for RasterResizer {
    async fn resize(
        &self,
        source: &Path,
        widths: &[u32],
        output: &OutputSpec,
    ) -> Result<Vec<ImageVariant>, ResizeError> {
        let job = Job {
            source: source.to_path_buf(),
            widths: widths.to_vec(),
            output: output.clone(),
        };

        tokio::task::spawn_blocking(move || job.run()).await?
    }
}

struct Job {
    source: PathBuf,
    widths: Vec<u32>,
    output: OutputSpec,
}

impl Job {
    fn run(self) -> Result<Vec<ImageVariant>, ResizeError> {
        log::debug!("resizing {} to widths {:?}", self.source.display(), self.widths);

        let bytes = fs::read(&self.source).map_err(|e| ResizeError::io(&self.source, e))?;
        let id = self.output.variant_id(&bytes);
        let image = image::load_from_memory(&bytes).map_err(ResizeError::Decode)?;
        drop(bytes);

        fs::create_dir_all(&self.output.output_dir)
            .map_err(|e| ResizeError::io(&self.output.output_dir, e))?;

        self.widths.iter()
            .map(|&width| self.write_variant(&image, &id, width))
            .collect()
    }

    fn write_variant(
        &self,
        image: &DynamicImage,
        id: &str,
        width: u32,
    ) -> Result<ImageVariant, ResizeError> {
        let source_dimensions = image.dimensions();
        let target = if width > source_dimensions.0 {
            log::warn!(
                "{} is {}px wide; capping the {width}px variant at source width",
                self.source.display(), source_dimensions.0
            );

            source_dimensions.0
        } else {
            width
        };

        let height = proportional_height(source_dimensions, target);
        let resized = match (target, height) == source_dimensions {
            true => image.clone(),
            false => image.resize_exact(target, height, self.output.filter.into()),
        };

        let file_name = self.output.file_name(id, width);
        let path = self.output.path_for(&file_name);
        let file = fs::File::create(&path).map_err(|e| ResizeError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        self.encode(&mut writer, &resized)
            .map_err(|source| ResizeError::Encode { width, source })?;

        writer.flush().map_err(|e| ResizeError::io(&path, e))?;
        log::debug!("wrote {} ({target}x{height})", path.display());

        Ok(ImageVariant {
            width,
            url: self.output.url_for(&file_name),
            dimensions: (target, height),
        })
    }

    fn encode<W: Write>(&self, writer: W, image: &DynamicImage) -> image::ImageResult<()> {
        let (width, height) = image.dimensions();
        match self.output.format {
            OutputFormat::Jpeg => {
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(writer, self.output.quality)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            }
            OutputFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(writer)
                    .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
            }
        }
    }
}
