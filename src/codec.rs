//! Pixel-level work: probing, resizing and re-encoding images.

use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::error::ImageError;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

use crate::query::{ImageType, TransformParams};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("{0} output is not supported")]
    UnsupportedOutput(ImageType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The image-processing capability the resizer delegates to.
pub trait ImageCodec: Send + Sync {
    /// Intrinsic size of the encoded image, read from its header.
    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, CodecError>;

    /// Resizes `data` per `params` and encodes it as `params.format`.
    fn transform(&self, data: &[u8], params: &TransformParams) -> Result<Vec<u8>, CodecError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    filter: FilterType,
}

impl Default for RasterCodec {
    fn default() -> Self {
        RasterCodec {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageCodec for RasterCodec {
    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Dimensions { width, height })
    }

    fn transform(&self, data: &[u8], params: &TransformParams) -> Result<Vec<u8>, CodecError> {
        if params.format == ImageType::Svg {
            return Err(CodecError::UnsupportedOutput(params.format));
        }

        let mut decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        // pixels stay in stored order; the EXIF block travels with them
        let exif = decoder.exif_metadata()?;
        if let Some(chunk) = &exif {
            debug!(
                orientation = ?Orientation::from_exif_chunk(chunk),
                "carrying EXIF metadata into output"
            );
        }
        let img = DynamicImage::from_decoder(decoder)?;
        let resized = self.resize(&img, params.width, params.height);

        encode_image(&resized, params.format, params.quality, exif)
    }
}

impl RasterCodec {
    /// Both sides given: scale to cover the box, then centre-crop to it.
    /// One side given: scale by that side, keeping the aspect ratio.
    fn resize(&self, img: &DynamicImage, width: Option<u32>, height: Option<u32>) -> DynamicImage {
        match (width, height) {
            (Some(w), Some(h)) => img.resize_to_fill(w, h, self.filter),
            (Some(w), None) => {
                let h = scale_side(img.height(), w, img.width());
                img.resize_exact(w, h, self.filter)
            }
            (None, Some(h)) => {
                let w = scale_side(img.width(), h, img.height());
                img.resize_exact(w, h, self.filter)
            }
            (None, None) => img.clone(),
        }
    }
}

/// `side * target / reference`, rounded, never below one pixel.
fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    let scaled = (side as f64 * target as f64 / reference.max(1) as f64).round() as u32;
    scaled.max(1)
}

/// Encodes `img` as `format`. JPEG, PNG and WebP outputs also carry `exif`;
/// GIF and TIFF have no slot for it and drop it.
pub fn encode_image(
    img: &DynamicImage,
    format: ImageType,
    quality: u8,
    exif: Option<Vec<u8>>,
) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ImageType::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            write_with_exif(&DynamicImage::ImageRgb8(img.to_rgb8()), encoder, exif)?;
        }
        ImageType::Png => write_with_exif(img, PngEncoder::new(&mut buf), exif)?,
        ImageType::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, ImageFormat::Gif)?
        }
        ImageType::WebP => {
            // the pure-Rust WebP encoder is lossless only, quality does not apply
            let encoder = WebPEncoder::new_lossless(&mut buf);
            write_with_exif(&DynamicImage::ImageRgba8(img.to_rgba8()), encoder, exif)?;
        }
        ImageType::Tiff => img.write_to(&mut buf, ImageFormat::Tiff)?,
        ImageType::Svg => return Err(CodecError::UnsupportedOutput(format)),
    }

    Ok(buf.into_inner())
}

fn write_with_exif(
    img: &DynamicImage,
    mut encoder: impl ImageEncoder,
    exif: Option<Vec<u8>>,
) -> Result<(), CodecError> {
    if let Some(exif) = exif {
        encoder
            .set_exif_metadata(exif)
            .map_err(ImageError::Unsupported)?;
    }
    img.write_with_encoder(encoder)?;
    Ok(())
}
