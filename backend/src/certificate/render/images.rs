use crate::assets::{AssetStore, ImageKind};
use crate::error::AppError;
use image::{DynamicImage, GenericImageView};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use tempfile::NamedTempFile;

/// Decoded image together with the reference it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub source: String,
    pub image: DynamicImage,
}

impl LoadedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Decodes PNG or JPEG bytes, choosing the decoder from the byte signature.
pub fn decode(bytes: &[u8]) -> Option<DynamicImage> {
    let kind = ImageKind::sniff(bytes)?;
    image::load_from_memory_with_format(bytes, kind.image_format()).ok()
}

/// Loads the image behind `reference`, or `None` when it cannot be fetched
/// or decoded. Failures are logged, never propagated.
pub fn load(assets: &AssetStore, reference: Option<&str>) -> Option<LoadedImage> {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;
    let bytes = match assets.fetch(reference) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Cannot load image {}: {}", reference, e);
            return None;
        }
    };
    match decode(&bytes) {
        Some(image) => Some(LoadedImage {
            source: reference.to_string(),
            image,
        }),
        None => {
            log::warn!("Image {} is not a decodable PNG or JPEG, skipping it", reference);
            None
        }
    }
}

/// Flattens alpha over white and writes an 8-bit RGB PNG the PDF writer can embed.
pub fn write_temp_png(img: &DynamicImage) -> Result<NamedTempFile, AppError> {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let raw = DynamicImage::ImageRgba8(background).to_rgb8().into_raw();

    let mut tmp = tempfile::Builder::new().suffix(".png").tempfile()?;
    {
        let file = tmp.as_file_mut();
        let mut encoder = PngEncoder::new(file, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::Render(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(&raw)
            .map_err(|e| AppError::Render(format!("PNG data: {}", e)))?;
    }
    Ok(tmp)
}
