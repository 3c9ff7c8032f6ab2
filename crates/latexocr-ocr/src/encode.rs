use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use latexocr_types::{CapturedImage, ImageFormat, OcrError};

const JPEG_QUALITY: u8 = 90;

/// Encode the bitmap and wrap it in a `data:` URI
pub fn to_data_uri(image: &CapturedImage, format: ImageFormat) -> Result<String, OcrError> {
    let bytes = encode_image(image, format)?;
    Ok(format!("data:{};base64,{}", format.mime(), STANDARD.encode(&bytes)))
}

pub fn encode_image(image: &CapturedImage, format: ImageFormat) -> Result<Vec<u8>, OcrError> {
    if image.is_empty() {
        return Err(OcrError::Encoding("empty image".to_string()));
    }

    let mut buffer = Vec::new();
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut buffer)
                .write_image(&image.rgba, image.width, image.height, ExtendedColorType::Rgba8)
                .map_err(|e| OcrError::Encoding(e.to_string()))?;
        }
        ImageFormat::Jpeg => {
            let rgba = RgbaImage::from_raw(image.width, image.height, image.rgba.clone())
                .ok_or_else(|| OcrError::Encoding("buffer size mismatch".to_string()))?;
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| OcrError::Encoding(e.to_string()))?;
        }
    }

    Ok(buffer)
}
