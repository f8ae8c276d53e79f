use anyhow::Context;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// Frames are rewritten many times a second, so favour speed over size.
pub fn encode_frame_png(img: &RgbImage) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(img.as_raw().len() / 4);
    PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::Sub)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .context("Failed to encode chart frame as PNG")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_encode_frame_png() {
        let img = RgbImage::from_pixel(4, 3, Rgb([22, 26, 30]));
        let png = encode_frame_png(&img).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(3, 2), &Rgb([22, 26, 30]));
    }
}
