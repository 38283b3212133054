//! Decoding of raw payloads into renderable images.

use image::{DynamicImage, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::domain::entities::{ImageFormat, RawImage};
use crate::domain::errors::LoadError;

/// Decodes a raw payload according to its format tag.
///
/// # Errors
/// Returns [`LoadError::UnknownFormat`] for unclassified payloads and
/// [`LoadError::Decode`] when the bytes do not decode.
pub fn decode_image(raw: &RawImage) -> Result<DynamicImage, LoadError> {
    let format = match raw.format {
        ImageFormat::Unknown => return Err(LoadError::UnknownFormat),
        ImageFormat::Svg => return rasterize_svg(&raw.data),
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Webp => image::ImageFormat::WebP,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
        ImageFormat::Tga => image::ImageFormat::Tga,
    };

    image::load_from_memory_with_format(&raw.data, format).map_err(|e| {
        LoadError::decode(format!("error loading from buffer (format: {}): {e}", raw.format))
    })
}

/// Rasterizes an SVG at its intrinsic size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rasterize_svg(data: &[u8]) -> Result<DynamicImage, LoadError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(data, &options)
        .map_err(|e| LoadError::decode(format!("failed to parse SVG: {e}")))?;

    let size = tree.size();
    let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);
    if width == 0 || height == 0 {
        return Err(LoadError::decode("SVG has zero-size dimensions"));
    }

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LoadError::decode("failed to allocate pixmap for SVG"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    RgbaImage::from_raw(width, height, rgba)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| LoadError::decode("failed to create image from SVG pixmap"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(format: image::ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(5, 3, image::Rgb([10, 200, 30])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_raster_formats() {
        for (ours, theirs) in [
            (ImageFormat::Png, image::ImageFormat::Png),
            (ImageFormat::Jpeg, image::ImageFormat::Jpeg),
            (ImageFormat::Bmp, image::ImageFormat::Bmp),
            (ImageFormat::Tga, image::ImageFormat::Tga),
        ] {
            let decoded = decode_image(&RawImage::new(encode(theirs), ours)).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (5, 3), "{ours}");
        }
    }

    #[test]
    fn test_decode_svg() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
            <rect width="20" height="10" fill="#ff0000"/>
        </svg>"##;

        let decoded = decode_image(&RawImage::new(&svg[..], ImageFormat::Svg)).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (20, 10));
        assert_eq!(decoded.to_rgba8().get_pixel(5, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_unknown_format_fails() {
        let raw = RawImage::new(encode(image::ImageFormat::Png), ImageFormat::Unknown);

        assert!(matches!(decode_image(&raw), Err(LoadError::UnknownFormat)));
    }

    #[test]
    fn test_mislabelled_payload_fails() {
        let raw = RawImage::new(&b"not a png"[..], ImageFormat::Png);

        assert!(matches!(decode_image(&raw), Err(LoadError::Decode { .. })));
    }
}
