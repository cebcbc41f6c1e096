use super::{ArtifactError, BarcodeGeometry};
use image::{codecs::png::PngEncoder, ColorType, GrayImage, ImageEncoder, Luma};

const BAR: Luma<u8> = Luma([0]);
const SPACE: Luma<u8> = Luma([255]);

/// Draws encoded modules as a grayscale image, with the quiet zone on both
/// sides.
pub fn rasterize(modules: &[bool], geometry: &BarcodeGeometry) -> Result<GrayImage, ArtifactError> {
    let module_width = geometry.module_width.max(1);
    let width = u32::try_from(modules.len())
        .ok()
        .and_then(|n| n.checked_add(geometry.quiet_zone.checked_mul(2)?))
        .and_then(|n| n.checked_mul(module_width))
        .ok_or_else(|| ArtifactError::Encode("barcode too wide".to_string()))?;
    let height = geometry.height.max(1);

    let mut img = GrayImage::from_pixel(width, height, SPACE);
    let offset = geometry.quiet_zone * module_width;

    for (index, _) in modules.iter().enumerate().filter(|(_, bar)| **bar) {
        let x0 = offset + index as u32 * module_width;
        for x in x0..x0 + module_width {
            for y in 0..height {
                img.put_pixel(x, y, BAR);
            }
        }
    }

    Ok(img)
}

pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, ArtifactError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::L8)
        .map_err(|e| ArtifactError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn geometry() -> BarcodeGeometry {
        BarcodeGeometry {
            module_width: 2,
            height: 20,
            quiet_zone: 10,
        }
    }

    #[test]
    fn rasterize_scales_modules_and_adds_quiet_zone() {
        let img = rasterize(&[true, false, true], &geometry()).unwrap();
        assert_eq!(img.width(), (3 + 20) * 2);
        assert_eq!(img.height(), 20);

        // Quiet zone is white, first module black, second white
        assert_eq!(img.get_pixel(0, 0), &SPACE);
        assert_eq!(img.get_pixel(19, 5), &SPACE);
        assert_eq!(img.get_pixel(20, 5), &BAR);
        assert_eq!(img.get_pixel(21, 19), &BAR);
        assert_eq!(img.get_pixel(22, 5), &SPACE);
        assert_eq!(img.get_pixel(24, 5), &BAR);
    }

    #[test]
    fn png_output_has_signature() {
        let img = rasterize(&[true, false], &geometry()).unwrap();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }
}
