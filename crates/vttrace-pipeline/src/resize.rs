//! Image resizing to one of the upstream service's supported buckets.
//!
//! The image-edit service only accepts three fixed resolutions. The
//! resizer picks the bucket whose nominal aspect ratio is closest to
//! the source image's, then resamples to that bucket's exact
//! dimensions with a Lanczos filter. Aspect-fit is approximate by
//! design: the downstream coordinate rescale undoes any stretch with
//! independent X/Y factors.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::types::{Dimensions, PipelineError, SizeBucket};

/// Resampling filter for bucket resizing.
const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Pick the bucket whose nominal aspect ratio is closest to the
/// source aspect ratio. Ties resolve to the earliest bucket in
/// [`SizeBucket::ALL`] declaration order.
#[must_use]
pub fn select_bucket(source: Dimensions) -> SizeBucket {
    let aspect = source.aspect();
    SizeBucket::ALL
        .into_iter()
        .min_by(|a, b| {
            let da = (a.aspect() - aspect).abs();
            let db = (b.aspect() - aspect).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(SizeBucket::Square)
}

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] on unparseable data.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Resize an already-decoded image to its best-matching bucket.
#[must_use]
pub fn resize_image(image: &DynamicImage) -> (DynamicImage, SizeBucket) {
    let bucket = select_bucket(Dimensions {
        width: image.width(),
        height: image.height(),
    });
    let target = bucket.dimensions();
    let resized = image.resize_exact(target.width, target.height, RESIZE_FILTER);
    (resized, bucket)
}

/// Decode raw image bytes and resize to the best-matching bucket.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] when the input cannot be decoded.
pub fn resize(bytes: &[u8]) -> Result<(DynamicImage, SizeBucket), PipelineError> {
    let image = decode(bytes)?;
    Ok(resize_image(&image))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 180, 160, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn square_source_selects_square() {
        let bucket = select_bucket(Dimensions {
            width: 800,
            height: 800,
        });
        assert_eq!(bucket, SizeBucket::Square);
    }

    #[test]
    fn wide_source_selects_landscape() {
        let bucket = select_bucket(Dimensions {
            width: 1920,
            height: 1080,
        });
        assert_eq!(bucket, SizeBucket::Landscape);
    }

    #[test]
    fn tall_source_selects_portrait() {
        // 512x768 is the canonical portrait scenario: aspect 0.6667,
        // nearly exactly the portrait bucket's published 0.667.
        let bucket = select_bucket(Dimensions {
            width: 512,
            height: 768,
        });
        assert_eq!(bucket, SizeBucket::Portrait);
    }

    #[test]
    fn resize_output_matches_bucket_dimensions_exactly() {
        let (resized, bucket) = resize(&png_bytes(512, 768)).unwrap();
        assert_eq!(bucket, SizeBucket::Portrait);
        assert_eq!(resized.width(), 1024);
        assert_eq!(resized.height(), 1536);
    }

    #[test]
    fn resize_always_lands_on_a_canonical_bucket() {
        for (w, h) in [(100, 99), (3000, 1000), (640, 480), (333, 777)] {
            let (resized, bucket) = resize(&png_bytes(w, h)).unwrap();
            let target = bucket.dimensions();
            assert_eq!(resized.width(), target.width);
            assert_eq!(resized.height(), target.height);
            assert!(SizeBucket::ALL.contains(&bucket));
        }
    }

    #[test]
    fn empty_bytes_fail() {
        assert!(matches!(resize(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_fail_with_decode_error() {
        assert!(matches!(
            resize(&[1, 2, 3, 4]),
            Err(PipelineError::ImageDecode(_))
        ));
    }
}
