//! Logo download and background removal.
//!
//! Logos commonly ship on a white card; near-white pixels are made
//! transparent so the logo composites cleanly over video.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, RgbaImage};
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Channel value above which a pixel counts as "near white".
const WHITE_THRESHOLD: u8 = 200;

/// Timeout for a logo download.
const LOGO_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Download a logo, strip its white background, and write a PNG into
/// `workdir`.
pub async fn fetch_logo(url: &str, workdir: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let client = reqwest::Client::builder()
        .timeout(LOGO_FETCH_TIMEOUT)
        .user_agent("Mozilla/5.0")
        .build()
        .map_err(|e| MediaError::fetch_failed(url, e.to_string()))?;

    let bytes = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| MediaError::fetch_failed(url, e.to_string()))?
        .bytes()
        .await
        .map_err(|e| MediaError::fetch_failed(url, e.to_string()))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| MediaError::InvalidImage(format!("{url}: {e}")))?;

    let processed = remove_white_background(image);

    let dest = workdir
        .as_ref()
        .join(format!("logo-{:08x}.png", fingerprint(url)));
    processed
        .save(&dest)
        .map_err(|e| MediaError::InvalidImage(format!("failed to write {}: {e}", dest.display())))?;

    info!("Logo processed: {} -> {}", url, dest.display());
    Ok(dest)
}

/// Make near-white pixels fully transparent.
fn remove_white_background(image: DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
            pixel.0 = [255, 255, 255, 0];
        }
    }
    rgba
}

fn fingerprint(url: &str) -> u32 {
    url.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(b as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_white_pixels_become_transparent() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let out = remove_white_background(DynamicImage::ImageRgba8(img));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(1, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut img = RgbaImage::new(1, 1);
        // Exactly at the threshold stays opaque; removal requires strictly above
        img.put_pixel(0, 0, Rgba([200, 200, 200, 255]));
        let out = remove_white_background(DynamicImage::ImageRgba8(img));
        assert_eq!(out.get_pixel(0, 0).0[3], 255);
    }
}
