//! Photo resampling before processing and result saving after.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use image::imageops::FilterType;
use image::DynamicImage;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Downsample `photo` so its larger side is at most `max_dimension`.
///
/// Returns the (possibly unchanged) photo and the factor applied to it, so
/// face coordinates measured on the original can be mapped across.
/// `max_dimension == 0` disables resampling.
pub fn resample(photo: DynamicImage, max_dimension: u32) -> (DynamicImage, f32) {
    let (src_w, src_h) = (photo.width(), photo.height());
    let larger = src_w.max(src_h);
    if max_dimension == 0 || larger <= max_dimension {
        return (photo, 1.0);
    }

    let scale = max_dimension as f64 / larger as f64;
    let new_w = ((src_w as f64 * scale).round() as u32).max(1);
    let new_h = ((src_h as f64 * scale).round() as u32).max(1);

    tracing::debug!(src_w, src_h, new_w, new_h, "resampling photo");
    (photo.resize_exact(new_w, new_h, FilterType::Lanczos3), scale as f32)
}

/// `Emojify_<yyyyMMdd_HHmmss>.jpg`
pub fn output_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("Emojify_{}.jpg", at.format("%Y%m%d_%H%M%S"))
}

/// Output path: the explicit one, or a timestamped file in `output_dir`.
pub fn resolve_output_path(explicit: Option<PathBuf>, output_dir: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| output_dir.join(output_file_name(&chrono::Local::now())))
}

/// Save `image`, creating parent directories. JPEG has no alpha channel
/// or 16-bit support, so JPEG targets are flattened to 8-bit RGB first.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    let result = if is_jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    result.with_context(|| format!("saving {}", path.display()))?;

    tracing::info!(path = %path.display(), "saved result");
    Ok(())
}
