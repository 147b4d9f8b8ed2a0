//! Emoji compositor.
//!
//! Scales each face's emoji to the face box and draws it onto a copy of the
//! photo. Work is split in two phases: rendering an [`Overlay`] per face
//! (classify, look up, place, sample) is pure and independent per face;
//! drawing is a strict left fold over the overlays in detector order, so a
//! later face paints over an earlier one where their emojis overlap.

use crate::assets::AssetLookup;
use crate::classifier::classify;
use crate::notice::Notice;
use crate::types::{BoundingBox, EmojiCategory, FaceObservation};
use image::imageops;
use image::{ColorType, DynamicImage, GenericImageView, ImageBuffer, Pixel, Primitive, Rgba};
use std::borrow::Cow;
use thiserror::Error;

/// Emoji width relative to the face box width.
pub const EMOJI_SCALE_FACTOR: f32 = 0.9;

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("photo has zero width or height")]
    EmptyImage,
    #[error("scale factor must be finite and positive, got {0}")]
    InvalidScaleFactor(f32),
}

/// Emoji sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorConfig {
    pub scale_factor: f32,
    /// Apply `scale_factor` a second time to the emoji height.
    ///
    /// The width is already scaled, so the height ends up scaled twice and
    /// the emoji is squashed vertically. On by default; turn off for
    /// aspect-exact emojis.
    pub double_scale: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            scale_factor: EMOJI_SCALE_FACTOR,
            double_scale: true,
        }
    }
}

/// Target emoji size for a face box.
///
/// `width = round(face.width * s)`,
/// `height = round(emoji_height * width / emoji_width * s)` with double scaling,
/// or without the trailing `* s` when it is disabled.
pub fn emoji_size(face: &BoundingBox, emoji_width: u32, emoji_height: u32, config: &CompositorConfig) -> (u32, u32) {
    let new_width = (face.width * config.scale_factor).round();
    let mut new_height = emoji_height as f32 * new_width / emoji_width as f32;
    if config.double_scale {
        new_height *= config.scale_factor;
    }
    // Float-to-int `as` saturates and maps NaN to 0.
    (new_width as u32, new_height.round() as u32)
}

/// Top-left corner for a scaled emoji: centered horizontally on the face,
/// and a third of the emoji height above the face's vertical center.
pub fn emoji_position(face: &BoundingBox, scaled_width: u32, scaled_height: u32) -> (i64, i64) {
    let x = face.center_x() - scaled_width as f32 / 2.0;
    let y = face.center_y() - scaled_height as f32 / 3.0;
    (x.round() as i64, y.round() as i64)
}

/// The part of a face's emoji that lands on the canvas, ready to draw.
///
/// `image` holds only the visible window of the scaled emoji; `x`/`y` is
/// where that window goes on the canvas and is never negative.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Index of the face in detector order.
    pub face: usize,
    pub category: EmojiCategory,
    /// Full scaled emoji size, before clipping.
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub image: DynamicImage,
    pub x: i64,
    pub y: i64,
}

/// Placement of a scaled emoji clipped to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    x: i64,
    y: i64,
    /// Scaled-emoji pixels cut off on the left and top.
    skip_x: u64,
    skip_y: u64,
    width: u32,
    height: u32,
}

impl Window {
    fn clip(x: i64, y: i64, width: u32, height: u32, canvas: (u32, u32)) -> Option<Self> {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(i64::from(width)).min(i64::from(canvas.0));
        let bottom = y.saturating_add(i64::from(height)).min(i64::from(canvas.1));
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            skip_x: left.abs_diff(x),
            skip_y: top.abs_diff(y),
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Result of a compositing pass.
#[derive(Debug, Clone)]
pub struct Composite<'a> {
    /// Borrowed original when no faces were given, otherwise a fresh buffer.
    pub image: Cow<'a, DynamicImage>,
    pub notices: Vec<Notice>,
    pub overlays_drawn: usize,
}

/// Draws emojis over detected faces.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Result<Self, CompositeError> {
        if !config.scale_factor.is_finite() || config.scale_factor <= 0.0 {
            return Err(CompositeError::InvalidScaleFactor(config.scale_factor));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Classify one face and build its emoji overlay for a canvas of
    /// `canvas` (width, height).
    ///
    /// Only the part of the scaled emoji that falls on the canvas is
    /// sampled, so the cost is bounded by the canvas whatever the face box.
    /// Returns the notice to surface when the face cannot be drawn.
    pub fn render_overlay(
        &self,
        index: usize,
        face: &FaceObservation,
        canvas: (u32, u32),
        assets: &impl AssetLookup,
    ) -> Result<Overlay, Notice> {
        let bbox = &face.bounding_box;
        if !bbox.is_valid() {
            return Err(Notice::InvalidFaceGeometry { face: index });
        }

        let category = classify(face);
        let emoji = assets
            .emoji_for(category)
            .filter(|e| e.width() > 0 && e.height() > 0)
            .ok_or(Notice::NoEmojiForFace { face: index, category })?;

        let (width, height) = emoji_size(bbox, emoji.width(), emoji.height(), &self.config);
        if width == 0 || height == 0 {
            return Err(Notice::InvalidFaceGeometry { face: index });
        }

        let (x, y) = emoji_position(bbox, width, height);
        let Some(window) = Window::clip(x, y, width, height, canvas) else {
            tracing::debug!(face = index, x, y, width, height, "emoji entirely off canvas");
            return Err(Notice::InvalidFaceGeometry { face: index });
        };
        let image = sample_window(emoji, (width, height), &window);

        tracing::debug!(
            face = index,
            %category,
            width,
            height,
            x,
            y,
            visible_width = window.width,
            visible_height = window.height,
            "rendered overlay"
        );

        Ok(Overlay {
            face: index,
            category,
            scaled_width: width,
            scaled_height: height,
            image,
            x: window.x,
            y: window.y,
        })
    }

    /// Render every face's overlay, in detector order.
    ///
    /// Faces do not depend on each other here; only drawing is ordered.
    pub fn render_overlays(
        &self,
        faces: &[FaceObservation],
        canvas: (u32, u32),
        assets: &impl AssetLookup,
    ) -> Vec<Result<Overlay, Notice>> {
        faces
            .iter()
            .enumerate()
            .map(|(i, face)| self.render_overlay(i, face, canvas, assets))
            .collect()
    }

    /// Overlay an emoji on each face of `photo`.
    ///
    /// The photo is never modified. With no faces the original is handed
    /// back as-is with a [`Notice::NoFacesDetected`]. Faces that cannot be
    /// drawn are skipped with a notice; the rest are still drawn.
    pub fn composite<'a>(
        &self,
        photo: &'a DynamicImage,
        faces: &[FaceObservation],
        assets: &impl AssetLookup,
    ) -> Result<Composite<'a>, CompositeError> {
        if photo.width() == 0 || photo.height() == 0 {
            return Err(CompositeError::EmptyImage);
        }

        if faces.is_empty() {
            tracing::info!("no faces detected; returning original photo");
            return Ok(Composite {
                image: Cow::Borrowed(photo),
                notices: vec![Notice::NoFacesDetected],
                overlays_drawn: 0,
            });
        }

        let mut notices = Vec::new();
        let mut overlays = Vec::with_capacity(faces.len());
        for rendered in self.render_overlays(faces, photo.dimensions(), assets) {
            match rendered {
                Ok(overlay) => overlays.push(overlay),
                Err(notice) => {
                    tracing::warn!(%notice, "skipping face");
                    notices.push(notice);
                }
            }
        }

        let overlays_drawn = overlays.len();
        let canvas = overlays
            .iter()
            .fold(Canvas::from_image(photo), Canvas::with_overlay);

        tracing::debug!(faces = faces.len(), overlays_drawn, "composite complete");

        Ok(Composite {
            image: Cow::Owned(canvas.into_color(photo.color())),
            notices,
            overlays_drawn,
        })
    }
}

/// Working canvas: RGBA at the photo's sample depth.
enum Canvas {
    Rgba8(ImageBuffer<Rgba<u8>, Vec<u8>>),
    Rgba16(ImageBuffer<Rgba<u16>, Vec<u16>>),
    Rgba32F(ImageBuffer<Rgba<f32>, Vec<f32>>),
}

impl Canvas {
    fn from_image(image: &DynamicImage) -> Self {
        match image.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
                Canvas::Rgba16(image.to_rgba16())
            }
            ColorType::Rgb32F | ColorType::Rgba32F => Canvas::Rgba32F(image.to_rgba32f()),
            _ => Canvas::Rgba8(image.to_rgba8()),
        }
    }

    fn with_overlay(mut self, overlay: &Overlay) -> Self {
        match &mut self {
            Canvas::Rgba8(c) => imageops::overlay(c, &overlay.image.to_rgba8(), overlay.x, overlay.y),
            Canvas::Rgba16(c) => imageops::overlay(c, &overlay.image.to_rgba16(), overlay.x, overlay.y),
            Canvas::Rgba32F(c) => imageops::overlay(c, &overlay.image.to_rgba32f(), overlay.x, overlay.y),
        }
        self
    }

    /// Convert back to the photo's color type.
    fn into_color(self, color: ColorType) -> DynamicImage {
        let image = match self {
            Canvas::Rgba8(c) => DynamicImage::ImageRgba8(c),
            Canvas::Rgba16(c) => DynamicImage::ImageRgba16(c),
            Canvas::Rgba32F(c) => DynamicImage::ImageRgba32F(c),
        };
        match color {
            ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
            ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
            ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
            ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
            ColorType::La16 => DynamicImage::ImageLumaA16(image.to_luma_alpha16()),
            ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
            ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
            _ => image,
        }
    }
}

/// Nearest-neighbor sample of the visible `window` of `emoji` scaled to
/// `scaled` (width, height), at the emoji's sample depth.
fn sample_window(emoji: &DynamicImage, scaled: (u32, u32), window: &Window) -> DynamicImage {
    match Canvas::from_image(emoji) {
        Canvas::Rgba8(src) => DynamicImage::ImageRgba8(nearest_window(&src, scaled, window)),
        Canvas::Rgba16(src) => DynamicImage::ImageRgba16(nearest_window(&src, scaled, window)),
        Canvas::Rgba32F(src) => DynamicImage::ImageRgba32F(nearest_window(&src, scaled, window)),
    }
}

fn nearest_window<T>(
    src: &ImageBuffer<Rgba<T>, Vec<T>>,
    scaled: (u32, u32),
    window: &Window,
) -> ImageBuffer<Rgba<T>, Vec<T>>
where
    T: Primitive + 'static,
    Rgba<T>: Pixel<Subpixel = T>,
{
    let ratio_x = src.width() as f32 / scaled.0 as f32;
    let ratio_y = src.height() as f32 / scaled.1 as f32;
    ImageBuffer::from_fn(window.width, window.height, |wx, wy| {
        let sx = nearest_source(window.skip_x + u64::from(wx), ratio_x, src.width());
        let sy = nearest_source(window.skip_y + u64::from(wy), ratio_y, src.height());
        *src.get_pixel(sx, sy)
    })
}

/// Source pixel whose footprint contains the center of output pixel `out`.
fn nearest_source(out: u64, ratio: f32, len: u32) -> u32 {
    (((out as f32 + 0.5) * ratio).floor() as u32).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage, RgbaImage};
    use std::collections::HashMap;

    const GRAY: Rgb<u8> = Rgb([50, 50, 50]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn photo(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, GRAY))
    }

    fn solid_emoji(w: u32, h: u32, color: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, color))
    }

    fn smiling_face(x: f32, y: f32, w: f32, h: f32) -> FaceObservation {
        FaceObservation::new(BoundingBox::new(x, y, w, h), 0.9, 0.9, 0.9)
    }

    fn frowning_face(x: f32, y: f32, w: f32, h: f32) -> FaceObservation {
        FaceObservation::new(BoundingBox::new(x, y, w, h), 0.1, 0.9, 0.9)
    }

    fn assets() -> HashMap<EmojiCategory, DynamicImage> {
        let mut map = HashMap::new();
        map.insert(EmojiCategory::Smile, solid_emoji(10, 10, RED));
        map.insert(EmojiCategory::Frown, solid_emoji(10, 10, BLUE));
        map
    }

    #[test]
    fn test_emoji_width_scales_linearly() {
        let config = CompositorConfig::default();
        for w in [10.0f32, 37.0, 100.0, 250.0, 1000.0] {
            let face = BoundingBox::new(0.0, 0.0, w, w);
            let (new_w, _) = emoji_size(&face, 64, 64, &config);
            assert_eq!(new_w, (w * EMOJI_SCALE_FACTOR).round() as u32, "face width {w}");
        }
    }

    #[test]
    fn test_emoji_height_double_scaled() {
        let face = BoundingBox::new(0.0, 0.0, 200.0, 200.0);
        // 40x20 emoji: width 180, aspect height 90, then * 0.9 again.
        let (w, h) = emoji_size(&face, 40, 20, &CompositorConfig::default());
        assert_eq!((w, h), (180, 81));
    }

    #[test]
    fn test_emoji_height_single_scaled() {
        let face = BoundingBox::new(0.0, 0.0, 200.0, 200.0);
        let config = CompositorConfig { double_scale: false, ..Default::default() };
        let (w, h) = emoji_size(&face, 40, 20, &config);
        assert_eq!((w, h), (180, 90));
    }

    #[test]
    fn test_emoji_position() {
        let face = BoundingBox::new(100.0, 50.0, 200.0, 200.0);
        assert_eq!(emoji_position(&face, 180, 81), (110, 123));
    }

    #[test]
    fn test_emoji_position_can_go_negative() {
        let face = BoundingBox::new(-40.0, -40.0, 50.0, 50.0);
        let (x, y) = emoji_position(&face, 45, 45);
        assert_eq!((x, y), (-38, -30));
    }

    #[test]
    fn test_invalid_scale_factor() {
        for s in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let config = CompositorConfig { scale_factor: s, double_scale: true };
            assert!(matches!(Compositor::new(config), Err(CompositeError::InvalidScaleFactor(_))));
        }
    }

    #[test]
    fn test_zero_faces_returns_original() {
        let photo = photo(32, 24);
        let result = Compositor::default().composite(&photo, &[], &assets()).unwrap();

        assert!(matches!(result.image, Cow::Borrowed(_)));
        assert_eq!(result.image.as_bytes(), photo.as_bytes());
        assert_eq!(result.notices, vec![Notice::NoFacesDetected]);
        assert_eq!(result.overlays_drawn, 0);
    }

    #[test]
    fn test_empty_photo_is_error() {
        let photo = DynamicImage::new_rgb8(0, 10);
        let faces = [smiling_face(0.0, 0.0, 10.0, 10.0)];
        let result = Compositor::default().composite(&photo, &faces, &assets());
        assert!(matches!(result, Err(CompositeError::EmptyImage)));
    }

    #[test]
    fn test_one_face_paints_only_emoji_region() {
        let original = photo(200, 200);
        let faces = [smiling_face(50.0, 50.0, 100.0, 100.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 1);
        assert!(result.notices.is_empty());

        let out = result.image.to_rgb8();
        assert_eq!(out.dimensions(), (200, 200));
        assert_eq!(result.image.color(), ColorType::Rgb8);

        // 10x10 emoji → 90 wide, 10 * 90 / 10 * 0.9 = 81 tall.
        // x = 100 - 45 = 55, y = 100 - 27 = 73.
        let inside = |x: u32, y: u32| (55..145).contains(&x) && (73..154).contains(&y);
        for (x, y, p) in out.enumerate_pixels() {
            if inside(x, y) {
                assert_eq!(*p, Rgb([255, 0, 0]), "({x}, {y}) should be emoji");
            } else {
                assert_eq!(*p, GRAY, "({x}, {y}) should be untouched");
            }
        }
    }

    #[test]
    fn test_original_not_mutated() {
        let original = photo(64, 64);
        let before = original.as_bytes().to_vec();
        let faces = [smiling_face(10.0, 10.0, 40.0, 40.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert!(matches!(result.image, Cow::Owned(_)));
        assert_eq!(original.as_bytes(), &before[..]);
        assert_ne!(result.image.as_bytes(), &before[..]);
    }

    #[test]
    fn test_later_face_draws_on_top() {
        let original = photo(100, 100);
        let faces = [
            smiling_face(20.0, 20.0, 60.0, 60.0),
            frowning_face(20.0, 20.0, 60.0, 60.0),
        ];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();
        assert_eq!(result.overlays_drawn, 2);

        let out = result.image.to_rgb8();
        assert_eq!(*out.get_pixel(50, 50), Rgb([0, 0, 255]));
    }

    #[test]
    fn test_missing_asset_skips_face() {
        let original = photo(100, 100);
        let faces = [
            FaceObservation::new(BoundingBox::new(10.0, 10.0, 30.0, 30.0), 0.9, 0.1, 0.9),
            smiling_face(50.0, 50.0, 40.0, 40.0),
        ];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 1);
        assert_eq!(
            result.notices,
            vec![Notice::NoEmojiForFace { face: 0, category: EmojiCategory::LeftWink }]
        );
        let out = result.image.to_rgb8();
        assert_eq!(*out.get_pixel(25, 25), GRAY);
    }

    #[test]
    fn test_no_assets_at_all_keeps_pixels() {
        let original = photo(50, 50);
        let faces = [smiling_face(5.0, 5.0, 20.0, 20.0), frowning_face(25.0, 25.0, 20.0, 20.0)];
        let empty: HashMap<EmojiCategory, DynamicImage> = HashMap::new();
        let result = Compositor::default().composite(&original, &faces, &empty).unwrap();

        assert_eq!(result.overlays_drawn, 0);
        assert_eq!(result.notices.len(), 2);
        assert_eq!(result.image.as_bytes(), original.as_bytes());
    }

    #[test]
    fn test_invalid_geometry_skips_face() {
        let original = photo(100, 100);
        let faces = [
            smiling_face(10.0, 10.0, 0.0, 30.0),
            smiling_face(10.0, 10.0, 30.0, -5.0),
            smiling_face(f32::NAN, 10.0, 30.0, 30.0),
            // Rounds to a zero-width emoji.
            smiling_face(10.0, 10.0, 0.4, 0.4),
            smiling_face(40.0, 40.0, 30.0, 30.0),
        ];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 1);
        let skipped: Vec<_> = result.notices.iter().filter_map(Notice::face).collect();
        assert_eq!(skipped, vec![0, 1, 2, 3]);
        assert!(result
            .notices
            .iter()
            .all(|n| matches!(n, Notice::InvalidFaceGeometry { .. })));
    }

    #[test]
    fn test_never_more_draws_than_faces() {
        let original = photo(120, 120);
        let faces: Vec<_> = (0..6)
            .map(|i| smiling_face(i as f32 * 20.0, 10.0, 18.0, 18.0))
            .collect();
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();
        assert_eq!(result.overlays_drawn + result.notices.len(), faces.len());
        assert!(result.overlays_drawn <= faces.len());
    }

    #[test]
    fn test_face_partly_off_canvas() {
        let original = photo(40, 40);
        let faces = [smiling_face(-30.0, -30.0, 50.0, 50.0), smiling_face(20.0, 20.0, 50.0, 50.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 2);
        let out = result.image.to_rgb8();
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(39, 39), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_transparent_emoji_pixels_leave_photo() {
        let original = photo(100, 100);
        let mut emoji = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        emoji.put_pixel(5, 5, RED);
        let mut map = HashMap::new();
        map.insert(EmojiCategory::Smile, DynamicImage::ImageRgba8(emoji));

        let faces = [smiling_face(0.0, 0.0, 100.0, 100.0)];
        let result = Compositor::default().composite(&original, &faces, &map).unwrap();

        let out = result.image.to_rgb8();
        let painted = out.pixels().filter(|p| **p != GRAY).count();
        // One source pixel scales to a 9x~8 block under nearest-neighbor.
        assert!(painted > 0 && painted < 100, "painted {painted}");
        assert_eq!(*out.get_pixel(0, 0), GRAY);
    }

    #[test]
    fn test_half_transparent_emoji_blends() {
        let original = photo(20, 20);
        let mut map = HashMap::new();
        map.insert(EmojiCategory::Smile, solid_emoji(4, 4, Rgba([250, 250, 250, 128])));

        let faces = [smiling_face(0.0, 0.0, 20.0, 20.0)];
        let result = Compositor::default().composite(&original, &faces, &map).unwrap();

        let p = *result.image.to_rgb8().get_pixel(10, 10);
        assert!(p[0] > GRAY[0] && p[0] < 250, "blended value {}", p[0]);
    }

    #[test]
    fn test_grayscale_photo_keeps_color_type() {
        let original = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(60, 60, Luma([77])));
        let faces = [smiling_face(10.0, 10.0, 40.0, 40.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.image.color(), ColorType::L8);
        let out = result.image.to_luma8();
        assert_eq!(*out.get_pixel(0, 0), Luma([77]));
        assert_ne!(*out.get_pixel(30, 30), Luma([77]));
    }

    #[test]
    fn test_sixteen_bit_photo_keeps_depth() {
        let original = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(40, 40, Rgb([1234u16, 5678, 9012])));
        let faces = [smiling_face(5.0, 5.0, 30.0, 30.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.image.color(), ColorType::Rgb16);
        let out = result.image.to_rgb16();
        assert_eq!(*out.get_pixel(0, 0), Rgb([1234, 5678, 9012]));
        assert_eq!(*out.get_pixel(20, 20), Rgb([u16::MAX, 0, 0]));
    }

    #[test]
    fn test_render_overlays_independent_of_order() {
        let compositor = Compositor::default();
        let a = smiling_face(0.0, 0.0, 40.0, 40.0);
        let b = frowning_face(50.0, 50.0, 20.0, 20.0);
        let assets = assets();

        let forward = compositor.render_overlays(&[a, b], (100, 100), &assets);
        let reverse = compositor.render_overlays(&[b, a], (100, 100), &assets);

        let f0 = forward[0].as_ref().unwrap();
        let r1 = reverse[1].as_ref().unwrap();
        assert_eq!((f0.x, f0.y, f0.category), (r1.x, r1.y, r1.category));
        assert_eq!(f0.image.as_bytes(), r1.image.as_bytes());
    }

    #[test]
    fn test_huge_face_box_is_skipped_and_others_drawn() {
        let original = photo(100, 100);
        let faces = [
            smiling_face(10.0, 10.0, 30.0, 30.0),
            smiling_face(0.0, 0.0, 1e10, 1e10),
        ];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 1);
        assert_eq!(result.notices, vec![Notice::InvalidFaceGeometry { face: 1 }]);
        let out = result.image.to_rgb8();
        assert_eq!(*out.get_pixel(25, 25), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(90, 90), GRAY);
    }

    #[test]
    fn test_face_far_off_canvas_is_skipped() {
        let original = photo(50, 50);
        let faces = [smiling_face(500.0, 500.0, 40.0, 40.0), smiling_face(-90.0, 5.0, 40.0, 40.0)];
        let result = Compositor::default().composite(&original, &faces, &assets()).unwrap();

        assert_eq!(result.overlays_drawn, 0);
        assert_eq!(
            result.notices,
            vec![Notice::InvalidFaceGeometry { face: 0 }, Notice::InvalidFaceGeometry { face: 1 }]
        );
        assert_eq!(result.image.as_bytes(), original.as_bytes());
    }

    #[test]
    fn test_covering_face_samples_only_canvas() {
        // Center (50, 50); emoji 9090x8181 at (-4495, -2677).
        let face = smiling_face(-5000.0, -5000.0, 10100.0, 10100.0);
        let overlay = Compositor::default()
            .render_overlay(0, &face, (100, 100), &assets())
            .unwrap();

        assert_eq!((overlay.scaled_width, overlay.scaled_height), (9090, 8181));
        assert_eq!((overlay.x, overlay.y), (0, 0));
        assert_eq!((overlay.image.width(), overlay.image.height()), (100, 100));

        let base = photo(100, 100);
        let result = Compositor::default().composite(&base, &[face], &assets()).unwrap();
        assert!(result.image.to_rgb8().pixels().all(|p| *p == Rgb([255, 0, 0])));
    }

    #[test]
    fn test_overlay_clipped_at_top_left() {
        // 45x40 emoji at (-28, -18) on a 40x40 canvas.
        let face = smiling_face(-30.0, -30.0, 50.0, 50.0);
        let overlay = Compositor::default()
            .render_overlay(0, &face, (40, 40), &assets())
            .unwrap();

        assert_eq!((overlay.scaled_width, overlay.scaled_height), (45, 40));
        assert_eq!((overlay.x, overlay.y), (0, 0));
        assert_eq!((overlay.image.width(), overlay.image.height()), (17, 22));
    }

    #[test]
    fn test_visible_window_matches_full_resize() {
        let mut emoji = RgbaImage::new(7, 5);
        for (x, y, p) in emoji.enumerate_pixels_mut() {
            *p = Rgba([(x * 30) as u8, (y * 50) as u8, (x * y) as u8, 255]);
        }
        let emoji = DynamicImage::ImageRgba8(emoji);
        let mut map = HashMap::new();
        map.insert(EmojiCategory::Smile, emoji.clone());

        let face = smiling_face(-20.0, -10.0, 60.0, 60.0);
        let overlay = Compositor::default().render_overlay(0, &face, (30, 30), &map).unwrap();

        let (w, h) = (overlay.scaled_width, overlay.scaled_height);
        let (fx, fy) = emoji_position(&face.bounding_box, w, h);
        let full = emoji
            .resize_exact(w, h, image::imageops::FilterType::Nearest)
            .to_rgba8();
        let window = overlay.image.to_rgba8();
        for (x, y, p) in window.enumerate_pixels() {
            let sx = (overlay.x - fx) as u32 + x;
            let sy = (overlay.y - fy) as u32 + y;
            assert_eq!(p, full.get_pixel(sx, sy), "window pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_opaque_emoji_pixels_copied_exactly() {
        let original = photo(40, 40);
        let color = Rgba([201, 123, 7, 255]);
        let mut map = HashMap::new();
        map.insert(EmojiCategory::Smile, solid_emoji(5, 5, color));

        let faces = [smiling_face(0.0, 0.0, 40.0, 40.0)];
        let result = Compositor::default().composite(&original, &faces, &map).unwrap();
        assert_eq!(*result.image.to_rgb8().get_pixel(20, 20), Rgb([201, 123, 7]));
    }
}
