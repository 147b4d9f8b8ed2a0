//! Caller boundary: detect faces, then composite emojis over them.

use crate::assets::AssetLookup;
use crate::compositor::{CompositeError, Compositor};
use crate::detector::{DetectorError, FaceDetector};
use crate::notice::Notice;
use image::DynamicImage;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmojifyError {
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("composite error: {0}")]
    Composite(#[from] CompositeError),
}

/// Final image plus the notices raised while producing it.
#[derive(Debug, Clone)]
pub struct Emojified<'a> {
    pub image: Cow<'a, DynamicImage>,
    pub notices: Vec<Notice>,
    pub faces_detected: usize,
    pub overlays_drawn: usize,
}

/// Runs the detector and compositor in sequence.
#[derive(Debug, Clone, Default)]
pub struct Emojifier {
    compositor: Compositor,
}

impl Emojifier {
    pub fn new(compositor: Compositor) -> Self {
        Self { compositor }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Detect faces in `photo` and overlay the matching emoji on each.
    ///
    /// Detector failures are returned to the caller untouched; retry or
    /// fallback is the caller's decision. Per-face problems never fail the
    /// call, they show up in [`Emojified::notices`].
    pub fn detect_and_overlay<'a, D: FaceDetector>(
        &self,
        photo: &'a DynamicImage,
        detector: &mut D,
        assets: &impl AssetLookup,
    ) -> Result<Emojified<'a>, EmojifyError> {
        if photo.width() == 0 || photo.height() == 0 {
            return Err(CompositeError::EmptyImage.into());
        }

        let faces = detector.detect(photo)?;
        tracing::info!(faces = faces.len(), "faces detected");

        let composite = self.compositor.composite(photo, &faces, assets)?;

        Ok(Emojified {
            image: composite.image,
            notices: composite.notices,
            faces_detected: faces.len(),
            overlays_drawn: composite.overlays_drawn,
        })
    }
}
