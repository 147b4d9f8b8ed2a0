//! Face detector capability.
//!
//! Face detection itself is an external vision service. The pipeline only
//! needs something that turns a decoded image into an ordered list of
//! [`FaceObservation`]s, so tests and the CLI can feed synthetic or
//! recorded results.

use crate::types::FaceObservation;
use image::DynamicImage;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("face detector unavailable: {0}")]
    Unavailable(String),
    #[error("face detector timed out after {0}s")]
    Timeout(u64),
    #[error("malformed detector output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Locates faces and scores their expressions.
///
/// Results are returned in detector order; that order is the draw order.
/// An empty result is a valid outcome, not an error.
pub trait FaceDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceObservation>, DetectorError>;
}

/// Accepted JSON shapes: a bare array, or `{ "faces": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FaceDocument {
    List(Vec<FaceObservation>),
    Wrapped { faces: Vec<FaceObservation> },
}

/// Detector that replays a fixed set of observations regardless of input.
#[derive(Debug, Clone, Default)]
pub struct RecordedFaces {
    faces: Vec<FaceObservation>,
}

impl RecordedFaces {
    pub fn new(faces: Vec<FaceObservation>) -> Self {
        Self { faces }
    }

    /// Parse detector output JSON.
    pub fn from_json(json: &str) -> Result<Self, DetectorError> {
        let faces = match serde_json::from_str::<FaceDocument>(json)? {
            FaceDocument::List(faces) | FaceDocument::Wrapped { faces } => faces,
        };
        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[FaceObservation] {
        &self.faces
    }
}

impl FaceDetector for RecordedFaces {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceObservation>, DetectorError> {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            faces = self.faces.len(),
            "replaying recorded faces"
        );
        Ok(self.faces.clone())
    }
}
