//! Expression classifier.
//!
//! Maps a face's smiling and eye-open probabilities onto one of the eight
//! emoji categories. Pure and deterministic: the same probabilities always
//! yield the same category.

use crate::types::{EmojiCategory, FaceObservation};

/// A face counts as smiling strictly above this probability.
pub const SMILING_THRESHOLD: f32 = 0.15;
/// An eye counts as closed strictly below this open probability.
pub const EYE_OPEN_THRESHOLD: f32 = 0.5;

/// Thresholded facial expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expression {
    pub smiling: bool,
    pub left_eye_closed: bool,
    pub right_eye_closed: bool,
}

impl Expression {
    /// Threshold the raw probabilities. NaN compares false on both sides,
    /// so it reads as "not smiling" and "eye open".
    pub fn from_observation(face: &FaceObservation) -> Self {
        Self {
            smiling: face.smiling_probability > SMILING_THRESHOLD,
            left_eye_closed: face.left_eye_open_probability < EYE_OPEN_THRESHOLD,
            right_eye_closed: face.right_eye_open_probability < EYE_OPEN_THRESHOLD,
        }
    }

    /// Decision table. Single-eye winks are checked before both-eyes-closed.
    pub fn category(self) -> EmojiCategory {
        let Self {
            smiling,
            left_eye_closed: left,
            right_eye_closed: right,
        } = self;

        match (smiling, left, right) {
            (true, true, false) => EmojiCategory::LeftWink,
            (true, false, true) => EmojiCategory::RightWink,
            (true, true, true) => EmojiCategory::ClosedEyeSmile,
            (true, false, false) => EmojiCategory::Smile,
            (false, true, false) => EmojiCategory::LeftWinkFrown,
            (false, false, true) => EmojiCategory::RightWinkFrown,
            (false, true, true) => EmojiCategory::ClosedEyeFrown,
            (false, false, false) => EmojiCategory::Frown,
        }
    }
}

/// Pick the emoji category for one detected face.
pub fn classify(face: &FaceObservation) -> EmojiCategory {
    let expression = Expression::from_observation(face);
    let category = expression.category();

    tracing::debug!(
        smiling = face.smiling_probability,
        left_eye_open = face.left_eye_open_probability,
        right_eye_open = face.right_eye_open_probability,
        %category,
        "classified face"
    );

    category
}
