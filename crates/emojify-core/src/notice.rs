use crate::types::EmojiCategory;
use serde::Serialize;
use std::fmt;

/// User-facing notice raised during compositing.
///
/// Notices are non-fatal. The caller decides how to present them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notice {
    /// The detector found no faces; the photo is returned unchanged.
    NoFacesDetected,
    /// No emoji image is registered for the face's category.
    NoEmojiForFace { face: usize, category: EmojiCategory },
    /// The face box (or the emoji scaled to it) has no drawable area.
    InvalidFaceGeometry { face: usize },
}

impl Notice {
    /// Index of the face this notice concerns, if any.
    pub fn face(&self) -> Option<usize> {
        match self {
            Notice::NoFacesDetected => None,
            Notice::NoEmojiForFace { face, .. } | Notice::InvalidFaceGeometry { face } => Some(*face),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoFacesDetected => write!(f, "no faces detected"),
            Notice::NoEmojiForFace { face, category } => {
                write!(f, "face {face}: no emoji registered for {category}")
            }
            Notice::InvalidFaceGeometry { face } => write!(f, "face {face}: invalid face geometry"),
        }
    }
}
