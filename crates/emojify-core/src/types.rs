use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Face bounding box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// True when every coordinate is finite and the box has positive area.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center of the box.
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// The box in an image resized by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Detector output for one face.
///
/// Produced entirely by the external face detector; probabilities are
/// expected in [0, 1] but are not validated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceObservation {
    pub bounding_box: BoundingBox,
    pub smiling_probability: f32,
    pub left_eye_open_probability: f32,
    pub right_eye_open_probability: f32,
}

impl FaceObservation {
    pub fn new(bounding_box: BoundingBox, smiling: f32, left_eye_open: f32, right_eye_open: f32) -> Self {
        Self {
            bounding_box,
            smiling_probability: smiling,
            left_eye_open_probability: left_eye_open,
            right_eye_open_probability: right_eye_open,
        }
    }

    /// Same observation with its box mapped into an image resized by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            bounding_box: self.bounding_box.scaled(factor),
            ..*self
        }
    }
}

/// The eight emoji an expression can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmojiCategory {
    Smile,
    Frown,
    LeftWink,
    RightWink,
    LeftWinkFrown,
    RightWinkFrown,
    ClosedEyeSmile,
    ClosedEyeFrown,
}

impl EmojiCategory {
    pub const ALL: [EmojiCategory; 8] = [
        EmojiCategory::Smile,
        EmojiCategory::Frown,
        EmojiCategory::LeftWink,
        EmojiCategory::RightWink,
        EmojiCategory::LeftWinkFrown,
        EmojiCategory::RightWinkFrown,
        EmojiCategory::ClosedEyeSmile,
        EmojiCategory::ClosedEyeFrown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmojiCategory::Smile => "SMILE",
            EmojiCategory::Frown => "FROWN",
            EmojiCategory::LeftWink => "LEFT_WINK",
            EmojiCategory::RightWink => "RIGHT_WINK",
            EmojiCategory::LeftWinkFrown => "LEFT_WINK_FROWN",
            EmojiCategory::RightWinkFrown => "RIGHT_WINK_FROWN",
            EmojiCategory::ClosedEyeSmile => "CLOSED_EYE_SMILE",
            EmojiCategory::ClosedEyeFrown => "CLOSED_EYE_FROWN",
        }
    }

    /// Default asset file stem for this category (e.g. `leftwink` → `leftwink.png`).
    pub fn asset_stem(self) -> &'static str {
        match self {
            EmojiCategory::Smile => "smile",
            EmojiCategory::Frown => "frown",
            EmojiCategory::LeftWink => "leftwink",
            EmojiCategory::RightWink => "rightwink",
            EmojiCategory::LeftWinkFrown => "leftwinkfrown",
            EmojiCategory::RightWinkFrown => "rightwinkfrown",
            EmojiCategory::ClosedEyeSmile => "closed_smile",
            EmojiCategory::ClosedEyeFrown => "closed_frown",
        }
    }
}

impl fmt::Display for EmojiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmojiCategory {
    type Err = String;

    /// Parses the SCREAMING_SNAKE name (`LEFT_WINK`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmojiCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown emoji category: {s}"))
    }
}
