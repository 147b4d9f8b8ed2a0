//! emojify-core — Emoji overlays for detected faces.
//!
//! Classifies each face reported by an external detector into one of eight
//! emoji categories and composites the matching emoji over it.

pub mod assets;
pub mod classifier;
pub mod compositor;
pub mod detector;
pub mod notice;
pub mod pipeline;
pub mod types;

pub use assets::{AssetError, AssetLookup, EmojiAssets};
pub use classifier::classify;
pub use compositor::{Composite, CompositeError, Compositor, CompositorConfig, Overlay};
pub use detector::{DetectorError, FaceDetector, RecordedFaces};
pub use notice::Notice;
pub use pipeline::{Emojified, Emojifier, EmojifyError};
pub use types::{BoundingBox, EmojiCategory, FaceObservation};
