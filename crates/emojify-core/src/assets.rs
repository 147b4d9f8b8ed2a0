//! Emoji asset table.
//!
//! Maps each [`EmojiCategory`] to a decoded image. The compositor only sees
//! the [`AssetLookup`] trait, so assets can come from disk, memory or a test.

use crate::types::EmojiCategory;
use image::DynamicImage;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Optional per-directory manifest overriding default file names.
const MANIFEST_FILE: &str = "assets.toml";
/// Extensions probed, in priority order, when no manifest entry exists.
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("emoji image for {0} has zero width or height")]
    EmptyImage(EmojiCategory),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("bad asset manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown emoji category in manifest: {0}")]
    UnknownCategory(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve a category to its emoji image.
pub trait AssetLookup {
    fn emoji_for(&self, category: EmojiCategory) -> Option<&DynamicImage>;
}

impl AssetLookup for HashMap<EmojiCategory, DynamicImage> {
    fn emoji_for(&self, category: EmojiCategory) -> Option<&DynamicImage> {
        self.get(&category)
    }
}

/// `assets.toml` structure:
///
/// ```toml
/// [files]
/// SMILE = "grin.png"
/// CLOSED_EYE_FROWN = "sleepy.webp"
/// ```
#[derive(Debug, Default, Deserialize)]
struct AssetManifest {
    #[serde(default)]
    files: HashMap<String, PathBuf>,
}

impl AssetManifest {
    fn into_files(self) -> Result<HashMap<EmojiCategory, PathBuf>, AssetError> {
        self.files
            .into_iter()
            .map(|(name, file)| {
                name.parse::<EmojiCategory>()
                    .map(|category| (category, file))
                    .map_err(|_| AssetError::UnknownCategory(name))
            })
            .collect()
    }
}

/// Category → emoji image table.
#[derive(Debug, Clone, Default)]
pub struct EmojiAssets {
    images: HashMap<EmojiCategory, DynamicImage>,
}

impl EmojiAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an emoji image, replacing any previous one for the category.
    pub fn insert(&mut self, category: EmojiCategory, image: DynamicImage) -> Result<(), AssetError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AssetError::EmptyImage(category));
        }
        self.images.insert(category, image);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Categories with no registered image.
    pub fn missing(&self) -> Vec<EmojiCategory> {
        EmojiCategory::ALL
            .into_iter()
            .filter(|c| !self.images.contains_key(c))
            .collect()
    }

    /// Load emoji images from a directory.
    ///
    /// Each category is looked up by its manifest entry, or else by
    /// `<stem>.png`, `<stem>.jpg`, `<stem>.jpeg` (first found wins).
    /// Categories without a file stay unregistered.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(AssetError::DirNotFound(dir.to_path_buf()));
        }

        let manifest = load_manifest(dir)?;
        let mut assets = Self::new();

        for category in EmojiCategory::ALL {
            let Some(path) = resolve_asset_path(dir, &manifest, category) else {
                tracing::warn!(%category, dir = %dir.display(), "no emoji image found");
                continue;
            };

            let image = image::open(&path).map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(
                %category,
                path = %path.display(),
                width = image.width(),
                height = image.height(),
                "loaded emoji"
            );
            assets.insert(category, image)?;
        }

        tracing::info!(dir = %dir.display(), loaded = assets.len(), "emoji assets loaded");
        Ok(assets)
    }
}

impl AssetLookup for EmojiAssets {
    fn emoji_for(&self, category: EmojiCategory) -> Option<&DynamicImage> {
        self.images.get(&category)
    }
}

fn load_manifest(dir: &Path) -> Result<HashMap<EmojiCategory, PathBuf>, AssetError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let src = std::fs::read_to_string(&path)?;
    let manifest: AssetManifest =
        toml::from_str(&src).map_err(|source| AssetError::Manifest { path, source })?;
    manifest.into_files()
}

fn resolve_asset_path(
    dir: &Path,
    manifest: &HashMap<EmojiCategory, PathBuf>,
    category: EmojiCategory,
) -> Option<PathBuf> {
    if let Some(file) = manifest.get(&category) {
        let path = dir.join(file);
        return path.exists().then_some(path);
    }

    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{ext}", category.asset_stem())))
        .find(|p| p.exists())
}
