use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Directory holding the emoji images (`smile.png`, `leftwink.png`, ...).
    pub asset_dir: PathBuf,
    /// Where results go when no explicit output path is given.
    pub output_dir: PathBuf,
    /// External face detector command line, split on whitespace with no quoting;
    /// the photo path is appended as its last argument.
    pub detector_cmd: Option<String>,
    /// Deadline in seconds for the external detector.
    pub detect_timeout_secs: u64,
    /// Emoji width relative to the face width.
    pub scale_factor: f32,
    /// Apply the scale factor to the emoji height a second time.
    pub double_scale: bool,
    /// Photos larger than this on either side are downsampled first (0 = never).
    pub max_dimension: u32,
}

impl Config {
    /// Load configuration from `EMOJIFY_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir(&var).join(".local/share"))
            .join("emojify");

        let asset_dir = var("EMOJIFY_ASSET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("emoji"));

        let output_dir = var("EMOJIFY_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir(&var).join("Pictures/Emojify"));

        Self {
            asset_dir,
            output_dir,
            detector_cmd: var("EMOJIFY_DETECTOR_CMD").filter(|c| !c.trim().is_empty()),
            detect_timeout_secs: parse_or(&var, "EMOJIFY_DETECT_TIMEOUT_SECS", 10),
            scale_factor: parse_or(&var, "EMOJIFY_SCALE_FACTOR", emojify_core::compositor::EMOJI_SCALE_FACTOR),
            double_scale: var("EMOJIFY_DOUBLE_SCALE")
                .map(|v| v != "0")
                .unwrap_or(true),
            max_dimension: parse_or(&var, "EMOJIFY_MAX_DIMENSION", 2048),
        }
    }
}

fn home_dir(var: &impl Fn(&str) -> Option<String>) -> PathBuf {
    PathBuf::from(var("HOME").unwrap_or_else(|| "/tmp".to_string()))
}

fn parse_or<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
