use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use emojify_core::{
    classify, Compositor, CompositorConfig, EmojiAssets, Emojifier, FaceObservation, Notice, RecordedFaces,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod detect;
mod output;

use config::Config;
use detect::FaceSource;

#[derive(Parser)]
#[command(name = "emojify", about = "Overlay emojis on the faces in a photo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay an emoji on every face in a photo and save the result
    Apply {
        /// Photo to process
        photo: PathBuf,
        /// JSON file with face observations for the photo
        #[arg(long, conflicts_with = "detector_cmd")]
        faces: Option<PathBuf>,
        /// Face detector command line, split on whitespace (no quoting);
        /// the photo path is appended as its last argument
        #[arg(long)]
        detector_cmd: Option<String>,
        /// Extra detector argument passed verbatim, may contain spaces (repeatable)
        #[arg(long = "detector-arg", value_name = "ARG")]
        detector_args: Vec<String>,
        /// Emoji image directory
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Output file (default: timestamped JPEG in the output directory)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,
        /// Output directory for timestamped results
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Downsample photos larger than this before processing (0 = never)
        #[arg(long)]
        max_dimension: Option<u32>,
        /// Emoji width relative to face width
        #[arg(long)]
        scale_factor: Option<f32>,
        /// Apply the scale factor to the emoji height once instead of twice
        #[arg(long)]
        single_scale: bool,
        /// Print a JSON report on stdout
        #[arg(long)]
        json: bool,
    },
    /// Print the emoji category chosen for each face in a JSON file
    Classify {
        /// JSON file with face observations
        faces: PathBuf,
    },
    /// Show which emoji images are available
    Assets {
        /// Emoji image directory
        #[arg(long)]
        assets: Option<PathBuf>,
    },
}

/// Outcome of an `apply` run; also its `--json` report.
#[derive(Debug, Serialize)]
struct Applied {
    output: PathBuf,
    faces_detected: usize,
    overlays_drawn: usize,
    notices: Vec<Notice>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Apply {
            photo,
            faces,
            detector_cmd,
            detector_args,
            assets,
            output,
            output_dir,
            max_dimension,
            scale_factor,
            single_scale,
            json,
        } => {
            if let Some(dir) = assets {
                config.asset_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(cmd) = detector_cmd {
                config.detector_cmd = Some(cmd);
            }
            if let Some(max) = max_dimension {
                config.max_dimension = max;
            }
            if let Some(scale) = scale_factor {
                config.scale_factor = scale;
            }
            if single_scale {
                config.double_scale = false;
            }

            let source = match (faces, config.detector_cmd.clone()) {
                (Some(path), _) => FaceSource::File(path),
                (None, Some(cmd)) => FaceSource::command(&cmd, detector_args),
                (None, None) => bail!("no face source: pass --faces, --detector-cmd or set EMOJIFY_DETECTOR_CMD"),
            };

            run_apply(&config, &photo, &source, output, json).await?;
        }
        Commands::Classify { faces } => {
            let json = tokio::fs::read_to_string(&faces)
                .await
                .with_context(|| format!("reading {}", faces.display()))?;
            let recorded = RecordedFaces::from_json(&json)?;
            if recorded.faces().is_empty() {
                println!("No faces");
            }
            for (i, face) in recorded.faces().iter().enumerate() {
                print_classification(i, face);
            }
        }
        Commands::Assets { assets } => {
            let dir = assets.unwrap_or(config.asset_dir);
            let loaded = EmojiAssets::load_dir(&dir)?;
            println!("{}: {} of 8 emoji loaded", dir.display(), loaded.len());
            for category in loaded.missing() {
                println!("  missing {category} ({}.png)", category.asset_stem());
            }
        }
    }

    Ok(())
}

async fn run_apply(
    config: &Config,
    photo_path: &Path,
    source: &FaceSource,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let applied = apply(config, photo_path, source, output).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&applied)?);
    } else {
        for notice in &applied.notices {
            eprintln!("{notice}");
        }
        println!(
            "{}: {} face(s), {} emoji drawn",
            applied.output.display(),
            applied.faces_detected,
            applied.overlays_drawn
        );
    }

    Ok(())
}

/// Load assets and faces, downsample the photo, overlay emojis and save.
///
/// Faces are measured on the photo as loaded, so they are mapped onto the
/// downsampled photo before compositing.
async fn apply(config: &Config, photo_path: &Path, source: &FaceSource, output: Option<PathBuf>) -> Result<Applied> {
    let compositor = Compositor::new(CompositorConfig {
        scale_factor: config.scale_factor,
        double_scale: config.double_scale,
    })?;
    let assets = EmojiAssets::load_dir(&config.asset_dir)
        .with_context(|| format!("loading emoji from {}", config.asset_dir.display()))?;
    let missing = assets.missing();
    if !missing.is_empty() {
        tracing::warn!(
            dir = %config.asset_dir.display(),
            loaded = assets.len(),
            ?missing,
            "emoji images missing; faces in these categories will be skipped"
        );
    }

    let photo = image::open(photo_path).with_context(|| format!("opening {}", photo_path.display()))?;
    let recorded = detect::load_faces(source, photo_path, Duration::from_secs(config.detect_timeout_secs)).await?;

    let (photo, scale) = output::resample(photo, config.max_dimension);
    let mut detector = if scale == 1.0 {
        recorded
    } else {
        RecordedFaces::new(recorded.faces().iter().map(|f| f.scaled(scale)).collect())
    };

    let result = Emojifier::new(compositor).detect_and_overlay(&photo, &mut detector, &assets)?;

    let path = output::resolve_output_path(output, &config.output_dir);
    output::save_image(&result.image, &path)?;

    Ok(Applied {
        output: path,
        faces_detected: result.faces_detected,
        overlays_drawn: result.overlays_drawn,
        notices: result.notices,
    })
}

fn print_classification(index: usize, face: &FaceObservation) {
    println!(
        "face {index}: {} (smiling {:.2}, left eye open {:.2}, right eye open {:.2})",
        classify(face),
        face.smiling_probability,
        face.left_eye_open_probability,
        face.right_eye_open_probability
    );
}
