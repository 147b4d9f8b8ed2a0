//! Face observations from outside the process.
//!
//! Either a JSON file recorded earlier, or an external detector command
//! that prints observation JSON for the photo path it is given.

use emojify_core::{DetectorError, RecordedFaces};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Where face observations come from.
#[derive(Debug, Clone)]
pub enum FaceSource {
    File(PathBuf),
    Command { program: String, args: Vec<String> },
}

impl FaceSource {
    /// Detector command from a configured command line plus extra arguments.
    ///
    /// `line` is split on whitespace with no quoting, so the program path and
    /// its arguments in it cannot contain spaces. `extra_args` are passed
    /// through verbatim after the arguments from `line`.
    pub fn command(line: &str, extra_args: impl IntoIterator<Item = String>) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        let args = parts.chain(extra_args).collect();
        FaceSource::Command { program, args }
    }
}

/// Obtain the observations for `photo`.
///
/// Only the external command is bounded by `timeout`; the child is killed
/// when the deadline passes.
pub async fn load_faces(source: &FaceSource, photo: &Path, timeout: Duration) -> Result<RecordedFaces, DetectorError> {
    match source {
        FaceSource::File(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let faces = RecordedFaces::from_json(&json)?;
            tracing::debug!(path = %path.display(), faces = faces.faces().len(), "loaded face file");
            Ok(faces)
        }
        FaceSource::Command { program, args } => run_detector(program, args, photo, timeout).await,
    }
}

async fn run_detector(
    program: &str,
    args: &[String],
    photo: &Path,
    timeout: Duration,
) -> Result<RecordedFaces, DetectorError> {
    if program.is_empty() {
        return Err(DetectorError::Unavailable("empty detector command".into()));
    }

    tracing::info!(program, ?args, photo = %photo.display(), "running face detector");

    let mut command = Command::new(program);
    command.args(args).arg(photo).kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(|e| DetectorError::Unavailable(format!("{program}: {e}")))?,
        Err(_) => return Err(DetectorError::Timeout(timeout.as_secs())),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DetectorError::Unavailable(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    RecordedFaces::from_json(&stdout)
}
