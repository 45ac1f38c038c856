//! Batch classification of every image in a directory.
//!
//! Files are processed in parallel with rayon. A file that cannot be read
//! or decoded yields a failure entry instead of aborting the batch.

use crate::catalogue::Scene;
use crate::classifier::{SceneClassifier, SceneReport};
use crate::{analyze_path, Result};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions (lowercase, without the dot) picked up from a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Result of analyzing one file.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub file_name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Report(SceneReport),
    Failed(String),
}

impl BatchEntry {
    pub fn report(&self) -> Option<&SceneReport> {
        match &self.outcome {
            BatchOutcome::Report(report) => Some(report),
            BatchOutcome::Failed(_) => None,
        }
    }

    /// One line summarizing the entry, e.g. `cat.png: best fit: Avatar`.
    pub fn summary_line(&self) -> String {
        match &self.outcome {
            BatchOutcome::Report(report) => match report.best_scene {
                Some(scene) => format!("{}: best fit: {}", self.file_name, scene),
                None => format!("{}: no scene fits", self.file_name),
            },
            BatchOutcome::Failed(reason) => {
                format!("{}: analysis failed - {}", self.file_name, reason)
            }
        }
    }
}

/// Per-scene counts for a finished batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub best_scene_counts: IndexMap<Scene, usize>,
    pub unmatched: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };

        for entry in entries {
            match &entry.outcome {
                BatchOutcome::Report(report) => match report.best_scene {
                    Some(scene) => *summary.best_scene_counts.entry(scene).or_insert(0) += 1,
                    None => summary.unmatched += 1,
                },
                BatchOutcome::Failed(_) => summary.failed += 1,
            }
        }

        summary
    }
}

/// Lists image files directly inside `dir`, sorted by path.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Analyzes one file, turning any error into a failure entry.
pub fn analyze_file(path: &Path, classifier: &SceneClassifier) -> BatchEntry {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let outcome = match analyze_path(path, classifier) {
        Ok(report) => BatchOutcome::Report(report),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "analysis failed");
            BatchOutcome::Failed(error.to_string())
        }
    };

    BatchEntry {
        file_name,
        path: path.to_path_buf(),
        outcome,
    }
}

/// Classifies every image in `files`, calling `on_done` as each finishes.
///
/// Entries come back in the order of `files`.
pub fn analyze_files<F>(files: &[PathBuf], classifier: &SceneClassifier, on_done: F) -> Vec<BatchEntry>
where
    F: Fn(&BatchEntry) + Sync,
{
    files
        .par_iter()
        .map(|path| {
            let entry = analyze_file(path, classifier);
            on_done(&entry);
            entry
        })
        .collect()
}

/// Classifies every image directly inside `dir`.
pub fn analyze_dir(dir: &Path, classifier: &SceneClassifier) -> Result<Vec<BatchEntry>> {
    let files = collect_images(dir)?;
    let entries = analyze_files(&files, classifier, |_| {});
    let summary = BatchSummary::from_entries(&entries);
    tracing::info!(
        dir = %dir.display(),
        total = summary.total,
        failed = summary.failed,
        "batch complete"
    );
    Ok(entries)
}
