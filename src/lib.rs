//! Usage-scene classifier for image dimensions.
//!
//! Given an image's width and height, scenefit decides which usage scenes
//! (avatar, phone wallpaper, tablet, PC display) the image suits, how much a
//! scene's standard ratio would distort it, and which scene fits best.
//! Only the two integers matter; pixel content is never inspected.
//!
//! ```
//! use scenefit::{Scene, SceneClassifier};
//!
//! let report = SceneClassifier::default().classify(3840, 2160)?;
//! assert_eq!(report.best_scene, Some(Scene::Pc));
//! # Ok::<(), scenefit::SceneError>(())
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub mod batch;
pub mod catalogue;
pub mod classifier;
pub mod distortion;
pub mod report;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use catalogue::{AspectRatio, Catalogue, MinResolution, RatioRule, Scene, SceneDefinition};
pub use classifier::{ImageDimensions, SceneAssessment, SceneClassifier, SceneReport};
pub use distortion::Distortion;

use once_cell::sync::Lazy;
use std::path::Path;
use thiserror::Error;

static STANDARD_CLASSIFIER: Lazy<SceneClassifier> = Lazy::new(SceneClassifier::default);

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("Invalid size '{0}': expected WIDTHxHEIGHT")]
    InvalidSize(String),
    #[error("Invalid catalogue: {0}")]
    InvalidCatalogue(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SceneError>;

/// Classifies dimensions against the standard catalogue.
pub fn classify(width: u32, height: u32) -> Result<SceneReport> {
    STANDARD_CLASSIFIER.classify(width, height)
}

/// Reads an image's dimensions from its header.
pub fn read_dimensions(path: impl AsRef<Path>) -> Result<ImageDimensions> {
    let (width, height) = image::image_dimensions(path.as_ref())?;
    ImageDimensions::new(width, height)
}

/// Reads an image file's dimensions and classifies them.
pub fn analyze_path(path: impl AsRef<Path>, classifier: &SceneClassifier) -> Result<SceneReport> {
    let path = path.as_ref();
    let dims = read_dimensions(path)?;
    tracing::trace!(path = %path.display(), width = dims.width(), height = dims.height(), "read dimensions");
    Ok(classifier.classify_dimensions(dims))
}
