//! Text and JSON rendering of classification results.

use crate::catalogue::Scene;
use crate::classifier::{SceneAssessment, SceneReport};
use crate::Result;
use serde::Serialize;
use std::io::Write;

/// Short status for a scene: whether it fits, and if not, what fails first.
pub fn status_label(assessment: &SceneAssessment) -> &'static str {
    match (assessment.ratio_suitable, assessment.resolution_suitable) {
        (true, true) => "✓ suitable",
        (false, _) => "✗ ratio mismatch",
        (true, false) => "✗ resolution too low",
    }
}

pub fn best_scene_label(best: Option<Scene>) -> String {
    match best {
        Some(scene) => format!("best fit: {}", scene),
        None => String::from("no scene fits"),
    }
}

/// Multi-line human readable report for one image.
pub fn render_text(report: &SceneReport) -> String {
    let mut out = format!(
        "{} x {} px (ratio {:.3})\n",
        report.width, report.height, report.ratio
    );
    for (scene, assessment) in &report.scene_analysis {
        out.push_str(&format!(
            "  {:<7} best match {:<19} distortion {:<15} {}\n",
            scene.name(),
            assessment.best_match_ratio,
            assessment.distortion.label(),
            status_label(assessment),
        ));
    }
    out.push_str(&best_scene_label(report.best_scene));
    out.push('\n');
    out
}

/// Pretty-printed JSON for any serializable result.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}
