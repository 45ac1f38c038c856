//! Scene classification from image dimensions.
//!
//! [`SceneClassifier`] evaluates every scene of its [`Catalogue`] against an
//! image's width and height and picks the single best fit. It holds no
//! mutable state, so one instance can be shared freely across threads.

use crate::catalogue::{
    AspectRatio, Catalogue, RatioRule, Scene, SceneDefinition, PORTRAIT_RANGE_LABEL,
};
use crate::distortion::Distortion;
use crate::{Result, SceneError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pixel size of an image. Both edges are guaranteed positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDimensions {
    width: u32,
    height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

impl TryFrom<(i64, i64)> for ImageDimensions {
    type Error = SceneError;

    fn try_from((width, height): (i64, i64)) -> Result<Self> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Self::new(w, h),
            _ => Err(SceneError::InvalidDimensions { width, height }),
        }
    }
}

/// Outcome of one scene's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAssessment {
    pub suitable: bool,
    pub ratio_suitable: bool,
    pub resolution_suitable: bool,
    pub best_match_ratio: String,
    /// Relative difference to the closest accepted ratio. `None` for
    /// continuous-range scenes, which have no single target ratio.
    pub difference: Option<f64>,
    pub distortion: Distortion,
}

/// Full classification of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReport {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
    pub scene_analysis: IndexMap<Scene, SceneAssessment>,
    pub suitable_scenes: Vec<Scene>,
    /// Serialized as the scene name, or `"none"` when nothing fits.
    #[serde(with = "best_scene_name")]
    pub best_scene: Option<Scene>,
}

impl SceneReport {
    pub fn assessment(&self, scene: Scene) -> Option<&SceneAssessment> {
        self.scene_analysis.get(&scene)
    }

    pub fn is_suitable_for(&self, scene: Scene) -> bool {
        self.suitable_scenes.contains(&scene)
    }
}

/// Classifier bound to a rule catalogue.
#[derive(Debug, Clone)]
pub struct SceneClassifier {
    catalogue: Catalogue,
}

impl SceneClassifier {
    /// Binds a catalogue after checking it with [`Catalogue::validate`].
    pub fn new(catalogue: Catalogue) -> Result<Self> {
        catalogue.validate()?;
        Ok(Self { catalogue })
    }

    pub fn with_tolerance(self, tolerance: f64) -> Result<Self> {
        Self::new(self.catalogue.with_tolerance(tolerance))
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn classify(&self, width: u32, height: u32) -> Result<SceneReport> {
        ImageDimensions::new(width, height).map(|dims| self.classify_dimensions(dims))
    }

    pub fn classify_dimensions(&self, dims: ImageDimensions) -> SceneReport {
        let mut scene_analysis = IndexMap::with_capacity(self.catalogue.scenes.len());
        let mut suitable_scenes = Vec::new();

        for definition in &self.catalogue.scenes {
            let assessment = self.assess(definition, dims);
            if assessment.suitable {
                suitable_scenes.push(definition.scene);
            }
            scene_analysis.insert(definition.scene, assessment);
        }

        let best_scene = self.select_best(&suitable_scenes, &scene_analysis);
        tracing::debug!(
            width = dims.width(),
            height = dims.height(),
            suitable = suitable_scenes.len(),
            best = best_scene.map(Scene::name).unwrap_or("none"),
            "classified dimensions"
        );

        SceneReport {
            width: dims.width(),
            height: dims.height(),
            ratio: dims.ratio(),
            scene_analysis,
            suitable_scenes,
            best_scene,
        }
    }

    fn assess(&self, definition: &SceneDefinition, dims: ImageDimensions) -> SceneAssessment {
        let ratio = match &definition.rule {
            RatioRule::Discrete { ratios } => match_discrete(ratios, dims, self.catalogue.tolerance),
            RatioRule::PortraitRange { min, max } => match_portrait_range(*min, *max, dims),
        };
        let resolution_suitable = definition
            .min_resolution
            .is_met_by(dims.width(), dims.height());

        SceneAssessment {
            suitable: ratio.suitable && resolution_suitable,
            ratio_suitable: ratio.suitable,
            resolution_suitable,
            best_match_ratio: ratio.label,
            difference: ratio.difference,
            distortion: ratio.distortion,
        }
    }

    fn select_best(
        &self,
        suitable: &[Scene],
        analysis: &IndexMap<Scene, SceneAssessment>,
    ) -> Option<Scene> {
        if let Some(priority) = self.catalogue.priority {
            if suitable.contains(&priority) {
                return Some(priority);
            }
        }

        // `suitable` is in catalogue order; strict comparison keeps the
        // earliest scene on equal differences.
        let mut best: Option<(Scene, f64)> = None;
        for &scene in suitable {
            let difference = analysis
                .get(&scene)
                .and_then(|a| a.difference)
                .unwrap_or(f64::MAX);
            if best.map_or(true, |(_, current)| difference < current) {
                best = Some((scene, difference));
            }
        }
        best.map(|(scene, _)| scene)
    }
}

impl Default for SceneClassifier {
    fn default() -> Self {
        // The standard table is covered by `standard_catalogue_is_valid`.
        Self {
            catalogue: Catalogue::default(),
        }
    }
}

struct RatioMatch {
    suitable: bool,
    label: String,
    difference: Option<f64>,
    distortion: Distortion,
}

fn match_discrete(ratios: &[AspectRatio], dims: ImageDimensions, tolerance: f64) -> RatioMatch {
    let image_ratio = dims.ratio();
    let closest = ratios
        .iter()
        .map(|ratio| {
            let standard = ratio.value();
            (ratio, (image_ratio - standard).abs() / standard)
        })
        .fold(None, |best: Option<(&AspectRatio, f64)>, (ratio, diff)| match best {
            Some((_, current)) if diff >= current => best,
            _ => Some((ratio, diff)),
        });

    match closest {
        Some((ratio, difference)) => RatioMatch {
            suitable: difference <= tolerance,
            label: ratio.label(),
            difference: Some(difference),
            distortion: Distortion::from_difference(difference),
        },
        None => RatioMatch {
            suitable: false,
            label: String::from("N/A"),
            difference: None,
            distortion: Distortion::NotApplicable,
        },
    }
}

fn match_portrait_range(min: f64, max: f64, dims: ImageDimensions) -> RatioMatch {
    let suitable = dims.is_portrait() && (min..=max).contains(&dims.ratio());
    RatioMatch {
        suitable,
        label: String::from(PORTRAIT_RANGE_LABEL),
        difference: None,
        distortion: if suitable {
            Distortion::Negligible
        } else {
            Distortion::NotApplicable
        },
    }
}

mod best_scene_name {
    use super::Scene;
    use serde::{Deserialize, Deserializer, Serializer};

    const NONE: &str = "none";

    pub fn serialize<S: Serializer>(scene: &Option<Scene>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(scene.map(Scene::name).unwrap_or(NONE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Scene>, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            NONE => Ok(None),
            "Avatar" => Ok(Some(Scene::Avatar)),
            "Phone" => Ok(Some(Scene::Phone)),
            "Tablet" => Ok(Some(Scene::Tablet)),
            "PC" => Ok(Some(Scene::Pc)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[NONE, "Avatar", "Phone", "Tablet", "PC"],
            )),
        }
    }
}
