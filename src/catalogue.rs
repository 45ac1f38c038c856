//! Scene rule catalogue: accepted ratios and minimum resolutions per scene.

use crate::{Result, SceneError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative deviation allowed when matching a discrete ratio list.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Accepted ratio values lie in `[1 / MAX_RATIO, MAX_RATIO]`. Keeps relative
/// differences finite for every `u32` image size.
pub const MAX_RATIO: f64 = 1e6;

/// Label reported for scenes matched against a continuous portrait range.
pub const PORTRAIT_RANGE_LABEL: &str = "portrait wallpaper";

static STANDARD: Lazy<Catalogue> = Lazy::new(Catalogue::build_standard);

/// Usage context an image can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    Avatar,
    Phone,
    Tablet,
    #[serde(rename = "PC")]
    Pc,
}

impl Scene {
    pub fn name(self) -> &'static str {
        match self {
            Scene::Avatar => "Avatar",
            Scene::Phone => "Phone",
            Scene::Tablet => "Tablet",
            Scene::Pc => "PC",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `width:height` ratio. Components may be fractional (e.g. 19.5:9).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn value(&self) -> f64 {
        self.width / self.height
    }

    fn is_valid(&self) -> bool {
        let value = self.value();
        self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && (1.0 / MAX_RATIO..=MAX_RATIO).contains(&value)
    }

    /// `16:9`, `19.5:9`, ...
    pub fn label(&self) -> String {
        format!("{}:{}", self.width, self.height)
    }
}

/// How a scene decides whether an image's proportions fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatioRule {
    /// Closest match against a short list of standard ratios, within tolerance.
    Discrete { ratios: Vec<AspectRatio> },
    /// Portrait images whose `width / height` lies in `[min, max]`.
    PortraitRange { min: f64, max: f64 },
}

/// Minimum pixel size, expressed on the long and short edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinResolution {
    pub long: u32,
    pub short: u32,
}

impl MinResolution {
    pub const fn new(long: u32, short: u32) -> Self {
        Self { long, short }
    }

    pub fn is_met_by(&self, width: u32, height: u32) -> bool {
        width.max(height) >= self.long && width.min(height) >= self.short
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub scene: Scene,
    pub rule: RatioRule,
    pub min_resolution: MinResolution,
}

/// The full rule table consumed by the classifier.
///
/// Scene order is significant: reports list scenes in this order and
/// best-scene ties are resolved in favour of the earlier entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub scenes: Vec<SceneDefinition>,
    pub tolerance: f64,
    /// Scene that wins outright whenever it is suitable.
    #[serde(default)]
    pub priority: Option<Scene>,
}

impl Catalogue {
    /// Shared instance of the standard table.
    pub fn standard() -> &'static Catalogue {
        &STANDARD
    }

    fn build_standard() -> Self {
        let r = AspectRatio::new;
        Self {
            scenes: vec![
                SceneDefinition {
                    scene: Scene::Avatar,
                    rule: RatioRule::Discrete { ratios: vec![r(1.0, 1.0)] },
                    min_resolution: MinResolution::new(300, 300),
                },
                SceneDefinition {
                    scene: Scene::Phone,
                    // 9:21 up to roughly 9:14
                    rule: RatioRule::PortraitRange { min: 0.42, max: 0.65 },
                    min_resolution: MinResolution::new(1600, 1080),
                },
                SceneDefinition {
                    scene: Scene::Tablet,
                    rule: RatioRule::Discrete {
                        ratios: vec![r(4.0, 3.0), r(16.0, 10.0), r(3.0, 2.0), r(5.0, 4.0)],
                    },
                    min_resolution: MinResolution::new(1920, 1200),
                },
                SceneDefinition {
                    scene: Scene::Pc,
                    rule: RatioRule::Discrete {
                        ratios: vec![
                            r(16.0, 9.0),
                            r(21.0, 9.0),
                            r(16.0, 10.0),
                            r(4.0, 3.0),
                            r(5.0, 4.0),
                            r(3.0, 2.0),
                        ],
                    },
                    min_resolution: MinResolution::new(1920, 1080),
                },
            ],
            tolerance: DEFAULT_TOLERANCE,
            priority: Some(Scene::Phone),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Checks that every rule can be evaluated to finite values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SceneError::InvalidCatalogue(msg));

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return invalid(format!("tolerance {} must be finite and non-negative", self.tolerance));
        }

        for (index, def) in self.scenes.iter().enumerate() {
            if self.scenes[..index].iter().any(|prev| prev.scene == def.scene) {
                return invalid(format!("scene {} is defined more than once", def.scene));
            }
            match &def.rule {
                RatioRule::Discrete { ratios } => {
                    for ratio in ratios {
                        if !ratio.is_valid() {
                            return invalid(format!(
                                "{}: ratio {} is out of range",
                                def.scene,
                                ratio.label()
                            ));
                        }
                    }
                }
                RatioRule::PortraitRange { min, max } => {
                    if !(min.is_finite() && max.is_finite() && *min > 0.0 && min <= max) {
                        return invalid(format!(
                            "{}: portrait range [{}, {}] is not a positive interval",
                            def.scene, min, max
                        ));
                    }
                }
            }
        }

        if let Some(priority) = self.priority {
            if self.definition(priority).is_none() {
                return invalid(format!("priority scene {} is not in the catalogue", priority));
            }
        }
        Ok(())
    }

    pub fn definition(&self, scene: Scene) -> Option<&SceneDefinition> {
        self.scenes.iter().find(|def| def.scene == scene)
    }

    pub fn scene_names(&self) -> impl Iterator<Item = Scene> + '_ {
        self.scenes.iter().map(|def| def.scene)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scene_order() {
        let scenes: Vec<Scene> = Catalogue::standard().scene_names().collect();
        assert_eq!(scenes, vec![Scene::Avatar, Scene::Phone, Scene::Tablet, Scene::Pc]);
    }

    #[test]
    fn standard_thresholds() {
        let catalogue = Catalogue::standard();
        let min = |scene| catalogue.definition(scene).unwrap().min_resolution;
        assert_eq!(min(Scene::Avatar), MinResolution::new(300, 300));
        assert_eq!(min(Scene::Phone), MinResolution::new(1600, 1080));
        assert_eq!(min(Scene::Tablet), MinResolution::new(1920, 1200));
        assert_eq!(min(Scene::Pc), MinResolution::new(1920, 1080));
        assert_eq!(catalogue.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(catalogue.priority, Some(Scene::Phone));
    }

    #[test]
    fn standard_ratio_lists() {
        let catalogue = Catalogue::standard();
        let labels = |scene| match &catalogue.definition(scene).unwrap().rule {
            RatioRule::Discrete { ratios } => ratios.iter().map(|r| r.label()).collect(),
            RatioRule::PortraitRange { .. } => Vec::<String>::new(),
        };
        assert_eq!(labels(Scene::Avatar), vec!["1:1"]);
        assert_eq!(labels(Scene::Tablet), vec!["4:3", "16:10", "3:2", "5:4"]);
        assert_eq!(labels(Scene::Pc), vec!["16:9", "21:9", "16:10", "4:3", "5:4", "3:2"]);
        assert_eq!(
            catalogue.definition(Scene::Phone).unwrap().rule,
            RatioRule::PortraitRange { min: 0.42, max: 0.65 }
        );
    }

    #[test]
    fn fractional_ratio_label() {
        assert_eq!(AspectRatio::new(19.5, 9.0).label(), "19.5:9");
    }

    #[test]
    fn min_resolution_uses_long_and_short_edges() {
        let min = MinResolution::new(1600, 1080);
        assert!(min.is_met_by(1080, 1920));
        assert!(min.is_met_by(1920, 1080));
        assert!(!min.is_met_by(1079, 1920));
        assert!(!min.is_met_by(1080, 1599));
    }

    #[test]
    fn scene_serializes_with_display_names() {
        assert_eq!(serde_json::to_string(&Scene::Pc).unwrap(), "\"PC\"");
        assert_eq!(Scene::Pc.to_string(), "PC");
        assert_eq!(serde_json::from_str::<Scene>("\"Tablet\"").unwrap(), Scene::Tablet);
    }

    fn single_avatar(ratio: AspectRatio) -> Catalogue {
        Catalogue {
            scenes: vec![SceneDefinition {
                scene: Scene::Avatar,
                rule: RatioRule::Discrete { ratios: vec![ratio] },
                min_resolution: MinResolution::new(300, 300),
            }],
            tolerance: DEFAULT_TOLERANCE,
            priority: None,
        }
    }

    fn assert_invalid(catalogue: &Catalogue) {
        assert!(matches!(catalogue.validate(), Err(SceneError::InvalidCatalogue(_))));
    }

    #[test]
    fn standard_catalogue_is_valid() {
        assert!(Catalogue::standard().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_ratios() {
        assert_invalid(&single_avatar(AspectRatio::new(1.0, 0.0)));
        assert_invalid(&single_avatar(AspectRatio::new(0.0, 1.0)));
        assert_invalid(&single_avatar(AspectRatio::new(-4.0, 3.0)));
        assert_invalid(&single_avatar(AspectRatio::new(f64::NAN, 1.0)));
        assert_invalid(&single_avatar(AspectRatio::new(f64::INFINITY, 1.0)));
        assert_invalid(&single_avatar(AspectRatio::new(1e-300, 1.0)));
        assert!(single_avatar(AspectRatio::new(19.5, 9.0)).validate().is_ok());
    }

    #[test]
    fn rejects_bad_tolerance() {
        assert_invalid(&Catalogue::default().with_tolerance(f64::NAN));
        assert_invalid(&Catalogue::default().with_tolerance(-0.01));
        assert_invalid(&Catalogue::default().with_tolerance(f64::INFINITY));
        assert!(Catalogue::default().with_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_bad_portrait_range() {
        let with_range = |min: f64, max: f64| {
            let mut catalogue = Catalogue::default();
            catalogue.scenes[1].rule = RatioRule::PortraitRange { min, max };
            catalogue
        };
        assert_invalid(&with_range(0.65, 0.42));
        assert_invalid(&with_range(f64::NAN, 0.65));
        assert_invalid(&with_range(0.42, f64::INFINITY));
        assert_invalid(&with_range(0.0, 0.5));
        assert!(with_range(0.5, 0.5).validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_scenes() {
        let mut catalogue = Catalogue::default();
        let avatar = catalogue.scenes[0].clone();
        catalogue.scenes.push(avatar);
        assert_invalid(&catalogue);
    }

    #[test]
    fn rejects_unknown_priority() {
        let mut catalogue = single_avatar(AspectRatio::new(1.0, 1.0));
        catalogue.priority = Some(Scene::Phone);
        assert_invalid(&catalogue);
    }

    #[test]
    fn zero_height_ratio_from_json_is_rejected() {
        let json = r#"{
            "scenes": [
                {
                    "scene": "Avatar",
                    "rule": { "kind": "discrete", "ratios": [{ "width": 1.0, "height": 0.0 }] },
                    "min_resolution": { "long": 300, "short": 300 }
                }
            ],
            "tolerance": 0.05
        }"#;
        let catalogue: Catalogue = serde_json::from_str(json).unwrap();
        assert_invalid(&catalogue);
    }

    #[test]
    fn catalogue_loads_from_json() {
        let json = r#"{
            "scenes": [
                {
                    "scene": "Avatar",
                    "rule": { "kind": "discrete", "ratios": [{ "width": 1.0, "height": 1.0 }] },
                    "min_resolution": { "long": 128, "short": 128 }
                }
            ],
            "tolerance": 0.1
        }"#;
        let catalogue: Catalogue = serde_json::from_str(json).unwrap();
        assert_eq!(catalogue.scenes.len(), 1);
        assert_eq!(catalogue.tolerance, 0.1);
        assert_eq!(catalogue.priority, None);
    }
}
