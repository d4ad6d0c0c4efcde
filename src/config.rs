use std::error::Error;
use std::fs;
use std::path::Path;

use quarry_geom::{Aabb, Vec3};
use quarry_server::Tuning;
use serde::Deserialize;

/// Session configuration: protocol tuning and the static scenery the
/// ray resolver casts against. Fixed once loaded.
#[derive(Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tuning: Tuning,
    pub scenery: Vec<SceneryDef>,
}

/// Solid axis-aligned box of non-player scenery.
#[derive(Deserialize, Clone, Copy)]
pub struct SceneryDef {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            // Flat floor whose top face is flush with the bottom of the
            // y = 0 cell layer
            scenery: vec![SceneryDef {
                min: [-20.0, -1.125, -20.0],
                max: [20.0, -0.375, 20.0],
            }],
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn scenery_aabbs(&self) -> Vec<Aabb> {
        self.scenery
            .iter()
            .map(|s| {
                Aabb::new(
                    Vec3::new(s.min[0], s.min[1], s.min[2]),
                    Vec3::new(s.max[0], s.max[1], s.max[2]),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_tuning() {
        let cfg = SessionConfig::default();
        assert!((cfg.tuning.grid_size - 0.75).abs() < 1e-6);
        assert!((cfg.tuning.max_place_distance - 10.0).abs() < 1e-6);
        assert_eq!(cfg.scenery.len(), 1);
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let cfg = SessionConfig::from_toml_str(
            r#"
            [tuning]
            grid_size = 1.0
        "#,
        )
        .unwrap();
        assert!((cfg.tuning.grid_size - 1.0).abs() < 1e-6);
        assert!((cfg.tuning.max_place_distance - 10.0).abs() < 1e-6);
        assert!(!cfg.scenery.is_empty());
    }

    #[test]
    fn scenery_converts_to_aabbs() {
        let cfg = SessionConfig::from_toml_str(
            r#"
            [[scenery]]
            min = [0.0, 0.0, 0.0]
            max = [1.0, 2.0, 3.0]
        "#,
        )
        .unwrap();
        let boxes = cfg.scenery_aabbs();
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].max.z - 3.0).abs() < 1e-6);
    }
}
