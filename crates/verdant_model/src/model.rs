//! Building model: spaces and envelope surfaces, stored as JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write model {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Wall,
    RoofCeiling,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    Outdoors,
    Ground,
    Adiabatic,
    Surface,
}

/// Compass orientation of an exterior wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facade {
    North,
    East,
    South,
    West,
}

impl Facade {
    pub const ALL: [Facade; 4] = [Facade::North, Facade::East, Facade::South, Facade::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facade::North => "North",
            Facade::East => "East",
            Facade::South => "South",
            Facade::West => "West",
        }
    }

    /// Facade for an outward normal azimuth in degrees clockwise from north.
    ///
    /// Quadrants are centered on the cardinal directions: North is
    /// `[315, 45)`, East `[45, 135)`, South `[135, 225)`, West `[225, 315)`.
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        let azimuth = azimuth_deg.rem_euclid(360.0);
        if !(45.0..315.0).contains(&azimuth) {
            Facade::North
        } else if azimuth < 135.0 {
            Facade::East
        } else if azimuth < 225.0 {
            Facade::South
        } else {
            Facade::West
        }
    }
}

impl fmt::Display for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Facade {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facade::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::Invalid(format!("unknown facade '{}'", s)))
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub name: String,
    pub floor_area_m2: f64,
    /// Lighting power density, W/m2
    #[serde(default)]
    pub lighting_power_density: f64,
}

impl Space {
    pub fn lighting_power_w(&self) -> f64 {
        self.floor_area_m2 * self.lighting_power_density
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    pub surface_type: SurfaceType,
    pub boundary_condition: BoundaryCondition,
    /// Outward normal, degrees clockwise from north
    #[serde(default)]
    pub azimuth_deg: f64,
    pub gross_area_m2: f64,
    #[serde(default)]
    pub window_area_m2: f64,
    /// Construction thermal resistance, m2-K/W
    pub r_value: f64,
}

impl Surface {
    pub fn is_exterior_wall(&self) -> bool {
        self.surface_type == SurfaceType::Wall
            && self.boundary_condition == BoundaryCondition::Outdoors
    }

    pub fn is_roof(&self, include_ground: bool) -> bool {
        self.surface_type == SurfaceType::RoofCeiling
            && match self.boundary_condition {
                BoundaryCondition::Outdoors => true,
                BoundaryCondition::Ground => include_ground,
                _ => false,
            }
    }

    /// A usable construction has a finite, positive R-value.
    pub fn has_valid_r_value(&self) -> bool {
        self.r_value.is_finite() && self.r_value > 0.0
    }

    pub fn facade(&self) -> Facade {
        Facade::from_azimuth(self.azimuth_deg)
    }

    pub fn window_to_wall_ratio(&self) -> f64 {
        if self.gross_area_m2 > 0.0 {
            self.window_area_m2 / self.gross_area_m2
        } else {
            0.0
        }
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spaces: Vec<Space>,
    #[serde(default)]
    pub surfaces: Vec<Surface>,
}

impl BuildingModel {
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.check()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ModelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject negative or non-finite quantities, unusable R-values and windows
    /// larger than walls.
    pub fn check(&self) -> Result<(), ModelError> {
        for space in &self.spaces {
            if !(space.floor_area_m2.is_finite() && space.floor_area_m2 >= 0.0) {
                return Err(ModelError::Invalid(format!(
                    "space '{}' has invalid floor area {}",
                    space.name, space.floor_area_m2
                )));
            }
            if !(space.lighting_power_density.is_finite() && space.lighting_power_density >= 0.0) {
                return Err(ModelError::Invalid(format!(
                    "space '{}' has invalid lighting power density {}",
                    space.name, space.lighting_power_density
                )));
            }
        }
        for surface in &self.surfaces {
            if !(surface.gross_area_m2.is_finite() && surface.gross_area_m2 >= 0.0) {
                return Err(ModelError::Invalid(format!(
                    "surface '{}' has invalid gross area {}",
                    surface.name, surface.gross_area_m2
                )));
            }
            if !(surface.window_area_m2 >= 0.0 && surface.window_area_m2 <= surface.gross_area_m2) {
                return Err(ModelError::Invalid(format!(
                    "surface '{}' has window area {} outside [0, {}]",
                    surface.name, surface.window_area_m2, surface.gross_area_m2
                )));
            }
            if !surface.has_valid_r_value() {
                return Err(ModelError::Invalid(format!(
                    "surface '{}' has invalid R-value {}",
                    surface.name, surface.r_value
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty() && self.surfaces.is_empty()
    }

    pub fn total_floor_area(&self) -> f64 {
        self.spaces.iter().map(|s| s.floor_area_m2).sum()
    }

    pub fn lighting_power_w(&self) -> f64 {
        self.spaces.iter().map(Space::lighting_power_w).sum()
    }

    pub fn exterior_walls(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter().filter(|s| s.is_exterior_wall())
    }

    pub fn roofs(&self, include_ground: bool) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter().filter(move |s| s.is_roof(include_ground))
    }

    pub fn roofs_mut(&mut self, include_ground: bool) -> impl Iterator<Item = &mut Surface> {
        self.surfaces
            .iter_mut()
            .filter(move |s| s.is_roof(include_ground))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_from_azimuth() {
        assert_eq!(Facade::from_azimuth(0.0), Facade::North);
        assert_eq!(Facade::from_azimuth(350.0), Facade::North);
        assert_eq!(Facade::from_azimuth(-10.0), Facade::North);
        assert_eq!(Facade::from_azimuth(45.0), Facade::East);
        assert_eq!(Facade::from_azimuth(180.0), Facade::South);
        assert_eq!(Facade::from_azimuth(270.0), Facade::West);
        assert_eq!(Facade::from_azimuth(315.0), Facade::North);
    }

    #[test]
    fn test_facade_from_str() {
        assert_eq!("south".parse::<Facade>().unwrap(), Facade::South);
        assert!("up".parse::<Facade>().is_err());
    }

    #[test]
    fn test_window_larger_than_wall_rejected() {
        let json = r#"{
            "surfaces": [{
                "name": "w", "surface_type": "wall", "boundary_condition": "outdoors",
                "gross_area_m2": 10.0, "window_area_m2": 12.0, "r_value": 2.0
            }]
        }"#;
        assert!(matches!(
            BuildingModel::from_json_str(json),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_non_positive_r_value_rejected() {
        let json = r#"{
            "surfaces": [{
                "name": "r", "surface_type": "roof_ceiling", "boundary_condition": "outdoors",
                "gross_area_m2": 10.0, "r_value": 0.0
            }]
        }"#;
        let err = BuildingModel::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("R-value"));
    }

    #[test]
    fn test_nan_r_value_fails_check() {
        let model = BuildingModel {
            name: "m".to_string(),
            spaces: Vec::new(),
            surfaces: vec![Surface {
                name: "r".to_string(),
                space: None,
                surface_type: SurfaceType::RoofCeiling,
                boundary_condition: BoundaryCondition::Outdoors,
                azimuth_deg: 0.0,
                gross_area_m2: 10.0,
                window_area_m2: 0.0,
                r_value: f64::NAN,
            }],
        };
        assert!(matches!(model.check(), Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_roof_filter() {
        let roof = |bc| Surface {
            name: "r".to_string(),
            space: None,
            surface_type: SurfaceType::RoofCeiling,
            boundary_condition: bc,
            azimuth_deg: 0.0,
            gross_area_m2: 1.0,
            window_area_m2: 0.0,
            r_value: 3.0,
        };
        assert!(roof(BoundaryCondition::Outdoors).is_roof(false));
        assert!(!roof(BoundaryCondition::Ground).is_roof(false));
        assert!(roof(BoundaryCondition::Ground).is_roof(true));
        assert!(!roof(BoundaryCondition::Adiabatic).is_roof(true));
    }
}
