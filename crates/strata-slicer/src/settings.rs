//! Slicing parameters and per-object overrides.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlicerError};
use crate::path::PathKind;

/// Infill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfillPattern {
    /// Parallel scan lines, direction alternating 90° per layer.
    #[default]
    Rectilinear,
    /// Rectilinear at the base angle and its perpendicular, unioned.
    Grid,
    /// Hexagonal lattice clipped to the boundary.
    Honeycomb,
}

/// Slicing parameters.
///
/// A flat record merged from global defaults and optional per-object
/// overrides. All lengths are mm, speeds mm/s, temperatures °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    /// Layer height (mm, > 0).
    pub layer_height: f64,
    /// Hard ceiling on slice height from the build plate (mm, 0 = unlimited).
    pub max_z_height: f64,
    /// Number of perimeter walls.
    pub wall_count: u32,
    /// Extrusion line width (mm).
    pub line_width: f64,
    /// Infill density in percent (0–100).
    pub infill_density: f64,
    /// Infill pattern.
    pub infill_pattern: InfillPattern,
    /// Base infill angle (degrees).
    pub infill_angle: f64,
    /// Infill/perimeter overlap in percent of line width (0–100).
    pub infill_overlap: f64,
    /// Base print speed (mm/s).
    pub print_speed: f64,
    /// Outer wall speed; falls back to `print_speed`.
    pub perimeter_speed: Option<f64>,
    /// Inner wall speed; falls back to `print_speed`.
    pub inner_perimeter_speed: Option<f64>,
    /// Infill speed; falls back to 1.5 × `print_speed`.
    pub infill_speed: Option<f64>,
    /// Travel (non-extruding) speed (mm/s).
    pub travel_speed: f64,
    /// Nozzle temperature (°C).
    pub nozzle_temp: f64,
    /// Bed temperature (°C).
    pub bed_temp: f64,
    /// Retraction distance (mm).
    pub retraction: f64,
    /// Retraction speed (mm/s).
    pub retraction_speed: f64,
    /// Filament diameter (mm).
    pub filament_diameter: f64,
    /// Minimum emitted segment length (mm).
    pub min_segment_length: f64,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            max_z_height: 0.0,
            wall_count: 2,
            line_width: 0.4,
            infill_density: 20.0,
            infill_pattern: InfillPattern::Rectilinear,
            infill_angle: 0.0,
            infill_overlap: 0.0,
            print_speed: 60.0,
            perimeter_speed: Some(50.0),
            inner_perimeter_speed: None,
            infill_speed: Some(80.0),
            travel_speed: 150.0,
            nozzle_temp: 200.0,
            bed_temp: 60.0,
            retraction: 5.0,
            retraction_speed: 40.0,
            filament_diameter: 1.75,
            min_segment_length: 0.1,
        }
    }
}

impl SliceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.layer_height <= 0.0 {
            return Err(SlicerError::InvalidInput(
                "layer_height must be positive".into(),
            ));
        }
        if self.line_width <= 0.0 {
            return Err(SlicerError::InvalidInput(
                "line_width must be positive".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.infill_density) {
            return Err(SlicerError::InvalidInput(
                "infill_density must be between 0 and 100".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.infill_overlap) {
            return Err(SlicerError::InvalidInput(
                "infill_overlap must be between 0 and 100".into(),
            ));
        }
        if self.filament_diameter <= 0.0 {
            return Err(SlicerError::InvalidInput(
                "filament_diameter must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Feed speed (mm/s) for a path kind, with the documented fallbacks.
    pub fn feature_speed(&self, kind: PathKind) -> f64 {
        match kind {
            PathKind::OuterWall => self.perimeter_speed.unwrap_or(self.print_speed),
            PathKind::InnerWall => {
                self.inner_perimeter_speed.unwrap_or(self.print_speed)
            }
            PathKind::Infill(_) => {
                self.infill_speed.unwrap_or(self.print_speed * 1.5)
            }
        }
    }

    /// Fast draft profile.
    pub fn fast() -> Self {
        Self {
            layer_height: 0.3,
            infill_density: 10.0,
            wall_count: 2,
            print_speed: 80.0,
            ..Self::default()
        }
    }

    /// Balanced profile (the defaults).
    pub fn balanced() -> Self {
        Self::default()
    }

    /// High-quality profile.
    pub fn quality() -> Self {
        Self {
            layer_height: 0.1,
            infill_density: 30.0,
            wall_count: 3,
            print_speed: 40.0,
            ..Self::default()
        }
    }

    /// Dense, strong profile.
    pub fn strong() -> Self {
        Self {
            layer_height: 0.2,
            infill_density: 50.0,
            wall_count: 4,
            print_speed: 50.0,
            ..Self::default()
        }
    }
}

/// Per-object overrides, restricted to a fixed allow-list of fields.
///
/// Layer height and the Z ceiling are deliberately absent: overriding them
/// per object would break cross-object Z alignment in the layer merger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverride {
    /// Number of perimeter walls.
    pub wall_count: Option<u32>,
    /// Extrusion line width (mm).
    pub line_width: Option<f64>,
    /// Infill density in percent.
    pub infill_density: Option<f64>,
    /// Infill pattern.
    pub infill_pattern: Option<InfillPattern>,
    /// Base infill angle (degrees).
    pub infill_angle: Option<f64>,
    /// Infill overlap in percent of line width.
    pub infill_overlap: Option<f64>,
    /// Base print speed (mm/s).
    pub print_speed: Option<f64>,
    /// Outer wall speed (mm/s).
    pub perimeter_speed: Option<f64>,
    /// Inner wall speed (mm/s).
    pub inner_perimeter_speed: Option<f64>,
    /// Infill speed (mm/s).
    pub infill_speed: Option<f64>,
    /// Travel speed (mm/s).
    pub travel_speed: Option<f64>,
    /// Minimum emitted segment length (mm).
    pub min_segment_length: Option<f64>,
}

impl SettingsOverride {
    /// Merge over a base settings record, producing the effective settings.
    pub fn apply(&self, base: &SliceSettings) -> SliceSettings {
        let mut settings = base.clone();
        if let Some(v) = self.wall_count {
            settings.wall_count = v;
        }
        if let Some(v) = self.line_width {
            settings.line_width = v;
        }
        if let Some(v) = self.infill_density {
            settings.infill_density = v;
        }
        if let Some(v) = self.infill_pattern {
            settings.infill_pattern = v;
        }
        if let Some(v) = self.infill_angle {
            settings.infill_angle = v;
        }
        if let Some(v) = self.infill_overlap {
            settings.infill_overlap = v;
        }
        if let Some(v) = self.print_speed {
            settings.print_speed = v;
        }
        if let Some(v) = self.perimeter_speed {
            settings.perimeter_speed = Some(v);
        }
        if let Some(v) = self.inner_perimeter_speed {
            settings.inner_perimeter_speed = Some(v);
        }
        if let Some(v) = self.infill_speed {
            settings.infill_speed = Some(v);
        }
        if let Some(v) = self.travel_speed {
            settings.travel_speed = v;
        }
        if let Some(v) = self.min_segment_length {
            settings.min_segment_length = v;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_layer_height() {
        let settings = SliceSettings {
            layer_height: -0.1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_density_range() {
        let settings = SliceSettings {
            infill_density: 120.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_feature_speed_fallbacks() {
        let settings = SliceSettings {
            print_speed: 60.0,
            perimeter_speed: None,
            inner_perimeter_speed: None,
            infill_speed: None,
            ..Default::default()
        };
        assert_eq!(settings.feature_speed(PathKind::OuterWall), 60.0);
        assert_eq!(settings.feature_speed(PathKind::InnerWall), 60.0);
        assert_eq!(
            settings.feature_speed(PathKind::Infill(InfillPattern::Rectilinear)),
            90.0
        );
    }

    #[test]
    fn test_override_leaves_layer_height_alone() {
        let base = SliceSettings::default();
        let over = SettingsOverride {
            wall_count: Some(4),
            infill_density: Some(50.0),
            ..Default::default()
        };
        let effective = over.apply(&base);
        assert_eq!(effective.wall_count, 4);
        assert_eq!(effective.infill_density, 50.0);
        assert_eq!(effective.layer_height, base.layer_height);
        assert_eq!(effective.max_z_height, base.max_z_height);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = SliceSettings::quality();
        let json = serde_json::to_string(&settings).unwrap();
        let back: SliceSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: SliceSettings =
            serde_json::from_str(r#"{"layer_height": 0.15, "wall_count": 3}"#).unwrap();
        assert_eq!(settings.layer_height, 0.15);
        assert_eq!(settings.wall_count, 3);
        assert_eq!(settings.line_width, SliceSettings::default().line_width);
    }
}
