//! Objects on the build plate: identity, placement, and print mode.

use serde::{Deserialize, Serialize};
use strata_math::{Transform, Vec3};

use crate::mesh::Mesh;
use crate::settings::SettingsOverride;

/// Stable identity of an object across the whole pipeline.
///
/// Output paths are attributed back to the source object through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object-{}", self.0)
    }
}

/// Whether an object adds material or carves it out of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectMode {
    /// Material is added to the build.
    #[default]
    Additive,
    /// Material is boolean-subtracted from overlapping additive objects.
    Subtractive,
}

/// Placement of an object: position, Euler rotation, uniform scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Position in mm.
    pub position: Vec3,
    /// Rotation in degrees, applied in fixed XYZ order.
    pub rotation_deg: Vec3,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation_deg: Vec3::zeros(),
            scale: 1.0,
        }
    }
}

impl Placement {
    /// Placement translated to `(x, y, z)` with no rotation or scaling.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::default()
        }
    }

    /// Build the affine transform: scale, then rotation (X, Y, Z), then
    /// translation.
    pub fn to_transform(&self) -> Transform {
        let rotation = Transform::rotation_x(self.rotation_deg.x.to_radians())
            .then(&Transform::rotation_y(self.rotation_deg.y.to_radians()))
            .then(&Transform::rotation_z(self.rotation_deg.z.to_radians()));
        Transform::translation(self.position.x, self.position.y, self.position.z)
            .then(&rotation)
            .then(&Transform::uniform_scale(self.scale))
    }
}

/// One object submitted for slicing.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    /// Stable object identity.
    pub id: ObjectId,
    /// Triangle soup snapshot.
    pub mesh: Mesh,
    /// Placement on the build plate.
    pub placement: Placement,
    /// Additive or subtractive intent.
    pub mode: ObjectMode,
    /// Optional per-object settings overrides (allow-listed fields only).
    pub overrides: Option<SettingsOverride>,
}

impl ObjectEntry {
    /// An additive object with default placement and no overrides.
    pub fn additive(id: ObjectId, mesh: Mesh) -> Self {
        Self {
            id,
            mesh,
            placement: Placement::default(),
            mode: ObjectMode::Additive,
            overrides: None,
        }
    }

    /// A subtractive object with default placement and no overrides.
    pub fn subtractive(id: ObjectId, mesh: Mesh) -> Self {
        Self {
            id,
            mesh,
            placement: Placement::default(),
            mode: ObjectMode::Subtractive,
            overrides: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Point3;

    #[test]
    fn test_placement_translation() {
        let placement = Placement::at(10.0, 0.0, 5.0);
        let t = placement.to_transform();
        let p = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((p.x - 11.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!((p.z - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_placement_scale_then_translate() {
        let placement = Placement {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation_deg: Vec3::zeros(),
            scale: 2.0,
        };
        let t = placement.to_transform();
        let p = t.apply_point(&Point3::new(3.0, 0.0, 0.0));
        // scaled to 6, then translated to 7
        assert!((p.x - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_placement_rotation_z() {
        let placement = Placement {
            position: Vec3::zeros(),
            rotation_deg: Vec3::new(0.0, 0.0, 90.0),
            scale: 1.0,
        };
        let t = placement.to_transform();
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&ObjectMode::Subtractive).unwrap();
        assert_eq!(json, "\"subtractive\"");
    }
}
