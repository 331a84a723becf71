//! Triangle soup mesh snapshot.

use strata_math::Point3;

use crate::error::{Result, SlicerError};

/// A triangulated mesh as a flat vertex buffer.
///
/// Nine floats per triangle (three XYZ vertices), no connectivity. The
/// slicer only reads the snapshot; duplicate and near-duplicate vertices
/// are expected and handled by the tolerance constants downstream.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<f32>,
    normals: Option<Vec<f32>>,
}

impl Mesh {
    /// Create a mesh from a flat position buffer (9 floats per triangle).
    pub fn new(positions: Vec<f32>) -> Result<Self> {
        if positions.is_empty() {
            return Err(SlicerError::InvalidInput(
                "mesh has no vertex data".into(),
            ));
        }
        if positions.len() % 9 != 0 {
            return Err(SlicerError::InvalidInput(format!(
                "mesh position buffer length {} is not a multiple of 9",
                positions.len()
            )));
        }
        Ok(Self {
            positions,
            normals: None,
        })
    }

    /// Create a mesh with per-vertex normals.
    ///
    /// Normals are carried for consumers that want them; slicing ignores
    /// them entirely.
    pub fn with_normals(positions: Vec<f32>, normals: Vec<f32>) -> Result<Self> {
        if normals.len() != positions.len() {
            return Err(SlicerError::InvalidInput(
                "normal buffer length does not match position buffer".into(),
            ));
        }
        let mut mesh = Self::new(positions)?;
        mesh.normals = Some(normals);
        Ok(mesh)
    }

    /// Raw position buffer.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Per-vertex normals, if supplied.
    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// The three vertices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let base = i * 9;
        let p = &self.positions;
        [
            Point3::new(p[base] as f64, p[base + 1] as f64, p[base + 2] as f64),
            Point3::new(
                p[base + 3] as f64,
                p[base + 4] as f64,
                p[base + 5] as f64,
            ),
            Point3::new(
                p[base + 6] as f64,
                p[base + 7] as f64,
                p[base + 8] as f64,
            ),
        ]
    }

    /// Iterator over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        (0..self.triangle_count()).map(|i| self.triangle(i))
    }
}
