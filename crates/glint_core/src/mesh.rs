//! Triangle mesh input for scene construction.
//!
//! A mesh is the minimal form that asset importers hand to Glint: vertex
//! positions plus a flat list of triangle indices. Reading files is the
//! importer's job; this module only checks that the indices make sense
//! before anything gets built on top of them.

use glint_math::{Aabb, Vec3};
use thiserror::Error;

/// Squared cross-product length below which a triangle counts as degenerate.
const DEGENERATE_AREA_SQ: f32 = 1e-12;

/// Errors detected while validating mesh topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("index count {len} is not a multiple of 3")]
    IncompleteTriangle { len: usize },
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    ///
    /// No validation happens here; call [`Mesh::validate`] or
    /// [`Mesh::triangles`] before handing the mesh to a scene.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        positions
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &Aabb::from_points(*p, *p)))
    }

    /// Return a copy of the mesh moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Mesh {
        let positions = self.positions.iter().map(|p| *p + offset).collect();
        Mesh::new(positions, self.indices.clone())
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check that the index list forms whole triangles and that every index
    /// points at an existing vertex.
    pub fn validate(&self) -> MeshResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle {
                len: self.indices.len(),
            });
        }

        let vertex_count = self.positions.len();
        for (triangle, face) in self.indices.chunks_exact(3).enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Extract triangle vertices as `[v0, v1, v2]` triplets.
    ///
    /// Fails on the first invalid index instead of skipping the face.
    /// Zero-area faces are kept (they can never be hit) but reported.
    pub fn triangles(&self) -> MeshResult<Vec<[Vec3; 3]>> {
        self.validate()?;

        let mut triangles = Vec::with_capacity(self.triangle_count());
        let mut degenerate = 0usize;

        for face in self.indices.chunks_exact(3) {
            let v0 = self.positions[face[0] as usize];
            let v1 = self.positions[face[1] as usize];
            let v2 = self.positions[face[2] as usize];

            if (v1 - v0).cross(v2 - v0).length_squared() < DEGENERATE_AREA_SQ {
                degenerate += 1;
            }
            triangles.push([v0, v1, v2]);
        }

        if degenerate > 0 {
            log::warn!(
                "Mesh has {} degenerate triangles out of {}",
                degenerate,
                triangles.len()
            );
        }

        Ok(triangles)
    }
}
