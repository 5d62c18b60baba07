//! Scene aggregate: primitive and material arenas plus the BVH over them.
//!
//! Scenes are assembled with [`SceneBuilder`] and frozen by
//! [`SceneBuilder::build`]. There is no incremental update; a reload builds
//! a fresh scene.

use crate::bvh::{Bvh, BvhError};
use crate::{Cuboid, HitRecord, Hittable, Material, MaterialId, Primitive, Sphere, Triangle};
use glint_core::{Mesh, MeshError};
use glint_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors that abort scene construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has no primitives")]
    Empty,

    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("primitive {primitive} uses material {material}, but only {materials} materials exist")]
    UnknownMaterial {
        primitive: usize,
        material: usize,
        materials: usize,
    },
}

impl From<BvhError> for SceneError {
    fn from(err: BvhError) -> Self {
        match err {
            BvhError::Empty => SceneError::Empty,
        }
    }
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Collects materials and primitives before the BVH is built.
#[derive(Debug, Default, Clone)]
pub struct SceneBuilder {
    materials: Vec<Material>,
    primitives: Vec<Primitive>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId::new(self.materials.len() - 1)
    }

    /// Add any primitive.
    pub fn add(&mut self, primitive: impl Into<Primitive>) -> &mut Self {
        self.primitives.push(primitive.into());
        self
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: MaterialId) -> &mut Self {
        self.add(Sphere::new(center, radius, material))
    }

    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> &mut Self {
        self.add(Triangle::new(v0, v1, v2, material))
    }

    pub fn add_cuboid(&mut self, center: Vec3, half_extent: Vec3, material: MaterialId) -> &mut Self {
        self.add(Cuboid::new(center, half_extent, material))
    }

    /// Expand a mesh into triangles sharing one material.
    ///
    /// Returns the number of triangles added. An invalid index aborts
    /// without adding anything.
    pub fn add_mesh(&mut self, mesh: &Mesh, material: MaterialId) -> SceneResult<usize> {
        let triangles = mesh.triangles()?;
        let count = triangles.len();
        self.primitives.extend(
            triangles
                .into_iter()
                .map(|[v0, v1, v2]| Primitive::from(Triangle::new(v0, v1, v2, material))),
        );
        Ok(count)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Validate material references and build the BVH.
    pub fn build(self, rng: &mut dyn RngCore) -> SceneResult<Scene> {
        let materials = self.materials.len();
        for (primitive, p) in self.primitives.iter().enumerate() {
            let material = p.material().index();
            if material >= materials {
                return Err(SceneError::UnknownMaterial {
                    primitive,
                    material,
                    materials,
                });
            }
        }

        let bvh = Bvh::build(&self.primitives, rng)?;

        log::info!(
            "Scene built: {} primitives, {} materials",
            self.primitives.len(),
            materials
        );
        log::debug!("BVH: {} nodes, depth {}", bvh.node_count(), bvh.depth());

        Ok(Scene {
            primitives: self.primitives,
            materials: self.materials,
            bvh,
        })
    }
}

/// An immutable, render-ready scene.
#[derive(Debug, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    bvh: Bvh,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// Closest hit through the BVH.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.bvh.hit(&self.primitives, ray, ray_t)
    }

    /// Closest hit by testing every primitive. Slow; used as a reference.
    pub fn hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.primitives.as_slice().hit(ray, ray_t)
    }

    /// Material by id. Ids handed out by the builder are always valid.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        Scene::hit(self, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Metal};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_scene_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut builder = Scene::builder();
        builder.add_material(Lambertian::new(Vec3::splat(0.5)));

        assert_eq!(builder.build(&mut rng).unwrap_err(), SceneError::Empty);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Lambertian::new(Vec3::splat(0.5)));
        builder
            .add_sphere(Vec3::ZERO, 1.0, mat)
            .add_sphere(Vec3::X, 1.0, MaterialId::new(3));

        assert_eq!(
            builder.build(&mut rng).unwrap_err(),
            SceneError::UnknownMaterial {
                primitive: 1,
                material: 3,
                materials: 1
            }
        );
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let mut builder = Scene::builder();
        let mat = builder.add_material(Metal::new(Vec3::splat(0.8)));
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 5]);

        let err = builder.add_mesh(&mesh, mat).unwrap_err();
        assert!(matches!(err, SceneError::Mesh(MeshError::IndexOutOfRange { index: 5, .. })));
        assert_eq!(builder.primitive_count(), 0);
    }

    #[test]
    fn test_mesh_expands_to_triangles() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Metal::new(Vec3::splat(0.8)));
        let mesh = Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(1.0, 1.0, -2.0),
                Vec3::new(-1.0, 1.0, -2.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );

        assert_eq!(builder.add_mesh(&mesh, mat).unwrap(), 2);
        let scene = builder.build(&mut rng).unwrap();
        assert_eq!(scene.primitives().len(), 2);

        let ray = Ray::new(Vec3::new(-0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-6);
        assert_eq!(scene.material(rec.material), &Material::from(Metal::new(Vec3::splat(0.8))));
    }

    #[test]
    fn test_shared_material() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Lambertian::new(Vec3::new(0.3, 0.6, 0.5)));
        builder
            .add_sphere(Vec3::new(-2.0, 0.0, -5.0), 1.0, mat)
            .add_cuboid(Vec3::new(2.0, 0.0, -5.0), Vec3::splat(0.5), mat);
        let scene = builder.build(&mut rng).unwrap();

        assert_eq!(scene.materials().len(), 1);
        assert!(scene.primitives().iter().all(|p| p.material() == mat));
    }
}
