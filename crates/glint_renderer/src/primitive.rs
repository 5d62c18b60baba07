//! The closed set of shapes a scene can contain.

use crate::{Cuboid, HitRecord, Hittable, MaterialId, Sphere, Triangle};
use glint_math::{Aabb, Interval, Ray};

/// A renderable shape.
///
/// Using an enum keeps primitives in one contiguous arena and lets the BVH
/// refer to them by index without boxing or dynamic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Cuboid(Cuboid),
}

impl Primitive {
    /// Material referenced by this primitive.
    pub fn material(&self) -> MaterialId {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Triangle(t) => t.material(),
            Primitive::Cuboid(c) => c.material(),
        }
    }
}

impl Hittable for Primitive {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Triangle(t) => t.hit(ray, ray_t),
            Primitive::Cuboid(c) => c.hit(ray, ray_t),
        }
    }

    #[inline]
    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
            Primitive::Cuboid(c) => c.bounding_box(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Cuboid> for Primitive {
    fn from(c: Cuboid) -> Self {
        Primitive::Cuboid(c)
    }
}
