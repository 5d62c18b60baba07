//! Axis-aligned box primitive.

use crate::{HitRecord, Hittable, MaterialId};
use glint_math::{Aabb, Interval, Ray, Vec3};

/// An axis-aligned box given by its center and half extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    center: Vec3,
    half_extent: Vec3,
    material: MaterialId,
    bounds: Aabb,
    bbox: Aabb,
}

impl Cuboid {
    /// Create a new box. Negative half extents are treated as their magnitude.
    pub fn new(center: Vec3, half_extent: Vec3, material: MaterialId) -> Self {
        let half_extent = half_extent.abs();
        let bounds = Aabb::from_points(center - half_extent, center + half_extent);

        Self {
            center,
            half_extent,
            material,
            bounds,
            bbox: bounds.padded(),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_extent(&self) -> Vec3 {
        self.half_extent
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

/// Unit vector along `axis` scaled by `sign`.
fn axis_normal(axis: usize, sign: f32) -> Vec3 {
    let mut n = Vec3::ZERO;
    n[axis] = sign;
    n
}

impl Hittable for Cuboid {
    /// Slab test that remembers which face the ray enters and leaves through.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let origin = ray.origin();
        let dir = ray.direction();

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = 0;
        let mut exit_axis = 0;

        for axis in 0..3 {
            let slab = self.bounds.axis_interval(axis);
            let adinv = 1.0 / dir[axis];

            let t0 = (slab.min - origin[axis]) * adinv;
            let t1 = (slab.max - origin[axis]) * adinv;
            let (near, far) = if adinv < 0.0 { (t1, t0) } else { (t0, t1) };

            if near > t_enter {
                t_enter = near;
                enter_axis = axis;
            }
            if far < t_exit {
                t_exit = far;
                exit_axis = axis;
            }
        }

        if t_exit <= t_enter {
            return None;
        }

        // Entering face faces the ray; when the origin is inside, report the exit face
        let (t, outward_normal) = if ray_t.surrounds(t_enter) {
            (t_enter, axis_normal(enter_axis, -dir[enter_axis].signum()))
        } else if ray_t.surrounds(t_exit) {
            (t_exit, axis_normal(exit_axis, dir[exit_axis].signum()))
        } else {
            return None;
        };

        Some(HitRecord::new(ray, t, outward_normal, self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
