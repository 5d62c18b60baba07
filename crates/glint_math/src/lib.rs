// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_reexport() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
    }

    #[test]
    fn test_types_reexported() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);
        assert!(aabb.hit(&ray, Interval::new(0.0, 10.0)));
    }
}
