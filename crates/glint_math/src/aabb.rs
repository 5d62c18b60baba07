use crate::{Interval, Ray, Vec3};

/// Minimum slab thickness applied by [`Aabb::padded`].
const MIN_THICKNESS: f32 = 0.0001;

/// Axis-Aligned Bounding Box for the BVH.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Constructors never pad implicitly: the union of two boxes is exactly as
/// large as the two inputs require. Flat primitives call [`Aabb::padded`] so
/// the slab test never sees a zero-width slab.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub const fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. A zero direction component produces an infinite inverse,
    /// which the comparisons below absorb; the NaN that appears when the
    /// origin lies exactly on a parallel face never narrows `ray_t`.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let ray_orig = r.origin();
        let ray_dir = r.direction();

        for axis in 0..3 {
            let ax = self.axis_interval(axis);
            let adinv = 1.0 / ray_dir[axis];

            let t0 = (ax.min - ray_orig[axis]) * adinv;
            let t1 = (ax.max - ray_orig[axis]) * adinv;
            let (near, far) = if adinv < 0.0 { (t1, t0) } else { (t0, t1) };

            if near > ray_t.min {
                ray_t.min = near;
            }
            if far < ray_t.max {
                ray_t.max = far;
            }

            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Return a copy with every axis at least `MIN_THICKNESS` wide.
    ///
    /// Only ever grows the box, so containment of the original geometry holds.
    pub fn padded(&self) -> Aabb {
        let pad = |i: Interval| {
            if i.size() < MIN_THICKNESS {
                i.expand(MIN_THICKNESS)
            } else {
                i
            }
        };
        Aabb::new(pad(self.x), pad(self.y), pad(self.z))
    }

    /// Returns true if `p` lies inside or on the boundary of the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            let outer = self.axis_interval(axis);
            let inner = other.axis_interval(axis);
            inner.is_empty() || (outer.min <= inner.min && inner.max <= outer.max)
        })
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(
            (self.x.min + self.x.max) * 0.5,
            (self.y.min + self.y.max) * 0.5,
            (self.z.min + self.z.max) * 0.5,
        )
    }

    /// The empty box, identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_aabb_from_points_any_order() {
        let a = Vec3::new(10.0, 0.0, 5.0);
        let b = Vec3::new(0.0, 10.0, -5.0);
        let aabb = Aabb::from_points(a, b);

        assert_eq!(aabb.x, Interval::new(0.0, 10.0));
        assert_eq!(aabb.y, Interval::new(0.0, 10.0));
        assert_eq!(aabb.z, Interval::new(-5.0, 5.0));
        assert_eq!(aabb, Aabb::from_points(b, a));
    }

    #[test]
    fn test_aabb_surrounding_is_tight() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 1.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, -2.0, 3.0), Vec3::new(10.0, 0.5, 4.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert!(surrounding.contains_box(&box1));
        assert!(surrounding.contains_box(&box2));

        // No slack beyond the extrema of the inputs
        assert_eq!(surrounding.x, Interval::new(0.0, 10.0));
        assert_eq!(surrounding.y, Interval::new(-2.0, 1.0));
        assert_eq!(surrounding.z, Interval::new(0.0, 5.0));
    }

    #[test]
    fn test_aabb_surrounding_random_pairs() {
        let mut rng = StdRng::seed_from_u64(17);
        let random_point = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            )
        };

        for _ in 0..1000 {
            let box1 = Aabb::from_points(random_point(&mut rng), random_point(&mut rng));
            let box2 = Aabb::from_points(random_point(&mut rng), random_point(&mut rng));
            let surrounding = Aabb::surrounding(&box1, &box2);

            assert!(surrounding.contains_box(&box1));
            assert!(surrounding.contains_box(&box2));
            assert_eq!(surrounding, Aabb::surrounding(&box2, &box1));

            for axis in 0..3 {
                let (a, b) = (box1.axis_interval(axis), box2.axis_interval(axis));
                let u = surrounding.axis_interval(axis);
                assert_eq!(u.min, a.min.min(b.min));
                assert_eq!(u.max, a.max.max(b.max));
            }
        }
    }

    #[test]
    fn test_aabb_surrounding_empty_identity() {
        let box1 = Aabb::from_points(Vec3::ONE, Vec3::splat(2.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_axis_interval() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.axis_interval(0).max, 1.0);
        assert_eq!(aabb.axis_interval(1).max, 2.0);
        assert_eq!(aabb.axis_interval(2).max, 3.0);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box beyond the allowed range
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_parallel_ray_inside_slab() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Direction has zero x and y components, origin inside those slabs
        let ray = Ray::new(Vec3::new(0.5, -0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Same, but outside the x slab
        let ray = Ray::new(Vec3::new(1.5, -0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Negative zero behaves like positive zero
        let ray = Ray::new(Vec3::new(0.5, -0.5, 5.0), Vec3::new(-0.0, 0.0, -1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_hit_parallel_ray_on_face() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Origin exactly on the x = -1 face, travelling along z
        let ray = Ray::new(Vec3::new(-1.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        let ray = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_hit_origin_inside() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, -0.2, 0.9));
        assert!(aabb.hit(&ray, Interval::new(0.001, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_padded() {
        let flat = Aabb::from_points(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        let padded = flat.padded();

        assert!(padded.z.size() > 0.0);
        assert!(padded.contains_box(&flat));
        assert_eq!(padded.x, flat.x);

        // A flat box can only be hit once padded
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Z);
        assert!(!flat.hit(&ray, Interval::new(0.0, 10.0)));
        assert!(padded.hit(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::splat(0.5)));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::new(0.5, 1.5, 0.5)));
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }
}
