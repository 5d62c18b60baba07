//! Camera for ray generation.
//!
//! A fixed pinhole at the view-space origin looking down -Z, with the image
//! plane at z = -1 spanning `[-aspect, aspect] x [-1, 1]`. The view matrix
//! places it in the world.

use glint_math::{Mat4, Ray, Vec3};

/// Pinhole camera built from the image size and a view matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    world_from_view: Mat4,
}

impl Camera {
    /// Create a camera for a `width` x `height` image.
    ///
    /// `view` maps world space to view space; its inverse is applied to
    /// every generated ray.
    pub fn new(width: u32, height: u32, view: Mat4) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;

        Self {
            width,
            height,
            lower_left: Vec3::new(-aspect, -1.0, -1.0),
            horizontal: Vec3::new(2.0 * aspect, 0.0, 0.0),
            vertical: Vec3::new(0.0, 2.0, 0.0),
            world_from_view: view.inverse(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// World-space ray through normalized image coordinates.
    ///
    /// `(0, 0)` is the lower-left corner and `(1, 1)` the upper-right.
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let direction = self.lower_left + u * self.horizontal + v * self.vertical;

        Ray::new(
            self.world_from_view.transform_point3(Vec3::ZERO),
            self.world_from_view.transform_vector3(direction),
        )
    }

    /// Ray through pixel `(x, y)` offset by `jitter` inside the pixel.
    ///
    /// Rows count upward from the bottom of the image.
    pub fn pixel_ray(&self, x: u32, y: u32, jitter: (f32, f32)) -> Ray {
        let u = (x as f32 + jitter.0) / self.width.max(1) as f32;
        let v = (y as f32 + jitter.1) / self.height.max(1) as f32;
        self.ray(u, v)
    }
}
