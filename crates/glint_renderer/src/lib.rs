//! Glint Renderer - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer that refines its image a scanline at a time,
//! averaging samples across frames instead of per pixel.
//!
//! Scenes are flat arenas of [`Primitive`]s and [`Material`]s with a
//! [`Bvh`] over them, assembled with [`SceneBuilder`]. The
//! [`ProgressiveRenderer`] drives a [`Camera`] and the integrator into an
//! [`Accumulator`] that a display can read back at any time.

mod accumulator;
mod bvh;
mod camera;
mod cuboid;
mod hittable;
mod integrator;
mod material;
mod primitive;
mod progressive;
mod sampling;
mod scene;
mod sphere;
mod triangle;

pub use accumulator::{color_to_rgba, linear_to_gamma, AccumCell, Accumulator};
pub use bvh::{Bvh, BvhChild, BvhError, BvhNode};
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use hittable::{HitRecord, Hittable};
pub use integrator::{estimate_radiance, trace_path, PathSample, HIT_RANGE};
pub use material::{Color, Lambertian, Material, MaterialId, Metal, ScatterResult};
pub use primitive::Primitive;
pub use progressive::{sample_pixel, Progress, ProgressiveRenderer};
pub use sampling::{gen_f32, gen_range_f32, line_rng, random_on_hemisphere, random_unit_vector, reflect};
pub use scene::{Scene, SceneBuilder, SceneError, SceneResult};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from glint_math
pub use glint_math::{Aabb, Interval, Ray, Vec3};
