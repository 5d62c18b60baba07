//! Light transport: turns one camera ray into a radiance estimate.
//!
//! The path is followed in a loop that carries the product of attenuations
//! so far, so the configured bounce limit bounds work, not stack depth. A
//! path never performs more than `remaining_bounces + 1` scene
//! intersections.

use crate::sampling::{random_on_hemisphere, random_unit_vector};
use crate::{Color, HitRecord, Scene};
use glint_core::{RenderConfig, ShadingMode};
use glint_math::{Interval, Ray};
use rand::RngCore;

/// Parametric range accepted for every path segment.
///
/// The lower bound keeps scattered rays from re-hitting the surface they
/// start on.
pub const HIT_RANGE: Interval = Interval::new(0.001, 9999.0);

/// Energy kept per bounce by the material-free shading modes.
const FALLBACK_ATTENUATION: f32 = 0.5;

/// Result of tracing one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    /// Scene intersections performed
    pub segments: u32,
}

/// Radiance arriving along `ray` with `remaining_bounces` scatters left.
///
/// A negative bounce count yields black. Never returns NaN or infinity.
pub fn estimate_radiance(
    scene: &Scene,
    ray: Ray,
    remaining_bounces: i32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    trace_path(scene, ray, remaining_bounces, config, rng).radiance
}

/// Same as [`estimate_radiance`], also reporting how many segments were traced.
pub fn trace_path(
    scene: &Scene,
    mut ray: Ray,
    mut remaining_bounces: i32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> PathSample {
    let mut throughput = Color::ONE;
    let mut segments = 0;

    let radiance = loop {
        if remaining_bounces < 0 {
            break Color::ZERO;
        }

        segments += 1;
        let Some(rec) = scene.hit(&ray, HIT_RANGE) else {
            break throughput * background(&ray, config);
        };

        let normal = rec.normal.normalize();
        if config.show_normals {
            break throughput * (normal * 0.5 + 0.5);
        }

        let (attenuation, direction) = match config.shading {
            ShadingMode::Material => {
                let shading_rec = HitRecord { normal, ..rec };
                match scene.material(rec.material).scatter(&ray, &shading_rec, rng) {
                    Some(scatter) => (scatter.attenuation, scatter.scattered.direction()),
                    None => break Color::ZERO,
                }
            }
            ShadingMode::Lambertian => (
                Color::splat(FALLBACK_ATTENUATION),
                normal + random_unit_vector(rng),
            ),
            ShadingMode::Hemisphere => (
                Color::splat(FALLBACK_ATTENUATION),
                random_on_hemisphere(normal, rng),
            ),
        };

        throughput *= attenuation;
        ray = Ray::new(rec.p, direction);
        remaining_bounces -= 1;
    };

    let radiance = if radiance.is_finite() {
        radiance
    } else {
        log::trace!("Discarding non-finite path radiance {radiance}");
        Color::ZERO
    };

    PathSample { radiance, segments }
}

/// Vertical gradient from the ground color (looking down) to the sky color.
fn background(ray: &Ray, config: &RenderConfig) -> Color {
    let unit_direction = ray.direction().normalize();
    let t = 0.5 * (unit_direction.y + 1.0);
    config.ground_color.lerp(config.sky_color, t)
}
