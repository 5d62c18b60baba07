//! Random sampling helpers.
//!
//! Nothing here owns generator state. Every function takes the caller's RNG,
//! and [`line_rng`] derives an independent stream per (epoch, frame, line)
//! so parallel workers never share a generator.

use glint_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform f32 in [min, max).
#[inline]
pub fn gen_range_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Generate a random unit vector, uniformly distributed on the sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling inside the unit ball, then project
    loop {
        let p = Vec3::new(
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
        );
        let len_sq = p.length_squared();
        if 1e-12 < len_sq && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Random unit vector in the hemisphere around `normal`.
pub fn random_on_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let on_unit_sphere = random_unit_vector(rng);
    if on_unit_sphere.dot(normal) > 0.0 {
        on_unit_sphere
    } else {
        -on_unit_sphere
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Generator for one scanline of one pass.
///
/// Distinct (seed, epoch, frame, line) keys give unrelated streams, so rows
/// can be rendered on any thread in any order. `epoch` counts resets; frame
/// numbers restart after a reset but the streams must not.
pub fn line_rng(seed: u64, epoch: u64, frame: i32, line: u32) -> StdRng {
    let mut h = splitmix64(seed);
    h = splitmix64(h ^ epoch);
    h = splitmix64(h ^ u64::from(frame as u32));
    h = splitmix64(h ^ (u64::from(line) << 32));
    StdRng::seed_from_u64(h)
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
