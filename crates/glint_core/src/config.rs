//! Render configuration shared between the shell and the renderer.
//!
//! The renderer only ever reads this. Whatever drives it (a viewer, a test,
//! a batch job) owns the values and hands over a new copy when the user
//! changes something.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// How surfaces respond to a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// Use each primitive's material to scatter.
    #[default]
    Material,
    /// Ignore materials; bounce along `normal + random unit vector`, halving energy.
    Lambertian,
    /// Ignore materials; bounce uniformly over the normal's hemisphere, halving energy.
    Hemisphere,
}

/// Settings consumed by the progressive renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Maximum number of bounces after the primary hit
    pub max_bounces: u32,
    /// Jittered samples averaged per pixel per pass (with antialiasing on)
    pub samples_per_pixel: u32,
    /// View matrix (view-from-world)
    pub view: Mat4,
    /// Background color for rays pointing straight down
    pub ground_color: Vec3,
    /// Background color for rays pointing straight up
    pub sky_color: Vec3,
    /// Jitter primary rays inside the pixel
    pub antialiasing: bool,
    /// Show surface normals instead of shading
    pub show_normals: bool,
    pub shading: ShadingMode,
    /// Stop advancing the frame cursor once this many passes are done
    pub max_frames: u32,
    /// Suspend all accumulation
    pub freeze: bool,
    /// Base seed for per-line random streams
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            max_bounces: 5,
            samples_per_pixel: 2,
            view: Mat4::IDENTITY,
            ground_color: Vec3::new(1.0, 1.0, 1.0),
            sky_color: Vec3::new(0.5, 0.7, 1.0),
            antialiasing: true,
            show_normals: false,
            shading: ShadingMode::Material,
            max_frames: 1000,
            freeze: false,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    /// Set the view matrix (view-from-world).
    pub fn with_view(mut self, view: Mat4) -> Self {
        self.view = view;
        self
    }

    /// Set the background gradient.
    pub fn with_background(mut self, ground_color: Vec3, sky_color: Vec3) -> Self {
        self.ground_color = ground_color;
        self.sky_color = sky_color;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_antialiasing(mut self, enabled: bool) -> Self {
        self.antialiasing = enabled;
        self
    }

    pub fn with_normals(mut self, show_normals: bool) -> Self {
        self.show_normals = show_normals;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u32) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
