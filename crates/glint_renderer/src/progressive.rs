//! Progressive rendering driver.
//!
//! The renderer walks the image one scanline at a time, adding one sample
//! per pixel per visit, and counts completed passes over the image as
//! frames. Callers either step a single line (cheap enough to interleave
//! with UI work) or finish the current pass with rows spread over the
//! rayon pool.
//!
//! Two kinds of reset exist:
//! - [`ProgressiveRenderer::reset_image`] throws everything away.
//! - [`ProgressiveRenderer::reset_accumulation`] keeps the old image as a
//!   single faded sample per pixel, so a moving camera does not flash to
//!   black.

use crate::accumulator::{AccumCell, Accumulator};
use crate::integrator::estimate_radiance;
use crate::sampling::{gen_f32, line_rng};
use crate::{Camera, Color, Scene};
use glint_core::RenderConfig;
use rand::RngCore;
use rayon::prelude::*;

/// Position of the progressive cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Completed passes since the last hard reset. A soft reset sets this
    /// to -1; every pass with `frame <= 0` blends the previous image in.
    pub frame: i32,
    /// Next row to render
    pub line: u32,
}

/// Owns the accumulation buffer and advances it one line or pass at a time.
#[derive(Debug, Clone)]
pub struct ProgressiveRenderer {
    config: RenderConfig,
    camera: Camera,
    accumulator: Accumulator,
    progress: Progress,
    /// Number of resets so far; keys the random streams
    epoch: u64,
}

impl ProgressiveRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let camera = Camera::new(config.width, config.height, config.view);
        let accumulator = Accumulator::new(config.width, config.height);

        Self {
            config,
            camera,
            accumulator,
            progress: Progress::default(),
            epoch: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// A new resolution starts over from an empty image. Any other change
    /// that affects the picture starts a soft reset. `freeze` and
    /// `max_frames` take effect without resetting.
    pub fn set_config(&mut self, config: RenderConfig) {
        let resized = config.width != self.config.width || config.height != self.config.height;
        let restyled = !resized && !same_picture(&self.config, &config);
        let freeze = config.freeze;

        self.config = config;
        self.camera = Camera::new(self.config.width, self.config.height, self.config.view);

        if resized {
            self.reset_image();
            self.config.freeze = freeze;
        } else if restyled {
            self.reset_accumulation();
        }
    }

    pub fn set_freeze(&mut self, freeze: bool) {
        self.config.freeze = freeze;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Resets performed so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `max_frames` passes have been accumulated.
    pub fn is_complete(&self) -> bool {
        i64::from(self.progress.frame) >= i64::from(self.config.max_frames)
    }

    /// Render the next scanline.
    ///
    /// Returns `false` without touching the image when frozen, complete or
    /// the image is empty.
    pub fn update_image(&mut self, scene: &Scene) -> bool {
        if !self.ready() {
            return false;
        }

        let y = self.progress.line % self.config.height;
        let frame = self.progress.frame;
        let mut rng = line_rng(self.config.seed, self.epoch, frame, y);
        render_row(
            scene,
            &self.camera,
            &self.config,
            frame,
            y,
            self.accumulator.row_mut(y),
            &mut rng,
        );
        log::trace!("Rendered line {y} of frame {frame}");

        self.advance(1);
        true
    }

    /// Render every remaining line of the current pass in parallel.
    ///
    /// Produces exactly the same image as calling [`update_image`] until the
    /// pass wraps, since each row draws from the same random stream either way.
    ///
    /// [`update_image`]: Self::update_image
    pub fn update_frame(&mut self, scene: &Scene) -> bool {
        if !self.ready() {
            return false;
        }

        let first = self.progress.line % self.config.height;
        let frame = self.progress.frame;
        let epoch = self.epoch;
        let camera = &self.camera;
        let config = &self.config;

        self.accumulator
            .par_rows_mut(first)
            .for_each(|(y, row)| {
                let mut rng = line_rng(config.seed, epoch, frame, y);
                render_row(scene, camera, config, frame, y, row, &mut rng);
            });

        self.advance(self.config.height - first);
        true
    }

    /// Hard reset: empty image, cursor back to the first line of frame 0,
    /// and unfrozen.
    pub fn reset_image(&mut self) {
        self.accumulator
            .resize(self.config.width, self.config.height);
        self.progress = Progress::default();
        self.epoch += 1;
        self.config.freeze = false;
        log::info!(
            "Image reset ({}x{})",
            self.config.width,
            self.config.height
        );
    }

    /// Soft reset: the rest of this pass and the next one blend the old
    /// image in as a single sample instead of clearing it.
    pub fn reset_accumulation(&mut self) {
        self.progress.frame = -1;
        self.epoch += 1;
        log::info!("Accumulation reset at line {}", self.progress.line);
    }

    fn ready(&mut self) -> bool {
        if self.config.freeze || self.is_complete() {
            return false;
        }
        if self.config.width == 0 || self.config.height == 0 {
            return false;
        }
        if self.accumulator.width() != self.config.width
            || self.accumulator.height() != self.config.height
        {
            self.reset_image();
        }
        true
    }

    fn advance(&mut self, lines: u32) {
        self.progress.line += lines;
        if self.progress.line >= self.config.height {
            self.progress.frame += 1;
            self.progress.line %= self.config.height;
            log::debug!("Frame {} complete", self.progress.frame);
        }
    }
}

/// Configs that only differ in `freeze` or `max_frames` draw the same picture.
fn same_picture(a: &RenderConfig, b: &RenderConfig) -> bool {
    let normalize = |c: &RenderConfig| RenderConfig {
        freeze: false,
        max_frames: 0,
        ..c.clone()
    };
    normalize(a) == normalize(b)
}

/// Add one sample to each pixel of row `y`.
fn render_row(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    frame: i32,
    y: u32,
    row: &mut [AccumCell],
    rng: &mut dyn RngCore,
) {
    for (x, cell) in (0u32..).zip(row.iter_mut()) {
        let color = sample_pixel(scene, camera, config, x, y, rng);
        if frame <= 0 {
            cell.fold();
        }
        cell.add(color);
    }
}

/// One radiance estimate for pixel `(x, y)`.
///
/// With antialiasing on this averages `samples_per_pixel` jittered rays,
/// otherwise it traces a single ray through the pixel center.
pub fn sample_pixel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let bounces = i32::try_from(config.max_bounces).unwrap_or(i32::MAX);

    if !config.antialiasing {
        let ray = camera.pixel_ray(x, y, (0.5, 0.5));
        return estimate_radiance(scene, ray, bounces, config, rng);
    }

    let samples = config.samples_per_pixel.max(1);
    let mut sum = Color::ZERO;
    for _ in 0..samples {
        let jitter = (gen_f32(rng), gen_f32(rng));
        let ray = camera.pixel_ray(x, y, jitter);
        sum += estimate_radiance(scene, ray, bounces, config, rng);
    }
    sum / samples as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A single sphere behind the camera: every primary ray sees the sky.
    fn sky_scene() -> Scene {
        let mut rng = StdRng::seed_from_u64(0);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Lambertian::new(Vec3::splat(0.5)));
        builder.add_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0, mat);
        builder.build(&mut rng).unwrap()
    }

    fn small_config() -> RenderConfig {
        RenderConfig::default()
            .with_resolution(8, 4)
            .with_antialiasing(false)
    }

    fn expected_sky(renderer: &ProgressiveRenderer, x: u32, y: u32) -> Color {
        let config = renderer.config();
        let ray = renderer.camera().pixel_ray(x, y, (0.5, 0.5));
        let t = 0.5 * (ray.direction().normalize().y + 1.0);
        config.ground_color.lerp(config.sky_color, t)
    }

    #[test]
    fn test_update_image_walks_lines() {
        let scene = sky_scene();
        let mut renderer = ProgressiveRenderer::new(small_config());

        assert!(renderer.update_image(&scene));
        assert_eq!(renderer.progress(), Progress { frame: 0, line: 1 });
        assert_eq!(renderer.accumulator().cell(3, 0).count, 1.0);
        assert_eq!(renderer.accumulator().cell(3, 1).count, 0.0);

        for _ in 0..3 {
            renderer.update_image(&scene);
        }
        assert_eq!(renderer.progress(), Progress { frame: 1, line: 0 });
    }

    #[test]
    fn test_first_sample_after_reset_is_exact() {
        let scene = sky_scene();
        let mut renderer = ProgressiveRenderer::new(small_config());
        renderer.update_frame(&scene);
        renderer.update_frame(&scene);

        renderer.reset_image();
        assert_eq!(renderer.progress(), Progress::default());
        assert!(renderer
            .accumulator()
            .cells()
            .iter()
            .all(|c| *c == AccumCell::default()));

        renderer.update_image(&scene);
        for x in 0..8 {
            assert_eq!(renderer.accumulator().cell(x, 0).count, 1.0);
            let diff = renderer.accumulator().resolve(x, 0) - expected_sky(&renderer, x, 0);
            assert!(diff.length() < 1e-6);
        }
    }

    #[test]
    fn test_soft_reset_folds_to_one_sample() {
        let scene = sky_scene();
        let mut renderer = ProgressiveRenderer::new(small_config());
        for _ in 0..3 {
            renderer.update_frame(&scene);
        }
        assert_eq!(renderer.accumulator().cell(0, 0).count, 3.0);

        renderer.reset_accumulation();
        assert_eq!(renderer.progress().frame, -1);

        renderer.update_image(&scene);
        // Old image counts once, plus the new sample
        assert_eq!(renderer.accumulator().cell(0, 0).count, 2.0);
        assert_eq!(renderer.accumulator().cell(0, 1).count, 3.0);
        let diff = renderer.accumulator().resolve(0, 0) - expected_sky(&renderer, 0, 0);
        assert!(diff.length() < 1e-6);
    }

    #[test]
    fn test_freeze_and_max_frames() {
        let scene = sky_scene();
        let mut renderer = ProgressiveRenderer::new(small_config().with_max_frames(2));

        renderer.set_freeze(true);
        assert!(!renderer.update_image(&scene));
        assert_eq!(renderer.progress(), Progress::default());

        renderer.set_freeze(false);
        assert!(renderer.update_frame(&scene));
        assert!(renderer.update_frame(&scene));
        assert!(renderer.is_complete());

        let before = renderer.accumulator().cells().to_vec();
        assert!(!renderer.update_image(&scene));
        assert!(!renderer.update_frame(&scene));
        assert_eq!(renderer.accumulator().cells(), before.as_slice());
        assert_eq!(renderer.progress(), Progress { frame: 2, line: 0 });

        // reset_image unfreezes and restarts
        renderer.set_freeze(true);
        renderer.reset_image();
        assert!(!renderer.config().freeze);
        assert!(renderer.update_image(&scene));
    }

    #[test]
    fn test_update_frame_matches_line_by_line() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Lambertian::new(Vec3::new(0.3, 0.6, 0.5)));
        builder
            .add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, mat)
            .add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, mat);
        let scene = builder.build(&mut rng).unwrap();

        let config = RenderConfig::default()
            .with_resolution(16, 9)
            .with_seed(77);
        let mut by_line = ProgressiveRenderer::new(config.clone());
        let mut by_frame = ProgressiveRenderer::new(config);

        // Start mid-pass to cover the partial first frame
        for _ in 0..3 {
            by_line.update_image(&scene);
            by_frame.update_image(&scene);
        }
        for _ in 3..9 {
            by_line.update_image(&scene);
        }
        by_frame.update_frame(&scene);

        assert_eq!(by_line.progress(), by_frame.progress());
        assert_eq!(by_line.accumulator().cells(), by_frame.accumulator().cells());
    }

    #[test]
    fn test_set_config_resets() {
        let scene = sky_scene();
        let mut renderer = ProgressiveRenderer::new(small_config());
        renderer.update_frame(&scene);
        renderer.update_image(&scene);

        // Frame limit alone keeps accumulating
        renderer.set_config(small_config().with_max_frames(10));
        assert_eq!(renderer.progress(), Progress { frame: 1, line: 1 });

        // A new view blends instead of clearing
        let view = glint_math::Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        renderer.set_config(small_config().with_view(view));
        assert_eq!(renderer.progress(), Progress { frame: -1, line: 1 });
        assert_eq!(renderer.accumulator().cell(0, 0).count, 2.0);

        // A new resolution starts over
        renderer.set_config(small_config().with_resolution(4, 4));
        assert_eq!(renderer.progress(), Progress::default());
        assert_eq!(renderer.accumulator().cells().len(), 16);
        assert_eq!(renderer.camera().width(), 4);
    }

    #[test]
    fn test_antialiasing_averages_samples() {
        let scene = sky_scene();
        let config = small_config().with_antialiasing(true).with_quality(4, 2);
        let renderer = ProgressiveRenderer::new(config.clone());
        let mut rng = StdRng::seed_from_u64(2);

        let color = sample_pixel(&scene, renderer.camera(), &config, 4, 2, &mut rng);
        // Jittered rays stay within the pixel, so the gradient barely moves
        assert!((color - expected_sky(&renderer, 4, 2)).length() < 0.1);
    }

    fn diffuse_scene() -> Scene {
        let mut rng = StdRng::seed_from_u64(6);
        let mut builder = Scene::builder();
        let mat = builder.add_material(Lambertian::new(Vec3::new(0.3, 0.6, 0.5)));
        builder
            .add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, mat)
            .add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, mat);
        builder.build(&mut rng).unwrap()
    }

    #[test]
    fn test_hard_reset_draws_fresh_samples() {
        let scene = diffuse_scene();
        let config = RenderConfig::default().with_resolution(8, 4);

        let mut first = ProgressiveRenderer::new(config.clone());
        first.update_frame(&scene);

        let mut again = ProgressiveRenderer::new(config);
        again.update_frame(&scene);
        again.reset_image();
        again.update_frame(&scene);

        // Same frame number, but a reset in between must not replay the pass
        assert_eq!(first.progress(), again.progress());
        assert_ne!(first.accumulator().cells(), again.accumulator().cells());
    }

    #[test]
    fn test_soft_reset_draws_fresh_samples() {
        let scene = diffuse_scene();
        let mut renderer = ProgressiveRenderer::new(RenderConfig::default().with_resolution(8, 4));

        renderer.update_frame(&scene);
        let before: Vec<Color> = renderer
            .accumulator()
            .cells()
            .iter()
            .map(|c| c.resolve())
            .collect();
        renderer.update_frame(&scene);

        let epoch = renderer.epoch();
        renderer.reset_accumulation();
        assert_eq!(renderer.epoch(), epoch + 1);
        renderer.update_frame(&scene);
        assert_eq!(renderer.progress().frame, 0);

        // Isolate what the next frame-0 pass adds on top of the folded image
        let folded: Vec<AccumCell> = renderer
            .accumulator()
            .cells()
            .iter()
            .map(|c| {
                let mut c = *c;
                c.fold();
                c
            })
            .collect();
        renderer.update_frame(&scene);

        let replayed = renderer
            .accumulator()
            .cells()
            .iter()
            .zip(&folded)
            .zip(&before)
            .filter(|((after, folded), old)| {
                let added = Color::from_array(after.sum) - Color::from_array(folded.sum);
                (added - **old).length() < 1e-6
            })
            .count();

        assert!(replayed < before.len() / 4, "{replayed} of {} samples replayed", before.len());
    }

    #[test]
    fn test_resize_keeps_requested_freeze() {
        let mut renderer = ProgressiveRenderer::new(small_config());

        let mut config = small_config().with_resolution(16, 8);
        config.freeze = true;
        renderer.set_config(config);

        assert_eq!(renderer.accumulator().cells().len(), 128);
        assert_eq!(renderer.progress(), Progress::default());
        assert!(renderer.config().freeze);
        assert!(!renderer.update_image(&sky_scene()));
    }
}
