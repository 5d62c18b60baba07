//! Progressive render of the demo scene.
//!
//! Accumulates a number of passes and writes the result as a PNG:
//!
//! ```text
//! RUST_LOG=debug cargo run --release --example progressive -- 64 out.png
//! ```

use anyhow::{Context, Result};
use glint_core::{Mesh, RenderConfig};
use glint_math::{Mat4, Vec3};
use glint_renderer::{Lambertian, Metal, ProgressiveRenderer, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse().context("frame count must be a number")?,
        None => 32,
    };
    let output = args.next().unwrap_or_else(|| "glint.png".to_string());

    let start = Instant::now();
    let scene = build_scene()?;
    log::info!("Scene ready in {:?}", start.elapsed());

    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.5, 2.5), Vec3::ZERO, Vec3::Y);
    let config = RenderConfig::default()
        .with_view(view)
        .with_max_frames(frames);
    let mut renderer = ProgressiveRenderer::new(config);

    let start = Instant::now();
    while renderer.update_frame(&scene) {}
    log::info!(
        "Rendered {} frames at {}x{} in {:?}",
        renderer.progress().frame,
        renderer.config().width,
        renderer.config().height,
        start.elapsed()
    );

    renderer
        .accumulator()
        .to_rgba_image()
        .save(&output)
        .with_context(|| format!("failed to write {output}"))?;
    println!("Saved to {output}");

    Ok(())
}

fn build_scene() -> Result<Scene> {
    let mut builder = Scene::builder();
    let metal = builder.add_material(Metal::new(Vec3::new(0.7, 0.6, 0.5)));
    let lambertian = builder.add_material(Lambertian::new(Vec3::new(0.3, 0.6, 0.5)));

    builder
        .add_sphere(Vec3::new(0.0, -1000.5, 0.0), 1000.0, lambertian)
        .add_sphere(Vec3::new(0.0, 0.0, 0.0), 0.5, metal)
        .add_sphere(Vec3::new(1.0, 0.0, 0.0), 0.5, lambertian)
        .add_sphere(Vec3::new(-1.0, 0.0, 0.0), 0.5, metal);

    // Small pyramid floating in front of the spheres
    let pyramid = Mesh::new(
        vec![
            Vec3::new(-0.25, -0.4, 0.55),
            Vec3::new(0.25, -0.4, 0.55),
            Vec3::new(0.25, -0.4, 1.05),
            Vec3::new(-0.25, -0.4, 1.05),
            Vec3::new(0.0, 0.0, 0.8),
        ],
        vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4, 0, 2, 1, 0, 3, 2],
    )
    .translated(Vec3::new(0.0, 0.135, 0.0));
    builder.add_mesh(&pyramid, metal)?;

    let mut rng = StdRng::seed_from_u64(0);
    Ok(builder.build(&mut rng)?)
}
