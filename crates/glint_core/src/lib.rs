//! Glint Core - data handed to the renderer from the outside world.
//!
//! This crate provides:
//!
//! - **Mesh input**: `Mesh`, vertex positions plus triangle indices, with
//!   validation that rejects out-of-range indices before a scene is built
//! - **Render configuration**: `RenderConfig` and `ShadingMode`, serde-ready
//!   so a shell can load them from JSON
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{Mesh, RenderConfig};
//!
//! let mesh = Mesh::new(positions, indices);
//! mesh.validate()?;
//! let config = RenderConfig::default().with_resolution(320, 180);
//! ```

pub mod config;
pub mod mesh;

// Re-export commonly used types
pub use config::{RenderConfig, ShadingMode};
pub use mesh::{Mesh, MeshError, MeshResult};
