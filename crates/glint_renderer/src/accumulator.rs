//! Progressive frame accumulation.
//!
//! Each pixel keeps a running radiance sum and the number of samples that
//! went into it. The displayed value is `sum / count`. Rows are stored
//! bottom-up, matching the camera's `v` axis.

use crate::Color;
use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use rayon::prelude::*;

/// One pixel's running sum. Laid out as RGBA floats so the buffer can be
/// uploaded as a texture without conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct AccumCell {
    pub sum: [f32; 3],
    pub count: f32,
}

impl AccumCell {
    /// Add one sample.
    #[inline]
    pub fn add(&mut self, color: Color) {
        self.sum[0] += color.x;
        self.sum[1] += color.y;
        self.sum[2] += color.z;
        self.count += 1.0;
    }

    /// Collapse the cell into a single sample worth of its current average.
    ///
    /// Used on the first pass after a soft reset: the old image stays
    /// visible as one "previous frame" sample and fades out as new samples
    /// arrive. An empty cell stays empty.
    #[inline]
    pub fn fold(&mut self) {
        let weight = self.count.max(1.0);
        for c in &mut self.sum {
            *c = (*c / weight).clamp(0.0, 1.0);
        }
        self.count = (self.count / weight).clamp(0.0, 1.0);
    }

    /// Average of all samples in the cell. Black when empty.
    #[inline]
    pub fn resolve(&self) -> Color {
        Color::from_array(self.sum) / self.count.max(1.0)
    }
}

/// Convert linear to gamma space (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA with gamma correction.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Per-pixel sample accumulation buffer.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    width: u32,
    height: u32,
    cells: Vec<AccumCell>,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![AccumCell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Change the size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, AccumCell::default());
    }

    /// Hard reset: every cell back to zero color and zero samples.
    pub fn clear(&mut self) {
        self.cells.fill(AccumCell::default());
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.cells[i].add(color);
    }

    pub fn fold(&mut self, x: u32, y: u32) {
        let i = self.index(x, y);
        self.cells[i].fold();
    }

    /// Current displayed value of pixel `(x, y)`.
    pub fn resolve(&self, x: u32, y: u32) -> Color {
        self.cells[self.index(x, y)].resolve()
    }

    pub fn cell(&self, x: u32, y: u32) -> &AccumCell {
        &self.cells[self.index(x, y)]
    }

    pub fn cells(&self) -> &[AccumCell] {
        &self.cells
    }

    /// Mutable cells of row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [AccumCell] {
        let start = self.index(0, y);
        let end = start + self.width as usize;
        &mut self.cells[start..end]
    }

    /// Disjoint rows from `first_row` up, paired with their row index, for
    /// parallel writers.
    pub fn par_rows_mut(
        &mut self,
        first_row: u32,
    ) -> impl IndexedParallelIterator<Item = (u32, &mut [AccumCell])> {
        let start = self.index(0, first_row).min(self.cells.len());
        self.cells[start..]
            .par_chunks_mut(self.width.max(1) as usize)
            .enumerate()
            .map(move |(i, row)| (first_row + i as u32, row))
    }

    /// Raw cell data, four `f32` per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Resolve the whole buffer into an 8-bit, gamma-corrected image.
    ///
    /// The image is top-down, so rows are flipped.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let color = self.resolve(x, self.height - 1 - y);
            image::Rgba(color_to_rgba(color))
        })
    }
}
