//! Luminance flow fields.
//!
//! A [`FlowField`] is a grid of [`FlowCell`]s sampled from a canvas that
//! already has the source visual painted on it. Each cell stores the color
//! under its top-left pixel and a flow angle derived from that color's
//! brightness: black maps to `0`, white to a full turn (`2π`).
//!
//! Fields are immutable snapshots. Whenever the visual or the canvas size
//! changes the whole grid is rebuilt and handed to the particle system as a
//! new [`Arc`](std::sync::Arc); nothing patches a field in place.
//!
//! ```ignore
//! let field = FlowField::from_pixels(canvas.pixels(), 5);
//! let cell = field.cell_at(Vec2::new(12.0, 7.5)).unwrap();
//! println!("angle under particle: {}", cell.angle);
//! ```

use glam::{UVec2, Vec2};
use image::RgbaImage;
use std::f32::consts::TAU;

/// Default edge length of a flow cell, in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 5;

/// One sampled cell of a flow field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowCell {
    /// Top-left corner of the cell in canvas space.
    pub position: Vec2,
    /// Sampled RGBA color. Alpha `0` means background with no coverage.
    pub color: [u8; 4],
    /// Flow direction in radians, rounded to two decimals.
    pub angle: f32,
}

impl FlowCell {
    /// Whether the source visual covers this cell.
    #[inline]
    pub fn has_coverage(&self) -> bool {
        self.color[3] > 0
    }

    /// Red, green and blue as floats in `0.0..=255.0`.
    #[inline]
    pub fn rgb(&self) -> glam::Vec3 {
        glam::Vec3::new(
            self.color[0] as f32,
            self.color[1] as f32,
            self.color[2] as f32,
        )
    }
}

/// Map an RGB color to a flow angle.
///
/// The unweighted mean of the three channels is scaled onto a full circle
/// and rounded to two decimal places.
pub fn flow_angle(r: u8, g: u8, b: u8) -> f32 {
    let grayscale = (r as f32 + g as f32 + b as f32) / 3.0;
    let angle = grayscale / 255.0 * TAU;
    (angle * 100.0).round() / 100.0
}

/// Round a canvas dimension up to the next multiple of `cell_size`.
///
/// A `cell_size` of zero leaves the dimension unchanged.
pub fn align_to_cells(dimension: u32, cell_size: u32) -> u32 {
    if cell_size == 0 {
        return dimension;
    }
    dimension.div_ceil(cell_size) * cell_size
}

/// Round both axes of a viewport up to whole cells.
pub fn aligned_size(viewport: UVec2, cell_size: u32) -> UVec2 {
    UVec2::new(
        align_to_cells(viewport.x, cell_size),
        align_to_cells(viewport.y, cell_size),
    )
}

/// Immutable grid of flow cells covering a canvas.
#[derive(Debug, Clone)]
pub struct FlowField {
    cells: Vec<FlowCell>,
    cell_size: u32,
    columns: u32,
    rows: u32,
    size: UVec2,
}

impl FlowField {
    /// Sample a flow field from painted pixels.
    ///
    /// Cells are produced row-major, scanning left to right and then top to
    /// bottom. Each cell reads the single pixel at its top-left corner.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is zero.
    pub fn from_pixels(pixels: &RgbaImage, cell_size: u32) -> Self {
        assert!(cell_size > 0, "cell size must be non-zero");

        let (width, height) = pixels.dimensions();
        let columns = width.div_ceil(cell_size);
        let rows = height.div_ceil(cell_size);

        let mut cells = Vec::with_capacity((columns * rows) as usize);
        for y in (0..height).step_by(cell_size as usize) {
            for x in (0..width).step_by(cell_size as usize) {
                let [r, g, b, a] = pixels.get_pixel(x, y).0;
                cells.push(FlowCell {
                    position: Vec2::new(x as f32, y as f32),
                    color: [r, g, b, a],
                    angle: flow_angle(r, g, b),
                });
            }
        }

        Self {
            cells,
            cell_size,
            columns,
            rows,
            size: UVec2::new(width, height),
        }
    }

    /// An empty field of the given size with every cell transparent.
    pub fn blank(size: UVec2, cell_size: u32) -> Self {
        Self::from_pixels(&RgbaImage::new(size.x, size.y), cell_size)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[FlowCell] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of cells across.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cells down.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Canvas size the field was sampled from, in pixels.
    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Cell at a grid coordinate.
    pub fn cell(&self, column: u32, row: u32) -> Option<&FlowCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get((row * self.columns + column) as usize)
    }

    /// Cell under a canvas-space position.
    ///
    /// Positions past an edge are clamped onto the nearest edge cell, so
    /// particles that drift off the canvas keep being steered. Returns `None`
    /// only for non-finite positions or a field without cells.
    pub fn cell_at(&self, position: Vec2) -> Option<&FlowCell> {
        if !position.is_finite() || self.cells.is_empty() {
            return None;
        }
        let cell = (position / self.cell_size as f32).floor();
        let column = cell.x.clamp(0.0, (self.columns - 1) as f32) as u32;
        let row = cell.y.clamp(0.0, (self.rows - 1) as f32) as u32;
        self.cell(column, row)
    }

    /// Number of cells with coverage.
    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.has_coverage()).count()
    }
}
