//! The drawing surface the effect renders onto.
//!
//! [`Surface`] is the small immediate-mode 2D API the simulation needs from
//! its host: build a path, stroke it, blit an image, fill text with a
//! gradient, read the pixels back, and clear. [`Canvas`](crate::Canvas) is
//! the CPU implementation used both for rendering and for sampling new flow
//! fields.

use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

/// Drop shadow drawn beneath a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub offset: Vec2,
    pub color: Rgba<u8>,
}

/// How a path is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba<u8>,
    pub width: f32,
    pub shadow: Option<Shadow>,
}

impl StrokeStyle {
    pub fn new(color: Rgba<u8>, width: f32) -> Self {
        Self {
            color,
            width,
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, offset: Vec2, color: Rgba<u8>) -> Self {
        self.shadow = Some(Shadow { offset, color });
        self
    }
}

/// A radial gradient between two concentric circles.
///
/// Offsets `0.0..=1.0` run from the inner circle to the outer one. Points
/// before the first stop take its color, points past the last stop take
/// the last color.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub inner_radius: f32,
    pub outer_radius: f32,
    stops: Vec<(f32, Rgba<u8>)>,
}

impl RadialGradient {
    pub fn new(center: Vec2, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            stops: Vec::new(),
        }
    }

    /// Add a color stop. Stops are kept sorted by offset.
    pub fn with_stop(mut self, offset: f32, color: Rgba<u8>) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let index = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(index, (offset, color));
        self
    }

    pub fn stops(&self) -> &[(f32, Rgba<u8>)] {
        &self.stops
    }

    /// Gradient color at a point.
    pub fn color_at(&self, point: Vec2) -> Rgba<u8> {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba([0, 0, 0, 0]);
        };

        let span = self.outer_radius - self.inner_radius;
        let t = if span.abs() <= f32::EPSILON {
            1.0
        } else {
            (point.distance(self.center) - self.inner_radius) / span
        };

        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let upper = self.stops.partition_point(|(o, _)| *o <= t);
        let (o0, c0) = self.stops[upper - 1];
        let (o1, c1) = self.stops[upper];
        let local = if o1 > o0 { (t - o0) / (o1 - o0) } else { 0.0 };

        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = c0.0[i] as f32;
            let b = c1.0[i] as f32;
            *channel = (a + (b - a) * local).round() as u8;
        }
        Rgba(out)
    }
}

/// Where and how large text is laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Center of the text block (center alignment, middle baseline).
    pub center: Vec2,
    /// Glyph height in pixels.
    pub font_size: f32,
    /// Text is compressed horizontally to fit this width.
    pub max_width: f32,
}

/// Immediate-mode 2D drawing surface.
pub trait Surface {
    /// Surface size in pixels.
    fn size(&self) -> UVec2;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Discard the current path.
    fn begin_path(&mut self);

    /// Start a new sub-path at `point`.
    fn move_to(&mut self, point: Vec2);

    /// Extend the current sub-path to `point`.
    fn line_to(&mut self, point: Vec2);

    /// Stroke the current path.
    fn stroke(&mut self, style: &StrokeStyle);

    /// Composite an image with its top-left corner at `origin`.
    fn draw_image(&mut self, image: &RgbaImage, origin: glam::IVec2);

    /// Fill text using a radial gradient.
    fn fill_text(&mut self, text: &str, placement: &TextPlacement, fill: &RadialGradient);

    /// Read back the full surface as RGBA pixels.
    fn pixels(&self) -> &RgbaImage;
}
