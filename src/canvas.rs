//! CPU drawing surface backed by an RGBA image.

use glam::{IVec2, UVec2, Vec2};
use image::{Rgba, RgbaImage};

use crate::font::TextLayout;
use crate::surface::{RadialGradient, StrokeStyle, Surface, TextPlacement};

/// Step between stamps when rasterizing a line segment, in pixels.
const LINE_STEP: f32 = 0.5;

/// Software canvas implementing [`Surface`].
///
/// Strokes are rasterized by stamping a square brush along each segment and
/// alpha-blending it over the existing pixels. Widths below one pixel draw
/// a one-pixel line at reduced opacity.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    subpaths: Vec<Vec<Vec2>>,
}

impl Canvas {
    /// Create a transparent canvas.
    pub fn new(size: UVec2) -> Self {
        Self {
            pixels: RgbaImage::new(size.x, size.y),
            subpaths: Vec::new(),
        }
    }

    /// Resize the canvas, discarding its contents.
    pub fn resize(&mut self, size: UVec2) {
        if self.size() != size {
            self.pixels = RgbaImage::new(size.x, size.y);
        } else {
            self.clear();
        }
        self.subpaths.clear();
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.pixels.width() as i32 || y >= self.pixels.height() as i32 {
            return;
        }
        let alpha = color.0[3] as f32 / 255.0 * coverage;
        if alpha <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        blend_over(dst, color, alpha);
    }

    fn stamp(&mut self, center: Vec2, half_width: f32, color: Rgba<u8>, coverage: f32) {
        let x0 = (center.x - half_width).round() as i32;
        let y0 = (center.y - half_width).round() as i32;
        let x1 = ((center.x + half_width).round() as i32).max(x0 + 1);
        let y1 = ((center.y + half_width).round() as i32).max(y0 + 1);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, coverage);
            }
        }
    }

    fn stroke_paths(&mut self, offset: Vec2, color: Rgba<u8>, width: f32) {
        let half_width = (width / 2.0).max(0.5);
        let coverage = width.clamp(0.0, 1.0);
        let subpaths = std::mem::take(&mut self.subpaths);

        for path in &subpaths {
            // Consecutive stamps can land on the same pixels; skip repeats so
            // translucent strokes blend once.
            let mut last: Option<IVec2> = None;
            let mut plot = |canvas: &mut Self, p: Vec2| {
                let corner = (p - half_width).round().as_ivec2();
                if last == Some(corner) {
                    return;
                }
                last = Some(corner);
                canvas.stamp(p, half_width, color, coverage);
            };

            match path.as_slice() {
                [] => {}
                [only] => plot(self, *only + offset),
                points => {
                    for pair in points.windows(2) {
                        let a = pair[0] + offset;
                        let b = pair[1] + offset;
                        let steps = ((b - a).length() / LINE_STEP).ceil().max(1.0) as usize;
                        for i in 0..=steps {
                            plot(self, a.lerp(b, i as f32 / steps as f32));
                        }
                    }
                }
            }
        }

        self.subpaths = subpaths;
    }
}

/// Source-over blend of `color` at `alpha` onto `dst`.
fn blend_over(dst: &mut Rgba<u8>, color: Rgba<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let src = color.0[i] as f32;
        let under = dst.0[i] as f32;
        let mixed = (src * alpha + under * dst_alpha * (1.0 - alpha)) / out_alpha;
        dst.0[i] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round() as u8;
}

impl Surface for Canvas {
    fn size(&self) -> UVec2 {
        UVec2::new(self.pixels.width(), self.pixels.height())
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, point: Vec2) {
        self.subpaths.push(vec![point]);
    }

    fn line_to(&mut self, point: Vec2) {
        match self.subpaths.last_mut() {
            Some(path) => path.push(point),
            None => self.subpaths.push(vec![point]),
        }
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        if let Some(shadow) = style.shadow {
            self.stroke_paths(shadow.offset, shadow.color, style.width);
        }
        self.stroke_paths(Vec2::ZERO, style.color, style.width);
    }

    fn draw_image(&mut self, image: &RgbaImage, origin: IVec2) {
        image::imageops::overlay(&mut self.pixels, image, origin.x as i64, origin.y as i64);
    }

    fn fill_text(&mut self, text: &str, placement: &TextPlacement, fill: &RadialGradient) {
        let layout = TextLayout::new(text, placement);
        let (origin, extent) = layout.bounds();
        let (width, height) = self.pixels.dimensions();

        let x0 = origin.x.floor().max(0.0) as u32;
        let y0 = origin.y.floor().max(0.0) as u32;
        let x1 = ((origin.x + extent.x).ceil().max(0.0) as u32).min(width);
        let y1 = ((origin.y + extent.y).ceil().max(0.0) as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if layout.covers(center) {
                    self.blend(x as i32, y as i32, fill.color_at(center), 1.0);
                }
            }
        }
    }

    fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = Canvas::new(UVec2::new(4, 3));
        assert_eq!(canvas.size(), UVec2::new(4, 3));
        assert!(canvas.pixels().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_stroke_horizontal_line() {
        let mut canvas = Canvas::new(UVec2::new(10, 10));
        canvas.begin_path();
        canvas.move_to(Vec2::new(1.0, 4.0));
        canvas.line_to(Vec2::new(8.0, 4.0));
        canvas.stroke(&StrokeStyle::new(RED, 1.0));

        for x in 1..=8 {
            assert_eq!(*canvas.pixels().get_pixel(x, 4), RED, "pixel {} not drawn", x);
        }
        assert_eq!(canvas.pixels().get_pixel(5, 6).0[3], 0);
    }

    #[test]
    fn test_stroke_clips_outside_points() {
        let mut canvas = Canvas::new(UVec2::new(5, 5));
        canvas.begin_path();
        canvas.move_to(Vec2::new(-20.0, 2.0));
        canvas.line_to(Vec2::new(30.0, 2.0));
        canvas.stroke(&StrokeStyle::new(RED, 1.0));
        assert_eq!(*canvas.pixels().get_pixel(0, 2), RED);
        assert_eq!(*canvas.pixels().get_pixel(4, 2), RED);
    }

    #[test]
    fn test_shadow_is_drawn_under_stroke() {
        let mut canvas = Canvas::new(UVec2::new(12, 12));
        canvas.begin_path();
        canvas.move_to(Vec2::new(2.0, 2.0));
        canvas.line_to(Vec2::new(6.0, 2.0));
        let style = StrokeStyle::new(RED, 1.0).with_shadow(Vec2::new(2.0, 4.0), Rgba([0, 0, 0, 255]));
        canvas.stroke(&style);

        assert_eq!(*canvas.pixels().get_pixel(4, 2), RED);
        assert_eq!(*canvas.pixels().get_pixel(6, 6), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_thin_stroke_is_translucent() {
        let mut canvas = Canvas::new(UVec2::new(10, 10));
        canvas.begin_path();
        canvas.move_to(Vec2::new(5.0, 0.0));
        canvas.line_to(Vec2::new(5.0, 9.0));
        canvas.stroke(&StrokeStyle::new(Rgba([255, 255, 255, 255]), 0.3));

        let alpha = canvas.pixels().get_pixel(5, 4).0[3];
        assert_eq!(alpha, 77);
    }

    #[test]
    fn test_draw_image_and_clear() {
        let mut canvas = Canvas::new(UVec2::new(6, 6));
        let image = RgbaImage::from_pixel(2, 2, RED);
        canvas.draw_image(&image, IVec2::new(3, 3));
        assert_eq!(*canvas.pixels().get_pixel(4, 4), RED);
        assert_eq!(canvas.pixels().get_pixel(2, 2).0[3], 0);

        canvas.clear();
        assert!(canvas.pixels().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_fill_text_uses_gradient() {
        let mut canvas = Canvas::new(UVec2::new(40, 20));
        let placement = TextPlacement {
            center: Vec2::new(20.0, 10.0),
            font_size: 14.0,
            max_width: 40.0,
        };
        let fill = RadialGradient::new(Vec2::new(20.0, 10.0), 0.0, 40.0)
            .with_stop(0.0, Rgba([0, 0, 200, 255]));
        canvas.fill_text("H", &placement, &fill);

        let inked: Vec<_> = canvas.pixels().pixels().filter(|p| p.0[3] > 0).collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|p| **p == Rgba([0, 0, 200, 255])));
    }
}
