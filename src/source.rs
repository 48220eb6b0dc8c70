//! Source visuals the flow field is sampled from.
//!
//! - [`ImageSource`] - a raster image drawn unscaled at the canvas center
//! - [`TextSource`] - a string filled with a radial gradient
//!
//! Both paint onto any [`Surface`]: once onto a scratch canvas when a field
//! is rebuilt, and again every frame when shown as a backdrop.

use std::path::Path;

use glam::IVec2;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::surface::{RadialGradient, Surface, TextPlacement};

/// A preloaded raster image.
#[derive(Debug, Clone)]
pub struct ImageSource {
    image: RgbaImage,
}

impl ImageSource {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load an image from disk.
    ///
    /// Supports PNG and JPEG.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| SourceError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();

        if image.width() == 0 || image.height() == 0 {
            return Err(SourceError::EmptyImage(path.to_path_buf()));
        }
        log::info!(
            "Loaded source image '{}' ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self { image })
    }

    /// Top-left corner that centers the image on a surface.
    pub fn origin(&self, surface_size: glam::UVec2) -> IVec2 {
        let surface = surface_size.as_ivec2();
        let image = IVec2::new(self.image.width() as i32, self.image.height() as i32);
        surface / 2 - image / 2
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        let origin = self.origin(surface.size());
        surface.draw_image(&self.image, origin);
    }
}

/// Text settings and the gradient it is filled with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSource {
    /// The string to render.
    pub content: String,
    /// Glyph height in pixels.
    pub font_size: f32,
    /// Widest the text may be, as a fraction of the canvas width.
    pub max_width_fraction: f32,
}

impl Default for TextSource {
    fn default() -> Self {
        Self {
            content: "Flow".to_string(),
            font_size: 350.0,
            max_width_fraction: 0.8,
        }
    }
}

impl TextSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_max_width_fraction(mut self, fraction: f32) -> Self {
        self.max_width_fraction = fraction;
        self
    }

    /// Gradient spanning from the canvas center to its width.
    pub fn gradient(surface_size: glam::UVec2) -> RadialGradient {
        let size = surface_size.as_vec2();
        RadialGradient::new(size / 2.0, 10.0, size.x)
            .with_stop(0.0, Rgba([0, 0, 200, 255]))
            .with_stop(0.2, Rgba([50, 150, 150, 255]))
            .with_stop(0.4, Rgba([125, 150, 100, 255]))
            .with_stop(0.6, Rgba([75, 100, 100, 255]))
            .with_stop(0.7, Rgba([75, 100, 255, 255]))
            .with_stop(0.8, Rgba([50, 25, 125, 255]))
    }

    pub fn placement(&self, surface_size: glam::UVec2) -> TextPlacement {
        let size = surface_size.as_vec2();
        TextPlacement {
            center: size / 2.0,
            font_size: self.font_size,
            max_width: size.x * self.max_width_fraction,
        }
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        let size = surface.size();
        surface.fill_text(&self.content, &self.placement(size), &Self::gradient(size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use glam::{UVec2, Vec2};

    #[test]
    fn test_image_is_centered() {
        let source = ImageSource::new(RgbaImage::from_pixel(4, 2, Rgba([9, 9, 9, 255])));
        assert_eq!(source.origin(UVec2::new(10, 10)), IVec2::new(3, 4));

        let mut canvas = Canvas::new(UVec2::new(10, 10));
        source.paint(&mut canvas);
        assert_eq!(canvas.pixels().get_pixel(3, 4).0, [9, 9, 9, 255]);
        assert_eq!(canvas.pixels().get_pixel(6, 5).0, [9, 9, 9, 255]);
        assert_eq!(canvas.pixels().get_pixel(7, 5).0[3], 0);
        assert_eq!(canvas.pixels().get_pixel(3, 6).0[3], 0);
    }

    #[test]
    fn test_oversized_image_is_clipped() {
        let source = ImageSource::new(RgbaImage::from_pixel(20, 20, Rgba([1, 2, 3, 255])));
        assert_eq!(source.origin(UVec2::new(10, 10)), IVec2::new(-5, -5));
        let mut canvas = Canvas::new(UVec2::new(10, 10));
        source.paint(&mut canvas);
        assert!(canvas.pixels().pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let err = ImageSource::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, SourceError::ImageLoad { .. }));
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn test_text_paints_within_canvas() {
        let size = UVec2::new(200, 100);
        let mut canvas = Canvas::new(size);
        TextSource::new("AB").with_font_size(70.0).paint(&mut canvas);

        let inked = canvas.pixels().pixels().filter(|p| p.0[3] > 0).count();
        assert!(inked > 0);
        // Nothing outside the middle band
        for x in 0..200 {
            assert_eq!(canvas.pixels().get_pixel(x, 5).0[3], 0);
            assert_eq!(canvas.pixels().get_pixel(x, 95).0[3], 0);
        }
    }

    #[test]
    fn test_text_respects_max_width() {
        let text = TextSource::new("WIDE TEXT").with_max_width_fraction(0.5);
        let placement = text.placement(UVec2::new(400, 400));
        assert_eq!(placement.max_width, 200.0);
        assert_eq!(placement.center, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_gradient_stops() {
        let gradient = TextSource::gradient(UVec2::new(100, 100));
        assert_eq!(gradient.stops().len(), 6);
        assert_eq!(gradient.center, Vec2::new(50.0, 50.0));
        assert_eq!(gradient.outer_radius, 100.0);
    }
}
