//! Per-target coloring and stroke strategies.
//!
//! The active [`Target`] picks one [`ColorStrategy`] for the whole particle
//! pool. The strategy decides a particle's starting color, whether that
//! color follows the field, and how (or whether) its trail is stroked.

use std::fmt;

use glam::{Vec2, Vec3};
use image::Rgba;
use rand::{Rng, RngCore};

use crate::field::FlowCell;
use crate::mode::Target;
use crate::particle::Particle;
use crate::surface::StrokeStyle;

/// Trails longer than this get a drop shadow in image mode.
const SHADOW_MIN_LENGTH: usize = 120;
const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 4.0);
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Default palette for text trails: reds from bright to dark.
pub const TEXT_PALETTE: [[u8; 3]; 6] = [
    [0xfc, 0x03, 0x03],
    [0xff, 0x38, 0x38],
    [0xff, 0x66, 0x66],
    [0x94, 0x00, 0x00],
    [0x8a, 0x21, 0x21],
    [0x75, 0x2e, 0x2e],
];

/// How particles are colored and drawn for one target.
pub trait ColorStrategy: fmt::Debug + Send + Sync {
    /// Target this strategy renders.
    fn target(&self) -> Target;

    /// Color assigned when a particle is created.
    fn initial_color(&self, rng: &mut dyn RngCore) -> Vec3;

    /// Move `color` toward the cell under the particle. No-op by default.
    fn ease(&self, _color: &mut Vec3, _cell: &FlowCell, _rate: f32) {}

    /// Stroke for the particle's trail, or `None` to skip drawing.
    fn stroke(&self, particle: &Particle) -> Option<StrokeStyle>;
}

/// Strategy for a target.
pub fn for_target(target: Target) -> Box<dyn ColorStrategy> {
    match target {
        Target::Image => Box::new(ImageColoring),
        Target::Text => Box::new(TextColoring::default()),
        Target::Hidden => Box::new(HiddenColoring),
    }
}

fn to_rgba(color: Vec3) -> Rgba<u8> {
    let c = color.round().clamp(Vec3::ZERO, Vec3::splat(255.0));
    Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
}

/// Trails take on the colors of the image they flow over.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageColoring;

impl ColorStrategy for ImageColoring {
    fn target(&self) -> Target {
        Target::Image
    }

    fn initial_color(&self, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::ZERO
    }

    fn ease(&self, color: &mut Vec3, cell: &FlowCell, rate: f32) {
        if cell.has_coverage() {
            *color += (cell.rgb() - *color) * rate;
        }
    }

    fn stroke(&self, particle: &Particle) -> Option<StrokeStyle> {
        let style = StrokeStyle::new(to_rgba(particle.color()), particle.line_width());
        if particle.max_length() > SHADOW_MIN_LENGTH {
            Some(style.with_shadow(SHADOW_OFFSET, SHADOW_COLOR))
        } else {
            Some(style)
        }
    }
}

/// Trails keep a fixed color picked from a palette.
#[derive(Debug, Clone)]
pub struct TextColoring {
    palette: Vec<[u8; 3]>,
}

impl TextColoring {
    /// # Panics
    ///
    /// Panics if `palette` is empty.
    pub fn new(palette: Vec<[u8; 3]>) -> Self {
        assert!(!palette.is_empty(), "text palette must not be empty");
        Self { palette }
    }
}

impl Default for TextColoring {
    fn default() -> Self {
        Self::new(TEXT_PALETTE.to_vec())
    }
}

impl ColorStrategy for TextColoring {
    fn target(&self) -> Target {
        Target::Text
    }

    fn initial_color(&self, rng: &mut dyn RngCore) -> Vec3 {
        let [r, g, b] = self.palette[rng.gen_range(0..self.palette.len())];
        Vec3::new(r as f32, g as f32, b as f32)
    }

    fn stroke(&self, particle: &Particle) -> Option<StrokeStyle> {
        Some(StrokeStyle::new(to_rgba(particle.color()), 1.0))
    }
}

/// Nothing is drawn and colors stay put.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenColoring;

impl ColorStrategy for HiddenColoring {
    fn target(&self) -> Target {
        Target::Hidden
    }

    fn initial_color(&self, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::ZERO
    }

    fn stroke(&self, _particle: &Particle) -> Option<StrokeStyle> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cell(color: [u8; 4]) -> FlowCell {
        FlowCell {
            position: Vec2::ZERO,
            color,
            angle: 0.0,
        }
    }

    #[test]
    fn test_for_target() {
        for target in [Target::Image, Target::Text, Target::Hidden] {
            assert_eq!(for_target(target).target(), target);
        }
    }

    #[test]
    fn test_image_easing_converges() {
        let target = cell([255, 128, 0, 255]);
        let mut color = Vec3::ZERO;
        for n in 1..=30 {
            ImageColoring.ease(&mut color, &target, 0.1);
            let expected = Vec3::new(255.0, 128.0, 0.0) * (1.0 - 0.9f32.powi(n));
            assert!((color - expected).length() < 1e-3);
        }
    }

    #[test]
    fn test_text_coloring_never_eases() {
        let mut color = Vec3::new(252.0, 3.0, 3.0);
        TextColoring::default().ease(&mut color, &cell([0, 255, 0, 255]), 0.1);
        assert_eq!(color, Vec3::new(252.0, 3.0, 3.0));
    }

    #[test]
    fn test_text_initial_color_from_palette() {
        let coloring = TextColoring::default();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let c = coloring.initial_color(&mut rng);
            let rgb = [c.x as u8, c.y as u8, c.z as u8];
            assert!(TEXT_PALETTE.contains(&rgb));
        }
    }

    #[test]
    fn test_strokes_per_strategy() {
        let mut rng = StdRng::seed_from_u64(8);
        let particle = Particle::new(&mut rng, UVec2::splat(10), Vec3::new(10.4, 20.6, 300.0));

        let image = ImageColoring.stroke(&particle).unwrap();
        assert_eq!(image.color, Rgba([10, 21, 255, 255]));
        assert_eq!(image.width, particle.line_width());
        assert_eq!(image.shadow.is_some(), particle.max_length() > SHADOW_MIN_LENGTH);

        let text = TextColoring::default().stroke(&particle).unwrap();
        assert_eq!(text.width, 1.0);
        assert!(text.shadow.is_none());

        assert!(HiddenColoring.stroke(&particle).is_none());
    }

    #[test]
    fn test_long_trails_get_shadow() {
        let mut rng = StdRng::seed_from_u64(0);
        let long = std::iter::repeat_with(|| Particle::new(&mut rng, UVec2::splat(10), Vec3::ZERO))
            .find(|p| p.max_length() > SHADOW_MIN_LENGTH)
            .unwrap();
        let style = ImageColoring.stroke(&long).unwrap();
        assert_eq!(style.width, 4.0);
        let shadow = style.shadow.unwrap();
        assert_eq!(shadow.offset, Vec2::new(2.0, 4.0));
        assert_eq!(shadow.color, Rgba([0, 0, 0, 255]));
    }
}
