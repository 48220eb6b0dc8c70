//! The flow effect: mode state, sources, field and particle pool together.

use std::sync::Arc;

use glam::{UVec2, Vec2};
use image::Rgba;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::Canvas;
use crate::coloring::for_target;
use crate::config::EffectConfig;
use crate::error::ConfigError;
use crate::field::{aligned_size, FlowField};
use crate::mode::{Command, SimulationMode, Target};
use crate::source::{ImageSource, TextSource};
use crate::surface::{StrokeStyle, Surface};
use crate::system::ParticleSystem;

const GRID_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID_WIDTH: f32 = 0.3;

/// A running flow-field animation.
///
/// Owns the display mode, both source visuals and the particle pool. The
/// canvas size is always a whole number of cells; call
/// [`resize`](Self::resize) with the raw viewport size and draw onto a
/// surface of [`canvas_size`](Self::canvas_size).
///
/// # Example
///
/// ```ignore
/// let mut effect = FlowEffect::new(&config, image, UVec2::new(800, 600))?;
/// let mut canvas = Canvas::new(effect.canvas_size());
///
/// effect.apply(Command::SelectText);
/// effect.render(&mut canvas);
/// ```
#[derive(Debug)]
pub struct FlowEffect {
    mode: SimulationMode,
    cell_size: u32,
    size: UVec2,
    image: ImageSource,
    text: TextSource,
    field: Arc<FlowField>,
    system: ParticleSystem,
    rebuilds: u64,
}

impl FlowEffect {
    /// Create an effect for a viewport, sampling the initial target.
    ///
    /// Fails if `config` does not pass [`EffectConfig::validate`].
    pub fn new(
        config: &EffectConfig,
        image: ImageSource,
        viewport: UVec2,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = SimulationMode::new(config.initial_target);
        let size = aligned_size(viewport, config.cell_size);
        let text = config.text.clone();
        let field = Arc::new(sample_field(
            mode.target(),
            &image,
            &text,
            size,
            config.cell_size,
        ));

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let system = ParticleSystem::with_rng(
            field.clone(),
            for_target(mode.target()),
            config.dynamics(),
            config.particle_count,
            rng,
        );

        log::info!(
            "Flow effect ready: {}x{} canvas, {} particles, target {:?}",
            size.x,
            size.y,
            system.len(),
            mode.target()
        );

        Ok(Self {
            mode,
            cell_size: config.cell_size,
            size,
            image,
            text,
            field,
            system,
            rebuilds: 1,
        })
    }

    /// Apply a user command, rebuilding the field when the target changes.
    pub fn apply(&mut self, command: Command) {
        let change = self.mode.apply(command);
        let previous = self.mode.target();
        self.mode = change.mode;
        log::debug!("{:?}: {:?} -> {:?}", command, previous, self.mode.target());

        if change.rebuild {
            self.rebuild();
        } else if self.mode.target() != previous {
            self.system.set_coloring(for_target(self.mode.target()));
        }
    }

    /// Adapt to a new viewport size. Always rebuilds the field.
    pub fn resize(&mut self, viewport: UVec2) {
        self.size = aligned_size(viewport, self.cell_size);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let target = self.mode.target();
        self.field = Arc::new(sample_field(
            target,
            &self.image,
            &self.text,
            self.size,
            self.cell_size,
        ));
        self.system.rebuild(self.field.clone(), for_target(target));
        self.rebuilds += 1;
        log::info!(
            "Rebuilt {:?} field: {}x{} cells, {} covered",
            target,
            self.field.columns(),
            self.field.rows(),
            self.field.covered_cells()
        );
    }

    /// Draw one frame and advance the particles by one tick.
    ///
    /// Layers, bottom to top: grid, image backdrop, text backdrop, trails.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear();
        if self.mode.show_grid() {
            self.draw_grid(surface);
        }
        if self.mode.shows_image_backdrop() {
            self.image.paint(surface);
        }
        if self.mode.shows_text_backdrop() {
            self.text.paint(surface);
        }
        self.system.tick(surface);
    }

    fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S) {
        let extent = self.size.as_vec2();
        let cell = self.cell_size as f32;

        surface.begin_path();
        for col in 0..self.field.columns() {
            let x = cell * col as f32;
            surface.move_to(Vec2::new(x, 0.0));
            surface.line_to(Vec2::new(x, extent.y));
        }
        for row in 0..self.field.rows() {
            let y = cell * row as f32;
            surface.move_to(Vec2::new(0.0, y));
            surface.line_to(Vec2::new(extent.x, y));
        }
        surface.stroke(&StrokeStyle::new(GRID_COLOR, GRID_WIDTH));
    }

    /// Canvas size in pixels, a whole number of cells on each axis.
    pub fn canvas_size(&self) -> UVec2 {
        self.size
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn field(&self) -> &Arc<FlowField> {
        &self.field
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn text(&self) -> &TextSource {
        &self.text
    }

    /// Number of fields built so far, including the initial one.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

/// Paint `target` onto a scratch canvas and sample it.
///
/// A hidden target paints nothing and yields a field with no coverage.
pub fn sample_field(
    target: Target,
    image: &ImageSource,
    text: &TextSource,
    size: UVec2,
    cell_size: u32,
) -> FlowField {
    let mut scratch = Canvas::new(size);
    match target {
        Target::Image => image.paint(&mut scratch),
        Target::Text => text.paint(&mut scratch),
        Target::Hidden => {}
    }
    FlowField::from_pixels(scratch.pixels(), cell_size)
}
