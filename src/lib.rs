//! # lumaflow - luminance flow-field particle trails
//!
//! Particles drift across a canvas, steered by a grid of angles sampled from
//! the brightness of a source visual (an image or a line of text), leaving
//! fading polyline trails colored by what they flow over.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lumaflow::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = EffectConfig::new()
//!         .with_image_path("assets/portrait.png")
//!         .with_particle_count(5000);
//!     lumaflow::run(config)
//! }
//! ```
//!
//! ## Headless use
//!
//! [`FlowEffect`] draws onto anything implementing [`Surface`]. The bundled
//! [`Canvas`] is a CPU surface backed by an [`image::RgbaImage`]:
//!
//! ```ignore
//! let image = ImageSource::load("assets/portrait.png")?;
//! let mut effect = FlowEffect::new(&EffectConfig::default(), image, UVec2::new(800, 600))?;
//! let mut canvas = Canvas::new(effect.canvas_size());
//!
//! for _ in 0..120 {
//!     effect.render(&mut canvas);
//! }
//! canvas.pixels().save("frame.png")?;
//! ```
//!
//! ## Core Concepts
//!
//! - [`FlowField`] - immutable grid of [`FlowCell`]s, one per `cell_size`
//!   square, each holding the sampled color and an angle in `[0, 6.28]`
//! - [`ParticleSystem`] - a fixed pool of [`Particle`]s sharing one field
//!   snapshot; particles ease toward the cell angle, grow a bounded trail,
//!   unwind when their life runs out and respawn on covered cells
//! - [`ColorStrategy`] - per-target coloring and stroke rules
//! - [`SimulationMode`] - target selection plus grid and backdrop toggles,
//!   changed by [`Command`]s
//!
//! ## Controls
//!
//! | Key     | Action                         |
//! |---------|--------------------------------|
//! | `G`     | toggle cell grid               |
//! | `I`     | flow over image (again: hide)  |
//! | `T`     | flow over text (again: hide)   |
//! | `Alt+I` | toggle image backdrop          |
//! | `Alt+T` | toggle text backdrop           |

pub mod canvas;
pub mod coloring;
pub mod config;
pub mod effect;
mod error;
pub mod field;
mod font;
pub mod input;
pub mod mode;
pub mod particle;
mod present;
pub mod source;
pub mod surface;
pub mod system;
mod window;

pub use canvas::Canvas;
pub use coloring::{ColorStrategy, HiddenColoring, ImageColoring, TextColoring};
pub use config::{EffectConfig, WindowConfig, CONFIG_FILE};
pub use effect::FlowEffect;
pub use error::{AppError, ConfigError, GpuError, SourceError};
pub use field::{FlowCell, FlowField};
pub use glam::{IVec2, UVec2, Vec2, Vec3};
pub use mode::{Command, ModeChange, SimulationMode, Target};
pub use particle::{Dynamics, Particle, ParticleState};
pub use present::Presenter;
pub use source::{ImageSource, TextSource};
pub use surface::{RadialGradient, StrokeStyle, Surface};
pub use system::ParticleSystem;
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use lumaflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::config::EffectConfig;
    pub use crate::effect::FlowEffect;
    pub use crate::error::{AppError, SourceError};
    pub use crate::mode::{Command, Target};
    pub use crate::source::{ImageSource, TextSource};
    pub use crate::surface::Surface;
    pub use crate::{UVec2, Vec2};
}
