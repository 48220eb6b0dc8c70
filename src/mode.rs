//! Display mode state and the commands that change it.
//!
//! [`SimulationMode`] is a small immutable value. Applying a [`Command`]
//! never mutates a mode; it produces a new one plus a flag saying whether
//! the flow field has to be rebuilt before the next frame.

use serde::{Deserialize, Serialize};

/// Which visual the particles flow over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Flow over the source image, coloring trails from its pixels.
    #[default]
    Image,
    /// Flow over rendered text, coloring trails from a fixed palette.
    Text,
    /// No target selected. Particles keep moving but nothing is drawn.
    Hidden,
}

/// Edge-triggered user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Show or hide the cell grid overlay.
    ToggleGrid,
    /// Switch to the image target, or switch it off if already active.
    SelectImage,
    /// Switch to the text target, or switch it off if already active.
    SelectText,
    /// Show or hide the source image beneath the particles.
    ToggleImageBackdrop,
    /// Show or hide the source text beneath the particles.
    ToggleTextBackdrop,
}

/// Result of applying a command to a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub mode: SimulationMode,
    /// The flow field must be rebuilt for `mode.target()`.
    pub rebuild: bool,
}

/// Current display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationMode {
    target: Target,
    show_grid: bool,
    show_image: bool,
    show_text: bool,
}

impl SimulationMode {
    /// A mode flowing over `target` with every overlay hidden.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            show_grid: false,
            show_image: false,
            show_text: false,
        }
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    #[inline]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Whether the source image is drawn beneath the particles.
    ///
    /// The image backdrop is suppressed while the text target is active.
    pub fn shows_image_backdrop(&self) -> bool {
        self.show_image && self.target != Target::Text
    }

    /// Whether the source text is drawn beneath the particles.
    ///
    /// The text backdrop is suppressed while the image target is active.
    pub fn shows_text_backdrop(&self) -> bool {
        self.show_text && self.target != Target::Image
    }

    /// Apply a command, returning the new mode.
    pub fn apply(self, command: Command) -> ModeChange {
        match command {
            Command::ToggleGrid => self.keep(Self {
                show_grid: !self.show_grid,
                ..self
            }),
            Command::ToggleImageBackdrop => self.keep(Self {
                show_image: !self.show_image,
                ..self
            }),
            Command::ToggleTextBackdrop => self.keep(Self {
                show_text: !self.show_text,
                ..self
            }),
            Command::SelectImage => self.select(Target::Image, Self {
                show_text: false,
                ..self
            }),
            Command::SelectText => self.select(Target::Text, Self {
                show_image: false,
                ..self
            }),
        }
    }

    fn keep(self, mode: Self) -> ModeChange {
        ModeChange {
            mode,
            rebuild: false,
        }
    }

    fn select(self, target: Target, base: Self) -> ModeChange {
        if self.target == target {
            ModeChange {
                mode: Self {
                    target: Target::Hidden,
                    ..base
                },
                rebuild: false,
            }
        } else {
            ModeChange {
                mode: Self { target, ..base },
                rebuild: true,
            }
        }
    }
}

impl Default for SimulationMode {
    fn default() -> Self {
        Self::new(Target::Image)
    }
}
