//! Keyboard input.
//!
//! [`Input`] tracks which keys went down this frame and which are held,
//! along with the Alt modifier, and turns fresh key presses into
//! [`Command`]s:
//!
//! | Key     | Command                               |
//! |---------|---------------------------------------|
//! | `G`     | [`Command::ToggleGrid`]               |
//! | `I`     | [`Command::SelectImage`]              |
//! | `T`     | [`Command::SelectText`]               |
//! | `Alt+I` | [`Command::ToggleImageBackdrop`]      |
//! | `Alt+T` | [`Command::ToggleTextBackdrop`]       |

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::mode::Command;

/// Keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    alt: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` went down this frame. Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Commands triggered by this frame's key presses.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.key_pressed(KeyCode::KeyG) {
            commands.push(Command::ToggleGrid);
        }
        if self.key_pressed(KeyCode::KeyI) {
            commands.push(if self.alt {
                Command::ToggleImageBackdrop
            } else {
                Command::SelectImage
            });
        }
        if self.key_pressed(KeyCode::KeyT) {
            commands.push(if self.alt {
                Command::ToggleTextBackdrop
            } else {
                Command::SelectText
            });
        }
        commands
    }

    /// Clear per-frame state. Call after the frame's commands are consumed.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key_state(key, event.state);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.alt = modifiers.state().alt_key();
            }
            WindowEvent::Focused(false) => {
                // Release events are lost while unfocused
                self.keys_held.clear();
                self.alt = false;
            }
            _ => {}
        }
    }

    fn key_state(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }
}
