//! The particle pool.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::coloring::ColorStrategy;
use crate::field::FlowField;
use crate::particle::{Dynamics, Particle, Step};
use crate::surface::Surface;

/// Default number of particles in a pool.
pub const DEFAULT_PARTICLE_COUNT: usize = 3000;

/// A fixed-size pool of particles flowing through one field snapshot.
///
/// The field is shared read-only by every particle. [`rebuild`](Self::rebuild)
/// swaps it for the whole pool at once, between frames.
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    field: Arc<FlowField>,
    coloring: Box<dyn ColorStrategy>,
    dynamics: Dynamics,
    rng: StdRng,
    fallback_warned: bool,
}

impl ParticleSystem {
    /// Create a pool of `count` particles seeded from entropy.
    pub fn new(
        field: Arc<FlowField>,
        coloring: Box<dyn ColorStrategy>,
        dynamics: Dynamics,
        count: usize,
    ) -> Self {
        Self::with_rng(field, coloring, dynamics, count, StdRng::from_entropy())
    }

    /// Create a pool with a caller-supplied random source.
    pub fn with_rng(
        field: Arc<FlowField>,
        coloring: Box<dyn ColorStrategy>,
        dynamics: Dynamics,
        count: usize,
        rng: StdRng,
    ) -> Self {
        let mut system = Self {
            particles: Vec::with_capacity(count),
            field,
            coloring,
            dynamics,
            rng,
            fallback_warned: false,
        };
        system.populate(count);
        system
    }

    fn populate(&mut self, count: usize) {
        let bounds = self.field.size();
        self.particles.clear();
        for _ in 0..count {
            let color = self.coloring.initial_color(&mut self.rng);
            self.particles.push(Particle::new(&mut self.rng, bounds, color));
        }
        // Start every particle on the visual rather than at its random spot
        for particle in &mut self.particles {
            particle.respawn(&self.field, self.dynamics.respawn_attempts, &mut self.rng);
        }
        self.fallback_warned = false;
    }

    /// Replace the field and coloring, and recreate the whole pool.
    pub fn rebuild(&mut self, field: Arc<FlowField>, coloring: Box<dyn ColorStrategy>) {
        self.field = field;
        self.coloring = coloring;
        self.populate(self.particles.len());
        log::debug!(
            "Particle pool rebuilt: {} particles, {} of {} cells covered",
            self.particles.len(),
            self.field.covered_cells(),
            self.field.len()
        );
    }

    /// Swap the coloring strategy without touching particle state.
    pub fn set_coloring(&mut self, coloring: Box<dyn ColorStrategy>) {
        self.coloring = coloring;
    }

    /// Advance every particle by one tick without drawing.
    pub fn step(&mut self) {
        for i in 0..self.particles.len() {
            self.update(i);
        }
    }

    /// Advance every particle by one tick and stroke its trail.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        for i in 0..self.particles.len() {
            self.update(i);
            let particle = &self.particles[i];
            if let Some(style) = self.coloring.stroke(particle) {
                let trail = particle.trail();
                let Some(first) = trail.front() else {
                    continue;
                };
                surface.begin_path();
                surface.move_to(*first);
                for point in trail {
                    surface.line_to(*point);
                }
                surface.stroke(&style);
            }
        }
    }

    fn update(&mut self, index: usize) {
        let step = self.particles[index].update(
            &self.field,
            self.coloring.as_ref(),
            &self.dynamics,
            &mut self.rng,
        );
        if step == (Step::Respawned { covered: false }) && !self.fallback_warned {
            self.fallback_warned = true;
            log::warn!(
                "No covered cell found in {} attempts; respawning at random positions",
                self.dynamics.respawn_attempts
            );
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn field(&self) -> &Arc<FlowField> {
        &self.field
    }

    pub fn coloring(&self) -> &dyn ColorStrategy {
        self.coloring.as_ref()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
