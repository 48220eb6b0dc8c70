//! A single flow-field particle and its life cycle.
//!
//! Each particle cycles through three states for as long as the program
//! runs:
//!
//! | State | Condition | Per tick |
//! |-------|-----------|----------|
//! | [`Alive`](ParticleState::Alive) | life remaining | steer, move, extend trail |
//! | [`Dying`](ParticleState::Dying) | no life, trail > 1 point | drop the oldest trail point |
//! | [`Respawning`](ParticleState::Respawning) | no life, trail ≤ 1 point | re-seed on a covered cell |
//!
//! Steering is exponential easing: every tick the heading moves a fixed
//! fraction of the way toward the angle of the cell underneath, so after
//! `n` ticks toward a constant angle `θ` the heading is
//! `θ + (φ₀ - θ)(1 - rate)ⁿ`. That lag is what bends the trails into curves.

use std::collections::VecDeque;

use glam::{UVec2, Vec2, Vec3};
use rand::{Rng, RngCore};

use crate::coloring::ColorStrategy;
use crate::field::FlowField;

/// Fraction of the remaining angle covered per tick.
pub const DEFAULT_HEADING_EASING: f32 = 0.08;
/// Fraction of the remaining color distance covered per tick.
pub const DEFAULT_COLOR_EASING: f32 = 0.1;
/// Random cell picks tried before a respawn falls back to a random position.
pub const DEFAULT_RESPAWN_ATTEMPTS: u32 = 50;

/// Chance that a particle gets an extended trail and a thicker stroke.
const EXTENDED_CHANCE: f64 = 0.01;
const EXTENDED_LINE_WIDTH: f32 = 4.0;
const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Tunable rates shared by every particle in a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dynamics {
    pub heading_easing: f32,
    pub color_easing: f32,
    pub respawn_attempts: u32,
}

impl Default for Dynamics {
    fn default() -> Self {
        Self {
            heading_easing: DEFAULT_HEADING_EASING,
            color_easing: DEFAULT_COLOR_EASING,
            respawn_attempts: DEFAULT_RESPAWN_ATTEMPTS,
        }
    }
}

/// Move `current` a fraction `rate` of the way toward `target`.
#[inline]
pub fn ease(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Life-cycle state of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    Alive,
    Dying,
    Respawning,
}

/// What a single update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Unwound,
    /// The particle was re-seeded. `covered` is false when no covered cell
    /// was found and a random position was used instead.
    Respawned { covered: bool },
}

/// A particle drawing a trail through the flow field.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec2,
    trail: VecDeque<Vec2>,
    max_length: usize,
    line_width: f32,
    heading: f32,
    speed: f32,
    remaining_life: u32,
    color: Vec3,
}

impl Particle {
    /// Create a particle at a random position inside `bounds`.
    ///
    /// Trail length is 10..70 points, or 110..170 with a thicker stroke for
    /// roughly one particle in a hundred. Speed is 1 or 2 pixels per tick.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, bounds: UVec2, color: Vec3) -> Self {
        let speed = rng.gen_range(1..=2) as f32;
        let (max_length, line_width) = if rng.gen_bool(EXTENDED_CHANCE) {
            (rng.gen_range(110..170), EXTENDED_LINE_WIDTH)
        } else {
            (rng.gen_range(10..70), DEFAULT_LINE_WIDTH)
        };

        let mut particle = Self {
            position: Vec2::ZERO,
            trail: VecDeque::with_capacity(max_length + 1),
            max_length,
            line_width,
            heading: 0.0,
            speed,
            remaining_life: 0,
            color,
        };
        particle.reseed(random_point(rng, bounds));
        particle
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Recent positions, oldest first.
    #[inline]
    pub fn trail(&self) -> &VecDeque<Vec2> {
        &self.trail
    }

    #[inline]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    #[inline]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn remaining_life(&self) -> u32 {
        self.remaining_life
    }

    /// Current color, channels in `0.0..=255.0`.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn state(&self) -> ParticleState {
        if self.remaining_life > 0 {
            ParticleState::Alive
        } else if self.trail.len() > 1 {
            ParticleState::Dying
        } else {
            ParticleState::Respawning
        }
    }

    /// Advance the particle by one tick.
    pub fn update<R: RngCore + ?Sized>(
        &mut self,
        field: &FlowField,
        coloring: &dyn ColorStrategy,
        dynamics: &Dynamics,
        rng: &mut R,
    ) -> Step {
        match self.state() {
            ParticleState::Alive => {
                if let Some(cell) = field.cell_at(self.position) {
                    self.heading = ease(self.heading, cell.angle, dynamics.heading_easing);
                    coloring.ease(&mut self.color, cell, dynamics.color_easing);
                }

                self.position += Vec2::from_angle(self.heading) * self.speed;
                self.trail.push_back(self.position);
                if self.trail.len() > self.max_length {
                    self.trail.pop_front();
                }
                self.remaining_life -= 1;
                Step::Moved
            }
            ParticleState::Dying => {
                self.trail.pop_front();
                Step::Unwound
            }
            ParticleState::Respawning => Step::Respawned {
                covered: self.respawn(field, dynamics.respawn_attempts, rng),
            },
        }
    }

    /// Re-seed on a random covered cell, or anywhere if none is found.
    ///
    /// Returns whether a covered cell was found within `attempts` picks.
    pub fn respawn<R: RngCore + ?Sized>(&mut self, field: &FlowField, attempts: u32, rng: &mut R) -> bool {
        let cells = field.cells();
        if !cells.is_empty() {
            for _ in 0..attempts {
                let cell = &cells[rng.gen_range(0..cells.len())];
                if cell.has_coverage() {
                    self.reseed(cell.position);
                    return true;
                }
            }
        }

        self.reseed(random_point(rng, field.size()));
        false
    }

    fn reseed(&mut self, position: Vec2) {
        self.position = position;
        self.trail.clear();
        self.trail.push_back(position);
        self.remaining_life = 2 * self.max_length as u32;
    }
}

/// Uniformly random point in `[0, bounds)`.
fn random_point<R: RngCore + ?Sized>(rng: &mut R, bounds: UVec2) -> Vec2 {
    Vec2::new(
        rng.gen::<f32>() * bounds.x as f32,
        rng.gen::<f32>() * bounds.y as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coloring::{HiddenColoring, ImageColoring};
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uniform_field(size: u32, color: [u8; 4]) -> FlowField {
        FlowField::from_pixels(&RgbaImage::from_pixel(size, size, Rgba(color)), 5)
    }

    fn particle_at(position: Vec2, heading: f32) -> Particle {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::new(&mut rng, UVec2::splat(10), Vec3::ZERO);
        p.reseed(position);
        p.heading = heading;
        p
    }

    #[test]
    fn test_ease() {
        assert!((ease(0.0, 1.0, 0.08) - 0.08).abs() < 1e-6);
        assert!((ease(2.0, 1.0, 0.5) - 1.5).abs() < 1e-6);
        assert_eq!(ease(3.0, 3.0, 0.1), 3.0);
    }

    #[test]
    fn test_new_particle_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut extended = 0;
        for _ in 0..2000 {
            let p = Particle::new(&mut rng, UVec2::new(100, 50), Vec3::ZERO);
            assert!(p.speed() == 1.0 || p.speed() == 2.0);
            if p.line_width() == EXTENDED_LINE_WIDTH {
                extended += 1;
                assert!((110..170).contains(&p.max_length()));
            } else {
                assert!((10..70).contains(&p.max_length()));
            }
            assert_eq!(p.remaining_life() as usize, 2 * p.max_length());
            assert_eq!(p.trail().len(), 1);
            assert!(p.position().x < 100.0 && p.position().y < 50.0);
        }
        // ~1% of 2000
        assert!(extended > 0 && extended < 60, "extended = {}", extended);
    }

    #[test]
    fn test_heading_matches_closed_form() {
        let field = uniform_field(400, [128, 128, 128, 255]);
        let theta = field.cells()[0].angle;
        let phi0 = 0.5;
        let mut p = particle_at(Vec2::splat(200.0), phi0);
        let mut rng = StdRng::seed_from_u64(3);
        let dynamics = Dynamics::default();

        for n in 1..=40 {
            p.update(&field, &HiddenColoring, &dynamics, &mut rng);
            let expected = theta + (phi0 - theta) * 0.92f32.powi(n);
            assert!(
                (p.heading() - expected).abs() < 1e-4,
                "tick {}: {} vs {}",
                n,
                p.heading(),
                expected
            );
        }
    }

    #[test]
    fn test_moves_along_heading_by_speed() {
        let field = FlowField::blank(UVec2::splat(50), 5);
        let mut p = particle_at(Vec2::new(10.0, 10.0), 0.0);
        p.speed = 2.0;
        let mut rng = StdRng::seed_from_u64(3);
        p.update(&field, &HiddenColoring, &Dynamics::default(), &mut rng);

        // Transparent cells still steer: black maps to angle 0
        assert!((p.position() - Vec2::new(12.0, 10.0)).length() < 1e-5);
        assert_eq!(p.trail().back(), Some(&p.position()));
    }

    #[test]
    fn test_color_eases_toward_covered_cell() {
        let field = uniform_field(400, [200, 100, 50, 255]);
        let mut p = particle_at(Vec2::splat(200.0), 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        p.update(&field, &ImageColoring, &Dynamics::default(), &mut rng);
        assert!((p.color() - Vec3::new(20.0, 10.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_color_ignores_background_cells() {
        let field = uniform_field(400, [200, 100, 50, 0]);
        let mut p = particle_at(Vec2::splat(200.0), 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        p.update(&field, &ImageColoring, &Dynamics::default(), &mut rng);
        assert_eq!(p.color(), Vec3::ZERO);
    }

    #[test]
    fn test_trail_never_exceeds_max_length() {
        let field = uniform_field(200, [90, 40, 200, 255]);
        let mut rng = StdRng::seed_from_u64(11);
        let dynamics = Dynamics::default();
        let mut particles: Vec<Particle> = (0..50)
            .map(|_| Particle::new(&mut rng, field.size(), Vec3::ZERO))
            .collect();

        for _ in 0..600 {
            for p in &mut particles {
                p.update(&field, &ImageColoring, &dynamics, &mut rng);
                assert!(p.trail().len() <= p.max_length());
            }
        }
    }

    #[test]
    fn test_life_cycle_states() {
        let field = uniform_field(400, [255, 255, 255, 255]);
        let mut rng = StdRng::seed_from_u64(5);
        let dynamics = Dynamics::default();
        let mut p = particle_at(Vec2::splat(200.0), 0.0);
        let life = p.remaining_life();

        for _ in 0..life {
            assert_eq!(p.state(), ParticleState::Alive);
            assert_eq!(p.update(&field, &HiddenColoring, &dynamics, &mut rng), Step::Moved);
        }
        assert_eq!(p.trail().len(), p.max_length());

        // Tail unwinds one point per tick
        while p.trail().len() > 1 {
            let before = p.trail().len();
            let position = p.position();
            assert_eq!(p.state(), ParticleState::Dying);
            assert_eq!(p.update(&field, &HiddenColoring, &dynamics, &mut rng), Step::Unwound);
            assert_eq!(p.trail().len(), before - 1);
            assert_eq!(p.position(), position);
        }

        assert_eq!(p.state(), ParticleState::Respawning);
        assert_eq!(
            p.update(&field, &HiddenColoring, &dynamics, &mut rng),
            Step::Respawned { covered: true }
        );
        assert_eq!(p.state(), ParticleState::Alive);
    }

    #[test]
    fn test_exhausted_particle_respawns_within_one_tick() {
        let field = uniform_field(50, [0, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = particle_at(Vec2::splat(5.0), 0.0);
        p.remaining_life = 0;
        assert_eq!(p.trail().len(), 1);

        p.update(&field, &HiddenColoring, &Dynamics::default(), &mut rng);
        assert!(!p.trail().is_empty());
        assert!(p.remaining_life() > 0);
    }

    #[test]
    fn test_respawn_finds_single_covered_cell() {
        let mut pixels = RgbaImage::new(25, 25);
        pixels.put_pixel(15, 10, Rgba([255, 0, 0, 255]));
        let field = FlowField::from_pixels(&pixels, 5);
        assert_eq!(field.covered_cells(), 1);

        let mut rng = StdRng::seed_from_u64(21);
        let mut p = particle_at(Vec2::ZERO, 0.0);
        let mut hits = 0;
        for _ in 0..200 {
            if p.respawn(&field, DEFAULT_RESPAWN_ATTEMPTS, &mut rng) {
                assert_eq!(p.position(), Vec2::new(15.0, 10.0));
                hits += 1;
            }
        }
        // (24/25)^50 ≈ 13% of respawns miss
        assert!(hits > 150, "hits = {}", hits);
    }

    #[test]
    fn test_respawn_falls_back_on_empty_field() {
        let field = FlowField::blank(UVec2::new(40, 30), 5);
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = particle_at(Vec2::ZERO, 0.0);
        assert!(!p.respawn(&field, DEFAULT_RESPAWN_ATTEMPTS, &mut rng));
        assert!(p.position().x >= 0.0 && p.position().x < 40.0);
        assert!(p.position().y >= 0.0 && p.position().y < 30.0);
        assert_eq!(p.trail().len(), 1);
    }

    #[test]
    fn test_respawn_on_zero_sized_field_terminates() {
        let field = FlowField::blank(UVec2::ZERO, 5);
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = particle_at(Vec2::splat(3.0), 0.0);
        assert!(!p.respawn(&field, DEFAULT_RESPAWN_ATTEMPTS, &mut rng));
        assert_eq!(p.position(), Vec2::ZERO);
    }

    #[test]
    fn test_off_canvas_particle_steered_by_edge_cell() {
        let field = uniform_field(20, [128, 128, 128, 255]);
        let theta = field.cells()[0].angle;
        let mut p = particle_at(Vec2::new(20.5, 7.0), 0.0);
        p.speed = 0.0;
        let mut rng = StdRng::seed_from_u64(3);
        let dynamics = Dynamics::default();

        for _ in 0..10 {
            p.update(&field, &ImageColoring, &dynamics, &mut rng);
        }
        let expected = theta * (1.0 - 0.92f32.powi(10));
        assert!((p.heading() - expected).abs() < 1e-4, "heading = {}", p.heading());
        assert!(p.color().x > 0.0);
    }
}
