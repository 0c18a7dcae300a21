use super::{Firework, FireworkCore};
use crate::canvas::Renderer;
use crate::config::sim::FOUNTAIN_MAX_PARTICLES;
use crate::particle::{Particle, Point};
use crate::show::{FireworkKind, ShowEvent};
use fastrand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// A fixed emitter spraying an upward cone of glowing particles until its
/// countdown runs out.
pub struct Fountain {
    core: FireworkCore,
    max_particles: usize,
}

impl Fountain {
    pub fn new(event: &ShowEvent, canvas_size: (f32, f32)) -> Self {
        Self {
            core: FireworkCore::new(event, canvas_size),
            max_particles: FOUNTAIN_MAX_PARTICLES,
        }
    }

    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }

    pub fn is_emitting(&self) -> bool {
        self.core.countdown > 0.0
    }

    fn spawn(&mut self, rng: &mut Rng) -> Particle {
        // 90 degree cone around straight up (screen y grows downwards)
        let angle = -3.0 * FRAC_PI_4 + rng.f32() * FRAC_PI_2;
        let speed = (-rng.f32() * FRAC_PI_2).cos() * 15.0;

        Particle {
            velocity: Point::polar(angle, speed),
            radius: 20.0,
            gravity: 0.03,
            resistance: 0.96,
            shrink: rng.f32() * 0.05 + 0.9,
            flick: true,
            color: self.core.color,
            ..Particle::new(self.core.position)
        }
    }
}

impl Firework for Fountain {
    fn update(&mut self, elapsed_ms: f32, rng: &mut Rng) {
        self.core.countdown -= elapsed_ms;

        if self.is_emitting() {
            let missing = self.max_particles.saturating_sub(self.core.particles.len());
            for _ in 0..missing {
                let particle = self.spawn(rng);
                self.core.particles.push(particle);
            }
        }

        self.core.update_particles();
    }

    fn render(&mut self, elapsed_ms: f32, renderer: &mut dyn Renderer, rng: &mut Rng) {
        self.update(elapsed_ms, rng);
        self.core.render_particles(renderer, rng);
    }

    fn exists(&self) -> bool {
        !self.core.particles.is_empty() || self.is_emitting()
    }

    fn kind(&self) -> FireworkKind {
        FireworkKind::Fountain
    }

    fn particles(&self) -> &[Particle] {
        &self.core.particles
    }
}
