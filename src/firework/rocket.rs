use super::{Firework, FireworkCore};
use crate::canvas::Renderer;
use crate::config::sim::{ROCKET_BURST, VELOCITY_SCALE};
use crate::particle::{Particle, Point};
use crate::show::{FireworkKind, ShowEvent};
use fastrand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

/// A shell that climbs in a straight line, then bursts into a sphere of sparks.
pub struct Rocket {
    core: FireworkCore,
    /// Pixels per millisecond, y pointing up
    velocity: Point,
    has_exploded: bool,
}

impl Rocket {
    pub fn new(event: &ShowEvent, canvas_size: (f32, f32)) -> Self {
        let velocity = event.velocity.unwrap_or(Point::ZERO);
        Self {
            core: FireworkCore::new(event, canvas_size),
            velocity: Point::new(velocity.x * VELOCITY_SCALE, velocity.y * VELOCITY_SCALE),
            has_exploded: false,
        }
    }

    pub fn has_exploded(&self) -> bool {
        self.has_exploded
    }

    pub fn position(&self) -> Point {
        self.core.position
    }

    fn explode(&mut self, rng: &mut Rng) {
        self.velocity = Point::ZERO;
        self.core.particles.reserve(ROCKET_BURST);

        for _ in 0..ROCKET_BURST {
            let angle = rng.f32() * TAU;
            // cos of a uniform angle biases speeds towards the maximum
            let speed = (rng.f32() * FRAC_PI_2).cos() * 15.0;

            self.core.particles.push(Particle {
                velocity: Point::polar(angle, speed),
                radius: 8.0,
                gravity: 0.15,
                resistance: 0.9,
                shrink: rng.f32() * 0.05 + 0.91,
                flick: true,
                solid: true,
                color: self.core.color,
                ..Particle::new(self.core.position)
            });
        }

        self.has_exploded = true;
    }
}

impl Firework for Rocket {
    fn update(&mut self, elapsed_ms: f32, rng: &mut Rng) {
        self.core.countdown -= elapsed_ms;

        if !self.has_exploded && self.core.countdown <= 0.0 {
            self.explode(rng);
        }

        if !self.has_exploded {
            self.core.position.x += self.velocity.x * elapsed_ms;
            self.core.position.y -= self.velocity.y * elapsed_ms;
            return;
        }

        self.core.update_particles();
    }

    fn render(&mut self, elapsed_ms: f32, renderer: &mut dyn Renderer, rng: &mut Rng) {
        if !self.exists() {
            return;
        }

        self.update(elapsed_ms, rng);

        if !self.has_exploded {
            let Point { x, y } = self.core.position;
            renderer.draw_point(x, y, self.core.size / 2.0, self.core.color, u8::MAX, false);
        } else {
            self.core.render_particles(renderer, rng);
        }
    }

    fn exists(&self) -> bool {
        !self.has_exploded || !self.core.particles.is_empty()
    }

    fn kind(&self) -> FireworkKind {
        FireworkKind::Rocket
    }

    fn particles(&self) -> &[Particle] {
        &self.core.particles
    }
}
