use crate::canvas::Renderer;
use crate::color::Rgb;
use crate::particle::{Particle, Point};
use crate::show::{FireworkKind, ShowEvent};
use fastrand::Rng;

pub mod fountain;
pub mod rocket;

pub use fountain::Fountain;
pub use rocket::Rocket;

/// A timed entity owning a set of decaying particles.
pub trait Firework {
    /// Advance internal state and every owned particle by one frame.
    fn update(&mut self, elapsed_ms: f32, rng: &mut Rng);
    /// Update, draw, then drop dead particles.
    fn render(&mut self, elapsed_ms: f32, renderer: &mut dyn Renderer, rng: &mut Rng);
    fn exists(&self) -> bool;
    fn kind(&self) -> FireworkKind;
    fn particles(&self) -> &[Particle];
}

/// State shared by every firework kind.
#[derive(Debug, Clone)]
pub struct FireworkCore {
    pub position: Point,
    pub color: Rgb,
    /// Milliseconds left before the next state change
    pub countdown: f32,
    pub size: f32,
    pub particles: Vec<Particle>,
}

impl FireworkCore {
    /// Show positions are centre-relative with y pointing up.
    pub fn new(event: &ShowEvent, canvas_size: (f32, f32)) -> Self {
        let (width, height) = canvas_size;
        Self {
            position: Point::new(width / 2.0 + event.position.x, height / 2.0 - event.position.y),
            color: event.color,
            countdown: event.duration as f32,
            size: crate::config::sim::ROCKET_SIZE,
            particles: Vec::new(),
        }
    }

    pub fn update_particles(&mut self) {
        self.particles.iter_mut().for_each(Particle::update);
    }

    /// Draw live particles, then compact the collection in one pass if any died.
    pub fn render_particles(&mut self, renderer: &mut dyn Renderer, rng: &mut Rng) {
        let mut has_dead = false;

        for particle in &self.particles {
            if particle.exists() {
                particle.render(renderer, rng);
            } else {
                has_dead = true;
            }
        }

        if has_dead {
            self.particles.retain(Particle::exists);
        }
    }
}

/// Build the firework an event describes.
pub fn prepare_firework(event: &ShowEvent, canvas_size: (f32, f32)) -> Box<dyn Firework> {
    match event.kind {
        FireworkKind::Rocket => Box::new(Rocket::new(event, canvas_size)),
        FireworkKind::Fountain => Box::new(Fountain::new(event, canvas_size)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::canvas::tests::Recorder;

    pub(crate) fn event(kind: FireworkKind, duration: u64) -> ShowEvent {
        ShowEvent {
            kind,
            begin: 0,
            duration,
            color: Rgb(255, 0, 0),
            position: Point::new(0.0, 0.0),
            velocity: (kind == FireworkKind::Rocket).then_some(Point::ZERO),
        }
    }

    #[test]
    fn core_converts_centre_relative_position() {
        let mut e = event(FireworkKind::Fountain, 500);
        e.position = Point::new(-100.0, 200.0);
        let core = FireworkCore::new(&e, (800.0, 600.0));
        assert_eq!(core.position, Point::new(300.0, 100.0));
        assert_eq!(core.countdown, 500.0);
        assert_eq!(core.color, Rgb(255, 0, 0));
        assert!(core.particles.is_empty());
    }

    #[test]
    fn render_particles_prunes_dead_ones() {
        let mut core = FireworkCore::new(&event(FireworkKind::Fountain, 0), (100.0, 100.0));
        let alive = Particle::new(Point::ZERO);
        let dead = Particle { alpha: 0.0, ..Particle::new(Point::ZERO) };
        core.particles = vec![alive.clone(), dead.clone(), alive.clone(), dead];

        let mut rec = Recorder::default();
        core.render_particles(&mut rec, &mut Rng::with_seed(3));

        assert_eq!(rec.points.len(), 2);
        assert_eq!(core.particles, vec![alive.clone(), alive]);
    }

    #[test]
    fn factory_picks_kind() {
        let size = (800.0, 600.0);
        assert_eq!(prepare_firework(&event(FireworkKind::Rocket, 10), size).kind(), FireworkKind::Rocket);
        assert_eq!(prepare_firework(&event(FireworkKind::Fountain, 10), size).kind(), FireworkKind::Fountain);
    }
}
