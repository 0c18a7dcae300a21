use crate::canvas::Renderer;
use crate::color::Rgb;
use fastrand::Rng;

/// A 2D position or velocity, in show pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` scaled by `speed`.
    pub fn polar(angle: f32, speed: f32) -> Self {
        Self {
            x: angle.cos() * speed,
            y: angle.sin() * speed,
        }
    }
}

/// Minimum opacity of a live particle.
pub const MIN_ALPHA: f32 = 0.1;
/// Minimum radius of a live particle.
pub const MIN_RADIUS: f32 = 1.0;

/// A single decaying point of light.
///
/// Velocity is in pixels per update; every coefficient is applied once per
/// frame, whatever the frame length.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    pub radius: f32,
    pub color: Rgb,
    /// Opacity in [0, 1]
    pub alpha: f32,
    /// Subtracted from alpha on every update
    pub fade: f32,
    /// Velocity damping factor, usually in [0, 1]
    pub resistance: f32,
    /// Added to the vertical velocity on every update
    pub gravity: f32,
    /// Radius decay factor, usually in (0, 1]
    pub shrink: f32,
    /// Draw with a random radius each frame
    pub flick: bool,
    /// Draw as a flat disc instead of a gradient
    pub solid: bool,
}

impl Particle {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            velocity: Point::ZERO,
            radius: 4.0,
            color: Rgb::WHITE,
            alpha: 1.0,
            fade: 0.0,
            resistance: 1.0,
            gravity: 0.0,
            shrink: 0.97,
            flick: false,
            solid: false,
        }
    }

    pub fn update(&mut self) {
        self.velocity.x *= self.resistance;
        self.velocity.y *= self.resistance;

        self.velocity.y += self.gravity;

        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;

        self.radius *= self.shrink;

        self.alpha -= self.fade;
    }

    pub fn exists(&self) -> bool {
        self.alpha >= MIN_ALPHA && self.radius >= MIN_RADIUS
    }

    pub fn render(&self, renderer: &mut dyn Renderer, rng: &mut Rng) {
        if !self.exists() {
            return;
        }

        let radius = if self.flick { rng.f32() * self.radius } else { self.radius };
        let alpha = (255.0 * self.alpha).floor().clamp(0.0, 255.0) as u8;

        renderer.draw_point(self.position.x, self.position.y, radius, self.color, alpha, self.solid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::Recorder;

    fn particle(alpha: f32, radius: f32) -> Particle {
        Particle {
            alpha,
            radius,
            ..Particle::new(Point::new(10.0, 20.0))
        }
    }

    #[test]
    fn aliveness_bounds_are_inclusive() {
        assert!(particle(0.1, 1.0).exists());
        assert!(!particle(0.099, 1.0).exists());
        assert!(!particle(0.1, 0.999).exists());
        assert!(particle(1.0, 20.0).exists());
    }

    #[test]
    fn update_integrates_damped_velocity_then_position() {
        let mut p = Particle {
            velocity: Point::new(10.0, -10.0),
            resistance: 0.5,
            gravity: 1.0,
            shrink: 0.5,
            fade: 0.25,
            radius: 8.0,
            ..Particle::new(Point::new(0.0, 0.0))
        };
        p.update();
        assert_eq!(p.velocity, Point::new(5.0, -4.0));
        assert_eq!(p.position, Point::new(5.0, -4.0));
        assert_eq!(p.radius, 4.0);
        assert_eq!(p.alpha, 0.75);
    }

    #[test]
    fn update_never_grows_radius_or_alpha() {
        let mut p = Particle {
            fade: 0.01,
            shrink: 0.93,
            radius: 8.0,
            ..Particle::new(Point::ZERO)
        };
        for _ in 0..50 {
            let (radius, alpha) = (p.radius, p.alpha);
            p.update();
            assert!(p.radius < radius);
            assert!(p.alpha < alpha);
        }
    }

    #[test]
    fn dead_particle_is_not_drawn() {
        let mut rec = Recorder::default();
        let mut rng = Rng::with_seed(1);
        particle(0.05, 10.0).render(&mut rec, &mut rng);
        assert!(rec.points.is_empty());
    }

    #[test]
    fn render_passes_opacity_and_flags() {
        let mut rec = Recorder::default();
        let mut rng = Rng::with_seed(1);
        let p = Particle {
            solid: true,
            color: Rgb(1, 2, 3),
            ..particle(0.5, 6.0)
        };
        p.render(&mut rec, &mut rng);
        let call = rec.points[0];
        assert_eq!((call.x, call.y, call.radius), (10.0, 20.0, 6.0));
        assert_eq!(call.alpha, 127);
        assert!(call.solid);
        assert_eq!(call.color, Rgb(1, 2, 3));
    }

    #[test]
    fn flicker_stays_within_radius() {
        let mut rec = Recorder::default();
        let mut rng = Rng::with_seed(7);
        let p = Particle {
            flick: true,
            ..particle(1.0, 6.0)
        };
        for _ in 0..100 {
            p.render(&mut rec, &mut rng);
        }
        assert!(rec.points.iter().all(|c| c.radius >= 0.0 && c.radius < 6.0));
        assert!(rec.points.windows(2).any(|w| w[0].radius != w[1].radius));
    }
}
