//! Fireworks shows for the terminal.
//!
//! A show is a list of [`ShowEvent`]s, each launching a [`Rocket`] or a
//! [`Fountain`] at its begin time. The [`Scheduler`] owns the show clock
//! and is ticked once per frame against a [`Surface`]; [`Canvas`] is the
//! terminal implementation of that surface.

pub mod canvas;
pub mod color;
pub mod config;
pub mod firework;
pub mod particle;
pub mod show;

pub use canvas::{Canvas, Renderer, Surface};
pub use color::Rgb;
pub use firework::{Firework, Fountain, Rocket};
pub use particle::{Particle, Point};
pub use show::{FireworkKind, Scheduler, ShowError, ShowEvent};
