use crate::color::Rgb;
use crate::particle::Point;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireworkKind {
    Rocket,
    Fountain,
}

impl fmt::Display for FireworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FireworkKind::Rocket => "Rocket",
            FireworkKind::Fountain => "Fountain",
        })
    }
}

impl FromStr for FireworkKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Rocket" => Ok(FireworkKind::Rocket),
            "Fountain" => Ok(FireworkKind::Fountain),
            _ => Err(()),
        }
    }
}

/// A validated firework launch.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowEvent {
    pub kind: FireworkKind,
    /// Offset from show start, in milliseconds
    pub begin: u64,
    /// Rocket fuse or fountain emission window, in milliseconds
    pub duration: u64,
    pub color: Rgb,
    /// Centre-relative, y up
    pub position: Point,
    /// Pixels per second; always present for rockets
    pub velocity: Option<Point>,
}
