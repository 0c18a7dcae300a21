use std::fmt;

/// A 24-bit RGB colour (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `RRGGBB`, optionally prefixed with `#` or `0x`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim();
        let hex = hex
            .strip_prefix('#')
            .or_else(|| hex.strip_prefix("0x"))
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Rgb(r, g, b))
    }

    /// Channels as floats in 0..=255, ready to be scaled and accumulated.
    pub fn to_f32(self) -> [f32; 3] {
        [self.0 as f32, self.1 as f32, self.2 as f32]
    }

    /// Saturating "lighter" composite of an accumulated light value over `self`.
    pub fn lighten(self, light: [f32; 3]) -> Rgb {
        let add = |base: u8, v: f32| (base as f32 + v).clamp(0.0, 255.0) as u8;
        Rgb(add(self.0, light[0]), add(self.1, light[1]), add(self.2, light[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}
