//! Drawing surface: an additive light buffer rasterised to terminal half-blocks.

use crate::color::Rgb;
use crate::config::canvas::{GRADIENT_INNER_RADIUS, SOLID_ALPHA};
use std::io::Write;

/// Consumer of the points that particles and rockets emit.
pub trait Renderer {
    /// Draw a filled circle at (`x`, `y`) in show pixels. Non-solid points
    /// fade from `alpha` at the centre to transparent at the edge; solid
    /// points are a flat half-transparent fill.
    fn draw_point(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: u8, solid: bool);
}

/// A renderer that is wiped once per frame.
pub trait Surface: Renderer {
    fn clear(&mut self);
}

pub struct Canvas {
    /// Logical size in show pixels
    width: f32,
    height: f32,
    /// Terminal size in pixels (columns x rows * 2)
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
    light: Vec<[f32; 3]>,
    bg_color: Rgb,
    notice: Option<String>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(width: f32, height: f32, cols: usize, rows: usize, bg_color: Rgb) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            width,
            height,
            cols,
            rows,
            scale_x: cols as f32 / width,
            scale_y: rows as f32 / height,
            light: vec![[0.0; 3]; cols * rows],
            bg_color,
            notice: None,
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    /// Rebuild the pixel grid for a new terminal size, keeping the logical size.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let notice = self.notice.take();
        *self = Canvas::new(self.width, self.height, cols, rows, self.bg_color);
        self.notice = notice;
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// One line of text drawn over the top row, e.g. a load error.
    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Final colour of a terminal pixel.
    pub fn pixel(&self, px: usize, py: usize) -> Rgb {
        self.bg_color.lighten(self.light[py * self.cols + px])
    }

    /// Write the frame as 24-bit colour half-blocks.
    pub fn present<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color = Rgb::WHITE;
        let mut prev_bot_color = Rgb::WHITE;
        let mut notice_chars = self.notice.as_deref().unwrap_or("").chars();

        for y in (0..self.rows).step_by(2) {
            for x in 0..self.cols {
                let top_color = self.pixel(x, y);
                let bot_color = if y + 1 < self.rows { self.pixel(x, y + 1) } else { top_color };

                if y == 0 {
                    if let Some(ch) = notice_chars.next() {
                        // One cell per char: newlines or escapes would break the frame
                        let ch = if ch.is_control() { ' ' } else { ch };
                        write!(
                            self.output_buf,
                            "\x1b[48;2;{};{};{}m\x1b[38;2;255;255;255m{}",
                            top_color.0, top_color.1, top_color.2, ch
                        )?;
                        prev_top_color = top_color;
                        prev_bot_color = Rgb::WHITE;
                        continue;
                    }
                }

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = Rgb::WHITE;
            prev_bot_color = Rgb::WHITE;
            if y + 2 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl Renderer for Canvas {
    fn draw_point(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: u8, solid: bool) {
        if !(radius > 0.0) || !x.is_finite() || !y.is_finite() {
            return;
        }

        let base = color.to_f32();
        let center_x = x * self.scale_x;
        let center_y = y * self.scale_y;
        let min_x = ((x - radius) * self.scale_x).floor().max(0.0) as usize;
        let min_y = ((y - radius) * self.scale_y).floor().max(0.0) as usize;
        let max_x = ((x + radius) * self.scale_x).ceil().min(self.cols as f32) as usize;
        let max_y = ((y + radius) * self.scale_y).ceil().min(self.rows as f32) as usize;

        let peak = f32::from(if solid { SOLID_ALPHA } else { alpha }) / 255.0;
        let inner = GRADIENT_INNER_RADIUS.min(radius);
        let mut covered = false;

        for py in min_y..max_y {
            for px in min_x..max_x {
                // Distance from the centre of this pixel, back in show pixels
                let dx = (px as f32 + 0.5 - center_x) / self.scale_x;
                let dy = (py as f32 + 0.5 - center_y) / self.scale_y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > radius {
                    continue;
                }

                let opacity = if solid || dist <= inner {
                    peak
                } else {
                    peak * (1.0 - (dist - inner) / (radius - inner))
                };

                let cell = &mut self.light[py * self.cols + px];
                for (acc, channel) in cell.iter_mut().zip(base) {
                    *acc += channel * opacity;
                }
                covered = true;
            }
        }

        // Points smaller than a terminal pixel still light the pixel they sit in
        if !covered && center_x >= 0.0 && center_y >= 0.0 {
            let (px, py) = (center_x as usize, center_y as usize);
            if px < self.cols && py < self.rows {
                let cell = &mut self.light[py * self.cols + px];
                for (acc, channel) in cell.iter_mut().zip(base) {
                    *acc += channel * peak;
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.light.fill([0.0; 3]);
    }
}
