//! Line-stroking surfaces. The tree core draws through the `Surface`
//! trait; `BrailleCanvas` renders onto a 2x4 braille dot grid per
//! terminal cell.

use crate::terminal::Terminal;
use crossterm::style::Color;

// Braille dot geometry (2x4 dots per character cell)
const BRAILLE_BASE: u32 = 0x2800;
pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// A drawing surface capable of stroking line segments with a settable
/// color and stroke width. Side-effecting only; never fails.
pub trait Surface {
    fn set_stroke_width(&mut self, width: f64);
    fn set_stroke_color(&mut self, color: Color);
    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64);
}

/// Braille dot-grid canvas over terminal cells, with a view transform
/// (offset + uniform scale) so callers draw in world units.
pub struct BrailleCanvas {
    dots_w: usize,
    dots_h: usize,
    dots: Vec<bool>,
    offset_x: f64,
    offset_y: f64,
    scale: f64,
    stroke_width: f64,
    color: Color,
}

impl BrailleCanvas {
    pub fn new(cells_w: u16, cells_h: u16) -> Self {
        let dots_w = cells_w as usize * DOTS_X;
        let dots_h = cells_h as usize * DOTS_Y;
        Self {
            dots_w,
            dots_h,
            dots: vec![false; dots_w * dots_h],
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            stroke_width: 1.0,
            color: Color::White,
        }
    }

    /// Grid size in dots.
    pub fn dot_size(&self) -> (usize, usize) {
        (self.dots_w, self.dots_h)
    }

    /// Map world coordinates onto the dot grid: `screen = offset + scale * world`.
    pub fn set_view(&mut self, offset_x: f64, offset_y: f64, scale: f64) {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self.scale = scale;
    }

    pub fn clear(&mut self) {
        for dot in &mut self.dots {
            *dot = false;
        }
    }

    fn plot(&mut self, x: i32, y: i32) {
        // Out-of-bounds dots are clipped silently
        if x >= 0 && x < self.dots_w as i32 && y >= 0 && y < self.dots_h as i32 {
            self.dots[y as usize * self.dots_w + x as usize] = true;
        }
    }

    /// Stamp a filled disc of the current stroke radius.
    fn stamp(&mut self, cx: f64, cy: f64, radius: f64) {
        let r = radius.max(0.5);
        let ri = r.ceil() as i32;
        let x0 = cx.round() as i32;
        let y0 = cy.round() as i32;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f64 <= r * r {
                    self.plot(x0 + dx, y0 + dy);
                }
            }
        }
    }

    /// Encode the canvas into braille characters on the terminal back
    /// buffer, colored with the current stroke color.
    pub fn blit(&self, term: &mut Terminal) {
        let cells_w = self.dots_w / DOTS_X;
        let cells_h = self.dots_h / DOTS_Y;

        for cell_y in 0..cells_h {
            for cell_x in 0..cells_w {
                let mut code: u32 = 0;
                for dy in 0..DOTS_Y {
                    for dx in 0..DOTS_X {
                        let gx = cell_x * DOTS_X + dx;
                        let gy = cell_y * DOTS_Y + dy;
                        if self.dots[gy * self.dots_w + gx] {
                            code |= braille_bit(dx, dy);
                        }
                    }
                }
                if code != 0 {
                    let ch = char::from_u32(BRAILLE_BASE + code).unwrap_or(' ');
                    term.set(cell_x as i32, cell_y as i32, ch, Some(self.color));
                }
            }
        }
    }

    #[cfg(test)]
    fn dot(&self, x: usize, y: usize) -> bool {
        self.dots[y * self.dots_w + x]
    }
}

impl Surface for BrailleCanvas {
    fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.color = color;
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let sx0 = self.offset_x + self.scale * x0;
        let sy0 = self.offset_y + self.scale * y0;
        let sx1 = self.offset_x + self.scale * x1;
        let sy1 = self.offset_y + self.scale * y1;

        let radius = self.stroke_width * self.scale / 2.0;
        let dx = sx1 - sx0;
        let dy = sy1 - sy0;
        let span = dx.hypot(dy);

        // Half-dot steps so thin strokes stay gap-free
        let steps = (span * 2.0).ceil() as usize;
        for i in 0..=steps {
            let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
            self.stamp(sx0 + dx * t, sy0 + dy * t, radius);
        }
    }
}

/// Bit for a dot at (x, y) within one braille cell.
///
/// Dot numbering:
/// ```text
/// 0 3
/// 1 4
/// 2 5
/// 6 7
/// ```
fn braille_bit(x: usize, y: usize) -> u32 {
    match (x, y) {
        (0, 0) => 1 << 0,
        (0, 1) => 1 << 1,
        (0, 2) => 1 << 2,
        (1, 0) => 1 << 3,
        (1, 1) => 1 << 4,
        (1, 2) => 1 << 5,
        (0, 3) => 1 << 6,
        _ => 1 << 7,
    }
}
