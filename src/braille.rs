// Copyright (c) 2026 0xAditya

use crate::canvas::Canvas;
use crate::palette::Rgb;

/// Virtual pixels per Braille dot, on both axes (a cell is 2x4 dots of 8x16 px).
pub const PX_PER_DOT: f32 = 4.0;

const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

#[derive(Clone, Copy, Debug, Default)]
struct DotCell {
    mask: u8,
    color: Rgb,
    alpha: f32,
}

/// Sub-cell line layer: plots dots, then stamps Braille glyphs onto a canvas.
#[derive(Clone, Debug)]
pub struct DotLayer {
    cols: u16,
    rows: u16,
    cells: Vec<DotCell>,
}

impl DotLayer {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![DotCell::default(); cols as usize * rows as usize],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells.clear();
        self.cells
            .resize(cols as usize * rows as usize, DotCell::default());
    }

    pub fn clear(&mut self) {
        self.cells.fill(DotCell::default());
    }

    /// Sets the dot under virtual pixel `(px, py)`; the strongest color wins per cell.
    pub fn plot(&mut self, px: f32, py: f32, color: Rgb, alpha: f32) {
        if px < 0.0 || py < 0.0 {
            return;
        }
        let dx = (px / PX_PER_DOT) as usize;
        let dy = (py / PX_PER_DOT) as usize;
        let (cx, cy) = (dx / 2, dy / 4);
        if cx >= self.cols as usize || cy >= self.rows as usize {
            return;
        }
        let cell = &mut self.cells[cy * self.cols as usize + cx];
        cell.mask |= DOT_BITS[dy % 4][dx % 2];
        if alpha >= cell.alpha {
            cell.alpha = alpha;
            cell.color = color;
        }
    }

    /// Plots a straight segment between two virtual-pixel points.
    pub fn line(&mut self, a: (f32, f32), b: (f32, f32), color: Rgb, alpha: f32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let steps = (dx.abs().max(dy.abs()) / PX_PER_DOT).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            self.plot(a.0 + dx * t, a.1 + dy * t, color, alpha);
        }
    }

    /// Draws every lit cell onto `canvas` whose glyph is still blank.
    pub fn stamp(&self, canvas: &mut Canvas) {
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.mask == 0 {
                continue;
            }
            let x = (i % self.cols as usize) as i32;
            let y = (i / self.cols as usize) as i32;
            let Some(t) = canvas.get(x, y) else {
                continue;
            };
            if t.ch != ' ' {
                continue;
            }
            let fg = cell.color.over(t.bg, cell.alpha);
            let ch = char::from_u32(0x2800 + cell.mask as u32).unwrap_or('.');
            canvas.put(x, y, ch, fg, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BLACK, WHITE};

    #[test]
    fn plot_sets_expected_braille_bit() {
        let mut layer = DotLayer::new(1, 1);
        layer.plot(0.0, 0.0, WHITE, 1.0);
        layer.plot(4.0, 12.0, WHITE, 1.0);
        let mut c = Canvas::new(1, 1, BLACK);
        layer.stamp(&mut c);
        assert_eq!(c.get(0, 0).map(|t| t.ch), char::from_u32(0x2800 + 0x01 + 0x80));
    }

    #[test]
    fn stamp_does_not_overwrite_glyphs() {
        let mut layer = DotLayer::new(2, 1);
        layer.line((0.0, 0.0), (15.0, 0.0), WHITE, 1.0);
        let mut c = Canvas::new(2, 1, BLACK);
        c.put(0, 0, '@', WHITE, false);
        layer.stamp(&mut c);
        assert_eq!(c.get(0, 0).map(|t| t.ch), Some('@'));
        assert_ne!(c.get(1, 0).map(|t| t.ch), Some(' '));
    }
}
