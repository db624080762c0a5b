// Copyright (c) 2026 0xAditya

/// Width of one terminal cell in virtual pixels.
pub const CELL_W: f32 = 8.0;
/// Height of one terminal cell in virtual pixels.
pub const CELL_H: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// A cell-aligned rectangle on the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// Shrinks the rectangle by `n` cells on every side.
    pub fn inset(&self, n: u16) -> Rect {
        Rect {
            x: self.x.saturating_add(n),
            y: self.y.saturating_add(n),
            w: self.w.saturating_sub(n.saturating_mul(2)),
            h: self.h.saturating_sub(n.saturating_mul(2)),
        }
    }

    /// Clips the rectangle to a `cols x rows` screen.
    pub fn clip(&self, cols: u16, rows: u16) -> Rect {
        let x = self.x.min(cols);
        let y = self.y.min(rows);
        Rect {
            x,
            y,
            w: self.right().min(cols) - x,
            h: self.bottom().min(rows) - y,
        }
    }
}

/// Converts a cell count to virtual pixels.
pub fn cols_to_px(cols: u16) -> f32 {
    cols as f32 * CELL_W
}

pub fn rows_to_px(rows: u16) -> f32 {
    rows as f32 * CELL_H
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_rect_inside_screen() {
        let r = Rect::new(70, 20, 20, 10).clip(80, 24);
        assert_eq!(r, Rect::new(70, 20, 10, 4));
        assert!(Rect::new(90, 0, 5, 5).clip(80, 24).is_empty());
    }

    #[test]
    fn inset_saturates() {
        assert!(Rect::new(0, 0, 3, 3).inset(2).is_empty());
        assert_eq!(Rect::new(1, 1, 10, 6).inset(1), Rect::new(2, 2, 8, 4));
    }
}
