// Copyright (c) 2026 0xAditya

use crate::palette::Rgb;
use crate::runtime::Rect;

/// Marks the right half of a double-width glyph.
pub const WIDE_TAIL: char = '\0';

/// One composed cell in full RGB, before quantization for the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texel {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
}

impl Texel {
    pub fn blank(bg: Rgb) -> Self {
        Self {
            ch: ' ',
            fg: bg,
            bg,
            bold: false,
        }
    }
}

/// Terminal columns occupied by `ch`.
pub fn char_cols(ch: char) -> u16 {
    let v = ch as u32;
    match v {
        0x0300..=0x036F | 0x200B..=0x200F | 0xFE00..=0xFE0F => 0,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF => 2,
        _ => 1,
    }
}

/// Off-screen RGB composition target shared by every effect.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub width: u16,
    pub height: u16,
    texels: Vec<Texel>,
}

impl Canvas {
    pub fn new(width: u16, height: u16, bg: Rgb) -> Self {
        Self {
            width,
            height,
            texels: vec![Texel::blank(bg); width as usize * height as usize],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16, bg: Rgb) {
        self.width = width;
        self.height = height;
        self.texels.clear();
        self.texels
            .resize(width as usize * height as usize, Texel::blank(bg));
    }

    pub fn clear(&mut self, bg: Rgb) {
        self.texels.fill(Texel::blank(bg));
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Texel> {
        self.index(x, y).map(|i| &self.texels[i])
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn set(&mut self, x: i32, y: i32, t: Texel) {
        if let Some(i) = self.index(x, y) {
            self.texels[i] = t;
        }
    }

    /// Draws a glyph, keeping whatever background is already there.
    pub fn put(&mut self, x: i32, y: i32, ch: char, fg: Rgb, bold: bool) {
        if let Some(i) = self.index(x, y) {
            let t = &mut self.texels[i];
            t.ch = ch;
            t.fg = fg;
            t.bold = bold;
        }
    }

    /// Blends `color` into the background of one cell.
    pub fn tint(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            let t = &mut self.texels[i];
            t.bg = color.over(t.bg, alpha);
            if t.ch == ' ' {
                t.fg = t.bg;
            }
        }
    }

    pub fn fill_rect(&mut self, r: Rect, bg: Rgb) {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.set(x as i32, y as i32, Texel::blank(bg));
            }
        }
    }

    /// Writes `s` starting at `(x, y)`, never past `max_x`. Returns columns used.
    pub fn put_str(&mut self, x: u16, y: u16, max_x: u16, s: &str, fg: Rgb, bold: bool) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            let w = char_cols(ch);
            if w == 0 {
                continue;
            }
            if cx.saturating_add(w) > max_x {
                break;
            }
            self.put(cx as i32, y as i32, ch, fg, bold);
            if w == 2 {
                self.put(cx as i32 + 1, y as i32, WIDE_TAIL, fg, bold);
            }
            cx += w;
        }
        cx - x
    }

    /// Copies the texels covered by `r`, row-major. `None` if `r` is off-canvas.
    pub fn region(&self, r: Rect) -> Option<Vec<Texel>> {
        let r = r.clip(self.width, self.height);
        if r.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(r.w as usize * r.h as usize);
        for y in r.y..r.bottom() {
            let start = y as usize * self.width as usize + r.x as usize;
            out.extend_from_slice(&self.texels[start..start + r.w as usize]);
        }
        Some(out)
    }
}
