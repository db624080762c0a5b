// Copyright (c) 2026 0xAditya

use crossterm::style::Color;

use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const NEON_GREEN: Rgb = Rgb(0x39, 0xff, 0x14);
pub const NEON_CYAN: Rgb = Rgb(0x00, 0xff, 0xf9);
pub const NEON_MAGENTA: Rgb = Rgb(0xff, 0x00, 0xea);
pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
pub const PANEL_BG: Rgb = Rgb(8, 12, 8);
pub const PROMPT_CYAN: Rgb = Rgb(34, 211, 238);
pub const PALE_GREEN: Rgb = Rgb(187, 247, 208);

impl Rgb {
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb(
            lerp_u8(self.0, other.0, t),
            lerp_u8(self.1, other.1, t),
            lerp_u8(self.2, other.2, t),
        )
    }

    /// Paints `self` over `base` with the given opacity.
    pub fn over(self, base: Rgb, alpha: f32) -> Rgb {
        base.lerp(self, alpha)
    }

    pub fn scale(self, k: f32) -> Rgb {
        BLACK.lerp(self, k)
    }

    pub fn luma(self) -> f32 {
        (0.2126 * self.0 as f32 + 0.7152 * self.1 as f32 + 0.0722 * self.2 as f32) / 255.0
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.0 as i32) - (b.0 as i32);
    let dg = (a.1 as i32) - (b.1 as i32);
    let db = (a.2 as i32) - (b.2 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const ANSI16: [(Color, Rgb); 16] = [
    (Color::Black, Rgb(0, 0, 0)),
    (Color::DarkGrey, Rgb(128, 128, 128)),
    (Color::Grey, Rgb(192, 192, 192)),
    (Color::White, Rgb(255, 255, 255)),
    (Color::DarkRed, Rgb(128, 0, 0)),
    (Color::Red, Rgb(255, 0, 0)),
    (Color::DarkGreen, Rgb(0, 128, 0)),
    (Color::Green, Rgb(0, 255, 0)),
    (Color::DarkBlue, Rgb(0, 0, 128)),
    (Color::Blue, Rgb(0, 0, 255)),
    (Color::DarkCyan, Rgb(0, 128, 128)),
    (Color::Cyan, Rgb(0, 255, 255)),
    (Color::DarkMagenta, Rgb(128, 0, 128)),
    (Color::Magenta, Rgb(255, 0, 255)),
    (Color::DarkYellow, Rgb(128, 128, 0)),
    (Color::Yellow, Rgb(255, 255, 0)),
];

/// Index of the xterm cube level closest to one channel value.
fn nearest_cube_level(v: u8) -> u8 {
    let mut best = 0;
    for (i, level) in CUBE_LEVELS.iter().enumerate() {
        if (v as i16 - *level as i16).abs() < (v as i16 - CUBE_LEVELS[best] as i16).abs() {
            best = i;
        }
    }
    best as u8
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    let r6 = nearest_cube_level(c.0);
    let g6 = nearest_cube_level(c.1);
    let b6 = nearest_cube_level(c.2);

    let cube = Rgb(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6) + (6 * g6) + b6;

    let avg = ((c.0 as u16 + c.1 as u16 + c.2 as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };

    if dist2(c, ansi256_to_rgb(gray_idx)) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn ansi256_to_rgb(v: u8) -> Rgb {
    match v {
        0..=15 => ANSI16[v as usize].1,
        16..=231 => {
            let i = v - 16;
            Rgb(
                CUBE_LEVELS[(i / 36) as usize],
                CUBE_LEVELS[((i / 6) % 6) as usize],
                CUBE_LEVELS[(i % 6) as usize],
            )
        }
        _ => {
            let g = 8 + 10 * (v - 232);
            Rgb(g, g, g)
        }
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (color, rgb) in ANSI16 {
        let d = dist2(c, rgb);
        if d < best_d {
            best_d = d;
            best = color;
        }
    }
    best
}

/// Quantizes RGB colors for the detected terminal capability.
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    pub mode: ColorMode,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    pub fn fg(&self, c: Rgb) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb {
                r: c.0,
                g: c.1,
                b: c.2,
            }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
            ColorMode::Color16 => Some(rgb_to_color16(c)),
        }
    }

    pub fn bg(&self, c: Rgb) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::Color16 if c.luma() < 0.2 => Some(Color::Black),
            _ => self.fg(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(NEON_GREEN.lerp(WHITE, 0.0), NEON_GREEN);
        assert_eq!(NEON_GREEN.lerp(WHITE, 1.0), WHITE);
    }

    #[test]
    fn ansi256_round_trips_cube_colors() {
        let c = Rgb(95, 135, 255);
        let idx = rgb_to_ansi256(c);
        assert_eq!(ansi256_to_rgb(idx), c);
        for i in 16..=231u8 {
            let rgb = ansi256_to_rgb(i);
            assert_eq!(ansi256_to_rgb(rgb_to_ansi256(rgb)), rgb, "cube index {}", i);
        }
    }

    #[test]
    fn ansi256_picks_nearest_cube_level() {
        assert_eq!(nearest_cube_level(100), 1);
        assert_eq!(nearest_cube_level(114), 1);
        assert_eq!(nearest_cube_level(116), 2);
        assert_eq!(nearest_cube_level(47), 0);
        assert_eq!(ansi256_to_rgb(rgb_to_ansi256(Rgb(100, 0, 230))), Rgb(95, 0, 215));
    }

    #[test]
    fn mono_painter_emits_no_color() {
        let p = Painter::new(ColorMode::Mono);
        assert_eq!(p.fg(NEON_GREEN), None);
        assert_eq!(p.bg(BLACK), None);
    }
}
