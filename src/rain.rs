// Copyright (c) 2026 0xAditya

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::canvas::Canvas;
use crate::charset::{weighted_glyph, GlyphClass};
use crate::host::{Effect, Listen};
use crate::palette::{Rgb, NEON_CYAN, NEON_GREEN};
use crate::runtime::{cols_to_px, rows_to_px, CELL_H, CELL_W};

/// Width and height of one rain glyph, in virtual pixels.
pub const GLYPH_CELL: f32 = 14.0;

pub const SPEED_MIN: f32 = 0.8;
pub const SPEED_SPAN: f32 = 1.5;
pub const BRIGHTNESS_MIN: f32 = 0.5;
pub const BRIGHTNESS_SPAN: f32 = 0.5;

const TRAIL: Rgb = Rgb(10, 10, 10);
const TRAIL_ALPHA: f32 = 0.15;
// Rounding stalls the fade a few steps above the trail color.
const FADE_FLOOR: u8 = 14;
const LAYER_OPACITY: f32 = 0.4;
const FALL_SCALE: f32 = 0.1;

const GLITCH_CHANCE: f32 = 0.01;
const SWAP_CHANCE: f32 = 0.1;
const BIG_GLYPH_CHANCE: f32 = 0.005;
const HIGHLIGHT_CHANCE: f32 = 0.01;
const RESET_CHANCE: f32 = 0.04;

const HEAD_GAIN: f32 = 1.0;
const BODY_GAIN: f32 = 0.8;
const HIGHLIGHT_GAIN: f32 = 0.9;

/// One column's falling cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Drop {
    pub y: f32,
    pub speed: f32,
    pub brightness: f32,
    pub glitching: bool,
    pub glitch_ticks: u8,
    pub last_glyph: Option<char>,
}

/// A glyph painted during the last tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stamp {
    pub column: usize,
    pub y: f32,
    pub ch: char,
    pub color: Rgb,
    pub bold: bool,
}

#[derive(Clone, Copy, Debug)]
struct Phosphor {
    ch: char,
    color: Rgb,
    bold: bool,
}

impl Phosphor {
    const DARK: Phosphor = Phosphor {
        ch: ' ',
        color: TRAIL,
        bold: false,
    };
}

pub struct CharacterRain {
    width: f32,
    height: f32,
    cols: u16,
    rows: u16,
    drops: Vec<Drop>,
    classes: &'static [GlyphClass],
    rng: StdRng,
    stamps: Vec<Stamp>,
    /// What is left on screen from previous frames, faded a little each tick.
    trail: Vec<Phosphor>,
}

impl CharacterRain {
    pub fn new(cols: u16, rows: u16, classes: &'static [GlyphClass], seed: u64) -> Self {
        let mut rain = Self {
            width: cols_to_px(cols),
            height: rows_to_px(rows),
            cols,
            rows,
            drops: Vec::new(),
            classes,
            rng: StdRng::seed_from_u64(seed),
            stamps: Vec::new(),
            trail: vec![Phosphor::DARK; cols as usize * rows as usize],
        };
        let n = rain.column_count();
        rain.fill_columns(n);
        rain
    }

    pub fn column_count(&self) -> usize {
        (self.width / GLYPH_CELL).floor() as usize
    }

    #[cfg(test)]
    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    #[cfg(test)]
    pub fn last_stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    fn fill_columns(&mut self, n: usize) {
        while self.drops.len() < n {
            let y = self.rng.random::<f32>() * -self.height;
            let speed = SPEED_MIN + self.rng.random::<f32>() * SPEED_SPAN;
            let brightness = BRIGHTNESS_MIN + self.rng.random::<f32>() * BRIGHTNESS_SPAN;
            self.drops.push(Drop {
                y,
                speed,
                brightness,
                glitching: false,
                glitch_ticks: 0,
                last_glyph: None,
            });
        }
        self.drops.truncate(n);
    }

    fn glyph(&mut self) -> char {
        weighted_glyph(self.classes, &mut self.rng)
    }

    fn chance(&mut self, p: f32) -> bool {
        self.rng.random::<f32>() < p
    }

    /// Advances every drop one frame and records what it painted in `last_stamps`.
    pub fn step(&mut self) {
        self.stamps.clear();
        for i in 0..self.drops.len() {
            if self.drops[i].y > 0.0 {
                self.paint_drop(i);
            }

            let d = &mut self.drops[i];
            d.y += d.speed * GLYPH_CELL * FALL_SCALE;

            // The reset is deliberately stochastic so columns drift out of phase.
            if self.drops[i].y > self.height && self.chance(RESET_CHANCE) {
                let y = self.rng.random::<f32>() * -100.0;
                let speed = SPEED_MIN + self.rng.random::<f32>() * SPEED_SPAN;
                let brightness = BRIGHTNESS_MIN + self.rng.random::<f32>() * BRIGHTNESS_SPAN;
                let d = &mut self.drops[i];
                d.y = y;
                d.speed = speed;
                d.brightness = brightness;
            }
        }
    }

    fn paint_drop(&mut self, i: usize) {
        let mut brightness = self.drops[i].brightness;
        let mut ch = self.drops[i].last_glyph;

        if self.chance(GLITCH_CHANCE) {
            let ticks = 3 + self.rng.random_range(0..5u8);
            let d = &mut self.drops[i];
            d.glitching = true;
            d.glitch_ticks = ticks;
        }

        if self.drops[i].glitching {
            brightness = 1.0;
            ch = Some(self.glyph());
            let d = &mut self.drops[i];
            d.glitch_ticks = d.glitch_ticks.saturating_sub(1);
            if d.glitch_ticks == 0 {
                d.glitching = false;
            }
        } else if self.chance(SWAP_CHANCE) {
            ch = Some(self.glyph());
        }

        self.drops[i].last_glyph = ch;
        let Some(ch) = ch else {
            return;
        };

        let y = self.drops[i].y;
        let big = self.chance(BIG_GLYPH_CHANCE);
        self.stamps.push(Stamp {
            column: i,
            y,
            ch,
            color: NEON_GREEN.scale(brightness * HEAD_GAIN),
            bold: true,
        });
        if y - CELL_H > 0.0 {
            self.stamps.push(Stamp {
                column: i,
                y: y - CELL_H,
                ch,
                color: NEON_GREEN.scale(brightness * BODY_GAIN),
                bold: big,
            });
        }

        if self.chance(HIGHLIGHT_CHANCE) {
            let lift = GLYPH_CELL * self.rng.random::<f32>() * 5.0;
            let hi = self.glyph();
            self.stamps.push(Stamp {
                column: i,
                y: y - lift,
                ch: hi,
                color: NEON_CYAN.scale(brightness * HIGHLIGHT_GAIN),
                bold: true,
            });
        }
    }

    fn cell_of(&self, column: usize, y: f32) -> Option<usize> {
        let x = (column as f32 * GLYPH_CELL / CELL_W) as usize;
        if y <= 0.0 {
            return None;
        }
        let row = ((y - 1.0) / CELL_H) as usize;
        if x >= self.cols as usize || row >= self.rows as usize {
            return None;
        }
        Some(row * self.cols as usize + x)
    }

    /// Fades the trail and burns this frame's stamps into it.
    fn expose(&mut self) {
        for p in &mut self.trail {
            p.color = TRAIL.over(p.color, TRAIL_ALPHA);
            if p.color.0.max(p.color.1).max(p.color.2) <= FADE_FLOOR {
                *p = Phosphor::DARK;
            }
        }
        for s in &self.stamps {
            let Some(idx) = self.cell_of(s.column, s.y) else {
                continue;
            };
            let p = &mut self.trail[idx];
            p.ch = s.ch;
            p.color = s.color;
            p.bold = s.bold;
        }
    }
}

impl Effect for CharacterRain {
    fn name(&self) -> &'static str {
        "rain"
    }

    fn listens(&self) -> Listen {
        Listen {
            resize: true,
            pointer: false,
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.width = cols_to_px(cols);
        self.height = rows_to_px(rows);
        self.trail.clear();
        self.trail
            .resize(cols as usize * rows as usize, Phosphor::DARK);
        let n = self.column_count();
        self.fill_columns(n);
    }

    fn tick(&mut self, _now: Instant) {
        self.step();
        self.expose();
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        if canvas.width != self.cols || canvas.height != self.rows {
            return;
        }
        for (i, p) in self.trail.iter().enumerate() {
            if p.ch == ' ' {
                continue;
            }
            let x = (i % self.cols as usize) as i32;
            let y = (i / self.cols as usize) as i32;
            if let Some(bg) = canvas.get(x, y).map(|t| t.bg) {
                canvas.put(x, y, p.ch, p.color.over(bg, LAYER_OPACITY), p.bold);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::RAIN_KATAKANA;
    use crate::palette::BLACK;

    fn rain(cols: u16, rows: u16, seed: u64) -> CharacterRain {
        CharacterRain::new(cols, rows, &RAIN_KATAKANA, seed)
    }

    #[test]
    fn one_drop_per_column_with_staggered_start() {
        let r = rain(70, 20, 1);
        assert_eq!(r.drops().len(), (70.0 * CELL_W / GLYPH_CELL) as usize);
        for d in r.drops() {
            assert!(d.y <= 0.0 && d.y > -rows_to_px(20));
        }
    }

    #[test]
    fn reset_values_stay_in_range() {
        let mut r = rain(40, 4, 2);
        let height = rows_to_px(4);
        let mut resets = 0;
        for _ in 0..5_000 {
            let before: Vec<f32> = r.drops().iter().map(|d| d.y).collect();
            r.step();
            for (d, y0) in r.drops().iter().zip(before) {
                if d.y < y0 {
                    resets += 1;
                    assert!(d.y <= 0.0 && d.y > -100.0);
                    assert!((SPEED_MIN..SPEED_MIN + SPEED_SPAN).contains(&d.speed));
                    assert!(
                        (BRIGHTNESS_MIN..BRIGHTNESS_MIN + BRIGHTNESS_SPAN).contains(&d.brightness)
                    );
                    assert!(y0 > height - (SPEED_MIN + SPEED_SPAN) * GLYPH_CELL * FALL_SCALE);
                }
            }
        }
        assert!(resets > 0);
    }

    #[test]
    fn drops_above_the_top_never_paint() {
        let mut r = rain(40, 10, 3);
        for d in &mut r.drops {
            d.y = -50.0;
            d.speed = 0.8;
        }
        r.step();
        assert!(r.last_stamps().is_empty());
    }

    #[test]
    fn glitching_drop_repaints_at_full_brightness() {
        let mut r = rain(2, 10, 4);
        r.drops.truncate(1);
        r.drops[0].y = 40.0;
        r.drops[0].brightness = 0.5;
        r.drops[0].glitching = true;
        r.drops[0].glitch_ticks = 1;
        r.step();
        let head = r.last_stamps()[0];
        assert_eq!(head.color, NEON_GREEN);
        assert!(r.drops()[0].last_glyph.is_some());
    }

    #[test]
    fn glitches_last_three_to_seven_ticks() {
        let mut r = rain(80, 30, 7);
        let mut seen = Vec::new();
        for _ in 0..5_000 {
            let before: Vec<bool> = r.drops().iter().map(|d| d.glitching).collect();
            r.step();
            for (d, was) in r.drops().iter().zip(before) {
                if d.glitching {
                    assert!((1..=6).contains(&d.glitch_ticks));
                }
                // A fresh glitch has already spent one of its ticks on this step.
                if !was && d.glitching {
                    seen.push(d.glitch_ticks + 1);
                }
            }
        }
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|t| (3..=7).contains(t)));
        assert!(seen.contains(&3) && seen.contains(&7));
    }

    #[test]
    fn highlight_glyph_lands_just_above_the_head() {
        let mut r = rain(80, 30, 8);
        let mut highlights = 0;
        for _ in 0..3_000 {
            r.step();
            let stamps = r.last_stamps();
            // Scaled cyan has no red component; scaled green always does.
            for hi in stamps.iter().filter(|s| s.color.0 == 0) {
                let head = stamps
                    .iter()
                    .find(|s| s.column == hi.column && s.color.0 != 0)
                    .unwrap();
                let lift = head.y - hi.y;
                assert!((0.0..GLYPH_CELL * 5.0).contains(&lift), "lift {}", lift);
                assert!(hi.bold);
                assert_ne!(hi.ch, ' ');
                highlights += 1;
            }
        }
        assert!(highlights > 0);
    }

    #[test]
    fn resize_recomputes_columns_and_keeps_survivors() {
        let mut r = rain(70, 20, 5);
        let first = r.drops()[0].clone();
        r.on_resize(140, 20);
        assert_eq!(r.drops().len(), r.column_count());
        assert_eq!(r.drops()[0], first);
        r.on_resize(14, 20);
        assert_eq!(r.drops().len(), 8);
    }

    #[test]
    fn trail_fades_out() {
        let mut r = rain(20, 6, 6);
        let mut canvas = Canvas::new(20, 6, BLACK);
        for _ in 0..200 {
            r.tick(Instant::now());
        }
        for d in &mut r.drops {
            d.y = -1_000.0;
            d.speed = 0.0;
        }
        for _ in 0..200 {
            r.tick(Instant::now());
        }
        r.draw(&mut canvas);
        assert!(canvas.texels().iter().all(|t| t.ch == ' '));
    }
}
