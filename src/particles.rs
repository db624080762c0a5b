// Copyright (c) 2026 0xAditya

//! Ambient field of drifting neon dots with proximity links and pointer parallax.

use std::f32::consts::TAU;
use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::braille::DotLayer;
use crate::canvas::Canvas;
use crate::host::{Effect, Listen};
use crate::palette::{Rgb, NEON_CYAN, NEON_GREEN, NEON_MAGENTA, WHITE};
use crate::runtime::{cols_to_px, rows_to_px, CELL_H, CELL_W};

pub const PARTICLE_COUNT: usize = 100;
pub const PALETTE: [Rgb; 4] = [NEON_GREEN, NEON_CYAN, NEON_MAGENTA, WHITE];
pub const PARALLAX_STRENGTH: f32 = 40.0;
pub const LINK_DISTANCE: f32 = 100.0;

const LINK_ALPHA: f32 = 0.08;
// Braille dots are much thinner than a 1px canvas stroke.
const LINK_CONTRAST: f32 = 4.0;
const GLOW_BLUR: f32 = 16.0;
const LAYER_OPACITY: f32 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub color_index: usize,
    pub color_phase: f32,
    pub alpha: f32,
    /// 0.3 is far, 1.0 is near.
    pub depth: f32,
}

impl Particle {
    fn random(rng: &mut StdRng, width: f32, height: f32) -> Self {
        Self {
            x: rng.random_range(0.0..=width),
            y: rng.random_range(0.0..=height),
            vx: rng.random_range(-0.3..0.3),
            vy: rng.random_range(-0.3..0.3),
            radius: rng.random_range(1.5..3.5),
            color_index: rng.random_range(0..PALETTE.len()),
            color_phase: rng.random_range(0.0..TAU),
            alpha: rng.random_range(0.5..=1.0),
            depth: rng.random_range(0.3..=1.0),
        }
    }

    /// Smooth blend between this particle's palette color and the next one.
    pub fn color(&self) -> Rgb {
        let a = PALETTE[self.color_index % PALETTE.len()];
        let b = PALETTE[(self.color_index + 1) % PALETTE.len()];
        a.lerp(b, (self.color_phase.sin() + 1.0) / 2.0)
    }

    fn glyph(&self) -> char {
        if self.radius < 2.2 {
            '·'
        } else if self.radius < 2.9 {
            '•'
        } else {
            '●'
        }
    }
}

pub struct ParticleField {
    width: f32,
    height: f32,
    particles: Vec<Particle>,
    /// Last pointer position, normalized to the viewport.
    pointer: (f32, f32),
    links: DotLayer,
}

impl ParticleField {
    pub fn new(cols: u16, rows: u16, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (width, height) = (cols_to_px(cols), rows_to_px(rows));
        let particles = (0..count)
            .map(|_| Particle::random(&mut rng, width, height))
            .collect();
        Self {
            width,
            height,
            particles,
            pointer: (0.5, 0.5),
            links: DotLayer::new(cols, rows),
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Moves every particle one frame, reflecting off the viewport edges.
    pub fn step(&mut self) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.x += p.vx * p.depth;
            p.y += p.vy * p.depth;
            p.color_phase += 0.01 + 0.01 * p.depth;

            if p.x < 0.0 || p.x > w {
                p.vx = -p.vx;
                p.x = p.x.clamp(0.0, w);
            }
            if p.y < 0.0 || p.y > h {
                p.vy = -p.vy;
                p.y = p.y.clamp(0.0, h);
            }
        }
    }

    pub fn parallax_offset(&self) -> (f32, f32) {
        (
            (self.pointer.0 - 0.5) * PARALLAX_STRENGTH,
            (self.pointer.1 - 0.5) * PARALLAX_STRENGTH,
        )
    }

    fn screen_pos(p: &Particle, offset: (f32, f32)) -> (f32, f32) {
        (p.x + offset.0 * p.depth, p.y + offset.1 * p.depth)
    }

    /// Index pairs whose parallax-adjusted distance is under the link threshold.
    pub fn linked_pairs(&self) -> Vec<(usize, usize)> {
        let offset = self.parallax_offset();
        let mut out = Vec::new();
        for i in 0..self.particles.len() {
            let a = Self::screen_pos(&self.particles[i], offset);
            for j in (i + 1)..self.particles.len() {
                let b = Self::screen_pos(&self.particles[j], offset);
                if (a.0 - b.0).hypot(a.1 - b.1) < LINK_DISTANCE {
                    out.push((i, j));
                }
            }
        }
        out
    }

    fn draw_glow(canvas: &mut Canvas, center: (f32, f32), color: Rgb, strength: f32, blur: f32) {
        let (cx, cy) = (center.0 / CELL_W, center.1 / CELL_H);
        let (rx, ry) = (blur / CELL_W, blur / CELL_H);
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        for y in (cy - ry).floor() as i32..=(cy + ry).ceil() as i32 {
            for x in (cx - rx).floor() as i32..=(cx + rx).ceil() as i32 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                let d = (nx * nx + ny * ny).sqrt();
                if d < 1.0 {
                    canvas.tint(x, y, color, strength * (1.0 - d) * 0.35);
                }
            }
        }
    }
}

impl Effect for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn listens(&self) -> Listen {
        Listen {
            resize: true,
            pointer: true,
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        self.width = cols_to_px(cols);
        self.height = rows_to_px(rows);
        self.links.resize(cols, rows);
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, self.width);
            p.y = p.y.clamp(0.0, self.height);
        }
    }

    fn on_pointer(&mut self, px: f32, py: f32) {
        if self.width > 0.0 && self.height > 0.0 {
            self.pointer = (px / self.width, py / self.height);
        }
    }

    fn tick(&mut self, _now: Instant) {
        self.step();
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        if canvas.width == 0 || canvas.height == 0 {
            return;
        }
        let offset = self.parallax_offset();

        for p in &self.particles {
            let pos = Self::screen_pos(p, offset);
            let color = p.color();
            let strength = p.alpha * LAYER_OPACITY;
            Self::draw_glow(canvas, pos, color, strength, GLOW_BLUR * p.depth);

            let (x, y) = ((pos.0 / CELL_W) as i32, (pos.1 / CELL_H) as i32);
            if let Some(bg) = canvas.get(x, y).map(|t| t.bg) {
                canvas.put(x, y, p.glyph(), color.over(bg, strength), p.depth > 0.8);
            }
        }

        self.links.clear();
        for (i, j) in self.linked_pairs() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            let alpha = (LINK_ALPHA * a.depth * LINK_CONTRAST * LAYER_OPACITY).min(1.0);
            self.links.line(
                Self::screen_pos(a, offset),
                Self::screen_pos(b, offset),
                a.color(),
                alpha,
            );
        }
        self.links.stamp(canvas);
    }
}
