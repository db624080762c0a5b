// Copyright (c) 2026 0xAditya

//! Slowly spinning wireframe earth in the bottom-right corner.
//!
//! The sphere is ray cast once per cell against a perspective camera and
//! textured from an equirectangular image; latitude/longitude curves are
//! projected onto a Braille dot layer and pulsing data markers are drawn as
//! glyphs on top.

use std::f32::consts::{PI, TAU};
use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::braille::DotLayer;
use crate::canvas::Canvas;
use crate::host::{Effect, Listen};
use crate::palette::{Rgb, NEON_CYAN, NEON_GREEN};
use crate::runtime::{cols_to_px, rows_to_px, CELL_H, CELL_W};

pub const GLOBE_SIZE_PX: f32 = 300.0;
pub const GLOBE_OFFSET_PX: f32 = 20.0;
pub const MARKER_COUNT: usize = 8;
pub const ROTATION_STEP: f32 = 0.001;

const CAMERA_DISTANCE: f32 = 1.8;
const FOV_DEG: f32 = 75.0;
const GLOBE_OPACITY: f32 = 0.7;
const MERIDIANS: usize = 12;
const LATITUDE_STEPS: [i32; 5] = [-4, -2, 0, 2, 4];
const CURVE_SEGMENTS: usize = 50;
const SHADE_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const MAX_TEXTURE_WIDTH: u32 = 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rotation about the vertical axis, right-handed.
    pub fn rotate_y(self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c + self.z * s,
            y: self.y,
            z: -self.x * s + self.z * c,
        }
    }
}

/// A pulsing marker on the sphere surface.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    pub position: Vec3,
    pub base_scale: f32,
    pub amplitude: f32,
    pub pulse_speed: f32,
    pub phase: f32,
}

impl DataPoint {
    fn random(rng: &mut StdRng) -> Self {
        let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
        let theta = TAU * rng.random::<f32>();
        let position = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
        let base_scale = 0.5 + rng.random::<f32>() * 0.5;
        let pulse_factor = 0.5 + rng.random::<f32>() * 0.5;
        Self {
            position,
            base_scale,
            amplitude: 0.2 * pulse_factor,
            pulse_speed: 0.5 + rng.random::<f32>() * 2.0,
            phase: rng.random::<f32>() * TAU,
        }
    }

    /// Marker scale `t` seconds after mount.
    pub fn scale_at(&self, t: f32) -> f32 {
        (self.base_scale + self.amplitude * (t * self.pulse_speed + self.phase).sin()).max(0.0)
    }
}

#[derive(Clone, Debug)]
struct GridCurve {
    points: Vec<Vec3>,
    opacity: f32,
}

fn build_grid(rng: &mut StdRng) -> Vec<GridCurve> {
    let mut curves = Vec::with_capacity(MERIDIANS + LATITUDE_STEPS.len());
    for i in 0..MERIDIANS {
        let lon = PI / MERIDIANS as f32 * i as f32;
        let points = (0..=CURVE_SEGMENTS)
            .map(|s| {
                let a = TAU * s as f32 / CURVE_SEGMENTS as f32;
                Vec3::new(a.sin(), a.cos(), 0.0).rotate_y(lon)
            })
            .collect();
        curves.push(GridCurve {
            points,
            opacity: 0.2 + rng.random::<f32>() * 0.1,
        });
    }
    for step in LATITUDE_STEPS {
        let lat = PI / 10.0 * step as f32;
        let (r, y) = (lat.cos(), lat.sin());
        let points = (0..=CURVE_SEGMENTS)
            .map(|s| {
                let a = TAU * s as f32 / CURVE_SEGMENTS as f32;
                Vec3::new(r * a.cos(), y, r * a.sin())
            })
            .collect();
        curves.push(GridCurve {
            points,
            opacity: 0.2 + rng.random::<f32>() * 0.1,
        });
    }
    curves
}

/// Equirectangular surface image.
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn load(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        let img = if img.width() > MAX_TEXTURE_WIDTH {
            img.thumbnail(MAX_TEXTURE_WIDTH, MAX_TEXTURE_WIDTH / 2)
        } else {
            img
        };
        Ok(Self::from_image(img.to_rgb8()))
    }

    /// Missing or broken textures are not fatal; the globe falls back to shading.
    pub fn load_or_warn(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(t) => {
                tracing::info!(path = %path.display(), w = t.image.width(), h = t.image.height(), "globe texture loaded");
                Some(t)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "globe texture unavailable, using plain shading");
                None
            }
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Samples the texel under a point of the unrotated unit sphere.
    pub fn sample(&self, p: Vec3) -> Rgb {
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 {
            return Rgb::default();
        }
        let u = (p.z.atan2(-p.x) / TAU).rem_euclid(1.0);
        let v = p.y.clamp(-1.0, 1.0).acos() / PI;
        let x = ((u * w as f32) as u32).min(w - 1);
        let y = ((v * h as f32) as u32).min(h - 1);
        let px = self.image.get_pixel(x, y);
        Rgb(px[0], px[1], px[2])
    }
}

/// The globe's render target: a square of virtual pixels anchored to the bottom-right.
pub struct Viewport {
    size_px: f32,
    offset_px: f32,
    origin: (f32, f32),
    dots: DotLayer,
}

impl Viewport {
    fn new(cols: u16, rows: u16, size_px: f32, offset_px: f32) -> Self {
        let mut v = Self {
            size_px,
            offset_px,
            origin: (0.0, 0.0),
            dots: DotLayer::new(cols, rows),
        };
        v.anchor(cols, rows);
        v
    }

    fn anchor(&mut self, cols: u16, rows: u16) {
        self.origin = (
            cols_to_px(cols) - self.offset_px - self.size_px,
            rows_to_px(rows) - self.offset_px - self.size_px,
        );
        self.dots.resize(cols, rows);
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn size(&self) -> f32 {
        self.size_px
    }

    /// Normalized device coordinates to screen virtual pixels.
    fn to_screen(&self, ndc: (f32, f32)) -> (f32, f32) {
        (
            self.origin.0 + (ndc.0 + 1.0) * 0.5 * self.size_px,
            self.origin.1 + (1.0 - ndc.1) * 0.5 * self.size_px,
        )
    }

    fn to_ndc(&self, px: f32, py: f32) -> (f32, f32) {
        (
            (px - self.origin.0) / self.size_px * 2.0 - 1.0,
            1.0 - (py - self.origin.1) / self.size_px * 2.0,
        )
    }
}

pub struct GlobeOptions {
    pub size_px: f32,
    pub offset_px: f32,
    pub texture: Option<Texture>,
}

impl Default for GlobeOptions {
    fn default() -> Self {
        Self {
            size_px: GLOBE_SIZE_PX,
            offset_px: GLOBE_OFFSET_PX,
            texture: None,
        }
    }
}

pub struct Globe {
    viewport: Viewport,
    rotation: f32,
    grid: Vec<GridCurve>,
    points: Vec<DataPoint>,
    texture: Option<Texture>,
    mounted_at: Option<Instant>,
    elapsed: f32,
    tan_half_fov: f32,
}

impl Globe {
    pub fn new(cols: u16, rows: u16, opts: GlobeOptions, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = build_grid(&mut rng);
        let points = (0..MARKER_COUNT)
            .map(|_| DataPoint::random(&mut rng))
            .collect();
        Self {
            viewport: Viewport::new(cols, rows, opts.size_px, opts.offset_px),
            rotation: 0.0,
            grid,
            points,
            texture: opts.texture,
            mounted_at: None,
            elapsed: 0.0,
            tan_half_fov: (FOV_DEG.to_radians() / 2.0).tan(),
        }
    }

    #[cfg(test)]
    pub fn data_points(&self) -> &[DataPoint] {
        &self.points
    }

    #[cfg(test)]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[cfg(test)]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Curves in the latitude/longitude grid.
    #[cfg(test)]
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    /// Projects a world-space point; `None` when it sits behind the camera plane.
    fn project(&self, p: Vec3) -> Option<(f32, f32)> {
        let depth = CAMERA_DISTANCE - p.z;
        if depth <= 0.0 {
            return None;
        }
        let k = 1.0 / (depth * self.tan_half_fov);
        Some(self.viewport.to_screen((p.x * k, p.y * k)))
    }

    /// Whether a surface point faces the camera.
    fn faces_camera(p: Vec3) -> bool {
        p.z * CAMERA_DISTANCE > 1.0
    }

    /// First intersection of the ray through the given NDC with the unit sphere.
    fn cast(&self, ndc: (f32, f32)) -> Option<Vec3> {
        let d = Vec3::new(ndc.0 * self.tan_half_fov, ndc.1 * self.tan_half_fov, -1.0);
        let len = d.length();
        let d = Vec3::new(d.x / len, d.y / len, d.z / len);
        let b = CAMERA_DISTANCE * d.z;
        let c = CAMERA_DISTANCE * CAMERA_DISTANCE - 1.0;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        Some(Vec3::new(d.x * t, d.y * t, CAMERA_DISTANCE + d.z * t))
    }

    fn draw_surface(&self, canvas: &mut Canvas) {
        let (ox, oy) = self.viewport.origin();
        let size = self.viewport.size();
        let x0 = (ox / CELL_W).floor().max(0.0) as i32;
        let y0 = (oy / CELL_H).floor().max(0.0) as i32;
        let x1 = ((ox + size) / CELL_W).ceil() as i32;
        let y1 = ((oy + size) / CELL_H).ceil() as i32;

        for cy in y0..y1.min(canvas.height as i32) {
            for cx in x0..x1.min(canvas.width as i32) {
                let px = (cx as f32 + 0.5) * CELL_W;
                let py = (cy as f32 + 0.5) * CELL_H;
                let Some(hit) = self.cast(self.viewport.to_ndc(px, py)) else {
                    continue;
                };
                let local = hit.rotate_y(-self.rotation);
                let (color, level) = match &self.texture {
                    Some(tex) => {
                        let c = tex.sample(local);
                        (c, c.luma() * GLOBE_OPACITY)
                    }
                    None => {
                        // Brighter toward the center of the disc.
                        let facing = ((hit.z * CAMERA_DISTANCE - 1.0) / (CAMERA_DISTANCE - 1.0))
                            .clamp(0.0, 1.0);
                        (NEON_GREEN.scale(0.35), 0.05 + facing * 0.2)
                    }
                };
                canvas.tint(cx, cy, color, GLOBE_OPACITY * 0.25);
                let idx = ((level * (SHADE_RAMP.len() - 1) as f32).round() as usize)
                    .min(SHADE_RAMP.len() - 1);
                if idx == 0 {
                    continue;
                }
                if let Some(bg) = canvas.get(cx, cy).map(|t| t.bg) {
                    let fg = color.scale(1.4).over(bg, GLOBE_OPACITY);
                    canvas.put(cx, cy, SHADE_RAMP[idx], fg, false);
                }
            }
        }
    }

    fn draw_grid(&mut self) {
        self.viewport.dots.clear();
        for ci in 0..self.grid.len() {
            let opacity = self.grid[ci].opacity;
            for pair in self.grid[ci].points.windows(2) {
                let a = pair[0].rotate_y(self.rotation);
                let b = pair[1].rotate_y(self.rotation);
                if !Self::faces_camera(a) || !Self::faces_camera(b) {
                    continue;
                }
                if let (Some(pa), Some(pb)) = (self.project(a), self.project(b)) {
                    self.viewport.dots.line(pa, pb, NEON_GREEN, opacity);
                }
            }
        }
    }

    fn draw_markers(&self, canvas: &mut Canvas) {
        for point in &self.points {
            let p = point.position.rotate_y(self.rotation);
            if !Self::faces_camera(p) {
                continue;
            }
            let scale = point.scale_at(self.elapsed);
            if scale <= 0.0 {
                continue;
            }
            let Some((sx, sy)) = self.project(p) else {
                continue;
            };
            let glyph = if scale < 0.6 {
                '·'
            } else if scale < 0.9 {
                '•'
            } else {
                '●'
            };
            let (x, y) = ((sx / CELL_W) as i32, (sy / CELL_H) as i32);
            if let Some(bg) = canvas.get(x, y).map(|t| t.bg) {
                canvas.put(x, y, glyph, NEON_CYAN.over(bg, GLOBE_OPACITY), true);
            }
        }
    }
}

impl Effect for Globe {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn listens(&self) -> Listen {
        Listen {
            resize: true,
            pointer: false,
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        self.viewport.anchor(cols, rows);
    }

    fn tick(&mut self, now: Instant) {
        let start = *self.mounted_at.get_or_insert(now);
        self.elapsed = now.saturating_duration_since(start).as_secs_f32();
        self.rotation = (self.rotation + ROTATION_STEP) % TAU;
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        if canvas.width == 0 || canvas.height == 0 || self.viewport.size() <= 0.0 {
            return;
        }
        self.draw_surface(canvas);
        self.draw_grid();
        self.viewport.dots.stamp(canvas);
        self.draw_markers(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::BLACK;
    use std::time::Duration;

    fn globe(seed: u64) -> Globe {
        Globe::new(120, 40, GlobeOptions::default(), seed)
    }

    #[test]
    fn builds_twelve_meridians_and_five_parallels() {
        let g = globe(1);
        assert_eq!(g.grid_len(), 17);
        assert_eq!(g.data_points().len(), MARKER_COUNT);
        for c in &g.grid {
            assert_eq!(c.points.len(), CURVE_SEGMENTS + 1);
            assert!((0.2..0.3).contains(&c.opacity));
        }
    }

    #[test]
    fn data_points_sit_on_the_unit_sphere() {
        for p in globe(2).data_points() {
            assert!((p.position.length() - 1.0).abs() < 1e-4);
            assert!((0.5..1.0).contains(&p.base_scale));
            assert!((0.1..0.2).contains(&p.amplitude));
            assert!((0.5..2.5).contains(&p.pulse_speed));
        }
    }

    #[test]
    fn marker_scale_stays_within_pulse_band() {
        let g = globe(3);
        for p in g.data_points() {
            for i in 0..200 {
                let s = p.scale_at(i as f32 * 0.05);
                assert!(s >= 0.0);
                assert!(s >= p.base_scale - p.amplitude - 1e-5);
                assert!(s <= p.base_scale + p.amplitude + 1e-5);
            }
        }
    }

    #[test]
    fn ticks_rotate_without_moving_markers() {
        let mut g = globe(4);
        let before = g.data_points().to_vec();
        let t0 = Instant::now();
        for i in 0..10 {
            g.tick(t0 + Duration::from_millis(16 * i));
        }
        assert!((g.rotation() - 10.0 * ROTATION_STEP).abs() < 1e-6);
        assert_eq!(g.data_points(), &before[..]);
        assert!((g.elapsed_secs() - 0.144).abs() < 1e-3);
    }

    #[test]
    fn resize_re_anchors_to_bottom_right() {
        let mut g = globe(5);
        g.on_resize(200, 60);
        let (ox, oy) = g.viewport().origin();
        assert_eq!(ox, cols_to_px(200) - GLOBE_OFFSET_PX - GLOBE_SIZE_PX);
        assert_eq!(oy, rows_to_px(60) - GLOBE_OFFSET_PX - GLOBE_SIZE_PX);
        assert_eq!(g.viewport().size(), GLOBE_SIZE_PX);
    }

    #[test]
    fn center_ray_hits_the_front_pole() {
        let g = globe(6);
        let hit = g.cast((0.0, 0.0)).unwrap();
        assert!((hit.z - 1.0).abs() < 1e-4);
        assert!(g.cast((1.0, 1.0)).is_none());
    }

    #[test]
    fn draws_inside_its_corner_only() {
        let mut g = globe(7);
        let mut canvas = Canvas::new(120, 40, BLACK);
        g.tick(Instant::now());
        g.draw(&mut canvas);
        let (ox, oy) = g.viewport().origin();
        let min_x = (ox / CELL_W).floor() as i32;
        let min_y = (oy / CELL_H).floor() as i32;
        let mut drawn = 0;
        for y in 0..40 {
            for x in 0..120 {
                if canvas.get(x, y).is_some_and(|t| t.ch != ' ') {
                    drawn += 1;
                    assert!(x >= min_x && y >= min_y, "stray glyph at {},{}", x, y);
                }
            }
        }
        assert!(drawn > 0);
    }

    #[test]
    fn texture_sampling_wraps_longitude() {
        let mut img = RgbImage::new(4, 2);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = image::Rgb([x as u8 * 60, 0, 0]);
        }
        let tex = Texture::from_image(img);
        let a = tex.sample(Vec3::new(-1.0, 0.0, 0.0));
        let b = tex.sample(Vec3::new(-1.0, 0.0, -1e-6));
        assert_eq!(a, Rgb(0, 0, 0));
        assert_eq!(b.0, 180);
    }
}
