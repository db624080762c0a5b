// Copyright (c) 2026 0xAditya

use crate::braille::DotLayer;
use crate::canvas::{char_cols, Canvas, Texel};
use crate::console::draw_frame;
use crate::palette::{Rgb, BLACK, NEON_GREEN, PALE_GREEN};
use crate::runtime::{Rect, CELL_H, CELL_W};

const GREEN_400: Rgb = Rgb(74, 222, 128);
const GREEN_300: Rgb = Rgb(134, 239, 172);
const GREEN_100: Rgb = Rgb(220, 252, 231);
const GREEN_700: Rgb = Rgb(21, 128, 61);
const GRADIENT_FROM: Rgb = Rgb(0x0f, 0x2d, 0x0f);
const GRADIENT_TO: Rgb = Rgb(0x1a, 0x1a, 0x1a);

pub const HANDLE: &str = "0xAditya";
pub const BADGES: [&str; 4] = ["Cybersecurity", "Full-Stack", "Cloud", "Linux"];
const LINKS: [&str; 4] = ["✉ Email", "in LinkedIn", "⌥ GitHub", "⤓ Resume ^E"];

/// A run of text sharing one style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub text: &'static str,
    pub color: Rgb,
    pub bold: bool,
}

const fn plain(text: &'static str) -> Span {
    Span {
        text,
        color: GREEN_100,
        bold: false,
    }
}

const fn strong(text: &'static str) -> Span {
    Span {
        text,
        color: GREEN_400,
        bold: true,
    }
}

const fn accent(text: &'static str) -> Span {
    Span {
        text,
        color: GREEN_300,
        bold: false,
    }
}

pub const BIO: [&[Span]; 2] = [
    &[
        plain("Hi, I'm "),
        strong("Aditya Kumar Tiwari"),
        plain(", a passionate "),
        accent("Cybersecurity Specialist"),
        plain(" and "),
        accent("Full-Stack Developer"),
        plain(". I thrive at the intersection of technology and innovation, crafting secure and scalable solutions for real-world challenges."),
    ],
    &[
        plain("Currently pursuing a "),
        strong("BCA in Cybersecurity"),
        plain(" at Sushant University, I specialize in "),
        accent("Python, JavaScript, Linux, and Cloud Computing"),
        plain(". My mission is to combine security and creativity to build impactful digital experiences."),
    ],
];

/// A styled word or space chunk ready for placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

/// Word-wraps styled spans to `width` columns. Words longer than a line are split.
pub fn wrap_spans(spans: &[Span], width: usize) -> Vec<Vec<Piece>> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines: Vec<Vec<Piece>> = vec![Vec::new()];
    let mut used = 0usize;
    for span in spans {
        for word in span.text.split_inclusive(' ') {
            let visible: usize = word.trim_end().chars().map(|c| char_cols(c) as usize).sum();
            if used > 0 && used + visible > width {
                lines.push(Vec::new());
                used = 0;
            }
            let mut chunk = String::new();
            let mut chunk_cols = 0;
            for ch in word.chars() {
                let w = char_cols(ch) as usize;
                // Trailing spaces may hang past the edge; they are clipped on draw.
                if ch != ' ' && used + chunk_cols + w > width {
                    push_piece(&mut lines, &mut chunk, span);
                    lines.push(Vec::new());
                    used = 0;
                    chunk_cols = 0;
                }
                chunk.push(ch);
                chunk_cols += w;
            }
            used += chunk_cols;
            push_piece(&mut lines, &mut chunk, span);
        }
    }
    lines
}

fn push_piece(lines: &mut [Vec<Piece>], chunk: &mut String, span: &Span) {
    if chunk.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.push(Piece {
            text: std::mem::take(chunk),
            color: span.color,
            bold: span.bold,
        });
    }
}

/// The "About Me" card. Its rectangle is also the export region.
#[derive(Default)]
pub struct AboutPanel {
    avatar: Option<DotLayer>,
}

impl AboutPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the floating header just above the card.
    fn draw_header(canvas: &mut Canvas, area: Rect) {
        let lines = [("{ 0xAditya }", GREEN_400), ("Cybersecurity Enthusiast", GREEN_700)];
        for (i, (text, color)) in lines.iter().enumerate() {
            let y = area.y as i32 - 2 + i as i32;
            if y < 0 {
                continue;
            }
            let x = area.x + area.w.saturating_sub(text.len() as u16) / 2;
            canvas.put_str(x, y as u16, area.right(), text, *color, false);
        }
    }

    fn draw_avatar(&mut self, canvas: &mut Canvas, cx: u16, cy: u16, radius_rows: u16) {
        let dots = self
            .avatar
            .get_or_insert_with(|| DotLayer::new(canvas.width, canvas.height));
        dots.resize(canvas.width, canvas.height);
        dots.clear();
        let (px, py) = ((cx as f32 + 0.5) * CELL_W, (cy as f32 + 0.5) * CELL_H);
        let r = radius_rows as f32 * CELL_H;
        let steps = 96;
        for i in 0..steps {
            let a = std::f32::consts::TAU * i as f32 / steps as f32;
            dots.plot(px + a.cos() * r, py + a.sin() * r, NEON_GREEN, 1.0);
        }
        dots.stamp(canvas);
        let label_x = cx.saturating_sub(HANDLE.len() as u16 / 2);
        canvas.put_str(label_x, cy + radius_rows + 1, canvas.width, HANDLE, GREEN_300, false);
    }

    pub fn draw(&mut self, canvas: &mut Canvas, area: Rect, t: f32) {
        let area = area.clip(canvas.width, canvas.height);
        if area.w < 20 || area.h < 8 {
            return;
        }
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let k = ((x - area.x) as f32 / area.w as f32 + (y - area.y) as f32 / area.h as f32) / 2.0;
                let under = canvas.get(x as i32, y as i32).map_or(BLACK, |t| t.bg);
                let bg = GRADIENT_FROM.lerp(GRADIENT_TO, k).over(under, 0.92);
                canvas.set(x as i32, y as i32, Texel::blank(bg));
            }
        }
        draw_frame(canvas, area, NEON_GREEN);
        Self::draw_header(canvas, area);

        let title = "[ About Me ]";
        let tx = area.x + area.w.saturating_sub(title.len() as u16) / 2;
        canvas.put_str(tx, area.y + 1, area.right() - 1, title, NEON_GREEN, true);

        let inner = Rect::new(area.x + 2, area.y + 3, area.w.saturating_sub(4), area.h.saturating_sub(4));
        let side_by_side = inner.w >= 60;
        let text_x = if side_by_side {
            let avatar_rows = (inner.h.saturating_sub(4) / 2).clamp(1, 4);
            self.draw_avatar(canvas, inner.x + 10, inner.y + avatar_rows + 1, avatar_rows);
            for y in inner.y..inner.bottom() {
                canvas.put((inner.x + 22) as i32, y as i32, '┊', NEON_GREEN.scale(0.6), false);
            }
            inner.x + 24
        } else {
            inner.x
        };
        let right = inner.right();
        let width = right.saturating_sub(text_x) as usize;

        let mut y = inner.y;
        for para in BIO {
            for line in wrap_spans(para, width) {
                if y >= inner.bottom().saturating_sub(2) {
                    break;
                }
                let mut x = text_x;
                for piece in line {
                    x += canvas.put_str(x, y, right, &piece.text, piece.color, piece.bold);
                }
                y += 1;
            }
            y += 1;
        }

        let footer = inner.bottom().saturating_sub(2);
        let mut x = text_x;
        for link in LINKS {
            x += canvas.put_str(x, footer, right, link, NEON_GREEN, false) + 2;
        }
        // Badges float up and down out of phase with each other.
        let mut x = text_x;
        for (i, badge) in BADGES.iter().enumerate() {
            let lift = ((t / 2.2 * std::f32::consts::PI + i as f32 * 0.7).sin() + 1.0) / 2.0;
            let color = PALE_GREEN.lerp(NEON_GREEN, lift);
            let label = format!("[{}]", badge);
            x += canvas.put_str(x, footer + 1, right, &label, color, false) + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &[Piece]) -> String {
        line.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn wrap_keeps_every_word_in_order() {
        let lines = wrap_spans(BIO[0], 30);
        assert!(lines.len() > 3);
        for l in &lines {
            let w: usize = text_of(l).trim_end().chars().count();
            assert!(w <= 30, "line too wide: {:?}", text_of(l));
        }
        let joined: String = lines.iter().map(|l| text_of(l)).collect();
        let source: String = BIO[0].iter().map(|s| s.text).collect();
        assert_eq!(joined.split_whitespace().collect::<Vec<_>>(), source.split_whitespace().collect::<Vec<_>>());
    }

    #[test]
    fn wrap_preserves_span_styles() {
        let lines = wrap_spans(BIO[0], 400);
        assert_eq!(lines.len(), 1);
        let name = lines[0].iter().find(|p| p.text.starts_with("Aditya")).unwrap();
        assert!(name.bold);
        assert_eq!(name.color, GREEN_400);
    }

    #[test]
    fn draws_title_and_badges() {
        let mut panel = AboutPanel::new();
        let mut canvas = Canvas::new(100, 30, BLACK);
        let area = Rect::new(5, 4, 90, 24);
        panel.draw(&mut canvas, area, 0.0);
        let row = |y: i32| -> String { (0..100).filter_map(|x| canvas.get(x, y).map(|t| t.ch)).collect() };
        assert!(row(5).contains("[ About Me ]"));
        assert!(row(2).contains("{ 0xAditya }"));
        let all: String = (0..30).map(row).collect();
        for badge in BADGES {
            assert!(all.contains(badge), "missing badge {}", badge);
        }
        assert!(all.contains("Aditya Kumar Tiwari") || all.contains("Aditya Kumar"));
    }
}
