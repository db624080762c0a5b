// Copyright (c) 2026 0xAditya

use rand::Rng;

/// A contiguous block of code points sampled with a fixed weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphClass {
    pub start: u32,
    pub range: u32,
    pub weight: f32,
}

/// Half-width katakana, digits and punctuation, the classic rain mix.
pub const RAIN_KATAKANA: [GlyphClass; 3] = [
    GlyphClass {
        start: 0xFF66,
        range: 56,
        weight: 0.7,
    },
    GlyphClass {
        start: 0x30,
        range: 10,
        weight: 0.2,
    },
    GlyphClass {
        start: 0x21,
        range: 15,
        weight: 0.1,
    },
];

/// Same weights with capital letters in place of katakana, for non-UTF terminals.
pub const RAIN_ASCII: [GlyphClass; 3] = [
    GlyphClass {
        start: 0x41,
        range: 26,
        weight: 0.7,
    },
    GlyphClass {
        start: 0x30,
        range: 10,
        weight: 0.2,
    },
    GlyphClass {
        start: 0x21,
        range: 15,
        weight: 0.1,
    },
];

/// Characters for the console's full-screen matrix burst.
pub const MATRIX_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,./<>?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RainGlyphs {
    Katakana,
    Ascii,
}

impl RainGlyphs {
    pub fn classes(self) -> &'static [GlyphClass; 3] {
        match self {
            RainGlyphs::Katakana => &RAIN_KATAKANA,
            RainGlyphs::Ascii => &RAIN_ASCII,
        }
    }
}

pub fn rain_glyphs_from_str(name: &str, default_to_ascii: bool) -> Result<RainGlyphs, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_to_ascii {
            RainGlyphs::Ascii
        } else {
            RainGlyphs::Katakana
        }),
        "katakana" | "matrix" => Ok(RainGlyphs::Katakana),
        "ascii" => Ok(RainGlyphs::Ascii),
        other => Err(format!(
            "unsupported glyph set: {} (allowed: auto, katakana, ascii)",
            other
        )),
    }
}

/// Picks a class by cumulative weight, then a code point uniformly inside it.
pub fn weighted_glyph<R: Rng + ?Sized>(classes: &[GlyphClass], rng: &mut R) -> char {
    let roll: f32 = rng.random();
    let mut acc = 0.0;
    let mut chosen = classes.last().copied();
    for class in classes {
        acc += class.weight;
        if roll < acc {
            chosen = Some(*class);
            break;
        }
    }
    let Some(class) = chosen else {
        return '0';
    };
    let offset = rng.random_range(0..class.range.max(1));
    char::from_u32(class.start + offset).unwrap_or('0')
}

pub fn random_char<R: Rng + ?Sized>(chars: &[char], rng: &mut R) -> char {
    if chars.is_empty() {
        return '0';
    }
    chars[rng.random_range(0..chars.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn class_weights_sum_to_one() {
        for set in [RainGlyphs::Katakana, RainGlyphs::Ascii] {
            let sum: f32 = set.classes().iter().map(|c| c.weight).sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn weighted_glyph_stays_inside_classes() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5_000 {
            let ch = weighted_glyph(&RAIN_KATAKANA, &mut rng) as u32;
            let inside = RAIN_KATAKANA
                .iter()
                .any(|c| ch >= c.start && ch < c.start + c.range);
            assert!(inside, "unexpected glyph {:#x}", ch);
        }
    }

    #[test]
    fn weighted_glyph_prefers_heavy_class() {
        let mut rng = StdRng::seed_from_u64(17);
        let n = 10_000;
        let kana = (0..n)
            .filter(|_| weighted_glyph(&RAIN_KATAKANA, &mut rng) as u32 >= 0xFF66)
            .count();
        let share = kana as f32 / n as f32;
        assert!((0.65..0.75).contains(&share), "share {}", share);
    }

    #[test]
    fn auto_glyphs_fall_back_to_ascii() {
        assert_eq!(rain_glyphs_from_str("auto", true).unwrap(), RainGlyphs::Ascii);
        assert_eq!(
            rain_glyphs_from_str("auto", false).unwrap(),
            RainGlyphs::Katakana
        );
        assert!(rain_glyphs_from_str("runic", false).is_err());
    }
}
