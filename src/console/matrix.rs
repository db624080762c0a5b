// Copyright (c) 2026 0xAditya

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use crate::charset::{random_char, MATRIX_CHARS};

pub const MATRIX_ROWS: usize = 15;
pub const MATRIX_COLS: usize = 40;
pub const MATRIX_INTERVAL: Duration = Duration::from_millis(150);
/// Regenerations after the initial fill.
pub const MATRIX_ITERATIONS: u32 = 11;
/// How long the console stays in its effect state.
pub const MATRIX_WINDOW: Duration = Duration::from_millis(2000);

/// A grid of random characters refreshed on a fixed interval.
pub struct MatrixBurst {
    charset: Vec<char>,
    grid: Vec<char>,
    regenerations: u32,
    next_at: Instant,
    rng: StdRng,
}

impl MatrixBurst {
    pub fn new(now: Instant, seed: u64) -> Self {
        let mut burst = Self {
            charset: MATRIX_CHARS.chars().collect(),
            grid: vec![' '; MATRIX_ROWS * MATRIX_COLS],
            regenerations: 0,
            next_at: now + MATRIX_INTERVAL,
            rng: StdRng::seed_from_u64(seed),
        };
        burst.fill();
        burst
    }

    fn fill(&mut self) {
        for ch in self.grid.iter_mut() {
            *ch = random_char(&self.charset, &mut self.rng);
        }
    }

    pub fn poll(&mut self, now: Instant) {
        while !self.is_complete() && now >= self.next_at {
            self.fill();
            self.regenerations += 1;
            self.next_at += MATRIX_INTERVAL;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.regenerations >= MATRIX_ITERATIONS
    }

    #[cfg(test)]
    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.grid.chunks(MATRIX_COLS).map(|r| r.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_fixed_shape_from_charset() {
        let burst = MatrixBurst::new(Instant::now(), 1);
        let rows: Vec<String> = burst.rows().collect();
        assert_eq!(rows.len(), MATRIX_ROWS);
        for row in rows {
            assert_eq!(row.chars().count(), MATRIX_COLS);
            assert!(row.chars().all(|c| MATRIX_CHARS.contains(c)));
        }
    }

    #[test]
    fn stops_after_eleven_regenerations() {
        let t0 = Instant::now();
        let mut burst = MatrixBurst::new(t0, 2);
        burst.poll(t0 + MATRIX_INTERVAL * 5);
        assert_eq!(burst.regenerations(), 5);
        assert!(!burst.is_complete());
        burst.poll(t0 + Duration::from_secs(10));
        assert_eq!(burst.regenerations(), MATRIX_ITERATIONS);
        assert!(burst.is_complete());
    }

    #[test]
    fn regeneration_changes_the_grid() {
        let t0 = Instant::now();
        let mut burst = MatrixBurst::new(t0, 3);
        let before: Vec<String> = burst.rows().collect();
        burst.poll(t0 + MATRIX_INTERVAL);
        let after: Vec<String> = burst.rows().collect();
        assert_ne!(before, after);
    }
}
