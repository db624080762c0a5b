// Copyright (c) 2026 0xAditya

//! Typewriter playback of a command's output.
//!
//! A [`Reveal`] is a small state machine advanced by [`Reveal::poll`] with the
//! current time. Each line is written character by character into a fixed
//! slot of the scrollback, so it can be inspected or cancelled between polls.

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};

pub const CHAR_DELAY_BASE_MS: f32 = 12.0;
pub const CHAR_DELAY_JITTER_MS: f32 = 30.0;
pub const LINE_PAUSE: Duration = Duration::from_millis(200);
pub const PLACEHOLDER: char = '_';

/// Longest possible time for a full reveal of `lines`.
#[cfg(test)]
pub fn max_duration(lines: &[String]) -> Duration {
    let chars: usize = lines.iter().map(|l| l.chars().count()).sum();
    let per_char = (CHAR_DELAY_BASE_MS + CHAR_DELAY_JITTER_MS) as u64;
    Duration::from_millis(chars as u64 * per_char) + LINE_PAUSE * lines.len() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Typing,
    Pause,
    Done,
}

#[derive(Debug)]
pub struct Reveal {
    lines: Vec<String>,
    /// Scrollback index that receives line 0.
    base: usize,
    line: usize,
    chars: usize,
    phase: Phase,
    due: Instant,
    rng: StdRng,
}

impl Reveal {
    /// Starts revealing `lines`, pre-appending the first line in full.
    pub fn start(lines: &[String], scrollback: &mut Vec<String>, now: Instant, seed: u64) -> Self {
        let base = scrollback.len();
        scrollback.push(lines.first().cloned().unwrap_or_default());
        Self {
            lines: lines.to_vec(),
            base,
            line: 0,
            chars: 0,
            phase: if lines.is_empty() {
                Phase::Done
            } else {
                Phase::Typing
            },
            due: now,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Current `(line, characters revealed)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.line, self.chars)
    }

    pub fn cancel(&mut self) {
        if self.phase != Phase::Done {
            tracing::debug!(line = self.line, chars = self.chars, "reveal cancelled");
        }
        self.phase = Phase::Done;
    }

    fn char_delay(&mut self) -> Duration {
        let ms = CHAR_DELAY_BASE_MS + self.rng.random::<f32>() * CHAR_DELAY_JITTER_MS;
        Duration::from_micros((ms * 1000.0) as u64)
    }

    fn write(&self, scrollback: &mut Vec<String>, text: String) {
        let idx = self.base + self.line;
        if idx < scrollback.len() {
            scrollback[idx] = text;
        } else {
            scrollback.push(text);
        }
    }

    /// Applies every step that is due by `now`. Returns true when the reveal has finished.
    pub fn poll(&mut self, now: Instant, scrollback: &mut Vec<String>) -> bool {
        while self.phase != Phase::Done && now >= self.due {
            match self.phase {
                Phase::Typing => {
                    let total = self.lines[self.line].chars().count();
                    if self.chars < total {
                        let mut text: String =
                            self.lines[self.line].chars().take(self.chars + 1).collect();
                        if self.chars % 2 == 0 {
                            text.push(PLACEHOLDER);
                        }
                        self.write(scrollback, text);
                        self.chars += 1;
                        let delay = self.char_delay();
                        self.due += delay;
                    } else {
                        let full = self.lines[self.line].clone();
                        self.write(scrollback, full);
                        self.phase = Phase::Pause;
                        self.due += LINE_PAUSE;
                    }
                }
                Phase::Pause => {
                    self.line += 1;
                    self.chars = 0;
                    self.phase = if self.line < self.lines.len() {
                        Phase::Typing
                    } else {
                        Phase::Done
                    };
                }
                Phase::Done => {}
            }
        }
        self.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_line_is_present_before_any_poll() {
        let mut sb = owned(&["$ about"]);
        let r = Reveal::start(&owned(&["hello", "world"]), &mut sb, Instant::now(), 1);
        assert_eq!(sb, owned(&["$ about", "hello"]));
        assert_eq!(r.progress(), (0, 0));
    }

    #[test]
    fn placeholder_follows_even_indices() {
        let t0 = Instant::now();
        let mut sb = Vec::new();
        let mut r = Reveal::start(&owned(&["abc"]), &mut sb, t0, 2);
        r.poll(t0, &mut sb);
        assert_eq!(sb, owned(&["a_"]));
        let next = r.due;
        r.poll(next, &mut sb);
        assert_eq!(sb, owned(&["ab"]));
        let next = r.due;
        r.poll(next, &mut sb);
        assert_eq!(sb, owned(&["abc_"]));
        assert_eq!(r.progress(), (0, 3));
    }

    #[test]
    fn later_lines_are_appended_and_committed() {
        let t0 = Instant::now();
        let lines = owned(&["one", "", "three"]);
        let mut sb = owned(&["$ x"]);
        let mut r = Reveal::start(&lines, &mut sb, t0, 3);
        let end = t0 + max_duration(&lines);
        assert!(r.poll(end, &mut sb));
        assert_eq!(sb, owned(&["$ x", "one", "", "three"]));
    }

    #[test]
    fn finishes_only_after_the_last_pause() {
        let t0 = Instant::now();
        let mut sb = Vec::new();
        let mut r = Reveal::start(&owned(&["x"]), &mut sb, t0, 4);
        assert!(!r.poll(t0 + Duration::from_millis(50), &mut sb));
        assert_eq!(sb, owned(&["x"]));
        assert!(r.poll(t0 + Duration::from_millis(260), &mut sb));
    }

    #[test]
    fn each_character_waits_base_plus_jitter() {
        let t0 = Instant::now();
        let line = "x".repeat(200);
        let mut sb = Vec::new();
        let mut r = Reveal::start(&[line], &mut sb, t0, 6);
        let min = Duration::from_millis(CHAR_DELAY_BASE_MS as u64);
        let max = Duration::from_millis((CHAR_DELAY_BASE_MS + CHAR_DELAY_JITTER_MS) as u64);
        let mut steps = Vec::new();
        while r.progress().1 < 200 {
            let before = r.due;
            r.poll(before, &mut sb);
            steps.push(r.due - before);
        }
        assert_eq!(steps.len(), 200);
        for step in &steps {
            assert!(*step >= min && *step < max, "step {:?} out of range", step);
        }
        // Jitter actually varies the delay.
        assert!(steps.iter().any(|s| *s != steps[0]));
    }

    #[test]
    fn cancel_stops_mid_line() {
        let t0 = Instant::now();
        let mut sb = Vec::new();
        let mut r = Reveal::start(&owned(&["abcdef", "ghi"]), &mut sb, t0, 5);
        r.poll(t0, &mut sb);
        r.cancel();
        assert!(r.is_done());
        r.poll(t0 + Duration::from_secs(5), &mut sb);
        assert_eq!(sb, owned(&["a_"]));
    }
}
