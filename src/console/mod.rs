// Copyright (c) 2026 0xAditya

//! The scripted fake shell: scrollback, input line, typewriter output and the
//! matrix burst, plus the panel that displays them.

pub mod clipboard;
pub mod commands;
pub mod matrix;
pub mod reveal;

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::canvas::{char_cols, Canvas};
use crate::palette::{Rgb, NEON_GREEN, NEON_MAGENTA, PALE_GREEN, PANEL_BG, PROMPT_CYAN};
use crate::runtime::Rect;

use self::clipboard::Clipboard;
use self::commands::{CommandTable, Resolution, MATRIX_DONE};
use self::matrix::{MatrixBurst, MATRIX_WINDOW};
use self::reveal::Reveal;

const BLINK_MS: u128 = 500;
const MATRIX_GREEN: Rgb = Rgb(74, 222, 128);
const TITLE: &str = "0xAditya@terminal:~";
const HINTS: &str = "^X cut  ^Y copy  ^L clear";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleState {
    Idle,
    Typing,
    Effect,
}

enum Activity {
    Idle,
    Typing(Reveal),
    Effect { burst: MatrixBurst, until: Instant },
}

pub struct Console<C: Clipboard> {
    table: CommandTable,
    scrollback: Vec<String>,
    input: String,
    activity: Activity,
    /// Display rows scrolled up from the newest line.
    scroll: usize,
    page_rows: usize,
    cursor_on: bool,
    blink_epoch: Option<Instant>,
    rng: StdRng,
    clipboard: C,
}

impl<C: Clipboard> Console<C> {
    pub fn new(table: CommandTable, clipboard: C, seed: u64) -> Self {
        let scrollback = table.welcome.clone();
        Self {
            table,
            scrollback,
            input: String::new(),
            activity: Activity::Idle,
            scroll: 0,
            page_rows: 10,
            cursor_on: true,
            blink_epoch: None,
            rng: StdRng::seed_from_u64(seed),
            clipboard,
        }
    }

    pub fn state(&self) -> ConsoleState {
        match self.activity {
            Activity::Idle => ConsoleState::Idle,
            Activity::Typing(_) => ConsoleState::Typing,
            Activity::Effect { .. } => ConsoleState::Effect,
        }
    }

    pub fn scrollback(&self) -> &[String] {
        &self.scrollback
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    #[cfg(test)]
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// `(line, characters)` of the running reveal.
    #[cfg(test)]
    pub fn reveal_progress(&self) -> Option<(usize, usize)> {
        match &self.activity {
            Activity::Typing(r) => Some(r.progress()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    fn changed(&mut self) {
        self.scroll = 0;
    }

    #[cfg(test)]
    pub fn set_input(&mut self, text: &str) {
        if self.state() == ConsoleState::Idle {
            self.input = text.to_string();
        }
    }

    /// Runs whatever is in the input line. Ignored unless idle.
    pub fn submit(&mut self, now: Instant) {
        if self.state() != ConsoleState::Idle {
            return;
        }
        let raw = std::mem::take(&mut self.input);
        let resolution = self.table.resolve(&raw);
        if resolution == Resolution::Blank {
            return;
        }
        tracing::debug!(command = raw.trim(), "submit");

        self.scrollback.push(self.table.echo(&raw));
        match resolution {
            Resolution::Blank => {}
            Resolution::Clear => self.scrollback.clear(),
            Resolution::Matrix => {
                let burst = MatrixBurst::new(now, self.rng.random());
                self.activity = Activity::Effect {
                    burst,
                    until: now + MATRIX_WINDOW,
                };
            }
            Resolution::Reveal(lines) => {
                let reveal = Reveal::start(lines, &mut self.scrollback, now, self.rng.random());
                self.activity = Activity::Typing(reveal);
            }
            Resolution::ProjectNotFound(key) => {
                self.scrollback.push(CommandTable::project_not_found(&key));
            }
            Resolution::NotFound => self.scrollback.push(CommandTable::not_found(&raw)),
        }
        self.changed();
    }

    /// Advances the running reveal or matrix burst.
    pub fn tick(&mut self, now: Instant) {
        self.cursor_on = self.blink_phase(now);
        let mut changed = false;
        let finished = match &mut self.activity {
            Activity::Idle => false,
            Activity::Typing(reveal) => {
                let before = reveal.progress();
                let done = reveal.poll(now, &mut self.scrollback);
                changed = done || reveal.progress() != before;
                done
            }
            Activity::Effect { burst, until } => {
                burst.poll(now);
                if now >= *until {
                    self.scrollback.push(MATRIX_DONE.to_string());
                    changed = true;
                    true
                } else {
                    false
                }
            }
        };
        if finished {
            self.activity = Activity::Idle;
        }
        if changed {
            self.changed();
        }
    }

    fn blink_phase(&mut self, now: Instant) -> bool {
        let epoch = *self.blink_epoch.get_or_insert(now);
        (now.saturating_duration_since(epoch).as_millis() / BLINK_MS) % 2 == 0
    }

    pub fn copy_all(&mut self) {
        if self.scrollback.is_empty() {
            return;
        }
        let text = self.scrollback.join("\n");
        match self.clipboard.set_text(&text) {
            Ok(()) => tracing::info!("copied {} lines to clipboard", self.scrollback.len()),
            Err(e) => tracing::error!("failed to copy to clipboard: {}", e),
        }
    }

    pub fn cut_last(&mut self) {
        if let Activity::Typing(reveal) = &mut self.activity {
            reveal.cancel();
            self.activity = Activity::Idle;
        }
        let Some(last) = self.scrollback.pop() else {
            return;
        };
        if let Err(e) = self.clipboard.set_text(&last) {
            tracing::error!("failed to copy to clipboard: {}", e);
        }
        self.changed();
    }

    pub fn clear(&mut self) {
        if let Activity::Typing(reveal) = &mut self.activity {
            reveal.cancel();
            self.activity = Activity::Idle;
        }
        self.scrollback.clear();
        self.changed();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
    }

    /// Handles a key press. Returns false when the key is not the console's.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => self.copy_all(),
            (KeyCode::Char('x'), KeyModifiers::CONTROL) => self.cut_last(),
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::PageUp, _) => self.scroll_by(self.page_rows as isize),
            (KeyCode::PageDown, _) => self.scroll_by(-(self.page_rows as isize)),
            (KeyCode::Enter, _) => self.submit(now),
            (KeyCode::Backspace, _) => {
                if self.state() == ConsoleState::Idle {
                    self.input.pop();
                }
            }
            (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                if self.state() == ConsoleState::Idle {
                    self.input.push(c);
                }
            }
            _ => return false,
        }
        true
    }

    /// Draws the terminal window into `area`.
    pub fn draw(&mut self, canvas: &mut Canvas, area: Rect) {
        let area = area.clip(canvas.width, canvas.height);
        if area.w < 12 || area.h < 6 {
            return;
        }
        canvas.fill_rect(area, PANEL_BG);
        draw_frame(canvas, area, NEON_GREEN);

        let inner = area.inset(1);
        let (x0, x1) = (inner.x + 1, inner.right().saturating_sub(1));
        let width = x1.saturating_sub(x0) as usize;

        // Title bar.
        let mut x = x0;
        for dot in [Rgb(239, 68, 68), Rgb(234, 179, 8), Rgb(34, 197, 94)] {
            canvas.put(x as i32, inner.y as i32, '●', dot, false);
            x += 2;
        }
        let title_x = inner.x + (inner.w.saturating_sub(TITLE.len() as u16)) / 2;
        canvas.put_str(title_x, inner.y, x1, TITLE, PALE_GREEN, false);
        let hints_w = HINTS.len() as u16 + 6;
        if inner.w > TITLE.len() as u16 + hints_w + 10 {
            let hx = x1.saturating_sub(hints_w);
            canvas.put_str(hx, inner.y, x1, "bash  ", NEON_GREEN, false);
            canvas.put_str(hx + 6, inner.y, x1, HINTS, NEON_GREEN.scale(0.6), false);
        }
        for x in inner.x..inner.right() {
            canvas.put(x as i32, inner.y as i32 + 1, '─', NEON_GREEN.scale(0.3), false);
        }

        let prompt_row = inner.bottom().saturating_sub(1);
        let history_top = inner.y + 2;
        let history_rows = prompt_row.saturating_sub(history_top) as usize;
        self.page_rows = history_rows.max(1);

        match &self.activity {
            Activity::Effect { burst, .. } => {
                for (i, row) in burst.rows().take(history_rows).enumerate() {
                    canvas.put_str(x0, history_top + i as u16, x1, &row, MATRIX_GREEN, false);
                }
            }
            _ => {
                let wrapped: Vec<(String, bool)> = self
                    .scrollback
                    .iter()
                    .flat_map(|line| {
                        let echo = line.starts_with(&self.table.prompt);
                        wrap(line, width).into_iter().map(move |l| (l, echo))
                    })
                    .collect();
                let max_scroll = wrapped.len().saturating_sub(history_rows);
                self.scroll = self.scroll.min(max_scroll);
                let end = wrapped.len() - self.scroll;
                let start = end.saturating_sub(history_rows);
                for (i, (line, echo)) in wrapped[start..end].iter().enumerate() {
                    let color = if *echo { PALE_GREEN } else { NEON_GREEN };
                    canvas.put_str(x0, history_top + i as u16, x1, line, color, false);
                }
                if max_scroll > 0 {
                    let bar_x = inner.right().saturating_sub(1);
                    draw_scrollbar(canvas, bar_x, history_top, history_rows, start, wrapped.len());
                }
            }
        }

        if self.state() == ConsoleState::Idle {
            self.draw_prompt(canvas, x0, x1, prompt_row);
        }
    }

    fn draw_prompt(&self, canvas: &mut Canvas, x0: u16, x1: u16, y: u16) {
        let user = self.table.prompt.trim_end().trim_end_matches('$').trim_end_matches('~');
        let mut x = x0;
        x += canvas.put_str(x, y, x1, user, PROMPT_CYAN, false);
        if self.table.prompt.contains('~') {
            x += canvas.put_str(x, y, x1, "~", NEON_MAGENTA, false);
        }
        x += canvas.put_str(x, y, x1, "$ ", NEON_GREEN, false);
        // Keep the tail of long input visible.
        let room = x1.saturating_sub(x + 1) as usize;
        let shown: String = {
            let chars: Vec<char> = self.input.chars().collect();
            chars[chars.len().saturating_sub(room)..].iter().collect()
        };
        x += canvas.put_str(x, y, x1, &shown, NEON_GREEN, false);
        if self.cursor_on {
            canvas.put(x as i32, y as i32, '█', NEON_GREEN, false);
        }
    }
}

/// Splits a line into chunks at most `width` terminal columns wide.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cols = 0;
    for ch in line.chars() {
        let w = char_cols(ch) as usize;
        if cols + w > width && !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            cols = 0;
        }
        cur.push(ch);
        cols += w;
    }
    out.push(cur);
    out
}

pub(crate) fn draw_frame(canvas: &mut Canvas, r: Rect, color: Rgb) {
    let (l, t) = (r.x as i32, r.y as i32);
    let (rt, b) = (r.right() as i32 - 1, r.bottom() as i32 - 1);
    for x in l + 1..rt {
        canvas.put(x, t, '─', color, false);
        canvas.put(x, b, '─', color, false);
    }
    for y in t + 1..b {
        canvas.put(l, y, '│', color, false);
        canvas.put(rt, y, '│', color, false);
    }
    canvas.put(l, t, '╭', color, false);
    canvas.put(rt, t, '╮', color, false);
    canvas.put(l, b, '╰', color, false);
    canvas.put(rt, b, '╯', color, false);
}

fn draw_scrollbar(canvas: &mut Canvas, x: u16, top: u16, rows: usize, start: usize, total: usize) {
    if rows == 0 || total == 0 {
        return;
    }
    let thumb = (rows * rows / total).max(1);
    let pos = start * rows / total;
    for i in 0..rows {
        let lit = i >= pos && i < pos + thumb;
        let (ch, color) = if lit {
            ('┃', NEON_GREEN)
        } else {
            ('│', Rgb(10, 10, 10))
        };
        canvas.put(x as i32, (top as usize + i) as i32, ch, color, false);
    }
}

#[cfg(test)]
mod tests {
    use super::clipboard::MemoryClipboard;
    use super::commands::CommandTable;
    use super::*;
    use crate::palette::BLACK;
    use std::time::Duration;

    const PROMPT: &str = "0xAditya@portfolio:~$ ";

    fn console() -> Console<MemoryClipboard> {
        Console::new(CommandTable::builtin(), MemoryClipboard::default(), 7)
    }

    fn run(c: &mut Console<MemoryClipboard>, cmd: &str, now: Instant) {
        c.set_input(cmd);
        c.submit(now);
    }

    fn settle(c: &mut Console<MemoryClipboard>, now: Instant) -> Instant {
        let later = now + Duration::from_secs(60);
        c.tick(later);
        later
    }

    fn welcome() -> Vec<String> {
        vec![
            "Welcome to 0xAditya's Terminal Portfolio!".to_string(),
            "Type 'help' to see available commands or try 'banner'.".to_string(),
        ]
    }

    #[test]
    fn fresh_session_then_about() {
        let mut c = console();
        assert_eq!(c.scrollback(), &welcome()[..]);
        let t0 = Instant::now();
        run(&mut c, "about", t0);
        assert_eq!(c.state(), ConsoleState::Typing);
        settle(&mut c, t0);
        assert_eq!(c.state(), ConsoleState::Idle);

        let mut expected = welcome();
        expected.push(format!("{}about", PROMPT));
        expected.extend(CommandTable::builtin().commands["about"].iter().cloned());
        assert_eq!(c.scrollback(), &expected[..]);
    }

    #[test]
    fn help_reveals_exact_lines_and_returns_to_idle() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "help", t0);
        assert_eq!(c.state(), ConsoleState::Typing);
        c.tick(t0 + Duration::from_millis(1));
        assert!(c.reveal_progress().is_some());
        settle(&mut c, t0);
        assert_eq!(c.state(), ConsoleState::Idle);
        let help = &CommandTable::builtin().commands["help"];
        assert_eq!(&c.scrollback()[3..], &help[..]);
        assert_eq!(c.scrollback().len(), 3 + 11);
    }

    #[test]
    fn input_is_ignored_while_typing() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "hack", t0);
        c.handle_key(KeyEvent::from(KeyCode::Char('z')), t0);
        assert_eq!(c.input(), "");
        run(&mut c, "about", t0);
        settle(&mut c, t0);
        assert!(!c.scrollback().iter().any(|l| l.ends_with("about")));
    }

    #[test]
    fn project_three_and_missing_project() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "project 3", t0);
        assert_eq!(c.state(), ConsoleState::Typing);
        let t1 = settle(&mut c, t0);
        let tail: Vec<&str> = c.scrollback()[3..].iter().map(|s| s.as_str()).collect();
        assert_eq!(
            tail,
            [
                "Project: Innova",
                "Tech Stack: Next.js, MongoDB, Stripe",
                "Description: Modern e-commerce platform with seamless UX",
                "Features: Product filtering, secure checkout, order tracking",
            ]
        );

        let before = c.scrollback().len();
        run(&mut c, "project 9", t1);
        assert_eq!(c.state(), ConsoleState::Idle);
        assert_eq!(c.scrollback().len(), before + 2);
        assert_eq!(
            c.scrollback().last().map(String::as_str),
            Some("Project 9 not found. Try 'projects' to see available projects.")
        );
    }

    #[test]
    fn unknown_command_echoes_raw_input() {
        let mut c = console();
        run(&mut c, "  LS -la ", Instant::now());
        assert_eq!(c.state(), ConsoleState::Idle);
        let n = c.scrollback().len();
        assert_eq!(c.scrollback()[n - 2], format!("{}  LS -la ", PROMPT));
        assert_eq!(
            c.scrollback()[n - 1],
            "Command not found:   LS -la . Type 'help' for a list of commands."
        );
    }

    #[test]
    fn blank_submission_changes_nothing() {
        let mut c = console();
        run(&mut c, "    ", Instant::now());
        assert_eq!(c.scrollback(), &welcome()[..]);
        assert_eq!(c.state(), ConsoleState::Idle);
    }

    #[test]
    fn clear_twice_stays_empty() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "clear", t0);
        assert!(c.scrollback().is_empty());
        assert_eq!(c.state(), ConsoleState::Idle);
        run(&mut c, "CLEAR", t0);
        assert!(c.scrollback().is_empty());
        assert_eq!(c.state(), ConsoleState::Idle);
    }

    #[test]
    fn matrix_blocks_input_for_two_seconds() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "matrix", t0);
        assert_eq!(c.state(), ConsoleState::Effect);
        let len = c.scrollback().len();

        c.tick(t0 + Duration::from_millis(1999));
        assert_eq!(c.state(), ConsoleState::Effect);
        run(&mut c, "help", t0 + Duration::from_millis(1999));
        assert_eq!(c.scrollback().len(), len);

        c.tick(t0 + Duration::from_millis(2000));
        assert_eq!(c.state(), ConsoleState::Idle);
        assert_eq!(c.scrollback().len(), len + 1);
        assert_eq!(
            c.scrollback().last().map(String::as_str),
            Some("Matrix sequence completed. System normal.")
        );
        c.tick(t0 + Duration::from_millis(5000));
        assert_eq!(c.scrollback().len(), len + 1);
    }

    #[test]
    fn copy_cut_and_clear_controls() {
        let mut c = console();
        let t0 = Instant::now();
        c.handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL), t0);
        assert_eq!(c.clipboard().contents.as_deref(), Some(welcome().join("\n").as_str()));

        c.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL), t0);
        assert_eq!(c.clipboard().contents.as_deref(), Some(welcome()[1].as_str()));
        assert_eq!(c.scrollback(), &welcome()[..1]);

        c.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL), t0);
        assert!(c.scrollback().is_empty());
        let writes = c.clipboard().writes;
        c.handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL), t0);
        c.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL), t0);
        assert_eq!(c.clipboard().writes, writes);
    }

    #[test]
    fn new_output_snaps_scroll_to_bottom() {
        let mut c = console();
        let t0 = Instant::now();
        run(&mut c, "banner", t0);
        settle(&mut c, t0);
        c.scroll_by(5);
        assert_eq!(c.scroll_offset(), 5);
        run(&mut c, "nope", t0 + Duration::from_secs(61));
        assert_eq!(c.scroll_offset(), 0);
    }

    #[test]
    fn typing_keys_edit_the_input_line() {
        let mut c = console();
        let t0 = Instant::now();
        for ch in "helpx".chars() {
            c.handle_key(KeyEvent::from(KeyCode::Char(ch)), t0);
        }
        c.handle_key(KeyEvent::from(KeyCode::Backspace), t0);
        assert_eq!(c.input(), "help");
        c.handle_key(KeyEvent::from(KeyCode::Enter), t0);
        assert_eq!(c.state(), ConsoleState::Typing);
        assert_eq!(c.input(), "");
    }

    #[test]
    fn wrap_respects_wide_glyphs() {
        assert_eq!(wrap("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap("", 4), vec![""]);
        assert_eq!(wrap("👾👾👾", 4), vec!["👾👾", "👾"]);
    }

    #[test]
    fn draws_prompt_and_history() {
        let mut c = console();
        let mut canvas = Canvas::new(80, 20, BLACK);
        c.draw(&mut canvas, Rect::new(0, 0, 80, 20));
        let row: String = (0..80)
            .filter_map(|x| canvas.get(x, 3).map(|t| t.ch))
            .collect();
        assert!(row.contains("Welcome"), "row was {:?}", row);
        let prompt: String = (0..80)
            .filter_map(|x| canvas.get(x, 18).map(|t| t.ch))
            .collect();
        assert!(prompt.contains("0xAditya@portfolio:~$"), "prompt was {:?}", prompt);
    }
}
