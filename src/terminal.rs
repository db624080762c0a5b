// Copyright (c) 2026 0xAditya

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::canvas::WIDE_TAIL;
use crate::frame::{Cell, Frame};

/// Tracks the style currently active on the terminal so we only emit changes.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn same_style(a: &Cell, b: &Cell) -> bool {
        a.fg == b.fg && a.bg == b.bg && a.bold == b.bold
    }
}

/// Raw-mode alternate-screen backend with mouse reporting enabled.
pub struct Terminal {
    stdout: Stdout,
    last: Option<(u16, u16, Vec<Cell>)>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            out.execute(event::EnableMouseCapture)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let same_size = self
            .last
            .as_ref()
            .is_some_and(|(w, h, _)| *w == frame.width && *h == frame.height);
        let total = frame.width as usize * frame.height as usize;
        let dirty_is_large = total > 0 && frame.dirty_indices().len() >= total / 3;

        if !same_size || frame.is_dirty_all() || dirty_is_large {
            self.draw_full(frame, same_size)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame, same_size: bool) -> Result<()> {
        if !same_size {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = Some((
                frame.width,
                frame.height,
                vec![Cell::blank(None); frame.width as usize * frame.height as usize],
            ));
        }
        let Some((_, _, last)) = self.last.as_mut() else {
            return Ok(());
        };

        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.apply(&mut self.stdout, &cell)?;
                if cell.ch != WIDE_TAIL {
                    self.stdout.queue(Print(cell.ch))?;
                }
                last[idx] = cell;
            }
        }
        Ok(())
    }

    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some((_, _, last)) = self.last.as_mut() else {
            return Ok(());
        };

        let mut dirty = frame.dirty_indices().to_vec();
        dirty.sort_unstable();

        let width = frame.width as usize;
        let mut pen = Pen::default();
        let mut cursor_at: Option<usize> = None;
        let mut i = 0usize;

        while i < dirty.len() {
            let idx0 = dirty[i];
            let cell0 = frame.cell_at_index(idx0);
            if last[idx0] == cell0 {
                i += 1;
                continue;
            }

            // Grow a run of adjacent changed cells on the same row with one style.
            self.run_buf.clear();
            let mut end = idx0;
            let mut j = i;
            while j < dirty.len() {
                let idx = dirty[j];
                if idx != end + usize::from(j != i) || (j != i && idx % width == 0) {
                    break;
                }
                let cell = frame.cell_at_index(idx);
                if j != i && (last[idx] == cell || !Pen::same_style(&cell0, &cell)) {
                    break;
                }
                if cell.ch != WIDE_TAIL {
                    self.run_buf.push(cell.ch);
                }
                last[idx] = cell;
                end = idx;
                j += 1;
            }

            if cursor_at != Some(idx0) {
                let x = (idx0 % width) as u16;
                let y = (idx0 / width) as u16;
                self.stdout.queue(cursor::MoveTo(x, y))?;
            }
            pen.apply(&mut self.stdout, &cell0)?;
            self.stdout.queue(Print(self.run_buf.as_str()))?;

            // A run of only wide tails prints nothing, so the cursor did not move.
            cursor_at = if self.run_buf.is_empty() || (end + 1) % width == 0 {
                None
            } else {
                Some(end + 1)
            };
            i = j;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
