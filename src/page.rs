// Copyright (c) 2026 0xAditya

//! The composed portfolio screen: background effects, the console and the About card.

use std::thread::JoinHandle;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::about::AboutPanel;
use crate::canvas::Canvas;
use crate::charset::RainGlyphs;
use crate::console::clipboard::Clipboard;
use crate::console::commands::CommandTable;
use crate::console::Console;
use crate::export::{capture, spawn_export, ExportOptions, ExportSchedule};
use crate::globe::{Globe, GlobeOptions};
use crate::host::{derive_seed, Host};
use crate::palette::BLACK;
use crate::particles::{ParticleField, PARTICLE_COUNT};
use crate::rain::CharacterRain;
use crate::runtime::{Rect, CELL_H, CELL_W};

const CONSOLE_MAX_W: u16 = 84;
const CONSOLE_MAX_H: u16 = 22;
const ABOUT_MAX_W: u16 = 100;
const MOUSE_SCROLL_LINES: isize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub console: Rect,
    pub about: Rect,
}

impl Layout {
    pub fn compute(cols: u16, rows: u16) -> Self {
        let cw = cols.saturating_sub(4).min(CONSOLE_MAX_W);
        let ch = ((rows as f32 * 0.55) as u16).clamp(6, CONSOLE_MAX_H).min(rows.saturating_sub(1));
        let console = Rect::new(cols.saturating_sub(cw) / 2, 1, cw, ch);

        // Two rows above the card hold its header.
        let ay = console.bottom().saturating_add(3);
        let aw = cols.saturating_sub(4).min(ABOUT_MAX_W);
        let ah = rows.saturating_sub(ay).saturating_sub(1);
        let about = Rect::new(cols.saturating_sub(aw) / 2, ay, aw, ah);
        Self { console, about }
    }

    /// The card's on-screen rectangle, or `None` when it has no room to draw.
    pub fn about_region(&self) -> Option<Rect> {
        if self.about.w < 20 || self.about.h < 8 {
            None
        } else {
            Some(self.about)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct PageOptions {
    pub rain: bool,
    pub particles: bool,
    pub globe: bool,
    pub glyphs: RainGlyphs,
    pub globe_opts: GlobeOptions,
    pub seed: u64,
    pub export: ExportOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            rain: true,
            particles: true,
            globe: true,
            glyphs: RainGlyphs::Katakana,
            globe_opts: GlobeOptions::default(),
            seed: 0,
            export: ExportOptions::default(),
        }
    }
}

pub struct Page<C: Clipboard> {
    host: Host,
    console: Console<C>,
    about: AboutPanel,
    canvas: Canvas,
    layout: Layout,
    export: ExportSchedule,
    export_opts: ExportOptions,
    workers: Vec<JoinHandle<()>>,
    started: Option<Instant>,
}

impl<C: Clipboard> Page<C> {
    pub fn new(cols: u16, rows: u16, table: CommandTable, clipboard: C, opts: PageOptions) -> Self {
        let mut host = Host::new();
        let seed = opts.seed;
        // Mount order is draw order: rain at the back, globe on top.
        if opts.rain {
            let rain = CharacterRain::new(cols, rows, opts.glyphs.classes(), derive_seed(seed, "rain"));
            host.mount(Box::new(rain));
        }
        if opts.particles {
            let field = ParticleField::new(cols, rows, PARTICLE_COUNT, derive_seed(seed, "particles"));
            host.mount(Box::new(field));
        }
        if opts.globe {
            let globe = Globe::new(cols, rows, opts.globe_opts, derive_seed(seed, "globe"));
            host.mount(Box::new(globe));
        }
        tracing::info!(
            cols,
            rows,
            effects = host.scheduled_callbacks(),
            listeners = host.listener_count(),
            seed,
            "page mounted"
        );

        Self {
            host,
            console: Console::new(table, clipboard, derive_seed(seed, "console")),
            about: AboutPanel::new(),
            canvas: Canvas::new(cols, rows, BLACK),
            layout: Layout::compute(cols, rows),
            export: ExportSchedule::default(),
            export_opts: opts.export,
            workers: Vec::new(),
            started: None,
        }
    }

    #[cfg(test)]
    pub fn console(&self) -> &Console<C> {
        &self.console
    }

    #[cfg(test)]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[cfg(test)]
    pub fn export_pending(&self) -> bool {
        self.export.is_pending()
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas.resize(cols, rows, BLACK);
        self.layout = Layout::compute(cols, rows);
        self.host.resize(cols, rows);
        tracing::debug!(cols, rows, "resize");
    }

    /// Forwards a pointer position given in cells.
    pub fn pointer(&mut self, col: u16, row: u16) {
        let px = (col as f32 + 0.5) * CELL_W;
        let py = (row as f32 + 0.5) * CELL_H;
        self.host.pointer(px, py);
    }

    pub fn request_export(&mut self, now: Instant) {
        if self.export.request(now) {
            tracing::info!("export requested");
        } else {
            tracing::debug!("export already pending");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Flow::Quit,
            (KeyCode::Char('e'), KeyModifiers::CONTROL) | (KeyCode::F(2), _) => self.request_export(now),
            _ => {
                self.console.handle_key(key, now);
            }
        }
        Flow::Continue
    }

    pub fn mouse(&mut self, ev: MouseEvent) {
        match ev.kind {
            MouseEventKind::ScrollUp => self.console.scroll_by(MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => self.console.scroll_by(-MOUSE_SCROLL_LINES),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer(ev.column, ev.row),
            _ => {}
        }
    }

    /// Composes one frame and fires a due export from it.
    pub fn frame(&mut self, now: Instant) -> &Canvas {
        let started = *self.started.get_or_insert(now);
        let t = now.saturating_duration_since(started).as_secs_f32();

        self.canvas.clear(BLACK);
        self.host.frame(now, &mut self.canvas);
        self.console.tick(now);
        self.console.draw(&mut self.canvas, self.layout.console);
        self.about.draw(&mut self.canvas, self.layout.about, t);

        if self.export.take_due(now) {
            match capture(&self.canvas, self.layout.about_region()) {
                Ok(cap) => {
                    self.workers.retain(|w| !w.is_finished());
                    self.workers.extend(spawn_export(cap, self.export_opts.clone()));
                }
                Err(e) => tracing::error!("export failed: {}", e),
            }
        }
        &self.canvas
    }

    /// Tears down every mounted effect and waits for exports still being written.
    pub fn unmount_all(&mut self) {
        self.host.unmount_all();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("export worker panicked");
            }
        }
    }
}
