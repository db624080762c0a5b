// Copyright (c) 2026 0xAditya

mod about;
mod braille;
mod canvas;
mod charset;
mod config;
mod console;
mod export;
mod frame;
mod globe;
mod host;
mod page;
mod palette;
mod particles;
mod rain;
mod runtime;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::charset::rain_glyphs_from_str;
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, print_list_commands,
    Args,
};
use crate::console::clipboard::SystemClipboard;
use crate::console::commands::CommandTable;
use crate::export::ExportOptions;
use crate::frame::Frame;
use crate::globe::{GlobeOptions, Texture};
use crate::page::{Flow, Page, PageOptions};
use crate::palette::Painter;
use crate::runtime::ColorMode;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> String {
    let sha = env!("TERMFOLIO_GIT_SHA");
    if sha.is_empty() {
        env!("TERMFOLIO_BUILD").to_string()
    } else {
        format!("{} ({})", env!("TERMFOLIO_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u16_range(name: &str, v: u16, min: u16, max: u16) -> u16 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u32_range(name: &str, v: u32, min: u32, max: u32) -> u32 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8,24)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

/// Logs go to a file or nowhere; the terminal belongs to the page.
fn init_logging(args: &Args) {
    let level = args.log_level.as_level();
    let Some(path) = &args.log_file else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::sink)
            .init();
        return;
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_target(false)
            .with_ansi(false)
            .with_max_level(level)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            eprintln!("failed to open --log-file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn load_command_table(args: &Args) -> CommandTable {
    let Some(path) = &args.commands else {
        return CommandTable::builtin();
    };
    match CommandTable::load(path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Color: {}", color_mode_label(detect_color_mode_auto()));
        return Ok(());
    }

    let table = load_command_table(&args);
    if args.list_commands {
        print_list_commands(&table);
        return Ok(());
    }

    init_logging(&args);

    let color_mode = detect_color_mode(&args);
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });
    let globe_size = require_u16_range("--globe-size", args.globe_size, 64, 1200);
    let globe_offset = require_u16_range("--globe-offset", args.globe_offset, 0, 400);
    let page_rows = args
        .export_page_rows
        .map(|r| require_u16_range("--export-page-rows", r, 4, 1000));
    let export_scale = require_u32_range("--export-scale", args.export_scale, 1, 4);

    let glyphs = match rain_glyphs_from_str(&args.glyphs, default_to_ascii()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // The texture only matters when the globe is mounted.
    let texture = if args.no_globe {
        None
    } else {
        Texture::load_or_warn(&args.texture)
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        seed,
        color = color_mode_label(color_mode),
        fps = target_fps,
        "starting"
    );

    let opts = PageOptions {
        rain: !args.no_rain,
        particles: !args.no_particles,
        globe: !args.no_globe,
        glyphs,
        globe_opts: GlobeOptions {
            size_px: globe_size as f32,
            offset_px: globe_offset as f32,
            texture,
        },
        seed,
        export: ExportOptions {
            dir: args.export_dir.clone(),
            name: args.export_name.clone(),
            page_rows,
            scale: export_scale,
        },
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let painter = Painter::new(color_mode);
    let mut page = Page::new(w, h, table, SystemClipboard::new(), opts);
    let mut frame = Frame::new(w, h);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if page.handle_key(k, Instant::now()) == Flow::Quit {
                            running = false;
                            break;
                        }
                    }
                    Event::Mouse(m) => page.mouse(m),
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            page.resize(nw, nh);
            frame = Frame::new(nw, nh);
        }

        let canvas = page.frame(Instant::now());
        frame.present(canvas, &painter);
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    page.unmount_all();
    tracing::info!(elapsed_s = start_time.elapsed().as_secs_f64(), "exiting");
    Ok(())
}
