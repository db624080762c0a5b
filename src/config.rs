// Copyright (c) 2026 0xAditya

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::console::commands::CommandTable;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  termfolio --fps 60 --glyphs auto --globe-size 300 --globe-offset 20 --texture earth_nightmap.jpg --export-dir . --export-name AdityaKumarTiwari_Resume --log-level info";

pub const DEFAULT_TEXTURE: &str = "earth_nightmap.jpg";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Adds ANSI styling to the plain help-detail text: headings, examples and flags.
fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();
        if is_heading {
            out.push_str(&format!("\x1b[1;36m{}\x1b[0m{}", line, nl));
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str(&format!("      \x1b[32mExample:\x1b[0m{}{}", rest, nl));
        } else if let Some(rest) = line.strip_prefix("  termfolio") {
            out.push_str(&format!("  \x1b[1;34mtermfolio\x1b[0m{}{}", rest, nl));
        } else if let Some(rest) = line.strip_prefix("  -") {
            out.push_str(&format!("  \x1b[33m-{}\x1b[0m{}", rest, nl));
        } else {
            out.push_str(line);
            out.push_str(nl);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "termfolio", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Master random seed (default: random each run)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "commands",
        help_heading = "GENERAL",
        help = "TOML file overriding the shell's command table"
    )]
    pub commands: Option<PathBuf>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "glyphs",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Rain glyphs: auto, katakana or ascii (auto picks ascii on non-UTF locales)"
    )]
    pub glyphs: String,

    #[arg(
        long = "no-rain",
        help_heading = "EFFECTS",
        help = "Do not mount the character rain"
    )]
    pub no_rain: bool,

    #[arg(
        long = "no-particles",
        help_heading = "EFFECTS",
        help = "Do not mount the particle field"
    )]
    pub no_particles: bool,

    #[arg(
        long = "no-globe",
        help_heading = "EFFECTS",
        help = "Do not mount the globe"
    )]
    pub no_globe: bool,

    #[arg(
        long = "globe-size",
        default_value_t = 300,
        help_heading = "EFFECTS",
        help = "Globe viewport edge in virtual pixels (min 64 max 1200)"
    )]
    pub globe_size: u16,

    #[arg(
        long = "globe-offset",
        default_value_t = 20,
        help_heading = "EFFECTS",
        help = "Globe distance from the bottom-right corner in virtual pixels (min 0 max 400)"
    )]
    pub globe_offset: u16,

    #[arg(
        long = "texture",
        default_value = DEFAULT_TEXTURE,
        help_heading = "EFFECTS",
        help = "Equirectangular earth image for the globe surface (missing file: plain shading)"
    )]
    pub texture: PathBuf,

    #[arg(
        long = "export-dir",
        default_value = ".",
        help_heading = "EXPORT",
        help = "Directory receiving the exported resume"
    )]
    pub export_dir: PathBuf,

    #[arg(
        long = "export-name",
        default_value = crate::export::DEFAULT_NAME,
        help_heading = "EXPORT",
        help = "File name stem of the exported document (<name>.pdf)"
    )]
    pub export_name: String,

    #[arg(
        long = "export-page-rows",
        help_heading = "EXPORT",
        help = "Split exports into pages of N cell rows (min 4 max 1000; default: one page)"
    )]
    pub export_page_rows: Option<u16>,

    #[arg(
        long = "export-scale",
        default_value_t = crate::export::DEFAULT_SCALE,
        help_heading = "EXPORT",
        help = "Export pixel scale per virtual pixel (min 1 max 4)"
    )]
    pub export_scale: u32,

    #[arg(
        long = "log-file",
        help_heading = "LOGGING",
        help = "Write logs to this file (default: discarded)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value_t = LogLevel::Info,
        value_enum,
        help_heading = "LOGGING",
        help = "Log verbosity"
    )]
    pub log_level: LogLevel,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-commands",
        help_heading = "HELP",
        help = "List the shell's commands and exit"
    )]
    pub list_commands: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_commands(table: &CommandTable) {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COMMANDS:\x1b[0m");
        println!("\x1b[2mNOTE: Type these at the prompt and press Enter.\x1b[0m");
    } else {
        println!("AVAILABLE COMMANDS:");
        println!("NOTE: Type these at the prompt and press Enter.");
    }
    println!();
    println!("COMMAND      OUTPUT");
    for name in table.vocabulary() {
        let summary = match name.as_str() {
            "clear" => "Clear the scrollback".to_string(),
            "matrix" => "Two-second character burst".to_string(),
            other => {
                let lines = match other.strip_prefix("project ") {
                    Some(key) => table.projects.get(key),
                    None => table.commands.get(other),
                };
                lines.map_or_else(String::new, |l| format!("{} line(s)", l.len()))
            }
        };
        println!("{:<12} {}", name, summary);
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  termfolio [OPTIONS]\n\nGENERAL:\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: termfolio --duration 10\n\n  --seed <number>\n      Fix every random sequence for a reproducible run.\n      Example: termfolio --seed 42\n\n  --commands <file.toml>\n      Override prompt, welcome text, commands and projects.\n      Example: termfolio --commands shell.toml\n\nAPPEARANCE:\n  --colormode <0|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: termfolio --colormode 24\n\n  --glyphs <auto|katakana|ascii>\n      Character set of the background rain.\n      Example: termfolio --glyphs ascii\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n      Example: termfolio --fps 30\n\nEFFECTS:\n  --no-rain, --no-particles, --no-globe\n      Skip mounting a background effect.\n      Example: termfolio --no-globe\n\n  --globe-size <px>, --globe-offset <px>\n      Globe viewport size and corner offset in virtual pixels (8x16 per cell).\n      Example: termfolio --globe-size 240 --globe-offset 10\n\n  --texture <image>\n      Equirectangular earth texture (png or jpeg).\n      Example: termfolio --texture assets/earth.jpg\n\nEXPORT:\n  --export-dir <dir>, --export-name <stem>\n      Where Ctrl+E / F2 writes the About card as <stem>.pdf.\n      Example: termfolio --export-dir /tmp --export-name resume\n\n  --export-page-rows <rows>\n      Split the capture into pages of N cell rows.\n      Example: termfolio --export-page-rows 12\n\n  --export-scale <1..4>\n      Output pixels per virtual pixel.\n      Example: termfolio --export-scale 1\n\nLOGGING:\n  --log-file <path>\n      Append structured logs to a file; the screen is never written to.\n      Example: termfolio --log-file termfolio.log --log-level debug\n\n  --log-level <error|warn|info|debug|trace>\n      Log verbosity.\n\nKEYS:\n  Enter, Backspace, PageUp, PageDown\n      Edit and run commands, scroll the scrollback.\n\n  Ctrl+Y, Ctrl+X, Ctrl+L\n      Copy all, cut the last line, clear.\n\n  Ctrl+E, F2\n      Export the About card.\n\n  Esc, Ctrl+C\n      Quit.\n\nHELP:\n  --help\n      Show short help.\n\n  --help-detail\n      Show this detailed help.\n\n  --list-commands\n      List the shell's commands and exit.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }

    let tail = "\nLIMITS / VALID RANGES:\n";
    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(tail));
    } else {
        print!("{}", tail);
    }
    println!("  --duration <seconds>       min 0.1 max 86400 (<=0 disables)");
    println!("  --fps <number>             min 1 max 240");
    println!("  --globe-size <px>          min 64 max 1200");
    println!("  --globe-offset <px>        min 0 max 400");
    println!("  --export-page-rows <rows>  min 4 max 1000");
    println!("  --export-scale <n>         min 1 max 4");
    println!("  --colormode <0|16|8|24>    allowed values only (8==256, 24==32)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_page() {
        let args = Args::try_parse_from(["termfolio"]).unwrap();
        assert_eq!(args.fps, 60.0);
        assert_eq!(args.globe_size, 300);
        assert_eq!(args.globe_offset, 20);
        assert_eq!(args.texture, PathBuf::from(DEFAULT_TEXTURE));
        assert_eq!(args.export_name, crate::export::DEFAULT_NAME);
        assert_eq!(args.export_scale, 2);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.no_rain && !args.no_particles && !args.no_globe);
    }

    #[test]
    fn effect_switches_and_levels_parse() {
        let args = Args::try_parse_from([
            "termfolio",
            "--no-globe",
            "--glyphs",
            "ascii",
            "--log-level",
            "debug",
            "--export-page-rows",
            "12",
        ])
        .unwrap();
        assert!(args.no_globe);
        assert_eq!(args.glyphs, "ascii");
        assert_eq!(args.log_level.as_level(), tracing::Level::DEBUG);
        assert_eq!(args.export_page_rows, Some(12));
    }

    #[test]
    fn help_detail_headings_are_colored() {
        let out = colorize_help_detail("EXPORT:\n  --export-dir <dir>\n      Example: termfolio\n");
        assert!(out.starts_with("\x1b[1;36mEXPORT:\x1b[0m\n"));
        assert!(out.contains("\x1b[33m--export-dir <dir>\x1b[0m"));
        assert!(out.contains("\x1b[32mExample:\x1b[0m"));
    }
}
