// Copyright (c) 2026 0xAditya

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Words the console handles itself; a table may not redefine them.
pub const RESERVED: [&str; 3] = ["clear", "matrix", "project"];

pub const MATRIX_DONE: &str = "Matrix sequence completed. System normal.";

#[derive(Debug, Error)]
pub enum CommandTableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("'{0}' is a built-in command and cannot be redefined")]
    Reserved(String),
    #[error("command '{0}' has no output lines")]
    Empty(String),
}

/// Everything the console says, keyed by lowercase command word.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CommandTable {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_welcome")]
    pub welcome: Vec<String>,
    #[serde(default)]
    pub commands: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub projects: BTreeMap<String, Vec<String>>,
}

/// What a submitted line resolves to.
#[derive(Debug, PartialEq)]
pub enum Resolution<'a> {
    Blank,
    Clear,
    Matrix,
    Reveal(&'a [String]),
    /// Carries the requested project key, which may be empty.
    ProjectNotFound(String),
    NotFound,
}

fn default_prompt() -> String {
    "0xAditya@portfolio:~$ ".to_string()
}

fn default_welcome() -> Vec<String> {
    lines(&[
        "Welcome to 0xAditya's Terminal Portfolio!",
        "Type 'help' to see available commands or try 'banner'.",
    ])
}

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}

impl CommandTable {
    pub fn builtin() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert(
            "help".to_string(),
            lines(&[
                "Available commands:",
                "about      - Show about info",
                "skills     - List skills",
                "projects   - List projects",
                "contact    - Show contact info",
                "clear      - Clear terminal",
                "sudo       - Try it :)",
                "hack       - Simulate a hacking attempt",
                "matrix     - Show matrix effect",
                "banner     - Display ASCII art banner",
                "help       - Show this help message",
            ]),
        );
        commands.insert(
            "about".to_string(),
            lines(&[
                "Hi, I'm Aditya Kumar Tiwari, a passionate Cybersecurity Specialist and Full-Stack Developer.",
                "Currently pursuing a BCA in Cybersecurity at Sushant University.",
                "I specialize in Python, JavaScript, Linux, and Cloud Computing.",
            ]),
        );
        commands.insert(
            "skills".to_string(),
            lines(&[
                "⚙️ Penetration Testing [██████████] 90%",
                "⚙️ React/Next.js      [█████████ ] 85%",
                "⚙️ Node.js            [████████  ] 80%",
                "⚙️ Python             [███████   ] 75%",
                "⚙️ Network Security   [████████  ] 80%",
                "⚙️ Linux              [███████   ] 70%",
                "⚙️ Reverse Engineering[██████    ] 60%",
                "⚙️ Cloud Security     [██████▌   ] 65%",
            ]),
        );
        commands.insert(
            "projects".to_string(),
            lines(&[
                "Recent projects:",
                "1. Flappy - A 2D game built using HTML, CSS, and JavaScript",
                "2. Cinesphere - A movie website with high-rated free movies",
                "3. Innova - Modern responsive e-commerce website",
                "4. SEO Optimized Website - Improved search engine visibility",
                "5. MovieVerse Explorer - Movie exploration with dynamic API content",
                "Type 'project [number]' for details about a specific project.",
            ]),
        );
        commands.insert(
            "contact".to_string(),
            lines(&[
                "Email: aditya@email.com",
                "LinkedIn: linkedin.com/in/aditya",
                "GitHub: github.com/aditya",
            ]),
        );
        commands.insert(
            "sudo".to_string(),
            lines(&[
                "Permission denied: You are not root.",
                "Just kidding! Here's an Easter egg: 👾 Stay curious, stay secure! 👾",
            ]),
        );
        commands.insert(
            "hack".to_string(),
            lines(&[
                "INITIATING HACK SEQUENCE...",
                "Accessing mainframe...",
                "Bypassing security protocols...",
                "Decrypting files...",
                "Downloading data...",
                "HACK COMPLETE!",
                "Just kidding! This is a simulation. No systems were harmed during this demo.",
            ]),
        );
        commands.insert(
            "banner".to_string(),
            lines(&[
                "  _____    _ _ _                 ",
                " |  __ \\  | (_) |                ",
                " | |  | | | |_| |_ _   _  __ _  ",
                " | |  | | | | | __| | | |/ _` | ",
                " | |__| | | | | |_| |_| | (_| | ",
                " |_____/  |_|_|\\__|\\__, |\\__,_| ",
                "                    __/ |       ",
                "                   |___/        ",
                "                               ",
                "Cybersecurity Specialist & Developer",
            ]),
        );

        let mut projects = BTreeMap::new();
        projects.insert(
            "1".to_string(),
            lines(&[
                "Project: Flappy",
                "Tech Stack: HTML, CSS, JavaScript",
                "Description: A fun 2D game built for game enthusiasts",
                "Features: Character customization, score tracking, responsive design",
            ]),
        );
        projects.insert(
            "2".to_string(),
            lines(&[
                "Project: Movie Website (Cinesphere)",
                "Tech Stack: React, Node.js, MovieDB API",
                "Description: A platform for accessing high-rated movies",
                "Features: Search functionality, movie recommendations, watchlist creation",
            ]),
        );
        projects.insert(
            "3".to_string(),
            lines(&[
                "Project: Innova",
                "Tech Stack: Next.js, MongoDB, Stripe",
                "Description: Modern e-commerce platform with seamless UX",
                "Features: Product filtering, secure checkout, order tracking",
            ]),
        );
        projects.insert(
            "4".to_string(),
            lines(&[
                "Project: SEO Optimized Website",
                "Tech Stack: React, Next.js, Schema markup",
                "Description: Website built with best SEO practices",
                "Features: Fast load times, semantic HTML, optimized meta tags",
            ]),
        );
        projects.insert(
            "5".to_string(),
            lines(&[
                "Project: MovieVerse Explorer",
                "Tech Stack: React, Redux, TMDB API",
                "Description: Dynamic movie exploration site with API integration",
                "Features: Real-time data fetching, movie details, trailer viewing",
            ]),
        );

        Self {
            prompt: default_prompt(),
            welcome: default_welcome(),
            commands,
            projects,
        }
    }

    pub fn from_toml(src: &str, path: &Path) -> Result<Self, CommandTableError> {
        let table: CommandTable = toml::from_str(src).map_err(|source| CommandTableError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        table.validate()?;
        Ok(table.normalized())
    }

    pub fn load(path: &Path) -> Result<Self, CommandTableError> {
        let src = std::fs::read_to_string(path).map_err(|source| CommandTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml(&src, path)?;
        tracing::info!(
            path = %path.display(),
            commands = table.commands.len(),
            projects = table.projects.len(),
            "loaded command table"
        );
        Ok(table)
    }

    fn validate(&self) -> Result<(), CommandTableError> {
        for (name, out) in &self.commands {
            let key = name.trim().to_lowercase();
            if RESERVED.contains(&key.as_str()) {
                return Err(CommandTableError::Reserved(key));
            }
            if out.is_empty() {
                return Err(CommandTableError::Empty(key));
            }
        }
        for (key, out) in &self.projects {
            if out.is_empty() {
                return Err(CommandTableError::Empty(format!("project {}", key)));
            }
        }
        Ok(())
    }

    fn normalized(self) -> Self {
        let commands = self
            .commands
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        let projects = self
            .projects
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self {
            commands,
            projects,
            ..self
        }
    }

    pub fn resolve(&self, input: &str) -> Resolution<'_> {
        let cmd = input.trim().to_lowercase();
        if cmd.is_empty() {
            return Resolution::Blank;
        }
        match cmd.as_str() {
            "clear" => return Resolution::Clear,
            "matrix" => return Resolution::Matrix,
            _ => {}
        }
        if cmd.starts_with("project ") {
            let key = cmd.split_whitespace().nth(1).unwrap_or_default();
            return match self.projects.get(key) {
                Some(lines) => Resolution::Reveal(lines),
                None => Resolution::ProjectNotFound(key.to_string()),
            };
        }
        match self.commands.get(&cmd) {
            Some(lines) => Resolution::Reveal(lines),
            None => Resolution::NotFound,
        }
    }

    pub fn echo(&self, raw: &str) -> String {
        format!("{}{}", self.prompt, raw)
    }

    pub fn not_found(raw: &str) -> String {
        format!(
            "Command not found: {}. Type 'help' for a list of commands.",
            raw
        )
    }

    pub fn project_not_found(key: &str) -> String {
        format!(
            "Project {} not found. Try 'projects' to see available projects.",
            key
        )
    }

    /// Command names for `--list-commands`, with the console's own words included.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut out: Vec<String> = self.commands.keys().cloned().collect();
        out.push("clear".to_string());
        out.push("matrix".to_string());
        out.extend(self.projects.keys().map(|k| format!("project {}", k)));
        out.sort();
        out
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_case_insensitively_and_trimmed() {
        let t = CommandTable::builtin();
        assert!(matches!(t.resolve("  HeLp "), Resolution::Reveal(l) if l.len() == 11));
        assert_eq!(t.resolve("   "), Resolution::Blank);
        assert_eq!(t.resolve("CLEAR"), Resolution::Clear);
        assert_eq!(t.resolve("matrix"), Resolution::Matrix);
        assert_eq!(t.resolve("ls"), Resolution::NotFound);
    }

    #[test]
    fn project_lookup_uses_second_token() {
        let t = CommandTable::builtin();
        match t.resolve("project   3") {
            Resolution::Reveal(lines) => assert_eq!(lines[0], "Project: Innova"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            t.resolve("project 9"),
            Resolution::ProjectNotFound("9".to_string())
        );
        assert_eq!(t.resolve("project"), Resolution::NotFound);
    }

    #[test]
    fn toml_table_replaces_vocabulary() {
        let src = r#"
prompt = "guest$ "

[commands]
Whoami = ["guest"]

[projects]
"7" = ["Project: Seven"]
"#;
        let t = CommandTable::from_toml(src, Path::new("cmds.toml")).unwrap();
        assert_eq!(t.prompt, "guest$ ");
        assert_eq!(t.welcome, default_welcome());
        assert!(matches!(t.resolve("whoami"), Resolution::Reveal(l) if l.len() == 1 && l[0] == "guest"));
        assert_eq!(t.resolve("help"), Resolution::NotFound);
        assert!(matches!(t.resolve("project 7"), Resolution::Reveal(_)));
    }

    #[test]
    fn toml_rejects_reserved_and_empty_commands() {
        let reserved = "[commands]\nclear = [\"x\"]\n";
        assert!(matches!(
            CommandTable::from_toml(reserved, Path::new("a.toml")),
            Err(CommandTableError::Reserved(_))
        ));
        let empty = "[commands]\nfoo = []\n";
        assert!(matches!(
            CommandTable::from_toml(empty, Path::new("b.toml")),
            Err(CommandTableError::Empty(_))
        ));
        assert!(matches!(
            CommandTable::from_toml("commands = 3", Path::new("c.toml")),
            Err(CommandTableError::Parse { .. })
        ));
    }

    #[test]
    fn vocabulary_lists_builtins() {
        let v = CommandTable::builtin().vocabulary();
        for word in ["about", "clear", "matrix", "project 5", "help"] {
            assert!(v.iter().any(|w| w == word), "missing {}", word);
        }
    }
}
