use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::resolver::MatchPolicy;
use crate::sinks::DEFAULT_DUMP_FILE;
use crate::source::DEFAULT_COMMENT;
use crate::tape::TAPE_CAPACITY;

/// Construction-time options for one engine. Never changes during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Refuse `+` on a cell holding 255 instead of wrapping.
    pub overflow_guard: bool,
    /// `.` renders characters instead of numbers, and `:` is enabled.
    pub ascii: bool,
    /// Extra no-op marker accepted by the validator.
    pub comment: char,
    pub capacity: usize,
    pub match_policy: MatchPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overflow_guard: false,
            ascii: false,
            comment: DEFAULT_COMMENT,
            capacity: TAPE_CAPACITY,
            match_policy: MatchPolicy::Greedy,
        }
    }
}

/// CLI defaults, read from `bfc.toml` in the XDG config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub overflow_guard: bool,
    pub ascii: bool,
    pub comment: char,
    pub balanced_loops: bool,
    pub dump_file: PathBuf,
    /// Newline after every `.` value on the console.
    pub newline: bool,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overflow_guard: false,
            ascii: false,
            comment: DEFAULT_COMMENT,
            balanced_loops: false,
            dump_file: PathBuf::from(DEFAULT_DUMP_FILE),
            newline: true,
            max_steps: None,
            timeout_ms: None,
        }
    }
}

impl Settings {
    /// Defaults merged with the config file, if one exists.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded settings");
                Self::from_toml_str(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// Parse the `[run]` section of a small TOML document. Unknown keys are
    /// ignored; malformed values keep their default and log a warning.
    pub fn from_toml_str(content: &str) -> Self {
        let mut in_run = false;
        let mut map: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') { continue; }
            if line.starts_with('[') && line.ends_with(']') {
                in_run = &line[1..line.len() - 1] == "run";
                continue;
            }
            if !in_run { continue; }
            if let Some(eq) = line.find('=') {
                let key = line[..eq].trim().to_string();
                let val_raw = line[eq + 1..].trim();
                // Accept quoted or unquoted
                let val = if val_raw.len() >= 2
                    && ((val_raw.starts_with('"') && val_raw.ends_with('"'))
                        || (val_raw.starts_with('\'') && val_raw.ends_with('\'')))
                {
                    val_raw[1..val_raw.len() - 1].to_string()
                } else {
                    val_raw.to_string()
                };
                map.insert(key, val);
            }
        }

        let mut cfg = Settings::default();

        macro_rules! set {
            ($field:ident, $key:literal, $parse:expr) => {
                if let Some(raw) = map.get($key) {
                    match $parse(raw.as_str()) {
                        Some(v) => cfg.$field = v,
                        None => warn!(key = $key, value = %raw, "ignoring malformed setting"),
                    }
                }
            };
        }

        set!(overflow_guard, "overflow_guard", parse_bool);
        set!(ascii, "ascii", parse_bool);
        set!(comment, "comment", parse_char);
        set!(balanced_loops, "balanced_loops", parse_bool);
        set!(dump_file, "dump_file", |s: &str| (!s.is_empty()).then(|| PathBuf::from(s)));
        set!(newline, "newline", parse_bool);
        set!(max_steps, "max_steps", |s: &str| s.parse::<usize>().ok().map(Some));
        set!(timeout_ms, "timeout_ms", |s: &str| s.parse::<u64>().ok().map(Some));

        cfg
    }

    pub fn match_policy(&self) -> MatchPolicy {
        if self.balanced_loops { MatchPolicy::Nearest } else { MatchPolicy::Greedy }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BFC_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bfc.toml");
    Some(path)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}
