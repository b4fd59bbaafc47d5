use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Characters per second used whenever the configured rate is unusable.
pub const DEFAULT_SPEED: f64 = 30.0;

/// Immutable display configuration, resolved once at startup.
///
/// Precedence, lowest to highest: built-in defaults, optional config file,
/// `FANFARE_*` environment variables, command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub logo: Option<PathBuf>,
    /// Typing speed in characters per second.
    pub speed: f64,
    /// Pause between scene beats, in milliseconds.
    pub pause_ms: u64,
    /// Type out command results too, instead of printing them instantly.
    pub type_results: bool,
    /// Draw a trailing faux cursor while typing.
    pub use_cursor: bool,
    pub cursor_glyph: String,
    /// Skip the decorative border rules between beats.
    pub quiet_border: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Friend".to_string(),
            company: "the company".to_string(),
            role: "Software Engineer".to_string(),
            start_date: "soon".to_string(),
            logo: None,
            speed: DEFAULT_SPEED,
            pause_ms: 350,
            type_results: false,
            use_cursor: true,
            cursor_glyph: "▌".to_string(),
            quiet_border: false,
        }
    }
}

impl Config {
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fanfare")
            .join("config.toml")
    }

    /// Load the config file if one exists, then layer environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env();
        config.speed = sanitize_speed(config.speed);
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("FANFARE_NAME") {
            self.name = v;
        }
        if let Ok(v) = std::env::var("FANFARE_COMPANY") {
            self.company = v;
        }
        if let Ok(v) = std::env::var("FANFARE_ROLE") {
            self.role = v;
        }
        if let Ok(v) = std::env::var("FANFARE_START") {
            self.start_date = v;
        }
        if let Ok(v) = std::env::var("FANFARE_LOGO") {
            if !v.is_empty() {
                self.logo = Some(PathBuf::from(v));
            }
        }
        if let Ok(v) = std::env::var("FANFARE_SPEED") {
            self.speed = v.parse().unwrap_or(-1.0);
        }
        if let Ok(v) = std::env::var("FANFARE_TYPE_RESULTS") {
            self.type_results = parse_flag(&v).unwrap_or(self.type_results);
        }
        if let Ok(v) = std::env::var("FANFARE_QUIET_BORDER") {
            self.quiet_border = parse_flag(&v).unwrap_or(self.quiet_border);
        }
    }

    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// A speed must be a positive finite number; anything else falls back to the
/// default rate rather than erroring out.
pub fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        DEFAULT_SPEED
    }
}

/// Accepts the usual yes/no spellings for boolean flags.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "on" => Some(true),
        "no" | "n" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}
