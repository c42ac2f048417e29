//! `config.ini`: created with defaults when missing, then parsed into typed settings.

use crate::generator::{GeneratorError, SourceKind, SupplyKind};
use crate::gui::{GuiError, GuiKind};
use log::{debug, info};
use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Written verbatim when no config file exists.
pub const DEFAULT_CONFIG: &str = "\
[Basics]
# Settings related to the playfield
columns = 10
rows = 20
# Top-left corner of the playfield in terminal cells
x_position = 2
y_position = 2
# Grid cell a new piece's origin is placed on
spawn_row = 3
spawn_column = 4

[Game_window]
# One of: default, debug, m
gui = default

[Technical]
# Framerate limit
framerate = 60

[Generator]
# Supply policy: no_rules or bag
supply = no_rules
# Random source: entropy or seeded (seeded needs a seed)
source = entropy
seed =

[Colors]
# Color values are decimal components separated by \", \"
game_window_background_color = 18, 18, 18, 255
game_window_foreground_color = 245, 245, 245, 255
font_color = 70, 70, 70, 255
";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing [{section}] {key}")]
    Missing { section: String, key: String },
    #[error("[{section}] {key}: invalid number \"{value}\"")]
    InvalidNumber {
        section: String,
        key: String,
        value: String,
    },
    #[error("[{section}] {key}: must be positive")]
    NonPositive { section: String, key: String },
    #[error("[{section}] {key}: invalid color \"{value}\"")]
    InvalidColor {
        section: String,
        key: String,
        value: String,
    },
    #[error(transparent)]
    Gui(#[from] GuiError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Settings read from `config.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub columns: u16,
    pub rows: u16,
    pub x_position: u16,
    pub y_position: u16,
    pub spawn_row: i32,
    pub spawn_column: i32,
    pub gui: GuiKind,
    pub framerate: u32,
    pub supply: SupplyKind,
    pub source: SourceKind,
    pub seed: Option<u64>,
    pub window_bg: Color,
    pub window_fg: Color,
    pub font_color: Color,
}

impl Config {
    /// Read `path`, writing `DEFAULT_CONFIG` there first if it does not exist.
    pub fn read_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            info!("Creating default config file {}", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
        }
        let s = fs::read_to_string(path)?;
        Self::parse(&s)
    }

    /// Remove the config file. Returns whether one existed.
    pub fn delete(path: &Path) -> Result<bool, ConfigError> {
        if path.is_file() {
            debug!("Deleting config file {}", path.display());
            fs::remove_file(path)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let ini = Ini(parse_ini(s));
        let seed = match ini.get("Generator", "seed")?.trim() {
            "" => None,
            v => Some(ini.number::<u64>("Generator", "seed", v)?),
        };
        Ok(Self {
            columns: ini.positive("Basics", "columns")?,
            rows: ini.positive("Basics", "rows")?,
            x_position: ini.parsed("Basics", "x_position")?,
            y_position: ini.parsed("Basics", "y_position")?,
            spawn_row: ini.parsed("Basics", "spawn_row")?,
            spawn_column: ini.parsed("Basics", "spawn_column")?,
            gui: ini.get("Game_window", "gui")?.parse()?,
            framerate: ini.positive("Technical", "framerate")?,
            supply: ini.get("Generator", "supply")?.parse()?,
            source: ini.get("Generator", "source")?.parse()?,
            seed,
            window_bg: ini.color("Colors", "game_window_background_color")?,
            window_fg: ini.color("Colors", "game_window_foreground_color")?,
            font_color: ini.color("Colors", "font_color")?,
        })
    }
}

struct Ini(HashMap<(String, String), String>);

impl Ini {
    fn get(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.0
            .get(&(section.to_string(), key.to_string()))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::Missing {
                section: section.into(),
                key: key.into(),
            })
    }

    fn number<T: std::str::FromStr>(
        &self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<T, ConfigError> {
        value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        })
    }

    fn parsed<T: std::str::FromStr>(&self, section: &str, key: &str) -> Result<T, ConfigError> {
        let value = self.get(section, key)?;
        self.number(section, key, value)
    }

    fn positive<T>(&self, section: &str, key: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr + Default + PartialOrd,
    {
        let v: T = self.parsed(section, key)?;
        if v <= T::default() {
            return Err(ConfigError::NonPositive {
                section: section.into(),
                key: key.into(),
            });
        }
        Ok(v)
    }

    fn color(&self, section: &str, key: &str) -> Result<Color, ConfigError> {
        let value = self.get(section, key)?;
        parse_rgba(value).ok_or_else(|| ConfigError::InvalidColor {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        })
    }
}

/// Parse INI text into (section, key) -> value. Keys keep their case.
fn parse_ini(s: &str) -> HashMap<(String, String), String> {
    let mut map = HashMap::new();
    let mut section = String::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim();
            let value = line[eq + 1..].trim();
            if !key.is_empty() {
                map.insert((section.clone(), key.to_string()), value.to_string());
            }
        }
    }
    map
}

/// Parse "r, g, b" or "r, g, b, a" (decimal) into an RGB colour. Alpha is ignored.
pub fn parse_rgba(s: &str) -> Option<Color> {
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] | [r, g, b, _] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("absolutris-{}-{}", std::process::id(), name))
            .join("config.ini")
    }

    #[test]
    fn test_defaults_parse() {
        let c = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!((c.columns, c.rows), (10, 20));
        assert_eq!((c.spawn_row, c.spawn_column), (3, 4));
        assert_eq!(c.gui, GuiKind::Default);
        assert_eq!(c.framerate, 60);
        assert_eq!(c.supply, SupplyKind::NoRules);
        assert_eq!(c.source, SourceKind::Entropy);
        assert_eq!(c.seed, None);
        assert_eq!(c.window_bg, Color::Rgb(18, 18, 18));
    }

    #[test]
    fn test_read_or_create_writes_defaults() {
        let path = temp_path("create");
        let _ = fs::remove_file(&path);
        let c = Config::read_or_create(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        assert_eq!(c, Config::parse(DEFAULT_CONFIG).unwrap());
        assert!(Config::delete(&path).unwrap());
        assert!(!Config::delete(&path).unwrap());
    }

    #[test]
    fn test_read_existing_file() {
        let path = temp_path("existing");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let text = DEFAULT_CONFIG
            .replace("supply = no_rules", "supply = bag")
            .replace("source = entropy", "source = seeded")
            .replace("seed =", "seed = 1234");
        fs::write(&path, text).unwrap();
        let c = Config::read_or_create(&path).unwrap();
        assert_eq!(c.supply, SupplyKind::Bag);
        assert_eq!(c.source, SourceKind::Seeded);
        assert_eq!(c.seed, Some(1234));
        Config::delete(&path).unwrap();
    }

    #[test]
    fn test_errors() {
        let missing = DEFAULT_CONFIG.replace("rows = 20\n", "");
        assert!(matches!(
            Config::parse(&missing),
            Err(ConfigError::Missing { .. })
        ));
        let zero = DEFAULT_CONFIG.replace("columns = 10", "columns = 0");
        assert!(matches!(
            Config::parse(&zero),
            Err(ConfigError::NonPositive { .. })
        ));
        let nan = DEFAULT_CONFIG.replace("spawn_row = 3", "spawn_row = three");
        assert!(matches!(
            Config::parse(&nan),
            Err(ConfigError::InvalidNumber { .. })
        ));
        let gui = DEFAULT_CONFIG.replace("gui = default", "gui = sdl");
        assert!(matches!(Config::parse(&gui), Err(ConfigError::Gui(_))));
        let color = DEFAULT_CONFIG.replace("70, 70, 70, 255", "70, 70");
        assert!(matches!(
            Config::parse(&color),
            Err(ConfigError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_parse_rgba() {
        assert_eq!(parse_rgba("245, 245, 245, 255"), Some(Color::Rgb(245, 245, 245)));
        assert_eq!(parse_rgba("1,2,3"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_rgba("256, 0, 0"), None);
    }

    #[test]
    fn test_parse_ini_sections() {
        let map = parse_ini("; c\n[A]\nk = v\n[B]\nk=w\n");
        assert_eq!(map.get(&("A".into(), "k".into())), Some(&"v".to_string()));
        assert_eq!(map.get(&("B".into(), "k".into())), Some(&"w".to_string()));
    }
}
