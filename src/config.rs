//! Application configuration.
//!
//! One [`AppConfig`] is built at startup and handed to the components that
//! need it. Every editable parameter is described by a [`ParamSpec`], and
//! values move in and out through the uniform [`AppConfig::get`] /
//! [`AppConfig::set`] pair regardless of their kind.

use crate::error::ConfigError;
use crate::parser::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: String,
    pub font_size: i64,
    pub table_min_width: i64,
    pub plot_red_color: String,
    pub plot_green_color: String,
    pub plot_gray_color: String,
    pub plot_orange_color: String,
    pub plot_dark_gray_color: String,
    pub plot_background_color: String,
    pub plot_truncate_len: i64,
    pub export_plot_width: i64,
    pub export_plot_height: i64,
    pub vocabulary: Vocabulary,
}

const DEFAULT_RED: &str = "rgba(220, 20, 60, 255)";
const DEFAULT_GREEN: &str = "rgba(0, 176, 80, 255)";
const DEFAULT_GRAY: &str = "rgba(200, 200, 200, 255)";
const DEFAULT_ORANGE: &str = "rgba(255, 140, 0, 255)";
const DEFAULT_DARK_GRAY: &str = "rgba(100, 100, 100, 255)";
const DEFAULT_BACKGROUND: &str = "rgba(0, 0, 0, 0)";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: String::new(),
            font_size: 12,
            table_min_width: 510,
            plot_red_color: DEFAULT_RED.to_string(),
            plot_green_color: DEFAULT_GREEN.to_string(),
            plot_gray_color: DEFAULT_GRAY.to_string(),
            plot_orange_color: DEFAULT_ORANGE.to_string(),
            plot_dark_gray_color: DEFAULT_DARK_GRAY.to_string(),
            plot_background_color: DEFAULT_BACKGROUND.to_string(),
            plot_truncate_len: 30,
            export_plot_width: 1920,
            export_plot_height: 1080,
            vocabulary: Vocabulary::default(),
        }
    }
}

/// Editor kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number { min: i64, max: i64 },
    FilePath,
    Color,
}

impl ParamKind {
    fn name(self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::FilePath => "file path",
            Self::Color => "color",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Number(i64),
    FilePath(String),
    Color(Rgba),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::FilePath(p) if p.is_empty() => write!(f, "-"),
            Self::FilePath(p) => write!(f, "{p}"),
            Self::Color(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub group: &'static str,
    pub tooltip: &'static str,
    pub kind: ParamKind,
    pub require_reload: bool,
}

const fn number(min: i64, max: i64) -> ParamKind {
    ParamKind::Number { min, max }
}

pub const GROUP_ORDER: [&str; 3] = ["General", "Charts", "Export"];

/// Every editable parameter, in display order within its group.
pub const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "data_path",
        label: "Data file",
        group: "General",
        tooltip: "Path to the inventory export",
        kind: ParamKind::FilePath,
        require_reload: true,
    },
    ParamSpec {
        key: "font_size",
        label: "Font size",
        group: "General",
        tooltip: "Font size for exported tables",
        kind: number(6, 48),
        require_reload: true,
    },
    ParamSpec {
        key: "table_min_width",
        label: "Minimum table width",
        group: "General",
        tooltip: "Minimum width of the breakdown table",
        kind: number(0, 10_000),
        require_reload: false,
    },
    ParamSpec {
        key: "plot_red_color",
        label: "Chart color - red",
        group: "Charts",
        tooltip: "Color of negative categories",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_green_color",
        label: "Chart color - green",
        group: "Charts",
        tooltip: "Color of positive categories",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_gray_color",
        label: "Chart color - gray",
        group: "Charts",
        tooltip: "Color of the blank category",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_orange_color",
        label: "Chart color - orange",
        group: "Charts",
        tooltip: "Color of systems in development",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_dark_gray_color",
        label: "Chart color - dark gray",
        group: "Charts",
        tooltip: "Color of unused subsystems",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_background_color",
        label: "Chart background",
        group: "Charts",
        tooltip: "Chart background color (transparent by default)",
        kind: ParamKind::Color,
        require_reload: false,
    },
    ParamSpec {
        key: "plot_truncate_len",
        label: "Label truncation",
        group: "Charts",
        tooltip: "Maximum class label length in charts (characters)",
        kind: number(4, 200),
        require_reload: false,
    },
    ParamSpec {
        key: "export_plot_width",
        label: "Exported chart width",
        group: "Export",
        tooltip: "Width of exported charts in pixels",
        kind: number(100, 10_000),
        require_reload: false,
    },
    ParamSpec {
        key: "export_plot_height",
        label: "Exported chart height",
        group: "Export",
        tooltip: "Height of exported charts in pixels",
        kind: number(100, 10_000),
        require_reload: false,
    },
];

/// Looks up the descriptor of `key`.
#[must_use]
pub fn param_spec(key: &str) -> Option<&'static ParamSpec> {
    PARAMS.iter().find(|p| p.key == key)
}

/// Descriptors sorted by group order, keeping declaration order inside a group.
#[must_use]
pub fn params_by_group() -> Vec<&'static ParamSpec> {
    let mut params: Vec<&ParamSpec> = PARAMS.iter().collect();
    params.sort_by_key(|p| GROUP_ORDER.iter().position(|g| *g == p.group));
    params
}

impl AppConfig {
    /// Reads the configuration file, or returns defaults if it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            debug!(path = %path_ref.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path_ref.to_path_buf(),
                source,
            })?;

        if let serde_json::Value::Object(map) = &value {
            for key in map.keys() {
                if param_spec(key).is_none() && key != "vocabulary" {
                    warn!(key = %key, "unknown configuration key ignored");
                }
            }
        }

        serde_json::from_value(value).map_err(|source| ConfigError::Parse {
            path: path_ref.to_path_buf(),
            source,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_ref = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ConfigError::Encode { source })?;
        std::fs::write(path_ref, json).map_err(|source| ConfigError::Write {
            path: path_ref.to_path_buf(),
            source,
        })
    }

    /// Current value of a registered parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ParamValue> {
        match param_spec(key)?.kind {
            ParamKind::Number { .. } => self.number(key).map(ParamValue::Number),
            ParamKind::FilePath => self.text(key).map(|p| ParamValue::FilePath(p.to_string())),
            // an unparsable stored color reads as its default
            ParamKind::Color => self
                .text(key)
                .and_then(|c| c.parse().ok())
                .or_else(|| default_color(key))
                .map(ParamValue::Color),
        }
    }

    /// Sets a registered parameter. Numbers are clamped to their range.
    pub fn set(&mut self, key: &str, value: ParamValue) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownParam {
            key: key.to_string(),
        };
        let spec = param_spec(key).ok_or_else(unknown)?;

        match (spec.kind, value) {
            (ParamKind::Number { min, max }, ParamValue::Number(n)) => {
                *self.number_mut(key).ok_or_else(unknown)? = n.clamp(min, max);
            }
            (ParamKind::FilePath, ParamValue::FilePath(p)) => {
                *self.text_mut(key).ok_or_else(unknown)? = p;
            }
            (ParamKind::Color, ParamValue::Color(c)) => {
                *self.text_mut(key).ok_or_else(unknown)? = c.to_string();
            }
            (kind, _) => {
                return Err(ConfigError::KindMismatch {
                    key: key.to_string(),
                    expected: kind.name(),
                })
            }
        }
        debug!(key, "parameter updated");
        Ok(())
    }

    /// Restores the default value of `key`.
    pub fn reset(&mut self, key: &str) -> Result<(), ConfigError> {
        let default = Self::default()
            .get(key)
            .ok_or_else(|| ConfigError::UnknownParam {
                key: key.to_string(),
            })?;
        self.set(key, default)
    }

    /// Chart colors, falling back to defaults for unparsable entries.
    #[must_use]
    pub fn palette(&self) -> Palette {
        let color = |stored: &str, default: &str| {
            stored
                .parse::<Rgba>()
                .or_else(|_| default.parse())
                .unwrap_or_default()
        };
        Palette {
            red: color(&self.plot_red_color, DEFAULT_RED),
            green: color(&self.plot_green_color, DEFAULT_GREEN),
            gray: color(&self.plot_gray_color, DEFAULT_GRAY),
            orange: color(&self.plot_orange_color, DEFAULT_ORANGE),
            dark_gray: color(&self.plot_dark_gray_color, DEFAULT_DARK_GRAY),
        }
    }

    fn number(&self, key: &str) -> Option<i64> {
        match key {
            "font_size" => Some(self.font_size),
            "table_min_width" => Some(self.table_min_width),
            "plot_truncate_len" => Some(self.plot_truncate_len),
            "export_plot_width" => Some(self.export_plot_width),
            "export_plot_height" => Some(self.export_plot_height),
            _ => None,
        }
    }

    fn number_mut(&mut self, key: &str) -> Option<&mut i64> {
        match key {
            "font_size" => Some(&mut self.font_size),
            "table_min_width" => Some(&mut self.table_min_width),
            "plot_truncate_len" => Some(&mut self.plot_truncate_len),
            "export_plot_width" => Some(&mut self.export_plot_width),
            "export_plot_height" => Some(&mut self.export_plot_height),
            _ => None,
        }
    }

    // file paths and colors are both stored as text
    fn text(&self, key: &str) -> Option<&str> {
        match key {
            "data_path" => Some(&self.data_path),
            "plot_red_color" => Some(&self.plot_red_color),
            "plot_green_color" => Some(&self.plot_green_color),
            "plot_gray_color" => Some(&self.plot_gray_color),
            "plot_orange_color" => Some(&self.plot_orange_color),
            "plot_dark_gray_color" => Some(&self.plot_dark_gray_color),
            "plot_background_color" => Some(&self.plot_background_color),
            _ => None,
        }
    }

    fn text_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "data_path" => Some(&mut self.data_path),
            "plot_red_color" => Some(&mut self.plot_red_color),
            "plot_green_color" => Some(&mut self.plot_green_color),
            "plot_gray_color" => Some(&mut self.plot_gray_color),
            "plot_orange_color" => Some(&mut self.plot_orange_color),
            "plot_dark_gray_color" => Some(&mut self.plot_dark_gray_color),
            "plot_background_color" => Some(&mut self.plot_background_color),
            _ => None,
        }
    }
}

fn default_color(key: &str) -> Option<Rgba> {
    let text = match key {
        "plot_red_color" => DEFAULT_RED,
        "plot_green_color" => DEFAULT_GREEN,
        "plot_gray_color" => DEFAULT_GRAY,
        "plot_orange_color" => DEFAULT_ORANGE,
        "plot_dark_gray_color" => DEFAULT_DARK_GRAY,
        "plot_background_color" => DEFAULT_BACKGROUND,
        _ => return None,
    };
    text.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub red: Rgba,
    pub green: Rgba,
    pub gray: Rgba,
    pub orange: Rgba,
    pub dark_gray: Rgba,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ConfigError;

    /// Accepts `rgb(r, g, b)`, `rgba(r, g, b, a)` and `#rrggbb`.
    /// Alpha is 0-255, or a fraction when at most 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor {
            value: s.to_string(),
        };
        let text = s.trim();

        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(invalid());
            }
            let channel = |i: usize| {
                hex.get(i..i + 2)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(invalid)
            };
            return Ok(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            });
        }

        let (inner, with_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = text.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let inner = inner.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != if with_alpha { 4 } else { 3 } {
            return Err(invalid());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let a = if with_alpha {
            let alpha: f64 = parts[3].parse().map_err(|_| invalid())?;
            if !(0.0..=255.0).contains(&alpha) {
                return Err(invalid());
            }
            if alpha <= 1.0 {
                (alpha * 255.0).round() as u8
            } else {
                alpha.round() as u8
            }
        } else {
            255
        };

        Ok(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }
}
