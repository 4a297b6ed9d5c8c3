//! Client configuration parsed from environment variables.

use canvas::consts::{
    DEFAULT_BRUSH_WIDTH, DEFAULT_REVEAL_DELAY_MS, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, MAX_BRUSH_WIDTH,
    MIN_BRUSH_WIDTH,
};
use canvas::engine::EngineConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:8900";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the evaluation service, without a trailing slash.
    pub api_url: String,
    pub engine: EngineConfig,
    /// Initial brush width, already clamped to the toolbar range.
    pub brush_width: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned(), engine: EngineConfig::default(), brush_width: DEFAULT_BRUSH_WIDTH }
    }
}

impl Config {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `MATHBOARD_API_URL`: evaluation service base URL
    /// - `MATHBOARD_CANVAS_WIDTH` / `MATHBOARD_CANVAS_HEIGHT`: surface size
    /// - `MATHBOARD_REVEAL_DELAY_MS`: delay before overlays appear
    /// - `MATHBOARD_CLEAR_ON_REVEAL`: `true` / `false`
    /// - `MATHBOARD_BRUSH_WIDTH`: initial stroke width
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("MATHBOARD_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();

        let width = parse_or("MATHBOARD_CANVAS_WIDTH", get("MATHBOARD_CANVAS_WIDTH"), DEFAULT_SURFACE_WIDTH)?;
        let height = parse_or("MATHBOARD_CANVAS_HEIGHT", get("MATHBOARD_CANVAS_HEIGHT"), DEFAULT_SURFACE_HEIGHT)?;
        if width == 0 {
            return Err(ConfigError::Invalid { var: "MATHBOARD_CANVAS_WIDTH", value: "0".into() });
        }
        if height == 0 {
            return Err(ConfigError::Invalid { var: "MATHBOARD_CANVAS_HEIGHT", value: "0".into() });
        }
        let reveal_delay_ms =
            parse_or("MATHBOARD_REVEAL_DELAY_MS", get("MATHBOARD_REVEAL_DELAY_MS"), DEFAULT_REVEAL_DELAY_MS)?;
        let clear_on_reveal = parse_or("MATHBOARD_CLEAR_ON_REVEAL", get("MATHBOARD_CLEAR_ON_REVEAL"), true)?;
        let brush_width: f64 = parse_or("MATHBOARD_BRUSH_WIDTH", get("MATHBOARD_BRUSH_WIDTH"), DEFAULT_BRUSH_WIDTH)?;
        if !brush_width.is_finite() {
            return Err(ConfigError::Invalid { var: "MATHBOARD_BRUSH_WIDTH", value: brush_width.to_string() });
        }

        Ok(Self {
            api_url,
            engine: EngineConfig { width, height, reveal_delay_ms, clear_on_reveal },
            brush_width: brush_width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH),
        })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
