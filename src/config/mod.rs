use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::error::{ConfigError, Error as ToastError};
use crate::theme::Theme;
use crate::types::{DelayOverrides, Message, ThemeMode, ToastifyOptions};

mod defaults;
mod env;
mod raw;
mod serde;

use self::serde::HumantimeDuration;

#[derive(Debug, Clone)]
pub struct Config {
    pub messages: Vec<Message>,
    pub delays: DelayOverrides,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub theme: Option<ThemeMode>,
    pub viewport_width: u32,
    pub theme_breakpoint: u32,
    pub image_timeout: Duration,
    /// Extra CSS appended after the theme.
    pub styles: Option<String>,
    pub feed_capacity: usize,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// A missing file is an error only when `required` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read, parsed,
    /// when environment overrides are invalid, or when the resulting values
    /// fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>, required: bool) -> Result<Self> {
        let mut raw = raw::load(path, required).map_err(ToastError::from)?;
        raw.apply_env_overrides().map_err(ToastError::from)?;
        raw.validate_and_build()
    }

    /// Parse a TOML document without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the document does not parse or fails validation.
    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: raw::RawConfig = ::config::Config::builder()
            .add_source(::config::File::from_str(text, ::config::FileFormat::Toml))
            .build()
            .map_err(|err| ConfigError::Parse(err.to_string()))?
            .try_deserialize()
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        raw.validate_and_build()
    }

    /// Stylesheet for the configured theme, followed by any extra CSS.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let mut css = Theme::new(self.display.theme, self.display.theme_breakpoint).styles();
        if let Some(extra) = &self.display.styles {
            css.push('\n');
            css.push_str(extra);
        }
        css
    }

    #[must_use]
    pub fn options(&self) -> ToastifyOptions {
        ToastifyOptions {
            messages: self.messages.clone(),
            delays: self.delays,
            styles: Some(self.stylesheet()),
        }
    }
}
