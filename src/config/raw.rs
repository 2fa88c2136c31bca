use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;
use crate::types::{DelayOverrides, Message, ThemeMode};
use crate::util::time::local_clock;

use super::defaults::{
    default_feed_capacity, default_image_timeout, default_theme_breakpoint,
    default_viewport_width,
};
use super::env::{env_duration, env_parse, env_string};
use super::{Config, DisplaySettings, HumantimeDuration};

pub(super) fn load(
    path: impl AsRef<Path>,
    required: bool,
) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    if required {
        std::fs::metadata(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let builder = ::config::Config::builder()
        .add_source(::config::File::from(path).required(required))
        .add_source(
            ::config::Environment::with_prefix("TOASTIFY")
                .separator("__")
                .try_parsing(true),
        );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) delays: RawDelays,
    #[serde(default)]
    pub(super) display: RawDisplay,
    #[serde(default)]
    pub(super) messages: Vec<RawMessage>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawDelays {
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) start_after: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) display_interval: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) fade_out: Option<Duration>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawDisplay {
    #[serde(default)]
    pub(super) theme: Option<String>,
    #[serde(default = "default_viewport_width")]
    pub(super) viewport_width: u32,
    #[serde(default = "default_theme_breakpoint")]
    pub(super) theme_breakpoint: u32,
    #[serde(default = "default_image_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) image_timeout: Duration,
    #[serde(default)]
    pub(super) styles: Option<String>,
    #[serde(default = "default_feed_capacity")]
    pub(super) feed_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawMessage {
    pub(super) image: String,
    pub(super) title: String,
    #[serde(default)]
    pub(super) timestamp: Option<String>,
    #[serde(default)]
    pub(super) body: String,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(theme) = env_string("TOASTIFY_THEME")? {
            self.display.theme = Some(theme);
        }
        if let Some(start_after) = env_duration("TOASTIFY_START_AFTER")? {
            self.delays.start_after = Some(start_after);
        }
        if let Some(interval) = env_duration("TOASTIFY_INTERVAL")? {
            self.delays.display_interval = Some(interval);
        }
        if let Some(fade_out) = env_duration("TOASTIFY_FADE_OUT")? {
            self.delays.fade_out = Some(fade_out);
        }
        if let Some(image_timeout) = env_duration("TOASTIFY_IMAGE_TIMEOUT")? {
            self.display.image_timeout = image_timeout;
        }
        if let Some(width) = env_parse::<u32>("TOASTIFY_VIEWPORT")? {
            self.display.viewport_width = width;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let theme = match self.display.theme.as_deref().map(str::trim) {
            None | Some("" | "auto") => None,
            Some(raw) => Some(ThemeMode::from_str(raw).map_err(|message| {
                ConfigError::InvalidField {
                    field: "display.theme",
                    message,
                }
            })?),
        };

        if self.display.viewport_width == 0 {
            return Err(ConfigError::InvalidField {
                field: "display.viewport_width",
                message: "viewport width must be greater than zero".to_string(),
            }
            .into());
        }
        if self.display.image_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "display.image_timeout",
                message: "image timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.display.feed_capacity == 0 {
            return Err(ConfigError::InvalidField {
                field: "display.feed_capacity",
                message: "event feed capacity must be greater than zero".to_string(),
            }
            .into());
        }
        if self.messages.is_empty() {
            return Err(ConfigError::MissingField { field: "messages" }.into());
        }

        let messages = self
            .messages
            .into_iter()
            .map(RawMessage::build)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Config {
            messages,
            delays: DelayOverrides {
                start_after: self.delays.start_after,
                display_interval: self.delays.display_interval,
                fade_out: self.delays.fade_out,
            },
            display: DisplaySettings {
                theme,
                viewport_width: self.display.viewport_width,
                theme_breakpoint: self.display.theme_breakpoint,
                image_timeout: self.display.image_timeout,
                styles: self.display.styles.filter(|css| !css.trim().is_empty()),
                feed_capacity: self.display.feed_capacity,
            },
        })
    }
}

impl RawMessage {
    fn build(self) -> std::result::Result<Message, ConfigError> {
        let image = Url::parse(self.image.trim()).map_err(|err| ConfigError::InvalidField {
            field: "messages.image",
            message: format!("{}: {err}", self.image),
        })?;
        if self.title.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "messages.title",
                message: "title cannot be empty".to_string(),
            });
        }
        Ok(Message {
            image,
            title: self.title,
            timestamp: self.timestamp.unwrap_or_else(local_clock),
            body: self.body,
        })
    }
}

impl Default for RawDisplay {
    fn default() -> Self {
        Self {
            theme: None,
            viewport_width: default_viewport_width(),
            theme_breakpoint: default_theme_breakpoint(),
            image_timeout: default_image_timeout(),
            styles: None,
            feed_capacity: default_feed_capacity(),
        }
    }
}
