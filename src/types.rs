use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_START_AFTER: Duration = Duration::from_millis(1000);
pub const DEFAULT_DISPLAY_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_FADE_OUT: Duration = Duration::from_millis(5000);

/// One toast card. Immutable once queued.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    pub image: Url,
    pub title: String,
    pub timestamp: String,
    pub body: String,
}

/// Timing of a run. A zero `fade_out` keeps the last toast on screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Delays {
    start_after: Duration,
    display_interval: Duration,
    fade_out: Duration,
    mobile_fade_out: Duration,
}

impl Delays {
    #[must_use]
    pub fn new(start_after: Duration, display_interval: Duration, fade_out: Duration) -> Self {
        Self {
            start_after,
            display_interval,
            fade_out,
            mobile_fade_out: mobile_fade_out(display_interval),
        }
    }

    /// Applies the present overrides; absent fields keep their current value.
    pub fn apply(&mut self, overrides: &DelayOverrides) {
        if let Some(start_after) = overrides.start_after {
            self.start_after = start_after;
        }
        if let Some(display_interval) = overrides.display_interval {
            self.display_interval = display_interval;
        }
        if let Some(fade_out) = overrides.fade_out {
            self.fade_out = fade_out;
        }
        self.mobile_fade_out = mobile_fade_out(self.display_interval);
    }

    #[must_use]
    pub const fn start_after(&self) -> Duration {
        self.start_after
    }

    #[must_use]
    pub const fn display_interval(&self) -> Duration {
        self.display_interval
    }

    #[must_use]
    pub const fn fade_out(&self) -> Duration {
        self.fade_out
    }

    /// Fade-out delay of non-final toasts on narrow viewports.
    #[must_use]
    pub const fn mobile_fade_out(&self) -> Duration {
        self.mobile_fade_out
    }

    #[must_use]
    pub const fn persists_last(&self) -> bool {
        self.fade_out.is_zero()
    }
}

impl Default for Delays {
    fn default() -> Self {
        Self::new(DEFAULT_START_AFTER, DEFAULT_DISPLAY_INTERVAL, DEFAULT_FADE_OUT)
    }
}

fn mobile_fade_out(display_interval: Duration) -> Duration {
    display_interval * 9 / 10
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DelayOverrides {
    pub start_after: Option<Duration>,
    pub display_interval: Option<Duration>,
    pub fade_out: Option<Duration>,
}

/// Everything `init` and `update` need.
#[derive(Clone, Debug, Default)]
pub struct ToastifyOptions {
    pub messages: Vec<Message>,
    pub delays: DelayOverrides,
    /// Raw stylesheet injected verbatim before the keyframes.
    pub styles: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Lifecycle position of a controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControllerState {
    Idle,
    Initialized,
    Running,
    /// Every toast is revealed; waiting for fade-outs.
    Draining,
}

impl Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Draining => "draining",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DelayOverrides, Delays, ThemeMode};
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn theme_from_str_accepts_variants() {
        assert_eq!(ThemeMode::from_str("light"), Ok(ThemeMode::Light));
        assert_eq!(ThemeMode::from_str(" DARK "), Ok(ThemeMode::Dark));
        assert!(ThemeMode::from_str("sepia").is_err());
    }

    #[test]
    fn mobile_fade_out_follows_interval() {
        let mut delays = Delays::default();
        assert_eq!(delays.mobile_fade_out(), Duration::from_millis(1800));

        delays.apply(&DelayOverrides {
            display_interval: Some(Duration::from_millis(500)),
            ..DelayOverrides::default()
        });
        assert_eq!(delays.mobile_fade_out(), Duration::from_millis(450));
        assert_eq!(delays.start_after(), Duration::from_millis(1000));
    }

    #[test]
    fn absent_overrides_keep_previous_values() {
        let mut delays = Delays::default();
        delays.apply(&DelayOverrides {
            fade_out: Some(Duration::ZERO),
            ..DelayOverrides::default()
        });
        delays.apply(&DelayOverrides::default());
        assert!(delays.persists_last());
        assert_eq!(delays.display_interval(), Duration::from_millis(2000));
    }
}
