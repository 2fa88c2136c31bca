//! CSS animations applied to toast cards and the keyframes they reference.
//!
//! Every animation knows its own name, duration and delay so a host can tell
//! when it ends without parsing the rendered `animation` value.

use std::fmt::{self, Display, Write as _};
use std::time::Duration;

pub const FADE_IN_RIGHT: &str = "toastify-fade-in-right";
pub const FADE_OUT: &str = "toastify-fade-out";
pub const SLIDE_BOTTOM_PREFIX: &str = "toastify-slide-bottom-";

/// Height of one toast slot.
pub const SLOT_HEIGHT_PX: u32 = 75;
/// Gap between stacked slots.
pub const SLOT_MARGIN_PX: u32 = 8;

const FADE_IN_DURATION: Duration = Duration::from_millis(500);
const SLIDE_DURATION: Duration = Duration::from_millis(500);
const FADE_OUT_DURATION: Duration = Duration::from_millis(800);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Animation {
    FadeInRight,
    /// Slides a card down by `n` slots from its previous position.
    SlideBottom(usize),
    FadeOut { delay: Duration },
}

impl Animation {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::FadeInRight => FADE_IN_RIGHT.to_string(),
            Self::SlideBottom(slots) => format!("{SLIDE_BOTTOM_PREFIX}{slots}"),
            Self::FadeOut { .. } => FADE_OUT.to_string(),
        }
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self {
            Self::FadeInRight => FADE_IN_DURATION,
            Self::SlideBottom(_) => SLIDE_DURATION,
            Self::FadeOut { .. } => FADE_OUT_DURATION,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        match self {
            Self::FadeOut { delay } => *delay,
            Self::FadeInRight | Self::SlideBottom(_) => Duration::ZERO,
        }
    }

    /// Time from application until the `animationend` event.
    #[must_use]
    pub fn ends_after(&self) -> Duration {
        self.delay() + self.duration()
    }
}

impl Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FadeInRight => write!(
                f,
                "{FADE_IN_RIGHT} 500ms cubic-bezier(0.390, 0.575, 0.565, 1.000) forwards"
            ),
            Self::SlideBottom(slots) => write!(
                f,
                "{SLIDE_BOTTOM_PREFIX}{slots} 500ms cubic-bezier(0.455, 0.030, 0.515, 0.955) forwards"
            ),
            Self::FadeOut { delay } => {
                write!(f, "{FADE_OUT} 0.8s ease-out {} both", css_millis(*delay))
            }
        }
    }
}

/// Value of an element's `animation` property.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnimationList(Vec<Animation>);

impl AnimationList {
    #[must_use]
    pub fn single(animation: Animation) -> Self {
        Self(vec![animation])
    }

    pub fn push(&mut self, animation: Animation) {
        self.0.push(animation);
    }

    #[must_use]
    pub fn with(mut self, animation: Animation) -> Self {
        self.push(animation);
        self
    }

    /// Last animation carrying `name`, which is the one the host reports on.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Animation> {
        self.0.iter().rev().find(|animation| animation.name() == name)
    }
}

impl Display for AnimationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, animation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(animation, f)?;
        }
        Ok(())
    }
}

/// Keyframes for a queue of `message_count` toasts: the two fixed effects plus
/// one slide per stack depth.
#[must_use]
pub fn keyframes(message_count: usize) -> Vec<String> {
    let mut rules = Vec::with_capacity(message_count + 2);
    rules.push(format!(
        "@keyframes {FADE_IN_RIGHT} {{\n  0% {{ transform: translateX(50px); opacity: 0 }}\n  100% {{ transform: translateX(0); opacity: 1 }}\n}}"
    ));
    rules.push(format!(
        "@keyframes {FADE_OUT} {{\n  0% {{ opacity: 1 }}\n  100% {{ opacity: 0 }}\n}}"
    ));

    let pitch = u64::from(SLOT_HEIGHT_PX + SLOT_MARGIN_PX);
    for depth in 1..=message_count as u64 {
        rules.push(format!(
            "@keyframes {SLIDE_BOTTOM_PREFIX}{depth} {{\n  0% {{ transform: translateY({}px) }}\n  100% {{ transform: translateY({}px) }}\n}}",
            pitch * (depth - 1),
            pitch * depth,
        ));
    }
    rules
}

/// Renders a duration as CSS milliseconds, keeping sub-millisecond precision.
fn css_millis(value: Duration) -> String {
    let nanos = value.subsec_nanos() % 1_000_000;
    let mut out = value.as_millis().to_string();
    if nanos != 0 {
        let fraction = format!("{nanos:06}");
        let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
    }
    out.push_str("ms");
    out
}
