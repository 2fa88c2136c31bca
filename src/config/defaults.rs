use std::time::Duration;

use crate::controller::DEFAULT_IMAGE_TIMEOUT;
use crate::theme::DEFAULT_THEME_BREAKPOINT_PX;

pub(super) const fn default_viewport_width() -> u32 {
    1280
}

pub(super) const fn default_theme_breakpoint() -> u32 {
    DEFAULT_THEME_BREAKPOINT_PX
}

pub(super) const fn default_image_timeout() -> Duration {
    DEFAULT_IMAGE_TIMEOUT
}

pub(super) const fn default_feed_capacity() -> usize {
    64
}
