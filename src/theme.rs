//! Stylesheet for the toast cards, with a fixed or system-driven palette.

use std::fmt::Write as _;
use std::str::FromStr;

use tracing::debug;

use crate::types::ThemeMode;

/// Width below which only the newest toast stays visible.
pub const DEFAULT_THEME_BREAKPOINT_PX: u32 = 768;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Palette {
    background: &'static str,
    color: &'static str,
    shadow: &'static str,
    time_color: &'static str,
}

const LIGHT: Palette = Palette {
    background: "rgba(255, 255, 255, 0.8)",
    color: "rgb(17, 17, 17)",
    shadow: "rgba(0, 0, 0, 0.08) 0px 4px 20px 0px, rgba(0, 0, 0, 0.04) 0px 1px 3px 0px",
    time_color: "rgb(142, 142, 147)",
};

const DARK: Palette = Palette {
    background: "rgba(28, 28, 30, 0.8)",
    color: "rgb(255, 255, 255)",
    shadow: "rgba(0, 0, 0, 0.15) 0px 4px 20px 0px, rgba(0, 0, 0, 0.08) 0px 1px 3px 0px",
    time_color: "rgb(142, 142, 147)",
};

const BASE: &str = r#".toastify-toast {
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
  font-feature-settings: normal;
  font-variation-settings: normal;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "Roboto", "Helvetica Neue", Arial, "Noto Sans", sans-serif, "Apple Color Emoji", "Segoe UI Emoji", "Segoe UI Symbol", "Noto Color Emoji";
  font-size: 13px;
  line-height: 16px;
  box-sizing: border-box;
  position: fixed;
  right: 16px;
  top: 16px;
  display: flex;
  width: 345px;
  user-select: none;
  gap: 12px;
  border-radius: 16px;
  padding: 12px 16px;
  backdrop-filter: blur(10px);
  -webkit-backdrop-filter: blur(10px);
  z-index: 9999;
  border: 0.5px solid rgba(255, 255, 255, 0.15);
}
.toastify-image {
  display: flex;
  align-items: center;
  align-self: center;
  height: 38px;
  width: 38px;
  border-radius: 8px;
  box-shadow: rgba(0, 0, 0, 0.12) 0px 2px 8px 0px;
  flex-shrink: 0;
}
.toastify-image img {
  display: block;
  vertical-align: middle;
  margin: 0 auto;
  height: auto;
  max-height: 38px;
  max-width: 38px;
  border-radius: 8px;
  object-fit: contain;
}
.toastify-content {
  flex: 1 1 0%;
}
.toastify-title {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 8px;
}
.toastify-subject {
  margin: 0;
  overflow: hidden;
  display: -webkit-box;
  -webkit-box-orient: vertical;
  -webkit-line-clamp: 1;
  flex: 1 1 0%;
  font-weight: 600;
  font-size: 13px;
}
.toastify-time {
  display: inline-block;
  font-size: 11px;
  font-weight: 400;
  flex-shrink: 0;
}
.toastify-message {
  margin: 0;
  margin-top: 2px;
  overflow: hidden;
  display: -webkit-box;
  -webkit-box-orient: vertical;
  -webkit-line-clamp: 2;
  height: 32px;
  font-weight: 400;
  font-size: 13px;
  color: inherit;
}
"#;

/// Produces the `styles` option for a given palette choice.
///
/// With no theme, light colors apply by default and `prefers-color-scheme`
/// switches between the two palettes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Theme {
    mode: Option<ThemeMode>,
    mobile_breakpoint: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(None, DEFAULT_THEME_BREAKPOINT_PX)
    }
}

impl Theme {
    #[must_use]
    pub const fn new(mode: Option<ThemeMode>, mobile_breakpoint: u32) -> Self {
        Self {
            mode,
            mobile_breakpoint,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Option<ThemeMode> {
        self.mode
    }

    pub const fn set_theme(&mut self, mode: Option<ThemeMode>) {
        self.mode = mode;
    }

    /// Parses `selector` ("light", "dark", or empty for auto). Unknown values
    /// leave the current theme untouched.
    pub fn set_theme_str(&mut self, selector: &str) {
        let selector = selector.trim();
        if selector.is_empty() || selector.eq_ignore_ascii_case("auto") {
            self.set_theme(None);
            return;
        }
        match ThemeMode::from_str(selector) {
            Ok(mode) => self.set_theme(Some(mode)),
            Err(err) => debug!(%err, "ignoring theme selector"),
        }
    }

    #[must_use]
    pub fn styles(&self) -> String {
        let mut css = String::with_capacity(BASE.len() + 1024);
        css.push_str(BASE);
        let _ = writeln!(
            css,
            "@media (max-width: {}px) {{\n  .toastify-toast:not(:last-child) {{\n    display: none;\n  }}\n}}",
            self.mobile_breakpoint
        );

        match self.mode {
            Some(ThemeMode::Light) => push_palette(&mut css, &LIGHT, ""),
            Some(ThemeMode::Dark) => push_palette(&mut css, &DARK, ""),
            None => {
                push_palette(&mut css, &LIGHT, "");
                css.push_str("@media (prefers-color-scheme: light) {\n");
                push_palette(&mut css, &LIGHT, "  ");
                css.push_str("}\n@media (prefers-color-scheme: dark) {\n");
                push_palette(&mut css, &DARK, "  ");
                css.push_str("}\n");
            }
        }
        css
    }
}

fn push_palette(css: &mut String, palette: &Palette, indent: &str) {
    let _ = writeln!(
        css,
        "{indent}.toastify-toast {{\n{indent}  background-color: {};\n{indent}  color: {};\n{indent}  box-shadow: {};\n{indent}}}",
        palette.background, palette.color, palette.shadow
    );
    let _ = writeln!(
        css,
        "{indent}.toastify-time {{\n{indent}  color: {};\n{indent}}}",
        palette.time_color
    );
}
