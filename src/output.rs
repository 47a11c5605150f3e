//! # Output Configuration
//!
//! Controls how kubemerge decorates what it prints: status glyphs and colors
//! are used on capable terminals and replaced by plain tags otherwise.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::Style;

/// Output configuration for controlling colors and glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether colors and glyphs should be used in output.
    pub use_color: bool,
}

/// Kinds of status line, each with its own glyph, tag and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
    Info,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the `--color` flag.
    ///
    /// `always` and `never` win outright; anything else falls back to
    /// detection from the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        color_from_env(|name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
            .unwrap_or_else(|| console::Term::stdout().features().colors_supported())
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Prefix for a status line: a glyph with color, a bracketed tag without.
    pub fn marker(&self, status: Status) -> String {
        let (glyph, tag, style) = match status {
            Status::Ok => ("✅", "[OK]", Style::new().green()),
            Status::Warn => ("⚠️ ", "[WARN]", Style::new().yellow()),
            Status::Error => ("❌", "[ERR]", Style::new().red()),
            Status::Info => ("📋", "[INFO]", Style::new().cyan()),
        };
        if self.use_color {
            style.force_styling(true).apply_to(glyph).to_string()
        } else {
            tag.to_string()
        }
    }

    /// Bold `text` when colors are enabled.
    pub fn emphasis(&self, text: &str) -> String {
        if self.use_color {
            Style::new().bold().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// The color decision the environment forces, if any; `None` leaves it to
/// terminal detection. `NO_COLOR` beats `CLICOLOR_FORCE`, which beats
/// `CLICOLOR=0` and `TERM=dumb`.
fn color_from_env(var: impl Fn(&str) -> Option<String>) -> Option<bool> {
    let var_is = |name: &str, pred: fn(&str) -> bool| var(name).is_some_and(|v| pred(v.as_str()));

    if var("NO_COLOR").is_some() {
        Some(false)
    } else if var_is("CLICOLOR_FORCE", |v| !v.is_empty() && v != "0") {
        Some(true)
    } else if var_is("CLICOLOR", |v| v == "0") || var_is("TERM", |v| v == "dumb") {
        Some(false)
    } else {
        None
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
