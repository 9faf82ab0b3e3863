//! Terminal styling and color utilities.
//!
//! ANSI escape codes, a resolved [`ColorPalette`] and capability detection
//! for the text renderers in [`crate::output`].

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bright bold white for headings.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary elements (paths, units).
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for objective labels.
    pub const CYAN: &str = "\x1b[36m";
    /// Green for feasible outcomes.
    pub const GREEN: &str = "\x1b[32m";
    /// Orange (256-color) for skipped runs.
    pub const ORANGE: &str = "\x1b[38;5;208m";
    /// Red for infeasible outcomes.
    pub const RED: &str = "\x1b[31m";
}

/// A collection of resolved color codes, either actual ANSI sequences
/// or empty strings when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub heading: &'static str,
    pub muted: &'static str,
    pub label: &'static str,
    pub good: &'static str,
    pub warn: &'static str,
    pub bad: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            heading: colors::WHITE_BOLD,
            muted: colors::GRAY,
            label: colors::CYAN,
            good: colors::GREEN,
            warn: colors::ORANGE,
            bad: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            heading: "",
            muted: "",
            label: "",
            good: "",
            warn: "",
            bad: "",
        }
    }

    /// `colored()` if the terminal supports ANSI colors, otherwise `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Check `LANG` and `LC_ALL` for a UTF-8 locale.
#[must_use]
pub fn supports_unicode() -> bool {
    ["LANG", "LC_ALL"].iter().any(|key| {
        std::env::var(key)
            .map(|value| value.to_uppercase().contains("UTF"))
            .unwrap_or(false)
    })
}

/// Arrow joining path cells, falling back to ASCII.
#[must_use]
pub fn path_arrow(unicode: bool) -> &'static str {
    if unicode {
        " → "
    } else {
        " -> "
    }
}

/// Format a number with thousand separators (commas).
///
/// ```
/// # use flightpath_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
