//! Visual theme and styling.

use console::Style;
use serde::Serialize;

/// The four message levels every reporter renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
    Warning,
}

impl Level {
    /// Unicode glyph for terminals.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "◆",
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Warning => "⚠",
        }
    }

    /// ASCII glyph for logs and dumb terminals.
    pub fn ascii(self) -> &'static str {
        match self {
            Self::Info => "[*]",
            Self::Success => "[+]",
            Self::Error => "[-]",
            Self::Warning => "[!]",
        }
    }
}

/// Outpost's visual theme.
#[derive(Debug, Clone)]
pub struct OutpostTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning and blocked messages (orange).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Informational and running elements (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    pub highlight: Style,
    pub header: Style,
    pub duration: Style,
    pub border: Style,
    ascii: bool,
}

impl Default for OutpostTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl OutpostTheme {
    /// The default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            duration: Style::new().dim(),
            border: Style::new().dim(),
            ascii: false,
        }
    }

    /// A theme without colors (non-TTY or `--no-color`). Keeps unicode glyphs.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            duration: Style::new(),
            border: Style::new(),
            ascii: false,
        }
    }

    /// A colorless theme with bracketed ASCII glyphs.
    pub fn ascii() -> Self {
        Self {
            ascii: true,
            ..Self::plain()
        }
    }

    /// Glyph for a level in this theme.
    pub fn glyph(&self, level: Level) -> &'static str {
        if self.ascii {
            level.ascii()
        } else {
            level.icon()
        }
    }

    fn style(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Success => &self.success,
            Level::Error => &self.error,
            Level::Warning => &self.warning,
        }
    }

    /// Format a message at a level (glyph + text in the level's style).
    pub fn format(&self, level: Level, msg: &str) -> String {
        format!(
            "{}",
            self.style(level)
                .apply_to(format!("{} {}", self.glyph(level), msg))
        )
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.format(Level::Success, msg)
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.format(Level::Warning, msg)
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.format(Level::Error, msg)
    }

    pub fn format_info(&self, msg: &str) -> String {
        self.format(Level::Info, msg)
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("⌂"),
            self.highlight.apply_to(title)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_each_level() {
        let theme = OutpostTheme::plain();
        assert_eq!(theme.format_info("a"), "◆ a");
        assert_eq!(theme.format_success("a"), "✓ a");
        assert_eq!(theme.format_error("a"), "✗ a");
        assert_eq!(theme.format_warning("a"), "⚠ a");
    }

    #[test]
    fn ascii_theme_uses_brackets() {
        let theme = OutpostTheme::ascii();
        assert_eq!(theme.format_info("a"), "[*] a");
        assert_eq!(theme.format_success("a"), "[+] a");
        assert_eq!(theme.format_error("a"), "[-] a");
        assert_eq!(theme.format_warning("a"), "[!] a");
    }

    #[test]
    fn theme_formats_header() {
        let msg = OutpostTheme::plain().format_header("workstation");
        assert!(msg.contains("workstation"));
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Level::Warning).unwrap(),
            "\"warning\""
        );
    }
}
