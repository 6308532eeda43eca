//! # Terminal Output
//!
//! Status lines printed by the CLI commands. Colour and symbols follow the
//! `--color` flag and the usual environment conventions:
//!
//! - `--color=always|never|auto`
//! - `NO_COLOR` (any value) disables colour in auto mode
//! - `CLICOLOR=0` disables colour, `CLICOLOR_FORCE=1` forces it
//! - `TERM=dumb` disables colour
//!
//! Log lines go through `log` and are not affected by any of this.

use std::env;

use console::style;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag value against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    Build,
}

impl Status {
    fn symbol(&self) -> &'static str {
        match self {
            Status::Ok => "✅",
            Status::Error => "❌",
            Status::Build => "🔨",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Error => "[ERR]",
            Status::Build => "[BUILD]",
        }
    }
}

/// Returns the emoji when colours are on, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Format a status line: a marker followed by `message`.
///
/// Error lines are red and OK lines green when colours are on.
pub fn status_line(config: &OutputConfig, status: Status, message: &str) -> String {
    let marker = emoji(config, status.symbol(), status.tag());
    if !config.use_color {
        return format!("{} {}", marker, message);
    }
    let message = match status {
        Status::Ok => style(message).green().to_string(),
        Status::Error => style(message).red().to_string(),
        Status::Build => message.to_string(),
    };
    format!("{} {}", marker, message)
}
