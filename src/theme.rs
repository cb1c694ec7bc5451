//! Dark/light theme preference.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::config::DisplayConfig;
use crate::error::{Error, Result};
use crate::storage::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(Error::InvalidArgument(format!(
                "invalid theme '{other}' (expected dark|light)"
            ))),
        }
    }
}

/// Saved theme, else the configured or system preference.
pub fn load(storage: &Storage, display: &DisplayConfig) -> Theme {
    if let Some(theme) = storage
        .read_entry(THEME_KEY)
        .and_then(|raw| raw.parse::<Theme>().ok())
    {
        return theme;
    }
    let fallback = preferred(display, std::env::var("COLORFGBG").ok().as_deref());
    debug!(theme = %fallback, "no saved theme; using preference");
    fallback
}

pub fn save(storage: &Storage, theme: Theme) -> Result<()> {
    storage.write_entry(THEME_KEY, theme.as_str())
}

/// Flip the current theme and persist the result.
pub fn toggle(storage: &Storage, display: &DisplayConfig) -> Result<Theme> {
    let next = load(storage, display).toggled();
    save(storage, next)?;
    Ok(next)
}

fn preferred(display: &DisplayConfig, colorfgbg: Option<&str>) -> Theme {
    match display.theme.as_str() {
        "light" => Theme::Light,
        "dark" => Theme::Dark,
        _ => system_theme(colorfgbg),
    }
}

// COLORFGBG is "fg;bg" (sometimes "fg;extra;bg"); the last field is the
// background palette index.
fn system_theme(colorfgbg: Option<&str>) -> Theme {
    let background = colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match background {
        Some(0..=6) | Some(8) => Theme::Dark,
        Some(_) => Theme::Light,
        None => Theme::Dark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn display(theme: &str) -> DisplayConfig {
        DisplayConfig {
            theme: theme.to_string(),
        }
    }

    #[test]
    fn system_theme_reads_background_index() {
        assert_eq!(system_theme(Some("15;0")), Theme::Dark);
        assert_eq!(system_theme(Some("0;15")), Theme::Light);
        assert_eq!(system_theme(Some("0;default;7")), Theme::Light);
        assert_eq!(system_theme(Some("garbage")), Theme::Dark);
        assert_eq!(system_theme(None), Theme::Dark);
    }

    #[test]
    fn configured_preference_overrides_system() {
        assert_eq!(preferred(&display("light"), Some("15;0")), Theme::Light);
        assert_eq!(preferred(&display("dark"), Some("0;15")), Theme::Dark);
        assert_eq!(preferred(&display("system"), Some("0;15")), Theme::Light);
    }

    #[test]
    fn saved_theme_wins_and_toggle_persists() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        let config = display("light");
        assert_eq!(load(&storage, &config), Theme::Light);

        save(&storage, Theme::Dark).unwrap();
        assert_eq!(load(&storage, &config), Theme::Dark);

        assert_eq!(toggle(&storage, &config).unwrap(), Theme::Light);
        assert_eq!(storage.read_entry(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn malformed_entry_falls_back_to_preference() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        storage.write_entry(THEME_KEY, "sepia").unwrap();
        assert_eq!(load(&storage, &display("light")), Theme::Light);
    }
}
