//! User preferences and the application context handed to every view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{SharedStore, StoreKey, json};
use crate::{ReqlabError, Result};

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = ReqlabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            _ => Err(ReqlabError::Other(format!("Unknown language: {}", s))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Neon palette on a deep purple background.
    Color,
    /// Cold blue "tech" palette.
    Wuxia,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Color, Theme::Wuxia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Color => "color",
            Theme::Wuxia => "wuxia",
        }
    }

    /// Derived style tokens for this theme.
    #[must_use]
    pub fn tokens(&self) -> StyleTokens {
        match self {
            Theme::Light => StyleTokens {
                accent: "#007bff",
                muted: "#999999",
                success: "#28a745",
                warning: "#ffc107",
                danger: "#dc3545",
                info: "#17a2b8",
            },
            Theme::Dark => StyleTokens {
                accent: "#00d4ff",
                muted: "#666666",
                success: "#00ff88",
                warning: "#ffa502",
                danger: "#ff4757",
                info: "#3742fa",
            },
            Theme::Color => StyleTokens {
                accent: "#a259ff",
                muted: "#7a7aff",
                success: "#39ff14",
                warning: "#ffe156",
                danger: "#ff00cc",
                info: "#00fff7",
            },
            Theme::Wuxia => StyleTokens {
                accent: "#00d4ff",
                muted: "#6680a3",
                success: "#00e6cc",
                warning: "#00d4ff",
                danger: "#ff4d6d",
                info: "#80d4ff",
            },
        }
    }
}

impl FromStr for Theme {
    type Err = ReqlabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReqlabError::Other(format!("Unknown theme: {}", s)))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colours derived from the active theme, as `#rrggbb` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub accent: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
    pub info: &'static str,
}

impl StyleTokens {
    /// Colour for a response status; 0 means the request never got a response.
    pub fn status_color(&self, status: u16) -> &'static str {
        match status {
            200..=299 => self.success,
            300..=399 => self.warning,
            400..=499 => self.info,
            0 => self.danger,
            s if s >= 500 => self.danger,
            _ => self.muted,
        }
    }
}

/// Parse `#rrggbb` into an RGB triple.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Persisted user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub theme: Theme,

    /// Whether completed requests are recorded to history.
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

fn default_auto_save() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            theme: Theme::default(),
            auto_save: default_auto_save(),
        }
    }
}

/// Application context passed explicitly to each view.
///
/// Every setter persists the full preference record before returning.
pub struct AppContext {
    store: SharedStore,
    preferences: Preferences,
    tokens: StyleTokens,
}

impl AppContext {
    /// Load preferences from the store, falling back to built-in defaults.
    pub fn load(store: SharedStore) -> Result<Self> {
        Self::load_with_defaults(store, Preferences::default())
    }

    /// Load preferences from the store; `defaults` applies when none were saved.
    pub fn load_with_defaults(store: SharedStore, defaults: Preferences) -> Result<Self> {
        let raw = store.get(StoreKey::Preferences)?;
        let preferences = match raw {
            Some(_) => json::decode_or_default::<Option<Preferences>>(
                StoreKey::Preferences,
                raw.as_deref(),
            )
            .unwrap_or(defaults),
            None => defaults,
        };
        debug!("Loaded preferences: {:?}", preferences);

        Ok(Self {
            store,
            tokens: preferences.theme.tokens(),
            preferences,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn language(&self) -> Language {
        self.preferences.language
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn auto_save(&self) -> bool {
        self.preferences.auto_save
    }

    pub fn tokens(&self) -> &StyleTokens {
        &self.tokens
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.preferences.language = language;
        self.persist()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.preferences.theme = theme;
        self.tokens = theme.tokens();
        self.persist()
    }

    pub fn set_auto_save(&mut self, auto_save: bool) -> Result<()> {
        self.preferences.auto_save = auto_save;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        json::save(self.store.as_ref(), StoreKey::Preferences, &self.preferences)
    }
}
