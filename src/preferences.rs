/// Process-wide UI preferences
///
/// One shared context for every view, initialised on first use with the
/// light theme and never torn down.

use serde::{Deserialize, Serialize};
use std::sync::{OnceLock, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Snapshot of the preference values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreferenceValues {
    pub theme: Theme,
}

#[derive(Debug, Default)]
pub struct Preferences {
    values: RwLock<PreferenceValues>,
}

static GLOBAL: OnceLock<Preferences> = OnceLock::new();

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared context.
    pub fn global() -> &'static Preferences {
        GLOBAL.get_or_init(Preferences::new)
    }

    pub fn snapshot(&self) -> PreferenceValues {
        // A poisoned lock still holds a valid Copy value
        *self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn theme(&self) -> Theme {
        self.snapshot().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.values.write().unwrap_or_else(|e| e.into_inner()).theme = theme;
    }

    /// Flip the theme, returning the new one.
    pub fn toggle_theme(&self) -> Theme {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.theme = values.theme.toggled();
        values.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        assert_eq!(Preferences::new().theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_and_set() {
        let prefs = Preferences::new();
        assert_eq!(prefs.toggle_theme(), Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.toggle_theme(), Theme::Light);
        prefs.set_theme(Theme::Dark);
        assert_eq!(prefs.snapshot(), PreferenceValues { theme: Theme::Dark });
    }

    #[test]
    fn test_global_is_shared() {
        let a = Preferences::global() as *const Preferences;
        let b = Preferences::global() as *const Preferences;
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&PreferenceValues { theme: Theme::Dark }).unwrap(), r#"{"theme":"dark"}"#);
    }
}
