use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Тема оформления.
pub enum Theme {
    /// Светлая.
    #[default]
    Light,
    /// Тёмная.
    Dark,
    /// Как в системе.
    System,
}

impl Theme {
    /// Итоговая тёмность с учётом системной настройки.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }

    /// Тема после переключения: явная противоположность текущему виду.
    pub fn toggled(self, system_prefers_dark: bool) -> Self {
        if self.is_dark(system_prefers_dark) {
            Self::Light
        } else {
            Self::Dark
        }
    }

    /// Читает сохранённую тему. Отсутствующее или битое значение даёт `Light`.
    pub fn load(storage: &dyn Storage) -> Result<Self, StorageError> {
        let theme = storage
            .get(THEME_KEY)?
            .and_then(|raw| serde_json::from_str::<Theme>(&raw).ok())
            .unwrap_or_default();
        Ok(theme)
    }

    /// Сохраняет тему.
    pub fn save(self, storage: &dyn Storage) -> Result<(), StorageError> {
        storage.set(THEME_KEY, &serde_json::to_string(&self)?)
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::models::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_ascii_lowercase()))
            .map_err(|_| crate::models::ParseEnumError::new("theme", s))
    }
}
