//! Локальное хранилище сессии и настроек.
//!
//! Значения хранятся строками с JSON внутри под фиксированными ключами,
//! так же как их раскладывает браузерный клиент в `localStorage`.
//! CLI держит те же ключи в одном JSON-файле.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::models::User;

/// Ключ bearer-токена.
pub const TOKEN_KEY: &str = "auth_token";
/// Ключ закэшированного профиля пользователя.
pub const USER_KEY: &str = "user_data";
/// Ключ выбранной темы оформления.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
/// Ошибки локального хранилища.
pub enum StorageError {
    /// Хранилище недоступно (нет `window`, запрещён `localStorage` и т.п.).
    #[error("storage is not available: {0}")]
    Unavailable(String),

    /// Ошибка файловой системы.
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    /// Содержимое хранилища не удалось сериализовать или разобрать.
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Строковое key-value хранилище с семантикой `localStorage`.
pub trait Storage: Send + Sync {
    /// Возвращает значение по ключу, если оно есть.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Записывает значение.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Удаляет ключ. Отсутствие ключа не ошибка.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
/// Хранилище в памяти процесса. Используется в тестах и как запасной вариант.
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // Отравленный мьютекс не портит данные: каждая операция атомарна.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Хранилище в JSON-файле: объект `{ "ключ": "значение" }`.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Хранилище поверх файла `path`. Файл создаётся при первой записи.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Путь к файлу.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Битый файл читается как пустой: следующая запись его перезапишет.
    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable storage file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Разбирает сохранённый токен.
///
/// Браузерный клиент кладёт токен JSON-строкой (`"abc"`), старые версии
/// писали его как есть, поэтому принимаются оба варианта.
pub fn parse_token(raw: &str) -> Option<String> {
    let token = serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string());
    let token = token.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Разбирает сохранённый профиль; битый JSON считается отсутствующим.
pub fn parse_user(raw: &str) -> Option<User> {
    serde_json::from_str::<User>(raw).ok()
}

/// Читает токен и профиль. Сессия восстанавливается только если есть оба.
pub fn load_session(storage: &dyn Storage) -> Result<Option<(String, User)>, StorageError> {
    let token = storage.get(TOKEN_KEY)?.as_deref().and_then(parse_token);
    let user = storage.get(USER_KEY)?.as_deref().and_then(parse_user);

    Ok(token.zip(user))
}

/// Сохраняет токен и профиль.
pub fn save_session(storage: &dyn Storage, token: &str, user: &User) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, &serde_json::to_string(token)?)?;
    save_user(storage, user)
}

/// Обновляет только закэшированный профиль.
pub fn save_user(storage: &dyn Storage, user: &User) -> Result<(), StorageError> {
    storage.set(USER_KEY, &serde_json::to_string(user)?)
}

/// Удаляет токен и профиль.
pub fn clear_session(storage: &dyn Storage) -> Result<(), StorageError> {
    storage.remove(TOKEN_KEY)?;
    storage.remove(USER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            user_id: Uuid::from_u128(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("tracker-client-{}-{name}.json", std::process::id()));
        path
    }

    #[test]
    fn parse_token_accepts_json_string_and_raw_value() {
        assert_eq!(parse_token(r#""abc.def.ghi""#).as_deref(), Some("abc.def.ghi"));
        assert_eq!(parse_token("  abc.def.ghi  ").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_rejects_blank() {
        assert!(parse_token("   ").is_none());
        assert!(parse_token(r#""  ""#).is_none());
    }

    #[test]
    fn parse_user_returns_none_for_invalid_json() {
        assert!(parse_user("{not-json}").is_none());
    }

    #[test]
    fn session_requires_both_token_and_user() {
        let storage = MemoryStorage::new();
        storage
            .set(TOKEN_KEY, r#""token""#)
            .expect("memory storage never fails");
        assert!(load_session(&storage).expect("load").is_none());

        save_user(&storage, &sample_user()).expect("save user");
        let (token, user) = load_session(&storage).expect("load").expect("session");
        assert_eq!(token, "token");
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn clear_session_removes_both_keys_and_keeps_theme() {
        let storage = MemoryStorage::new();
        save_session(&storage, "token", &sample_user()).expect("save");
        storage.set(THEME_KEY, r#""dark""#).expect("set theme");

        clear_session(&storage).expect("clear");
        assert!(storage.get(TOKEN_KEY).expect("get").is_none());
        assert!(storage.get(USER_KEY).expect("get").is_none());
        assert!(storage.get(THEME_KEY).expect("get").is_some());
    }

    #[test]
    fn file_storage_round_trips_session_and_removes_empty_file() {
        let path = temp_path("session");
        let _ = fs::remove_file(&path);
        let storage = FileStorage::new(&path);

        save_session(&storage, "file-token", &sample_user()).expect("save");
        assert!(path.exists());

        let reopened = FileStorage::new(&path);
        let (token, user) = load_session(&reopened).expect("load").expect("session");
        assert_eq!(token, "file-token");
        assert_eq!(user.user_id, Uuid::from_u128(1));

        clear_session(&reopened).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn file_storage_treats_corrupt_file_as_empty_and_overwrites_it() {
        let path = temp_path("corrupt");
        fs::write(&path, "{truncated").expect("write fixture");

        let storage = FileStorage::new(&path);
        assert!(storage.get(TOKEN_KEY).expect("corrupt file reads as empty").is_none());
        assert!(load_session(&storage).expect("load").is_none());

        save_session(&storage, "fresh", &sample_user()).expect("save over corrupt file");
        let (token, _) = load_session(&storage).expect("load").expect("session");
        assert_eq!(token, "fresh");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn clear_session_succeeds_on_corrupt_file() {
        let path = temp_path("corrupt-clear");
        fs::write(&path, "not json").expect("write fixture");

        let storage = FileStorage::new(&path);
        clear_session(&storage).expect("clear must not fail");

        let _ = fs::remove_file(&path);
    }
}
