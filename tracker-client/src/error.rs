use thiserror::Error;
use validator::ValidationErrors;

use crate::storage::StorageError;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `tracker-client`.
pub enum TrackerClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): соединение, таймаут, чтение тела.
    #[cfg(feature = "http")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Сетевая ошибка браузерного транспорта.
    #[error("network error: {0}")]
    Network(String),

    /// Форма не прошла валидацию; запрос на сервер не отправлялся.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Сессия отсутствует, истекла или токен отклонён сервером (401).
    #[error("unauthorized")]
    Unauthorized,

    /// Недостаточно прав для операции (403).
    #[error("forbidden")]
    Forbidden,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Сервер ответил ошибкой; сообщение взято из тела ответа.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение для пользователя.
        message: String,
    },

    /// Не удалось разобрать ответ сервера.
    #[error("decode error: {0}")]
    Decode(String),

    /// Не удалось прочитать или записать локальное хранилище сессии.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Результат операций `tracker-client`.
pub type TrackerClientResult<T> = Result<T, TrackerClientError>;

impl TrackerClientError {
    /// Сопоставляет HTTP-статус ошибки с вариантом перечисления.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            _ => Self::Server {
                status,
                message: message.unwrap_or_else(|| format!("http status {status}")),
            },
        }
    }

    /// Сообщение для показа рядом с действием, которое его вызвало.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expired, please log in again".to_string(),
            Self::Forbidden => "You need admin privileges for this action".to_string(),
            Self::NotFound => "Resource not found".to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Validation(errors) => crate::validation::field_messages(errors)
                .into_values()
                .next()
                .unwrap_or_else(|| "Form contains invalid values".to_string()),
            other => other.to_string(),
        }
    }

    /// Сообщение для формы входа или регистрации. Здесь 401 означает
    /// неверные учётные данные, а не истёкшую сессию.
    pub fn auth_failure_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthorized => "Invalid username or password".to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Forbidden | Self::NotFound => fallback.to_string(),
            other => other.user_message(),
        }
    }

    #[cfg(feature = "http")]
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), None);
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Http(err)
    }
}
