//! Клиентская библиотека трекера решённых задач.
//!
//! Содержит всё, что не зависит от конкретного фронтенда:
//! - модели API и их JSON-представление;
//! - проверку форм до отправки на сервер;
//! - хранение сессии и темы;
//! - фильтрацию и клиентский список задач;
//! - HTTP-клиент с сессией (`reqwest`, фича `http`).
//!
//! Браузерная сборка отключает фичу `http` и ходит в API через `gloo-net`,
//! переиспользуя остальные модули.
#![warn(missing_docs)]

#[cfg(feature = "http")]
mod client;
mod error;
mod export;
mod filter;
#[cfg(feature = "http")]
mod http_client;
mod models;
mod session;
pub mod storage;
mod store;
mod theme;
pub mod validation;

#[cfg(feature = "http")]
pub use client::{TrackerClient, UnauthorizedHook};
pub use error::{TrackerClientError, TrackerClientResult};
pub use export::{ExportFile, ExportFormat, file_name_from_disposition};
pub use filter::ProblemFilter;
#[cfg(feature = "http")]
pub use http_client::ClientConfig;
pub use models::{
    AdminStats, AuthResponse, LevelCounts, ParseEnumError, Problem, ProblemDraft, ProblemLevel,
    ProblemStatus, Role, SignupResponse, StatusCounts, User, UserProgress, UserSummary,
};
pub use session::{AuthState, Session};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{LoadStatus, ProblemApi, ProblemStore};
pub use theme::Theme;
pub use validation::{LoginForm, ProblemForm, ProfileForm, SignupForm};
