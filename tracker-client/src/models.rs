use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Сложность задачи.
pub enum ProblemLevel {
    /// Лёгкая.
    #[default]
    Easy,
    /// Средняя.
    Medium,
    /// Сложная.
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Статус решения задачи.
pub enum ProblemStatus {
    /// Ещё не начата.
    #[default]
    Todo,
    /// В процессе.
    Doing,
    /// Решена.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Роль пользователя.
pub enum Role {
    /// Обычный пользователь.
    #[default]
    User,
    /// Администратор.
    Admin,
}

impl ProblemLevel {
    /// Все уровни в порядке возрастания сложности.
    pub const ALL: [ProblemLevel; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Значение в формате API (`EASY`, `MEDIUM`, `HARD`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    /// Подпись для интерфейса.
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl ProblemStatus {
    /// Все статусы в порядке жизненного цикла.
    pub const ALL: [ProblemStatus; 3] = [Self::Todo, Self::Doing, Self::Done];

    /// Значение в формате API (`TODO`, `DOING`, `DONE`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Doing => "DOING",
            Self::Done => "DONE",
        }
    }

    /// Подпись для интерфейса.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::Doing => "In Progress",
            Self::Done => "Completed",
        }
    }
}

impl Role {
    /// Роли, доступные при регистрации.
    pub const ALL: [Role; 2] = [Self::User, Self::Admin];

    /// Значение в формате API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Подпись для интерфейса.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Строка не соответствует ни одному значению перечисления.
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for ProblemLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            _ => Err(ParseEnumError::new("level", s)),
        }
    }
}

impl FromStr for ProblemStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TODO" => Ok(Self::Todo),
            "DOING" => Ok(Self::Doing),
            "DONE" => Ok(Self::Done),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

impl fmt::Display for ProblemLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub user_id: Uuid,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Роль.
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Является ли пользователь администратором.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Запись о задаче.
pub struct Problem {
    /// Идентификатор задачи.
    pub problem_id: Uuid,
    /// Название.
    pub problem_name: String,
    /// Ссылка на условие.
    pub link: String,
    /// Сложность.
    pub level: ProblemLevel,
    /// Статус.
    pub status: ProblemStatus,
    /// Комментарий пользователя.
    #[serde(default)]
    pub comment: Option<String>,
    /// Когда задача была добавлена.
    #[serde(default, with = "timestamp::option")]
    pub time_posted: Option<DateTime<Utc>>,
    /// Когда задача была решена. Выставляется сервером при переходе в `DONE`.
    #[serde(default, with = "timestamp::option")]
    pub done_time: Option<DateTime<Utc>>,
}

impl Problem {
    /// Черновик с текущими значениями полей, например для смены статуса.
    pub fn to_draft(&self) -> ProblemDraft {
        ProblemDraft {
            problem_name: self.problem_name.clone(),
            link: self.link.clone(),
            level: self.level,
            status: self.status,
            comment: self.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Тело запроса на создание или обновление задачи.
///
/// Получается из [`crate::ProblemForm`] после успешной валидации.
pub struct ProblemDraft {
    /// Название.
    pub problem_name: String,
    /// Ссылка на условие.
    pub link: String,
    /// Сложность.
    pub level: ProblemLevel,
    /// Статус.
    pub status: ProblemStatus,
    /// Комментарий; пустой не отправляется.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ после успешного входа.
pub struct AuthResponse {
    /// Bearer-токен.
    pub token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ после регистрации. Бэкенд может не выдать токен сразу.
pub struct SignupResponse {
    /// Bearer-токен, если сервер выдал его при регистрации.
    #[serde(default)]
    pub token: Option<String>,
    /// Зарегистрированный пользователь.
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Количество задач по статусам.
pub struct StatusCounts {
    /// `TODO`.
    #[serde(alias = "TODO")]
    pub todo: u64,
    /// `DOING`.
    #[serde(alias = "DOING")]
    pub doing: u64,
    /// `DONE`.
    #[serde(alias = "DONE")]
    pub done: u64,
}

impl StatusCounts {
    /// Количество задач с указанным статусом.
    pub fn get(&self, status: ProblemStatus) -> u64 {
        match status {
            ProblemStatus::Todo => self.todo,
            ProblemStatus::Doing => self.doing,
            ProblemStatus::Done => self.done,
        }
    }

    /// Сумма по всем статусам.
    pub fn total(&self) -> u64 {
        self.todo + self.doing + self.done
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Количество задач по уровням сложности.
pub struct LevelCounts {
    /// `EASY`.
    #[serde(alias = "EASY")]
    pub easy: u64,
    /// `MEDIUM`.
    #[serde(alias = "MEDIUM")]
    pub medium: u64,
    /// `HARD`.
    #[serde(alias = "HARD")]
    pub hard: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Сводная статистика для администратора. Отсутствующие счётчики равны нулю.
pub struct AdminStats {
    /// Число пользователей с ролью `USER`.
    pub total_users: u64,
    /// Число задач во всей системе.
    pub total_problems: u64,
    /// Разбивка по статусам.
    #[serde(alias = "problemsByStatus")]
    pub problem_stats: StatusCounts,
    /// Разбивка по сложности, если сервер её отдаёт.
    #[serde(alias = "problemsByLevel")]
    pub problem_levels: Option<LevelCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Прогресс пользователя в админском списке.
pub struct UserProgress {
    /// Всего задач.
    pub total: u64,
    /// `TODO`.
    pub todo: u64,
    /// `DOING`.
    pub doing: u64,
    /// `DONE`.
    pub done: u64,
}

impl UserProgress {
    /// Доля решённых задач в процентах, округлённая до целого.
    pub fn completion_percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.done * 100 + self.total / 2) / self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Строка админского списка пользователей.
pub struct UserSummary {
    /// Идентификатор пользователя.
    pub user_id: Uuid,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Роль.
    #[serde(default)]
    pub role: Role,
    /// Прогресс по задачам.
    #[serde(default)]
    pub progress: UserProgress,
}

/// Время в ответах сервера приходит либо миллисекундами от эпохи, либо
/// строкой RFC 3339. Отдаём всегда RFC 3339.
pub(crate) mod timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    fn convert<E: serde::de::Error>(raw: RawTimestamp) -> Result<DateTime<Utc>, E> {
        match raw {
            RawTimestamp::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|err| E::custom(format!("invalid timestamp '{text}': {err}"))),
        }
    }

    pub(crate) mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        use super::{RawTimestamp, convert};

        pub(crate) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<RawTimestamp>::deserialize(deserializer)?
                .map(convert)
                .transpose()
        }
    }
}
