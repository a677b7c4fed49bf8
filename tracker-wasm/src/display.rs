//! Форматирование значений для разметки.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracker_client::{ProblemLevel, ProblemStatus, UserProgress};

pub(crate) fn format_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

pub(crate) fn status_class(status: ProblemStatus) -> &'static str {
    match status {
        ProblemStatus::Todo => "badge todo",
        ProblemStatus::Doing => "badge doing",
        ProblemStatus::Done => "badge done",
    }
}

pub(crate) fn level_class(level: ProblemLevel) -> &'static str {
    match level {
        ProblemLevel::Easy => "level easy",
        ProblemLevel::Medium => "level medium",
        ProblemLevel::Hard => "level hard",
    }
}

pub(crate) fn progress_style(progress: &UserProgress) -> String {
    format!("width: {}%", progress.completion_percent())
}

/// Сообщение под полем формы.
pub(crate) fn field_error(errors: &BTreeMap<String, String>, field: &str) -> String {
    errors.get(field).cloned().unwrap_or_default()
}
