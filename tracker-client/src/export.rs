use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::models::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Формат выгрузки, который рендерит сервер.
pub enum ExportFormat {
    /// PDF-отчёт.
    Pdf,
    /// Таблица Excel.
    Excel,
}

impl ExportFormat {
    /// Сегмент пути в URL выгрузки.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "excel",
        }
    }

    /// Расширение файла.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }

    /// MIME-тип на случай, если сервер его не прислал.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Имя файла выгрузки своих задач.
    pub fn problems_file_name(self) -> String {
        format!("problems.{}", self.extension())
    }

    /// Имя файла выгрузки данных пользователя администратором.
    pub fn user_file_name(self, user_id: Uuid) -> String {
        format!("user-{user_id}-data.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(ParseEnumError::new("export format", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Файл, полученный от сервера.
pub struct ExportFile {
    /// Имя для сохранения.
    pub file_name: String,
    /// MIME-тип.
    pub content_type: String,
    /// Содержимое.
    pub bytes: Vec<u8>,
}

/// Достаёт имя файла из `Content-Disposition: attachment; filename=...`.
pub fn file_name_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            let value = value.trim().trim_matches('"');
            // Путь от сервера не принимаем, только имя.
            let value = value.rsplit(['/', '\\']).next().unwrap_or(value);
            (!value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_map_to_paths_and_extensions() {
        assert_eq!(ExportFormat::Excel.path_segment(), "excel");
        assert_eq!(ExportFormat::Excel.problems_file_name(), "problems.xlsx");
        assert_eq!(
            ExportFormat::Pdf.user_file_name(Uuid::from_u128(1)),
            "user-00000000-0000-0000-0000-000000000001-data.pdf"
        );
        assert_eq!("XLSX".parse::<ExportFormat>(), Ok(ExportFormat::Excel));
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn disposition_parsing_handles_quotes_and_paths() {
        assert_eq!(
            file_name_from_disposition("attachment; filename=problems.xlsx").as_deref(),
            Some("problems.xlsx")
        );
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="../../etc/report.pdf""#).as_deref(),
            Some("report.pdf")
        );
        assert!(file_name_from_disposition("inline").is_none());
        assert!(file_name_from_disposition(r#"attachment; filename="""#).is_none());
    }
}
