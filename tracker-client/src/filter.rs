use crate::models::{Problem, ProblemLevel, ProblemStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Клиентский фильтр списка задач.
///
/// Пустое поле не ограничивает выборку; задача проходит фильтр, только если
/// удовлетворяет всем заданным условиям одновременно.
pub struct ProblemFilter {
    /// Точное совпадение статуса.
    pub status: Option<ProblemStatus>,
    /// Точное совпадение сложности.
    pub level: Option<ProblemLevel>,
    /// Подстрока названия без учёта регистра.
    pub search: Option<String>,
}

impl ProblemFilter {
    /// Фильтр без условий.
    pub fn all() -> Self {
        Self::default()
    }

    /// Ограничивает выборку статусом.
    pub fn with_status(mut self, status: ProblemStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Ограничивает выборку сложностью.
    pub fn with_level(mut self, level: ProblemLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Ограничивает выборку подстрокой названия.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then(|| search.trim().to_string());
        self
    }

    /// Собирает фильтр из значений выпадающих списков.
    ///
    /// `""` и `"all"` означают отсутствие условия; регистр не важен
    /// (`hard`, `HARD`, `Hard`). Неизвестное значение возвращает ошибку.
    pub fn from_options(status: &str, level: &str) -> Result<Self, crate::models::ParseEnumError> {
        Ok(Self {
            status: parse_option(status)?,
            level: parse_option(level)?,
            search: None,
        })
    }

    /// Проходит ли задача фильтр.
    pub fn matches(&self, problem: &Problem) -> bool {
        if let Some(status) = self.status {
            if problem.status != status {
                return false;
            }
        }
        if let Some(level) = self.level {
            if problem.level != level {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !problem.problem_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Задачи, прошедшие фильтр, в исходном порядке.
    pub fn apply<'a>(&self, problems: &'a [Problem]) -> Vec<&'a Problem> {
        problems.iter().filter(|p| self.matches(p)).collect()
    }

    /// Есть ли хотя бы одно условие.
    pub fn is_active(&self) -> bool {
        self.status.is_some() || self.level.is_some() || self.search.is_some()
    }
}

fn parse_option<T>(raw: &str) -> Result<Option<T>, T::Err>
where
    T: std::str::FromStr,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn problem(id: u128, name: &str, level: ProblemLevel, status: ProblemStatus) -> Problem {
        Problem {
            problem_id: Uuid::from_u128(id),
            problem_name: name.to_string(),
            link: format!("https://leetcode.com/problems/{id}/"),
            level,
            status,
            comment: None,
            time_posted: None,
            done_time: None,
        }
    }

    fn sample() -> Vec<Problem> {
        vec![
            problem(1, "Two Sum", ProblemLevel::Easy, ProblemStatus::Done),
            problem(2, "Median of Two Sorted Arrays", ProblemLevel::Hard, ProblemStatus::Done),
            problem(3, "Trapping Rain Water", ProblemLevel::Hard, ProblemStatus::Doing),
            problem(4, "N-Queens", ProblemLevel::Hard, ProblemStatus::Done),
            problem(5, "Valid Parentheses", ProblemLevel::Easy, ProblemStatus::Todo),
        ]
    }

    #[test]
    fn done_and_hard_requires_both_predicates() {
        let problems = sample();
        let filter = ProblemFilter::all()
            .with_status(ProblemStatus::Done)
            .with_level(ProblemLevel::Hard);

        let ids: Vec<u128> = filter
            .apply(&problems)
            .iter()
            .map(|p| p.problem_id.as_u128())
            .collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(
            filter
                .apply(&problems)
                .iter()
                .all(|p| p.status == ProblemStatus::Done && p.level == ProblemLevel::Hard)
        );
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let problems = sample();
        let filter = ProblemFilter::from_options("", "all").expect("valid options");
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&problems).len(), problems.len());
    }

    #[test]
    fn options_are_case_insensitive() {
        let filter = ProblemFilter::from_options("done", "hArD").expect("valid options");
        assert_eq!(filter.status, Some(ProblemStatus::Done));
        assert_eq!(filter.level, Some(ProblemLevel::Hard));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(ProblemFilter::from_options("finished", "").is_err());
    }

    #[test]
    fn search_matches_substring_ignoring_case() {
        let problems = sample();
        let filter = ProblemFilter::all().with_search("  two ");
        let names: Vec<&str> = filter
            .apply(&problems)
            .iter()
            .map(|p| p.problem_name.as_str())
            .collect();
        assert_eq!(names, vec!["Two Sum", "Median of Two Sorted Arrays"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = ProblemFilter::all().with_search("   ");
        assert!(filter.search.is_none());
    }
}
