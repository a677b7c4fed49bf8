//! Хранилище списка задач на клиенте.
//!
//! Список меняется только ответами сервера: загрузка заменяет его целиком,
//! создание добавляет в конец, обновление заменяет запись с тем же
//! идентификатором, удаление убирает ровно одну запись. Пока ответа нет,
//! список не трогается.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{TrackerClientError, TrackerClientResult};
use crate::models::{Problem, ProblemDraft, ProblemStatus, StatusCounts};
use crate::validation::ProblemForm;

/// Операции API, которыми пользуется хранилище задач.
#[async_trait]
pub trait ProblemApi: Send {
    /// Все задачи пользователя.
    async fn fetch_problems(&mut self) -> TrackerClientResult<Vec<Problem>>;
    /// Создание задачи; возвращает запись с идентификатором сервера.
    async fn create_problem(&mut self, draft: &ProblemDraft) -> TrackerClientResult<Problem>;
    /// Обновление задачи; возвращает сохранённую запись.
    async fn update_problem(&mut self, id: Uuid, draft: &ProblemDraft) -> TrackerClientResult<Problem>;
    /// Удаление задачи.
    async fn delete_problem(&mut self, id: Uuid) -> TrackerClientResult<()>;
}

#[cfg(feature = "http")]
#[async_trait]
impl ProblemApi for crate::client::TrackerClient {
    async fn fetch_problems(&mut self) -> TrackerClientResult<Vec<Problem>> {
        self.list_problems().await
    }

    async fn create_problem(&mut self, draft: &ProblemDraft) -> TrackerClientResult<Problem> {
        crate::client::TrackerClient::create_problem(self, draft).await
    }

    async fn update_problem(&mut self, id: Uuid, draft: &ProblemDraft) -> TrackerClientResult<Problem> {
        crate::client::TrackerClient::update_problem(self, id, draft).await
    }

    async fn delete_problem(&mut self, id: Uuid) -> TrackerClientResult<()> {
        crate::client::TrackerClient::delete_problem(self, id).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Состояние загрузки.
pub enum LoadStatus {
    /// Запросов в работе нет.
    #[default]
    Idle,
    /// Идёт запрос.
    Loading,
    /// Последний запрос завершился ошибкой.
    Error(String),
}

#[derive(Debug, Clone, Default)]
/// Список задач и статус последнего запроса.
pub struct ProblemStore {
    problems: Vec<Problem>,
    status: LoadStatus,
}

impl ProblemStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущий список.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Статус последнего запроса.
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Сообщение последней ошибки.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Задача по идентификатору.
    pub fn get(&self, id: Uuid) -> Option<&Problem> {
        self.problems.iter().find(|p| p.problem_id == id)
    }

    /// Количество задач по статусам для сводки над доской.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for problem in &self.problems {
            match problem.status {
                ProblemStatus::Todo => counts.todo += 1,
                ProblemStatus::Doing => counts.doing += 1,
                ProblemStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Отмечает начало запроса.
    pub fn begin(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Фиксирует ошибку; список остаётся прежним.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = LoadStatus::Error(message.into());
    }

    /// Заменяет список ответом сервера.
    pub fn apply_loaded(&mut self, problems: Vec<Problem>) {
        self.problems = problems;
        self.status = LoadStatus::Idle;
    }

    /// Добавляет созданную сервером задачу в конец.
    pub fn apply_created(&mut self, problem: Problem) {
        self.problems.push(problem);
        self.status = LoadStatus::Idle;
    }

    /// Заменяет задачу с тем же идентификатором. Неизвестная запись
    /// игнорируется.
    pub fn apply_updated(&mut self, problem: Problem) {
        if let Some(slot) = self
            .problems
            .iter_mut()
            .find(|p| p.problem_id == problem.problem_id)
        {
            *slot = problem;
        }
        self.status = LoadStatus::Idle;
    }

    /// Убирает задачу с указанным идентификатором.
    pub fn apply_deleted(&mut self, id: Uuid) {
        self.problems.retain(|p| p.problem_id != id);
        self.status = LoadStatus::Idle;
    }

    fn settle<T>(&mut self, result: TrackerClientResult<T>) -> TrackerClientResult<T> {
        if let Err(err) = &result {
            self.fail(err.user_message());
        }
        result
    }

    /// Загружает список с сервера.
    pub async fn load_all<A: ProblemApi + ?Sized>(&mut self, api: &mut A) -> TrackerClientResult<()> {
        self.begin();
        let problems = self.settle(api.fetch_problems().await)?;
        self.apply_loaded(problems);
        Ok(())
    }

    /// Проверяет форму и создаёт задачу. Невалидная форма не уходит на сервер
    /// и не меняет статус хранилища.
    pub async fn create<A: ProblemApi + ?Sized>(
        &mut self,
        api: &mut A,
        form: &ProblemForm,
    ) -> TrackerClientResult<Problem> {
        let draft = form.submit()?;

        self.begin();
        let created = self.settle(api.create_problem(&draft).await)?;
        self.apply_created(created.clone());
        Ok(created)
    }

    /// Проверяет форму и обновляет задачу.
    pub async fn update<A: ProblemApi + ?Sized>(
        &mut self,
        api: &mut A,
        id: Uuid,
        form: &ProblemForm,
    ) -> TrackerClientResult<Problem> {
        let draft = form.submit()?;

        self.begin();
        let updated = self.settle(api.update_problem(id, &draft).await)?;
        self.apply_updated(updated.clone());
        Ok(updated)
    }

    /// Черновик для смены статуса: запись целиком с новым статусом.
    pub fn status_draft(&self, id: Uuid, status: ProblemStatus) -> TrackerClientResult<ProblemDraft> {
        let current = self.get(id).ok_or(TrackerClientError::NotFound)?;
        let mut draft = current.to_draft();
        draft.status = status;
        Ok(draft)
    }

    /// Меняет статус задачи, отправляя запись целиком с новым статусом.
    /// Время решения выставляет сервер.
    pub async fn set_status<A: ProblemApi + ?Sized>(
        &mut self,
        api: &mut A,
        id: Uuid,
        status: ProblemStatus,
    ) -> TrackerClientResult<Problem> {
        let draft = self.status_draft(id, status)?;

        self.begin();
        let updated = self.settle(api.update_problem(id, &draft).await)?;
        self.apply_updated(updated.clone());
        Ok(updated)
    }

    /// Удаляет задачу.
    pub async fn delete<A: ProblemApi + ?Sized>(&mut self, api: &mut A, id: Uuid) -> TrackerClientResult<()> {
        self.begin();
        self.settle(api.delete_problem(id).await)?;
        self.apply_deleted(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProblemLevel;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeApi {
        list_result: Arc<Mutex<Vec<Problem>>>,
        next_id: Arc<Mutex<u128>>,
        calls: Arc<Mutex<Vec<String>>>,
        fail_with_status: Arc<Mutex<Option<u16>>>,
    }

    impl FakeApi {
        fn record(&self, call: impl Into<String>) -> TrackerClientResult<()> {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push(call.into());
            match *self
                .fail_with_status
                .lock()
                .expect("fail mutex poisoned")
            {
                Some(status) => Err(TrackerClientError::from_status(
                    status,
                    Some("backend unavailable".to_string()),
                )),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls mutex poisoned").clone()
        }

        /// Как сервер: DONE ставит время завершения, другие статусы его не трогают.
        fn materialize(id: Uuid, draft: &ProblemDraft, previous: Option<&Problem>) -> Problem {
            let done_time = if draft.status == ProblemStatus::Done {
                Utc.timestamp_opt(2_000, 0).single()
            } else {
                previous.and_then(|p| p.done_time)
            };
            Problem {
                problem_id: id,
                problem_name: draft.problem_name.clone(),
                link: draft.link.clone(),
                level: draft.level,
                status: draft.status,
                comment: draft.comment.clone(),
                time_posted: Utc.timestamp_opt(1_000, 0).single(),
                done_time,
            }
        }
    }

    #[async_trait]
    impl ProblemApi for FakeApi {
        async fn fetch_problems(&mut self) -> TrackerClientResult<Vec<Problem>> {
            self.record("fetch")?;
            Ok(self.list_result.lock().expect("list mutex poisoned").clone())
        }

        async fn create_problem(&mut self, draft: &ProblemDraft) -> TrackerClientResult<Problem> {
            self.record("create")?;
            let mut next = self.next_id.lock().expect("id mutex poisoned");
            *next += 1;
            Ok(Self::materialize(Uuid::from_u128(*next), draft, None))
        }

        async fn update_problem(&mut self, id: Uuid, draft: &ProblemDraft) -> TrackerClientResult<Problem> {
            self.record(format!("update {}", draft.status))?;
            let list = self.list_result.lock().expect("list mutex poisoned");
            let previous = list.iter().find(|p| p.problem_id == id);
            Ok(Self::materialize(id, draft, previous))
        }

        async fn delete_problem(&mut self, id: Uuid) -> TrackerClientResult<()> {
            self.record(format!("delete {}", id.as_u128()))
        }
    }

    fn sample_problem(id: u128, status: ProblemStatus) -> Problem {
        Problem {
            problem_id: Uuid::from_u128(id),
            problem_name: format!("problem {id}"),
            link: format!("https://leetcode.com/problems/p{id}/"),
            level: ProblemLevel::Medium,
            status,
            comment: None,
            time_posted: Utc.timestamp_opt(500, 0).single(),
            done_time: None,
        }
    }

    fn valid_form() -> ProblemForm {
        ProblemForm {
            problem_name: "Two Sum".to_string(),
            link: "https://leetcode.com/problems/two-sum/".to_string(),
            level: ProblemLevel::Easy,
            status: ProblemStatus::Todo,
            comment: String::new(),
        }
    }

    async fn loaded_store(api: &mut FakeApi, problems: Vec<Problem>) -> ProblemStore {
        *api.list_result.lock().expect("list mutex poisoned") = problems;
        let mut store = ProblemStore::new();
        store.load_all(api).await.expect("load must succeed");
        store
    }

    #[tokio::test]
    async fn load_all_replaces_list() {
        let mut api = FakeApi::default();
        let mut store = loaded_store(&mut api, vec![sample_problem(1, ProblemStatus::Todo)]).await;
        assert_eq!(store.problems().len(), 1);

        *api.list_result.lock().expect("list mutex poisoned") = vec![
            sample_problem(2, ProblemStatus::Done),
            sample_problem(3, ProblemStatus::Doing),
        ];
        store.load_all(&mut api).await.expect("reload must succeed");

        let ids: Vec<u128> = store.problems().iter().map(|p| p.problem_id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.status(), &LoadStatus::Idle);
    }

    #[tokio::test]
    async fn create_appends_exactly_one_record_with_server_id() {
        let mut api = FakeApi::default();
        *api.next_id.lock().expect("id mutex poisoned") = 41;
        let mut store = loaded_store(&mut api, vec![sample_problem(1, ProblemStatus::Todo)]).await;

        let created = store
            .create(&mut api, &valid_form())
            .await
            .expect("create must succeed");

        assert_eq!(created.problem_id, Uuid::from_u128(42));
        assert_eq!(store.problems().len(), 2);
        assert_eq!(store.problems()[1].problem_id, Uuid::from_u128(42));
        assert_eq!(store.problems()[0].problem_id, Uuid::from_u128(1));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_api() {
        let mut api = FakeApi::default();
        let mut store = ProblemStore::new();
        let mut form = valid_form();
        form.link = "not a url".to_string();

        let err = store
            .create(&mut api, &form)
            .await
            .expect_err("invalid form must fail");

        assert!(matches!(err, TrackerClientError::Validation(_)));
        assert!(api.calls().is_empty());
        assert!(store.problems().is_empty());
        assert_eq!(store.status(), &LoadStatus::Idle);
    }

    #[tokio::test]
    async fn delete_removes_only_matching_record() {
        let mut api = FakeApi::default();
        let mut store = loaded_store(
            &mut api,
            vec![
                sample_problem(1, ProblemStatus::Todo),
                sample_problem(2, ProblemStatus::Doing),
                sample_problem(3, ProblemStatus::Done),
            ],
        )
        .await;

        store
            .delete(&mut api, Uuid::from_u128(2))
            .await
            .expect("delete must succeed");

        let ids: Vec<u128> = store.problems().iter().map(|p| p.problem_id.as_u128()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn set_status_done_applies_server_completion_time() {
        let mut api = FakeApi::default();
        let mut store = loaded_store(&mut api, vec![sample_problem(1, ProblemStatus::Doing)]).await;

        let updated = store
            .set_status(&mut api, Uuid::from_u128(1), ProblemStatus::Done)
            .await
            .expect("status change must succeed");

        assert_eq!(updated.status, ProblemStatus::Done);
        assert!(updated.done_time.is_some());
        assert_eq!(store.get(Uuid::from_u128(1)), Some(&updated));
        assert_eq!(api.calls().last().map(String::as_str), Some("update DONE"));
    }

    #[tokio::test]
    async fn leaving_done_keeps_server_completion_time() {
        let finished_at = Utc.timestamp_opt(1_500, 0).single();
        let mut solved = sample_problem(1, ProblemStatus::Done);
        solved.done_time = finished_at;
        let mut api = FakeApi::default();
        let mut store = loaded_store(&mut api, vec![solved]).await;

        let updated = store
            .set_status(&mut api, Uuid::from_u128(1), ProblemStatus::Doing)
            .await
            .expect("status change must succeed");

        assert_eq!(updated.status, ProblemStatus::Doing);
        assert_eq!(updated.done_time, finished_at);
        assert_eq!(
            store.get(Uuid::from_u128(1)).and_then(|p| p.done_time),
            finished_at
        );
        assert_eq!(api.calls().last().map(String::as_str), Some("update DOING"));
    }

    #[tokio::test]
    async fn set_status_on_unknown_record_is_not_found() {
        let mut api = FakeApi::default();
        let mut store = ProblemStore::new();

        let err = store
            .set_status(&mut api, Uuid::from_u128(9), ProblemStatus::Done)
            .await
            .expect_err("unknown record");
        assert!(matches!(err, TrackerClientError::NotFound));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_list_and_records_message() {
        let mut api = FakeApi::default();
        let mut store = loaded_store(&mut api, vec![sample_problem(1, ProblemStatus::Todo)]).await;
        *api.fail_with_status.lock().expect("fail mutex poisoned") = Some(500);

        let err = store
            .delete(&mut api, Uuid::from_u128(1))
            .await
            .expect_err("delete must fail");

        assert!(matches!(err, TrackerClientError::Server { status: 500, .. }));
        assert_eq!(store.problems().len(), 1);
        assert_eq!(store.error(), Some("backend unavailable"));
    }

    #[test]
    fn status_draft_keeps_record_fields() {
        let mut store = ProblemStore::new();
        let mut problem = sample_problem(1, ProblemStatus::Todo);
        problem.comment = Some("two pointers".to_string());
        store.apply_loaded(vec![problem]);

        let draft = store
            .status_draft(Uuid::from_u128(1), ProblemStatus::Doing)
            .expect("record exists");
        assert_eq!(draft.status, ProblemStatus::Doing);
        assert_eq!(draft.problem_name, "problem 1");
        assert_eq!(draft.comment.as_deref(), Some("two pointers"));

        assert!(matches!(
            store.status_draft(Uuid::from_u128(2), ProblemStatus::Done),
            Err(TrackerClientError::NotFound)
        ));
    }

    #[test]
    fn update_of_unknown_record_is_ignored() {
        let mut store = ProblemStore::new();
        store.apply_loaded(vec![sample_problem(1, ProblemStatus::Todo)]);
        store.apply_updated(sample_problem(2, ProblemStatus::Done));

        assert_eq!(store.problems().len(), 1);
        assert_eq!(store.problems()[0].status, ProblemStatus::Todo);
    }

    #[test]
    fn counts_group_by_status() {
        let mut store = ProblemStore::new();
        store.apply_loaded(vec![
            sample_problem(1, ProblemStatus::Todo),
            sample_problem(2, ProblemStatus::Done),
            sample_problem(3, ProblemStatus::Done),
        ]);

        let counts = store.counts();
        assert_eq!(counts.todo, 1);
        assert_eq!(counts.doing, 0);
        assert_eq!(counts.done, 2);
        assert_eq!(counts.total(), 3);
    }
}
