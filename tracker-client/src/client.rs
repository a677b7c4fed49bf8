use std::fmt;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{TrackerClientError, TrackerClientResult};
use crate::export::{ExportFile, ExportFormat};
use crate::http_client::{ClientConfig, HttpClient};
use crate::models::{AdminStats, Problem, ProblemDraft, User, UserSummary};
use crate::session::{AuthState, Session};
use crate::storage::{self, Storage};
use crate::validation::{Credentials, LoginForm, ProfileForm, SignupForm};

/// Обработчик истёкшей сессии: фронтенд переводит пользователя на вход.
pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Клиент трекера с сессией.
///
/// Держит состояние авторизации, прикладывает bearer-токен ко всем запросам,
/// сохраняет сессию в [`Storage`] и очищает её, когда сервер отвечает 401.
pub struct TrackerClient {
    http: HttpClient,
    storage: Box<dyn Storage>,
    auth: AuthState,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for TrackerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerClient")
            .field("http", &self.http)
            .field("auth", &self.auth)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

impl TrackerClient {
    /// Создаёт клиент и восстанавливает сессию из хранилища.
    pub fn new(config: &ClientConfig, storage: Box<dyn Storage>) -> TrackerClientResult<Self> {
        let mut client = Self {
            http: HttpClient::new(config)?,
            storage,
            auth: AuthState::Anonymous,
            on_unauthorized: None,
        };
        client.restore_session();
        Ok(client)
    }

    /// Устанавливает обработчик истёкшей сессии.
    ///
    /// Вызывается ровно один раз на каждый запрос, отклонённый с 401,
    /// после того как локальная сессия уже очищена.
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Box::new(hook));
        self
    }

    /// Перечитывает сессию из хранилища. Нужны и токен, и профиль;
    /// нечитаемые записи считаются отсутствующими.
    pub fn restore_session(&mut self) {
        self.auth = match storage::load_session(self.storage.as_ref()) {
            Ok(Some((token, user))) => AuthState::Authenticated(Session { token, user }),
            Ok(None) => AuthState::Anonymous,
            Err(err) => {
                warn!(error = %err, "failed to read stored session");
                AuthState::Anonymous
            }
        };
    }

    /// Текущее состояние авторизации.
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Текущий пользователь, если есть сессия.
    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    /// Хранилище, в котором живёт сессия (и, например, тема).
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Сбрасывает ошибку последней попытки входа.
    pub fn clear_error(&mut self) {
        self.auth.clear_error();
    }

    /// Выполняет вход.
    ///
    /// Невалидная форма возвращает ошибку без обращения к серверу.
    pub async fn login(&mut self, form: &LoginForm) -> TrackerClientResult<Session> {
        let credentials = form.submit()?;

        self.auth = AuthState::Loading;
        let result = self.login_with(&credentials).await;
        self.finish_auth(result, "Login failed")
    }

    /// Регистрирует пользователя и оставляет его авторизованным.
    ///
    /// Если сервер после регистрации не выдал токен, выполняется вход с теми
    /// же учётными данными.
    pub async fn register(&mut self, form: &SignupForm) -> TrackerClientResult<Session> {
        let request = form.submit()?;

        self.auth = AuthState::Loading;
        let result = match self.http.signup(&request).await {
            Ok(response) => match response.into_session() {
                Some(session) => Ok(session),
                None => self.login_with(&request.credentials()).await,
            },
            Err(err) => Err(err),
        };
        self.finish_auth(result, "Registration failed")
    }

    async fn login_with(&self, credentials: &Credentials) -> TrackerClientResult<Session> {
        let response = self.http.login(credentials).await?;
        Ok(Session::from(response))
    }

    fn finish_auth(
        &mut self,
        result: TrackerClientResult<Session>,
        fallback: &str,
    ) -> TrackerClientResult<Session> {
        let outcome = result.and_then(|session| {
            storage::save_session(self.storage.as_ref(), &session.token, &session.user)?;
            Ok(session)
        });

        match outcome {
            Ok(session) => {
                info!(username = %session.user.username, "authenticated");
                self.auth = AuthState::Authenticated(session.clone());
                Ok(session)
            }
            Err(err) => {
                // после неудачного входа в хранилище не остаётся прежней сессии
                if let Err(clear_err) = storage::clear_session(self.storage.as_ref()) {
                    warn!(error = %clear_err, "failed to clear stored session");
                }
                self.auth = AuthState::Failed(err.auth_failure_message(fallback));
                Err(err)
            }
        }
    }

    /// Завершает сессию локально.
    pub fn logout(&mut self) -> TrackerClientResult<()> {
        self.auth = AuthState::Anonymous;
        storage::clear_session(self.storage.as_ref())?;
        info!("logged out");
        Ok(())
    }

    fn token(&self) -> Option<&str> {
        self.auth.token()
    }

    /// Пропускает результат авторизованного запроса. На 401 очищает сессию и
    /// один раз зовёт обработчик; остальные ошибки отдаёт как есть.
    fn guard<T>(&mut self, result: TrackerClientResult<T>) -> TrackerClientResult<T> {
        if let Err(TrackerClientError::Unauthorized) = &result {
            warn!("session rejected by server, clearing local session");
            self.auth = AuthState::Anonymous;
            if let Err(err) = storage::clear_session(self.storage.as_ref()) {
                warn!(error = %err, "failed to clear stored session");
            }
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }
        result
    }

    /// Профиль текущего пользователя с сервера.
    pub async fn current_user(&mut self) -> TrackerClientResult<User> {
        let result = self.http.current_user(self.token()).await;
        self.guard(result)
    }

    /// Обновляет профиль и кладёт ответ сервера в сессию.
    pub async fn update_profile(&mut self, form: &ProfileForm) -> TrackerClientResult<User> {
        let update = form.submit()?;
        let result = self.http.update_profile(self.token(), &update).await;
        let user = self.guard(result)?;

        if let AuthState::Authenticated(session) = &mut self.auth {
            session.user = user.clone();
            storage::save_user(self.storage.as_ref(), &user)?;
        }
        Ok(user)
    }

    /// Все задачи текущего пользователя.
    pub async fn list_problems(&mut self) -> TrackerClientResult<Vec<Problem>> {
        let result = self.http.list_problems(self.token()).await;
        self.guard(result)
    }

    /// Задача по идентификатору.
    pub async fn get_problem(&mut self, id: Uuid) -> TrackerClientResult<Problem> {
        let result = self.http.get_problem(self.token(), id).await;
        self.guard(result)
    }

    /// Создаёт задачу из проверенного черновика.
    pub async fn create_problem(&mut self, draft: &ProblemDraft) -> TrackerClientResult<Problem> {
        let result = self.http.create_problem(self.token(), draft).await;
        self.guard(result)
    }

    /// Перезаписывает задачу черновиком.
    pub async fn update_problem(
        &mut self,
        id: Uuid,
        draft: &ProblemDraft,
    ) -> TrackerClientResult<Problem> {
        let result = self.http.update_problem(self.token(), id, draft).await;
        self.guard(result)
    }

    /// Удаляет задачу.
    pub async fn delete_problem(&mut self, id: Uuid) -> TrackerClientResult<()> {
        let result = self.http.delete_problem(self.token(), id).await;
        self.guard(result)
    }

    /// Выгрузка своих задач в файл, который рендерит сервер.
    pub async fn export_problems(&mut self, format: ExportFormat) -> TrackerClientResult<ExportFile> {
        let result = self.http.export_problems(self.token(), format).await;
        self.guard(result)
    }

    /// Сводная статистика (только для администратора).
    pub async fn admin_stats(&mut self) -> TrackerClientResult<AdminStats> {
        let result = self.http.admin_stats(self.token()).await;
        self.guard(result)
    }

    /// Пользователи с прогрессом (только для администратора).
    pub async fn admin_users(&mut self) -> TrackerClientResult<Vec<UserSummary>> {
        let result = self.http.admin_users(self.token()).await;
        self.guard(result)
    }

    /// Задачи выбранного пользователя (только для администратора).
    pub async fn admin_user_problems(&mut self, user_id: Uuid) -> TrackerClientResult<Vec<Problem>> {
        let result = self.http.admin_user_problems(self.token(), user_id).await;
        self.guard(result)
    }

    /// Выгрузка данных пользователя (только для администратора).
    pub async fn export_user_data(
        &mut self,
        user_id: Uuid,
        format: ExportFormat,
    ) -> TrackerClientResult<ExportFile> {
        let result = self
            .http
            .export_user_data(self.token(), user_id, format)
            .await;
        self.guard(result)
    }
}
