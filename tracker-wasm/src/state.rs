use leptos::logging::warn;
use leptos::prelude::*;
use tracker_client::storage::{clear_session, load_session, save_session};
use tracker_client::{AuthState, ProblemStore, Session, Theme, TrackerClientError, User};

use crate::routes::{self, Route};
use crate::storage::LocalStorage;

const SESSION_EXPIRED: &str = "Your session has expired, please log in again";

/// Общее состояние приложения. Все поля сигналы, поэтому значение копируется
/// в обработчики как есть.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AppState {
    pub(crate) auth: RwSignal<AuthState>,
    pub(crate) problems: RwSignal<ProblemStore>,
    pub(crate) route: RwSignal<Route>,
    pub(crate) theme: RwSignal<Theme>,
    pub(crate) error: RwSignal<Option<String>>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        let auth = match load_session(&LocalStorage) {
            Ok(Some((token, user))) => AuthState::Authenticated(Session { token, user }),
            Ok(None) => AuthState::Anonymous,
            Err(err) => {
                warn!("failed to read stored session: {err}");
                AuthState::Anonymous
            }
        };
        let route = if auth.is_authenticated() {
            Route::Board
        } else {
            Route::Login
        };
        let theme = Theme::load(&LocalStorage).unwrap_or_default();

        Self {
            auth: RwSignal::new(auth),
            problems: RwSignal::new(ProblemStore::new()),
            route: RwSignal::new(route),
            theme: RwSignal::new(theme),
            error: RwSignal::new(None),
        }
    }

    /// Экран с учётом сессии и роли.
    pub(crate) fn current_route(&self) -> Route {
        let requested = self.route.get();
        self.auth.with(|auth| routes::resolve(requested, auth.user()))
    }

    pub(crate) fn user(&self) -> Option<User> {
        self.auth.with(|auth| auth.user().cloned())
    }

    /// Токен для запроса; чтение не подписывает на изменения.
    pub(crate) fn token(&self) -> Option<String> {
        self.auth
            .with_untracked(|auth| auth.token().map(str::to_string))
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.error.set(Some(message.into()));
    }

    pub(crate) fn clear_error(&self) {
        self.error.set(None);
    }

    pub(crate) fn sign_in(&self, session: Session) {
        if let Err(err) = save_session(&LocalStorage, &session.token, &session.user) {
            warn!("failed to persist session: {err}");
        }
        self.auth.set(AuthState::Authenticated(session));
        self.problems.set(ProblemStore::new());
        self.route.set(Route::Board);
        self.clear_error();
    }

    pub(crate) fn sign_out(&self) {
        if let Err(err) = clear_session(&LocalStorage) {
            warn!("failed to clear session: {err}");
        }
        self.auth.set(AuthState::Anonymous);
        self.problems.set(ProblemStore::new());
        self.route.set(Route::Login);
    }

    /// Обрабатывает ошибку авторизованного запроса. 401 завершает сессию и
    /// уводит на вход; остальное показывается в баннере.
    pub(crate) fn fail(&self, err: TrackerClientError) {
        if matches!(err, TrackerClientError::Unauthorized) {
            self.sign_out();
            self.set_error(SESSION_EXPIRED);
            return;
        }
        self.set_error(err.user_message());
    }

    /// То же для запросов списка задач: ошибка остаётся в хранилище задач.
    pub(crate) fn fail_problems(&self, err: TrackerClientError) {
        if matches!(err, TrackerClientError::Unauthorized) {
            self.fail(err);
            return;
        }
        self.problems.update(|store| store.fail(err.user_message()));
    }

    pub(crate) fn set_theme(&self, theme: Theme) {
        if let Err(err) = theme.save(&LocalStorage) {
            warn!("failed to save theme: {err}");
        }
        self.theme.set(theme);
    }
}
