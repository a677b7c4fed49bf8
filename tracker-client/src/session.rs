use crate::models::{AuthResponse, SignupResponse, User};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Авторизованная сессия: bearer-токен и закэшированный профиль.
pub struct Session {
    /// Bearer-токен.
    pub token: String,
    /// Профиль пользователя.
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

impl SignupResponse {
    /// Сессия из ответа регистрации. `None`, если токена нет и нужно
    /// войти теми же учётными данными.
    pub fn into_session(self) -> Option<Session> {
        let user = self.user;
        self.token.map(|token| Session { token, user })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Состояние авторизации клиента.
pub enum AuthState {
    /// Сессии нет.
    #[default]
    Anonymous,
    /// Идёт вход или регистрация.
    Loading,
    /// Пользователь вошёл.
    Authenticated(Session),
    /// Последняя попытка входа или регистрации не удалась.
    Failed(String),
}

impl AuthState {
    /// Есть ли действующая сессия.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Идёт ли сейчас вход.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Текущая сессия.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Токен текущей сессии.
    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    /// Пользователь текущей сессии.
    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// Сообщение об ошибке последней попытки входа.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Сбрасывает ошибку входа; остальные состояния не меняются.
    pub fn clear_error(&mut self) {
        if matches!(self, Self::Failed(_)) {
            *self = Self::Anonymous;
        }
    }
}
