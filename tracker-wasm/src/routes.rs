use tracker_client::User;

/// Экран приложения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Route {
    #[default]
    Login,
    Signup,
    Board,
    Admin,
}

impl Route {
    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Sign up",
            Self::Board => "My problems",
            Self::Admin => "Admin dashboard",
        }
    }
}

/// Экран, который реально показывается для запрошенного.
///
/// Без сессии доступны только вход и регистрация. С сессией формы входа
/// не показываются, а админка доступна только роли `ADMIN`.
pub(crate) fn resolve(requested: Route, user: Option<&User>) -> Route {
    match (requested, user) {
        (Route::Signup, None) => Route::Signup,
        (_, None) => Route::Login,
        (Route::Admin, Some(user)) if user.is_admin() => Route::Admin,
        (_, Some(_)) => Route::Board,
    }
}

/// Экраны для навигации текущего пользователя.
pub(crate) fn nav_items(user: Option<&User>) -> Vec<Route> {
    match user {
        None => vec![Route::Login, Route::Signup],
        Some(user) if user.is_admin() => vec![Route::Board, Route::Admin],
        Some(_) => vec![Route::Board],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_client::Role;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            user_id: Uuid::from_u128(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn anonymous_user_is_sent_to_login() {
        assert_eq!(resolve(Route::Board, None), Route::Login);
        assert_eq!(resolve(Route::Admin, None), Route::Login);
        assert_eq!(resolve(Route::Signup, None), Route::Signup);
    }

    #[test]
    fn admin_route_requires_admin_role() {
        let regular = user(Role::User);
        let admin = user(Role::Admin);
        assert_eq!(resolve(Route::Admin, Some(&regular)), Route::Board);
        assert_eq!(resolve(Route::Admin, Some(&admin)), Route::Admin);
    }

    #[test]
    fn logged_in_user_skips_auth_forms() {
        let regular = user(Role::User);
        assert_eq!(resolve(Route::Login, Some(&regular)), Route::Board);
        assert_eq!(resolve(Route::Signup, Some(&regular)), Route::Board);
    }

    #[test]
    fn nav_shows_admin_only_to_admins() {
        assert_eq!(nav_items(Some(&user(Role::User))), vec![Route::Board]);
        assert_eq!(
            nav_items(Some(&user(Role::Admin))),
            vec![Route::Board, Route::Admin]
        );
    }
}
