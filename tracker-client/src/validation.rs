//! Формы и их полевые валидаторы.
//!
//! Каждая форма хранит сырые значения полей. `submit` обрезает пробелы,
//! прогоняет валидаторы и только при успехе отдаёт тело запроса; при ошибке
//! возвращается [`ValidationErrors`], а запрос не формируется вовсе.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError, ValidationErrors};

use crate::models::{ProblemDraft, ProblemLevel, ProblemStatus, Role};

/// Минимальная длина пароля.
pub const MIN_PASSWORD_LENGTH: u64 = 8;
/// Максимальная длина пароля.
pub const MAX_PASSWORD_LENGTH: u64 = 128;
/// Минимальная длина логина.
pub const MIN_USERNAME_LENGTH: u64 = 3;
/// Максимальная длина логина.
pub const MAX_USERNAME_LENGTH: u64 = 50;
/// Максимальная длина названия задачи.
pub const MAX_PROBLEM_NAME_LENGTH: u64 = 200;
/// Максимальная длина комментария.
pub const MAX_COMMENT_LENGTH: u64 = 500;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Username is required"));
    }
    let len = value.chars().count() as u64;
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(invalid("length", "Username must be 3-50 characters long"));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(
            "username_chars",
            "Username may contain only letters, numbers, and underscores",
        ));
    }
    Ok(())
}

fn validate_email_field(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if !value.validate_email() {
        return Err(invalid("email", "Please enter a valid email address"));
    }
    Ok(())
}

fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    let len = value.chars().count() as u64;
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(invalid("length", "Password must be 8-128 characters long"));
    }
    Ok(())
}

fn validate_problem_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Problem name is required"));
    }
    if value.chars().count() as u64 > MAX_PROBLEM_NAME_LENGTH {
        return Err(invalid(
            "length",
            "Problem name must be less than 200 characters",
        ));
    }
    Ok(())
}

fn validate_link(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Problem link is required"));
    }
    if !value.validate_url() {
        return Err(invalid("url", "Please enter a valid URL"));
    }
    Ok(())
}

/// Первое сообщение для каждого поля с ошибкой, для вывода рядом с полем.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            Some((field.to_string(), message))
        })
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

#[derive(Debug, Clone, Default, Validate)]
/// Форма входа.
pub struct LoginForm {
    /// Логин.
    #[validate(custom(function = "required", message = "Username is required"))]
    pub username: String,
    /// Пароль.
    #[validate(custom(function = "required", message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Тело запроса `POST /auth/login`.
pub struct Credentials {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
}

impl LoginForm {
    /// Форма с заполненными полями.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Проверяет форму и возвращает учётные данные для запроса.
    pub fn submit(&self) -> Result<Credentials, ValidationErrors> {
        // Пароль не обрезаем: пробелы могут быть его частью.
        let form = Self {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        };
        form.validate()?;

        Ok(Credentials {
            username: form.username,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
/// Форма регистрации.
pub struct SignupForm {
    /// Логин: 3–50 символов, латиница, цифры и `_`.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// Email.
    #[validate(custom(function = "validate_email_field"))]
    pub email: String,
    /// Пароль.
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    /// Повтор пароля; на сервер не отправляется.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    /// Запрошенная роль.
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Тело запроса `POST /auth/signup`.
pub struct RegistrationRequest {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Пароль.
    pub password: String,
    /// Роль.
    pub role: Role,
}

impl RegistrationRequest {
    /// Учётные данные для входа сразу после регистрации.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl SignupForm {
    /// Проверяет форму. Повтор пароля в запрос не попадает.
    pub fn submit(&self) -> Result<RegistrationRequest, ValidationErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            role: self.role,
        };
        form.validate()?;

        Ok(RegistrationRequest {
            username: form.username,
            email: form.email,
            password: form.password,
            role: form.role,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
/// Форма создания и редактирования задачи.
pub struct ProblemForm {
    /// Название.
    #[validate(custom(function = "validate_problem_name"))]
    pub problem_name: String,
    /// Ссылка на условие.
    #[validate(custom(function = "validate_link"))]
    pub link: String,
    /// Сложность.
    pub level: ProblemLevel,
    /// Статус.
    pub status: ProblemStatus,
    /// Комментарий, необязательный.
    #[validate(length(max = 500, message = "Comment must be less than 500 characters"))]
    pub comment: String,
}

impl ProblemForm {
    /// Форма, заполненная значениями существующей задачи.
    pub fn from_problem(problem: &crate::models::Problem) -> Self {
        Self {
            problem_name: problem.problem_name.clone(),
            link: problem.link.clone(),
            level: problem.level,
            status: problem.status,
            comment: problem.comment.clone().unwrap_or_default(),
        }
    }

    /// Проверяет форму и возвращает тело запроса.
    pub fn submit(&self) -> Result<ProblemDraft, ValidationErrors> {
        let form = Self {
            problem_name: self.problem_name.trim().to_string(),
            link: self.link.trim().to_string(),
            level: self.level,
            status: self.status,
            comment: self.comment.trim().to_string(),
        };
        form.validate()?;

        Ok(ProblemDraft {
            problem_name: form.problem_name,
            link: form.link,
            level: form.level,
            status: form.status,
            comment: non_empty(&form.comment),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
/// Форма редактирования профиля.
pub struct ProfileForm {
    /// Логин.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// Email.
    #[validate(custom(function = "validate_email_field"))]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Тело запроса `PUT /users/me`.
pub struct ProfileUpdate {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
}

impl ProfileForm {
    /// Проверяет форму и возвращает тело запроса.
    pub fn submit(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        };
        form.validate()?;

        Ok(ProfileUpdate {
            username: form.username,
            email: form.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupForm {
        SignupForm {
            username: "alice_01".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            role: Role::User,
        }
    }

    fn valid_problem() -> ProblemForm {
        ProblemForm {
            problem_name: "  Two Sum  ".to_string(),
            link: "https://leetcode.com/problems/two-sum/".to_string(),
            level: ProblemLevel::Easy,
            status: ProblemStatus::Todo,
            comment: "   ".to_string(),
        }
    }

    #[test]
    fn signup_passes_and_drops_confirmation() {
        let request = valid_signup().submit().expect("form must be valid");
        assert_eq!(request.username, "alice_01");
        assert_eq!(request.role, Role::User);

        let body = serde_json::to_value(&request).expect("serialize");
        assert!(body.get("confirm_password").is_none());
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["role"], "USER");
    }

    #[test]
    fn signup_rejects_password_mismatch() {
        let mut form = valid_signup();
        form.confirm_password = "password124".to_string();

        let errors = form.submit().expect_err("mismatch must fail");
        let messages = field_messages(&errors);
        assert_eq!(
            messages.get("confirm_password").map(String::as_str),
            Some("Passwords do not match")
        );
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn signup_rejects_username_pattern_and_bounds() {
        let mut form = valid_signup();
        form.username = "al".to_string();
        let messages = field_messages(&form.submit().expect_err("too short"));
        assert_eq!(
            messages.get("username").map(String::as_str),
            Some("Username must be 3-50 characters long")
        );

        form.username = "alice smith".to_string();
        let messages = field_messages(&form.submit().expect_err("space not allowed"));
        assert_eq!(
            messages.get("username").map(String::as_str),
            Some("Username may contain only letters, numbers, and underscores")
        );
    }

    #[test]
    fn signup_reports_required_first_for_empty_fields() {
        let errors = SignupForm::default().submit().expect_err("empty form");
        let messages = field_messages(&errors);
        assert_eq!(messages.get("username").map(String::as_str), Some("Username is required"));
        assert_eq!(messages.get("email").map(String::as_str), Some("Email is required"));
        assert_eq!(messages.get("password").map(String::as_str), Some("Password is required"));
        // Пустые пароль и повтор совпадают, ошибка только у самого пароля.
        assert!(!messages.contains_key("confirm_password"));
    }

    #[test]
    fn signup_rejects_invalid_email_and_short_password() {
        let mut form = valid_signup();
        form.email = "not-an-email".to_string();
        form.password = "short".to_string();
        form.confirm_password = "short".to_string();

        let messages = field_messages(&form.submit().expect_err("invalid"));
        assert_eq!(
            messages.get("email").map(String::as_str),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            messages.get("password").map(String::as_str),
            Some("Password must be 8-128 characters long")
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::new("  ", "").submit().expect_err("empty");
        let messages = field_messages(&errors);
        assert_eq!(messages.len(), 2);

        let credentials = LoginForm::new(" bob ", "secret")
            .submit()
            .expect("valid login");
        assert_eq!(credentials.username, "bob");
    }

    #[test]
    fn problem_form_trims_and_drops_blank_comment() {
        let draft = valid_problem().submit().expect("valid problem");
        assert_eq!(draft.problem_name, "Two Sum");
        assert!(draft.comment.is_none());
    }

    #[test]
    fn problem_form_enforces_url_and_lengths() {
        let mut form = valid_problem();
        form.link = "leetcode two sum".to_string();
        form.comment = "x".repeat(501);
        form.problem_name = "n".repeat(201);

        let messages = field_messages(&form.submit().expect_err("invalid"));
        assert_eq!(messages.get("link").map(String::as_str), Some("Please enter a valid URL"));
        assert_eq!(
            messages.get("comment").map(String::as_str),
            Some("Comment must be less than 500 characters")
        );
        assert_eq!(
            messages.get("problem_name").map(String::as_str),
            Some("Problem name must be less than 200 characters")
        );
    }

    #[test]
    fn profile_form_uses_signup_rules() {
        let form = ProfileForm {
            username: "bob!".to_string(),
            email: "bob@example.com".to_string(),
        };
        let messages = field_messages(&form.submit().expect_err("invalid username"));
        assert!(messages.contains_key("username"));
        assert!(!messages.contains_key("email"));
    }
}
