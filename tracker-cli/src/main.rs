mod logging;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracker_client::validation::field_messages;
use tracker_client::{
    AdminStats, ExportFile, ExportFormat, FileStorage, LoginForm, Problem, ProblemFilter,
    ProblemForm, ProblemLevel, ProblemStatus, ProblemStore, ProfileForm, Role, SignupForm,
    StatusCounts, Storage, Theme, TrackerClient, TrackerClientError, User, UserSummary,
};
use uuid::Uuid;

use crate::logging::init_logging;
use crate::settings::Settings;

const LOGIN_HINT: &str =
    "требуется авторизация: выполните `tracker-cli login ...` или `tracker-cli register ...`";

#[derive(Debug, Parser)]
#[command(name = "tracker-cli", version, about = "CLI клиент трекера решённых задач")]
struct Cli {
    /// Адрес сервера (по умолчанию TRACKER_API_URL или http://localhost:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Подробные логи в stderr (`-v` запросы к API, `-vv` всё).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя; после неё сессия сохраняется.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Повтор пароля; по умолчанию совпадает с `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
        /// Запросить роль администратора.
        #[arg(long)]
        admin: bool,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет локальную сессию.
    Logout,
    /// Текущий пользователь по данным сервера.
    Whoami,
    /// Изменение профиля. Не указанные поля остаются прежними.
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Список задач с фильтрами.
    List {
        /// TODO, DOING, DONE или all.
        #[arg(long, default_value = "all")]
        status: String,
        /// EASY, MEDIUM, HARD или all.
        #[arg(long, default_value = "all")]
        level: String,
        /// Подстрока названия.
        #[arg(long)]
        search: Option<String>,
    },
    /// Задача по id.
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Добавление задачи.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
        #[arg(long, default_value = "EASY")]
        level: ProblemLevel,
        #[arg(long, default_value = "TODO")]
        status: ProblemStatus,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Изменение задачи. Не указанные поля берутся из текущей версии.
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        level: Option<ProblemLevel>,
        #[arg(long)]
        status: Option<ProblemStatus>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Смена статуса задачи.
    Status {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        status: ProblemStatus,
    },
    /// Удаление задачи.
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Выгрузка своих задач в PDF или Excel.
    Export {
        #[arg(long)]
        format: ExportFormat,
        /// Куда сохранить; по умолчанию имя файла от сервера.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Команды администратора.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Тема оформления (хранится рядом с сессией).
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommand>,
    },
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Сводная статистика.
    Stats,
    /// Пользователи и их прогресс.
    Users,
    /// Задачи пользователя.
    Problems {
        #[arg(long)]
        user: Uuid,
    },
    /// Выгрузка данных пользователя.
    Export {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeCommand {
    /// Показать текущую тему.
    Show,
    /// Сохранить тему: light, dark или system.
    Set { theme: Theme },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env необязателен
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("некорректная конфигурация")?;
    init_logging(&settings.log_level, cli.verbose)?;

    let storage = FileStorage::new(&settings.session_file);
    let config = settings.client_config(cli.server);
    let mut client = TrackerClient::new(&config, Box::new(storage))
        .map_err(map_client_error)?
        .on_unauthorized(|| {
            warn!("stored session rejected by server");
            eprintln!("Сессия истекла, локальная сессия удалена");
        });

    match cli.command {
        Command::Register {
            username,
            email,
            password,
            confirm_password,
            admin,
        } => {
            let form = SignupForm {
                username,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                role: if admin { Role::Admin } else { Role::User },
            };
            let session = client.register(&form).await.map_err(map_client_error)?;
            print_user("Регистрация успешна", &session.user);
        }
        Command::Login { username, password } => {
            let session = client
                .login(&LoginForm::new(username, password))
                .await
                .map_err(map_client_error)?;
            print_user("Вход выполнен", &session.user);
        }
        Command::Logout => {
            client.logout().map_err(map_client_error)?;
            println!("Выход выполнен");
        }
        Command::Whoami => {
            require_session(&client)?;
            let user = client.current_user().await.map_err(map_client_error)?;
            print_user("Текущий пользователь", &user);
        }
        Command::Profile { username, email } => {
            let current = require_session(&client)?.clone();
            let form = ProfileForm {
                username: username.unwrap_or(current.username),
                email: email.unwrap_or(current.email),
            };
            let user = client
                .update_profile(&form)
                .await
                .map_err(map_client_error)?;
            print_user("Профиль обновлён", &user);
        }
        Command::List {
            status,
            level,
            search,
        } => {
            let mut filter = ProblemFilter::from_options(&status, &level)?;
            if let Some(search) = search {
                filter = filter.with_search(search);
            }

            let mut store = ProblemStore::new();
            store
                .load_all(&mut client)
                .await
                .map_err(map_client_error)?;
            print_counts(&store.counts());
            print_list(&filter.apply(store.problems()), filter.is_active());
        }
        Command::Get { id } => {
            let problem = client.get_problem(id).await.map_err(map_client_error)?;
            print_problem("Задача", &problem);
        }
        Command::Create {
            name,
            link,
            level,
            status,
            comment,
        } => {
            let form = ProblemForm {
                problem_name: name,
                link,
                level,
                status,
                comment: comment.unwrap_or_default(),
            };
            let mut store = ProblemStore::new();
            let problem = store
                .create(&mut client, &form)
                .await
                .map_err(map_client_error)?;
            print_problem("Задача добавлена", &problem);
        }
        Command::Update {
            id,
            name,
            link,
            level,
            status,
            comment,
        } => {
            let current = client.get_problem(id).await.map_err(map_client_error)?;
            let form = merge_problem_form(&current, name, link, level, status, comment);

            let mut store = ProblemStore::new();
            store.apply_loaded(vec![current]);
            let problem = store
                .update(&mut client, id, &form)
                .await
                .map_err(map_client_error)?;
            print_problem("Задача обновлена", &problem);
        }
        Command::Status { id, status } => {
            let current = client.get_problem(id).await.map_err(map_client_error)?;

            let mut store = ProblemStore::new();
            store.apply_loaded(vec![current]);
            let problem = store
                .set_status(&mut client, id, status)
                .await
                .map_err(map_client_error)?;
            print_problem("Статус изменён", &problem);
        }
        Command::Delete { id } => {
            client.delete_problem(id).await.map_err(map_client_error)?;
            println!("Задача удалена: id={id}");
        }
        Command::Export { format, out } => {
            let file = client
                .export_problems(format)
                .await
                .map_err(map_client_error)?;
            save_export(&file, out.as_deref())?;
        }
        Command::Admin { command } => run_admin(&mut client, command).await?,
        Command::Theme { command } => run_theme(client.storage(), command.as_ref())?,
    }

    Ok(())
}

async fn run_admin(client: &mut TrackerClient, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Stats => {
            let stats = client.admin_stats().await.map_err(map_client_error)?;
            print_stats(&stats);
        }
        AdminCommand::Users => {
            let users = client.admin_users().await.map_err(map_client_error)?;
            print_users(&users);
        }
        AdminCommand::Problems { user } => {
            let problems = client
                .admin_user_problems(user)
                .await
                .map_err(map_client_error)?;
            print_list(&problems.iter().collect::<Vec<_>>(), false);
        }
        AdminCommand::Export { user, format, out } => {
            let file = client
                .export_user_data(user, format)
                .await
                .map_err(map_client_error)?;
            save_export(&file, out.as_deref())?;
        }
    }
    Ok(())
}

fn run_theme(storage: &dyn Storage, command: Option<&ThemeCommand>) -> Result<()> {
    match command {
        None | Some(ThemeCommand::Show) => {
            let theme = Theme::load(storage).context("не удалось прочитать тему")?;
            println!("Тема: {}", theme_name(theme));
        }
        Some(ThemeCommand::Set { theme }) => {
            theme.save(storage).context("не удалось сохранить тему")?;
            println!("Тема сохранена: {}", theme_name(*theme));
        }
    }
    Ok(())
}

fn theme_name(theme: Theme) -> String {
    serde_json::to_value(theme)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{theme:?}"))
}

fn require_session(client: &TrackerClient) -> Result<&User> {
    client.user().ok_or_else(|| anyhow!(LOGIN_HINT))
}

fn merge_problem_form(
    current: &Problem,
    name: Option<String>,
    link: Option<String>,
    level: Option<ProblemLevel>,
    status: Option<ProblemStatus>,
    comment: Option<String>,
) -> ProblemForm {
    let mut form = ProblemForm::from_problem(current);
    if let Some(name) = name {
        form.problem_name = name;
    }
    if let Some(link) = link {
        form.link = link;
    }
    if let Some(level) = level {
        form.level = level;
    }
    if let Some(status) = status {
        form.status = status;
    }
    if let Some(comment) = comment {
        form.comment = comment;
    }
    form
}

fn save_export(file: &ExportFile, out: Option<&Path>) -> Result<()> {
    let target = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&file.file_name));
    fs::write(&target, &file.bytes)
        .with_context(|| format!("не удалось записать {}", target.display()))?;
    println!(
        "Файл сохранён: {} ({} байт, {})",
        target.display(),
        file.bytes.len(),
        file.content_type
    );
    Ok(())
}

fn map_client_error(err: TrackerClientError) -> anyhow::Error {
    let message = match err {
        TrackerClientError::Unauthorized => LOGIN_HINT.to_string(),
        TrackerClientError::Forbidden => "недостаточно прав: нужна роль ADMIN".to_string(),
        TrackerClientError::NotFound => "ресурс не найден".to_string(),
        TrackerClientError::Validation(errors) => {
            let details = field_messages(&errors)
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("; ");
            format!("некорректные данные: {details}")
        }
        TrackerClientError::Server { status, message } => {
            format!("сервер ответил {status}: {message}")
        }
        TrackerClientError::Http(err) => format!("ошибка HTTP: {err}"),
        TrackerClientError::Network(err) => format!("ошибка сети: {err}"),
        TrackerClientError::Decode(err) => format!("не удалось разобрать ответ: {err}"),
        TrackerClientError::Storage(err) => format!("ошибка файла сессии: {err}"),
    };
    anyhow!(message)
}

fn format_time(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("id: {}", user.user_id);
    println!("username: {}", user.username);
    println!("email: {}", user.email);
    println!("role: {}", user.role);
}

fn print_problem(title: &str, problem: &Problem) {
    println!("{title}");
    println!("id: {}", problem.problem_id);
    println!("name: {}", problem.problem_name);
    println!("link: {}", problem.link);
    println!("level: {}", problem.level.label());
    println!("status: {}", problem.status.label());
    if let Some(comment) = &problem.comment {
        println!("comment: {comment}");
    }
    println!("posted: {}", format_time(problem.time_posted.as_ref()));
    println!("done: {}", format_time(problem.done_time.as_ref()));
}

fn print_counts(counts: &StatusCounts) {
    println!(
        "Всего: {} (todo={}, doing={}, done={})",
        counts.total(),
        counts.todo,
        counts.doing,
        counts.done
    );
}

fn print_list(problems: &[&Problem], filtered: bool) {
    if filtered {
        println!("По фильтру: {}", problems.len());
    }
    for problem in problems {
        println!(
            "- [{}] {} ({}, {})",
            problem.problem_id,
            problem.problem_name,
            problem.level,
            problem.status
        );
    }
}

fn print_stats(stats: &AdminStats) {
    println!("Пользователей: {}", stats.total_users);
    println!("Задач: {}", stats.total_problems);
    for status in ProblemStatus::ALL {
        println!("  {}: {}", status.label(), stats.problem_stats.get(status));
    }
    if let Some(levels) = &stats.problem_levels {
        println!(
            "  easy={}, medium={}, hard={}",
            levels.easy, levels.medium, levels.hard
        );
    }
}

fn print_users(users: &[UserSummary]) {
    println!("Пользователей: {}", users.len());
    for user in users {
        println!(
            "- [{}] {} <{}> {} задач: {}/{} решено ({}%)",
            user.user_id,
            user.username,
            user.email,
            user.role,
            user.progress.done,
            user.progress.total,
            user.progress.completion_percent()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem() -> Problem {
        Problem {
            problem_id: Uuid::from_u128(5),
            problem_name: "Two Sum".to_string(),
            link: "https://leetcode.com/problems/two-sum/".to_string(),
            level: ProblemLevel::Easy,
            status: ProblemStatus::Todo,
            comment: Some("hash map".to_string()),
            time_posted: None,
            done_time: None,
        }
    }

    #[test]
    fn cli_parses_create_with_case_insensitive_enums() {
        let cli = Cli::try_parse_from([
            "tracker-cli",
            "create",
            "--name",
            "Two Sum",
            "--link",
            "https://leetcode.com/problems/two-sum/",
            "--level",
            "hard",
            "--status",
            "doing",
        ])
        .expect("args must parse");

        match cli.command {
            Command::Create { level, status, .. } => {
                assert_eq!(level, ProblemLevel::Hard);
                assert_eq!(status, ProblemStatus::Doing);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_export_format() {
        let parsed = Cli::try_parse_from(["tracker-cli", "export", "--format", "csv"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_accepts_global_server_after_subcommand() {
        let cli = Cli::try_parse_from(["tracker-cli", "admin", "stats", "--server", "localhost:1"])
            .expect("args must parse");
        assert_eq!(cli.server.as_deref(), Some("localhost:1"));
        assert!(matches!(
            cli.command,
            Command::Admin {
                command: AdminCommand::Stats
            }
        ));
    }

    #[test]
    fn cli_counts_repeated_verbose_flags() {
        let cli = Cli::try_parse_from(["tracker-cli", "list", "-vv"]).expect("args must parse");
        assert_eq!(cli.verbose, 2);

        let quiet = Cli::try_parse_from(["tracker-cli", "whoami"]).expect("args must parse");
        assert_eq!(quiet.verbose, 0);
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let form = merge_problem_form(
            &sample_problem(),
            None,
            None,
            Some(ProblemLevel::Medium),
            None,
            None,
        );
        assert_eq!(form.problem_name, "Two Sum");
        assert_eq!(form.level, ProblemLevel::Medium);
        assert_eq!(form.status, ProblemStatus::Todo);
        assert_eq!(form.comment, "hash map");
    }

    #[test]
    fn validation_errors_are_listed_per_field() {
        let form = ProblemForm {
            link: "nope".to_string(),
            ..ProblemForm::from_problem(&sample_problem())
        };
        let errors = form.submit().expect_err("link is invalid");
        let message = map_client_error(TrackerClientError::Validation(errors)).to_string();
        assert!(message.contains("link: Please enter a valid URL"));
    }

    #[test]
    fn theme_names_are_lowercase() {
        assert_eq!(theme_name(Theme::System), "system");
        assert_eq!(theme_name(Theme::Dark), "dark");
    }
}
