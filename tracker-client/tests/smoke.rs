use std::time::{SystemTime, UNIX_EPOCH};

use tracker_client::{
    ClientConfig, LoginForm, MemoryStorage, ProblemForm, ProblemLevel, ProblemStatus, Role,
    SignupForm, TrackerClient, TrackerClientError,
};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{}", nanos % 1_000_000_000_000)
}

#[tokio::test]
#[ignore = "requires running tracker backend"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("TRACKER_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let mut client = TrackerClient::new(&ClientConfig::new(base_url), Box::new(MemoryStorage::new()))
        .expect("client must build");

    let suffix = unique_suffix();
    let username = format!("smoke_{suffix}");
    let password = "password123";

    let session = client
        .register(&SignupForm {
            username: username.clone(),
            email: format!("smoke_{suffix}@example.com"),
            password: password.to_string(),
            confirm_password: password.to_string(),
            role: Role::User,
        })
        .await
        .expect("register must succeed");
    assert!(!session.token.is_empty());
    assert_eq!(session.user.username, username);

    client.logout().expect("logout must succeed");
    client
        .login(&LoginForm::new(&username, password))
        .await
        .expect("login must succeed");

    let created = client
        .create_problem(
            &ProblemForm {
                problem_name: "Two Sum".to_string(),
                link: "https://leetcode.com/problems/two-sum/".to_string(),
                level: ProblemLevel::Easy,
                status: ProblemStatus::Todo,
                comment: String::new(),
            }
            .submit()
            .expect("form must be valid"),
        )
        .await
        .expect("create_problem must succeed");

    let listed = client
        .list_problems()
        .await
        .expect("list_problems must succeed");
    assert!(listed.iter().any(|p| p.problem_id == created.problem_id));

    let mut draft = created.to_draft();
    draft.status = ProblemStatus::Done;
    let done = client
        .update_problem(created.problem_id, &draft)
        .await
        .expect("update_problem must succeed");
    assert!(done.done_time.is_some());

    client
        .delete_problem(created.problem_id)
        .await
        .expect("delete_problem must succeed");

    let after_delete = client.get_problem(created.problem_id).await;
    assert!(matches!(after_delete, Err(TrackerClientError::NotFound)));
}
