use leptos::prelude::*;
use leptos::task::spawn_local;
use tracker_client::{AdminStats, ExportFormat, Problem, ProblemStatus, UserSummary};
use uuid::Uuid;

use crate::api;
use crate::display::{format_time, level_class, progress_style, status_class};
use crate::download;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Stats,
    Users,
}

fn load_dashboard(
    state: AppState,
    stats: RwSignal<Option<AdminStats>>,
    users: RwSignal<Vec<UserSummary>>,
) {
    let token = state.token();
    state.clear_error();
    spawn_local(async move {
        match api::admin_stats(token.as_deref()).await {
            Ok(loaded) => stats.set(Some(loaded)),
            Err(err) => {
                state.fail(err);
                return;
            }
        }
        match api::admin_users(token.as_deref()).await {
            Ok(loaded) => users.set(loaded),
            Err(err) => state.fail(err),
        }
    });
}

fn export_user(state: AppState, user_id: Uuid, format: ExportFormat) {
    let token = state.token();
    state.clear_error();
    spawn_local(async move {
        match api::export_user_data(token.as_deref(), user_id, format).await {
            Ok(file) => {
                if let Err(err) = download::save_file(&file) {
                    state.set_error(err);
                }
            }
            Err(err) => state.fail(err),
        }
    });
}

fn show_user_problems(
    state: AppState,
    user: UserSummary,
    selected: RwSignal<Option<(UserSummary, Vec<Problem>)>>,
) {
    let token = state.token();
    spawn_local(async move {
        match api::admin_user_problems(token.as_deref(), user.user_id).await {
            Ok(problems) => selected.set(Some((user, problems))),
            Err(err) => state.fail(err),
        }
    });
}

#[component]
fn StatsTab(stats: RwSignal<Option<AdminStats>>) -> impl IntoView {
    view! {
        <Show
            when=move || stats.with(Option::is_some)
            fallback=|| view! { <p>"Loading..."</p> }
        >
            {move || {
                let stats = stats.get().unwrap_or_default();
                let by_status = stats.problem_stats;
                let by_level = stats.problem_levels;
                view! {
                    <div class="summary">
                        <div class="card">"Users: " {stats.total_users}</div>
                        <div class="card">"Problems: " {stats.total_problems}</div>
                        {ProblemStatus::ALL
                            .into_iter()
                            .map(|status| {
                                view! {
                                    <div class="card">
                                        <span class=status_class(status)>{status.label()}</span>
                                        " " {by_status.get(status)}
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                    {by_level.map(|levels| {
                        view! {
                            <p>
                                "Easy: " {levels.easy} ", Medium: " {levels.medium}
                                ", Hard: " {levels.hard}
                            </p>
                        }
                    })}
                }
            }}
        </Show>
    }
}

#[component]
fn UsersTab(
    state: AppState,
    users: RwSignal<Vec<UserSummary>>,
    selected: RwSignal<Option<(UserSummary, Vec<Problem>)>>,
) -> impl IntoView {
    view! {
        <table>
            <thead>
                <tr>
                    <th>"Username"</th>
                    <th>"Email"</th>
                    <th>"Role"</th>
                    <th>"Progress"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                <For
                    each=move || users.get()
                    key=|user| user.user_id
                    children=move |user| {
                        let user_id = user.user_id;
                        let for_problems = user.clone();
                        view! {
                            <tr>
                                <td>{user.username.clone()}</td>
                                <td>{user.email.clone()}</td>
                                <td>{user.role.as_str()}</td>
                                <td>
                                    {format!(
                                        "{}/{} ({}%)",
                                        user.progress.done,
                                        user.progress.total,
                                        user.progress.completion_percent()
                                    )}
                                    <div class="progress">
                                        <div style=progress_style(&user.progress)></div>
                                    </div>
                                </td>
                                <td>
                                    <button on:click=move |_| {
                                        show_user_problems(state, for_problems.clone(), selected)
                                    }>"Problems"</button>
                                    <button on:click=move |_| export_user(state, user_id, ExportFormat::Pdf)>
                                        "PDF"
                                    </button>
                                    <button on:click=move |_| export_user(state, user_id, ExportFormat::Excel)>
                                        "Excel"
                                    </button>
                                </td>
                            </tr>
                        }
                    }
                />
            </tbody>
        </table>

        <Show when=move || selected.with(Option::is_some)>
            {move || {
                selected
                    .get()
                    .map(|(user, problems)| {
                        view! {
                            <div class="card">
                                <h3>{format!("Problems of {}", user.username)}</h3>
                                <button on:click=move |_| selected.set(None)>"Close"</button>
                                <ul>
                                    {problems
                                        .into_iter()
                                        .map(|problem| {
                                            view! {
                                                <li>
                                                    <span class=level_class(problem.level)>
                                                        {problem.level.label()}
                                                    </span>
                                                    " " {problem.problem_name} " "
                                                    <span class=status_class(problem.status)>
                                                        {problem.status.label()}
                                                    </span>
                                                    " " {format_time(problem.done_time)}
                                                </li>
                                            }
                                        })
                                        .collect_view()}
                                </ul>
                            </div>
                        }
                    })
            }}
        </Show>
    }
}

#[component]
pub(crate) fn AdminPanel(state: AppState) -> impl IntoView {
    let tab = RwSignal::new(Tab::Stats);
    let stats = RwSignal::new(None::<AdminStats>);
    let users = RwSignal::new(Vec::<UserSummary>::new());
    let selected = RwSignal::new(None::<(UserSummary, Vec<Problem>)>);

    load_dashboard(state, stats, users);

    let tab_class = move |which: Tab| if tab.get() == which { "active" } else { "" };

    view! {
        <section>
            <div class="topbar">
                <h2>"Admin dashboard"</h2>
                <button on:click=move |_| load_dashboard(state, stats, users)>"Refresh"</button>
            </div>
            <div class="tabs">
                <button class=move || tab_class(Tab::Stats) on:click=move |_| tab.set(Tab::Stats)>
                    "Statistics"
                </button>
                <button class=move || tab_class(Tab::Users) on:click=move |_| tab.set(Tab::Users)>
                    "Users"
                </button>
            </div>

            {move || match tab.get() {
                Tab::Stats => view! { <StatsTab stats=stats /> }.into_any(),
                Tab::Users => {
                    view! { <UsersTab state=state users=users selected=selected /> }.into_any()
                }
            }}
        </section>
    }
}
