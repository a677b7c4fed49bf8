use leptos::prelude::*;
use leptos::task::spawn_local;
use tracker_client::{
    ExportFormat, LoadStatus, Problem, ProblemFilter, ProblemLevel, ProblemStatus, StatusCounts,
};
use uuid::Uuid;

use crate::api;
use crate::components::problem_form::ProblemFormPanel;
use crate::display::{format_time, level_class, status_class};
use crate::download;
use crate::state::AppState;

fn load_problems(state: AppState) {
    let token = state.token();
    state.problems.update(|store| store.begin());
    spawn_local(async move {
        match api::list_problems(token.as_deref()).await {
            Ok(problems) => state.problems.update(|store| store.apply_loaded(problems)),
            Err(err) => state.fail_problems(err),
        }
    });
}

fn change_status(state: AppState, id: Uuid, status: ProblemStatus) {
    let draft = match state
        .problems
        .with_untracked(|store| store.status_draft(id, status))
    {
        Ok(draft) => draft,
        Err(err) => return state.fail_problems(err),
    };

    let token = state.token();
    state.problems.update(|store| store.begin());
    spawn_local(async move {
        match api::update_problem(token.as_deref(), id, &draft).await {
            Ok(updated) => state.problems.update(|store| store.apply_updated(updated)),
            Err(err) => state.fail_problems(err),
        }
    });
}

fn delete_problem(state: AppState, id: Uuid) {
    let confirmed = web_sys::window()
        .and_then(|window| {
            window
                .confirm_with_message("Delete this problem?")
                .ok()
        })
        .unwrap_or(false);
    if !confirmed {
        return;
    }

    let token = state.token();
    state.problems.update(|store| store.begin());
    spawn_local(async move {
        match api::delete_problem(token.as_deref(), id).await {
            Ok(()) => state.problems.update(|store| store.apply_deleted(id)),
            Err(err) => state.fail_problems(err),
        }
    });
}

fn export(state: AppState, format: ExportFormat) {
    let token = state.token();
    state.clear_error();
    spawn_local(async move {
        match api::export_problems(token.as_deref(), format).await {
            Ok(file) => {
                if let Err(err) = download::save_file(&file) {
                    state.set_error(err);
                }
            }
            Err(err) => state.fail(err),
        }
    });
}

#[component]
fn Summary(counts: Signal<StatusCounts>) -> impl IntoView {
    view! {
        <div class="summary">
            <span>"Total: " {move || counts.get().total()}</span>
            {ProblemStatus::ALL
                .into_iter()
                .map(|status| {
                    view! {
                        <span class=status_class(status)>
                            {status.label()} ": " {move || counts.get().get(status)}
                        </span>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
pub(crate) fn ProblemBoard(state: AppState) -> impl IntoView {
    let status_filter = RwSignal::new("all".to_string());
    let level_filter = RwSignal::new("all".to_string());
    let search = RwSignal::new(String::new());

    let form_open = RwSignal::new(false);
    let editing = RwSignal::new(None::<Problem>);

    load_problems(state);

    let counts = Signal::derive(move || state.problems.with(|store| store.counts()));
    let visible = move || {
        let filter = ProblemFilter::from_options(&status_filter.get(), &level_filter.get())
            .unwrap_or_default()
            .with_search(search.get());
        state.problems.with(|store| {
            filter
                .apply(store.problems())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };
    let loading = move || {
        state
            .problems
            .with(|store| matches!(store.status(), LoadStatus::Loading))
    };
    let store_error = move || state.problems.with(|store| store.error().map(str::to_string));

    let on_close_form = Callback::new(move |_| {
        form_open.set(false);
        editing.set(None);
    });

    view! {
        <section>
            <div class="topbar">
                <h2>"My problems"</h2>
                <div>
                    <button on:click=move |_| {
                        editing.set(None);
                        form_open.set(true);
                    }>"Add problem"</button>
                    <button on:click=move |_| export(state, ExportFormat::Pdf)>"Export PDF"</button>
                    <button on:click=move |_| export(state, ExportFormat::Excel)>"Export Excel"</button>
                    <button on:click=move |_| load_problems(state) disabled=loading>"Refresh"</button>
                </div>
            </div>

            <Summary counts=counts />

            <Show when=move || store_error().is_some()>
                <div class="error-banner">{move || store_error().unwrap_or_default()}</div>
            </Show>

            <Show when=move || form_open.get()>
                {move || {
                    view! {
                        <ProblemFormPanel state=state initial=editing.get() on_close=on_close_form />
                    }
                }}
            </Show>

            <div class="card">
                <select
                    prop:value=move || status_filter.get()
                    on:change=move |ev| status_filter.set(event_target_value(&ev))
                >
                    <option value="all">"All statuses"</option>
                    {ProblemStatus::ALL
                        .into_iter()
                        .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                        .collect_view()}
                </select>
                <select
                    prop:value=move || level_filter.get()
                    on:change=move |ev| level_filter.set(event_target_value(&ev))
                >
                    <option value="all">"All levels"</option>
                    {ProblemLevel::ALL
                        .into_iter()
                        .map(|l| view! { <option value=l.as_str()>{l.label()}</option> })
                        .collect_view()}
                </select>
                <input
                    placeholder="Search by name"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
            </div>

            <Show when=move || loading()>
                <p>"Loading..."</p>
            </Show>

            <table>
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Level"</th>
                        <th>"Status"</th>
                        <th>"Comment"</th>
                        <th>"Added"</th>
                        <th>"Solved"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=visible
                        key=|p| (p.problem_id, p.status, p.level, p.problem_name.clone(), p.comment.clone(), p.done_time)
                        children=move |problem| {
                            let id = problem.problem_id;
                            let for_edit = problem.clone();
                            view! {
                                <tr>
                                    <td>
                                        <a href=problem.link.clone() target="_blank" rel="noopener noreferrer">
                                            {problem.problem_name.clone()}
                                        </a>
                                    </td>
                                    <td class=level_class(problem.level)>{problem.level.label()}</td>
                                    <td>
                                        <select
                                            class=status_class(problem.status)
                                            prop:value=problem.status.as_str()
                                            on:change=move |ev| {
                                                if let Ok(next) = event_target_value(&ev).parse::<ProblemStatus>() {
                                                    change_status(state, id, next);
                                                }
                                            }
                                        >
                                            {ProblemStatus::ALL
                                                .into_iter()
                                                .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                                                .collect_view()}
                                        </select>
                                    </td>
                                    <td>{problem.comment.clone().unwrap_or_default()}</td>
                                    <td>{format_time(problem.time_posted)}</td>
                                    <td>{format_time(problem.done_time)}</td>
                                    <td>
                                        <button on:click=move |_| {
                                            editing.set(Some(for_edit.clone()));
                                            form_open.set(true);
                                        }>"Edit"</button>
                                        <button on:click=move |_| delete_problem(state, id)>"Delete"</button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            <Show when=move || !loading() && visible().is_empty()>
                <p>"No problems match the current filters."</p>
            </Show>
        </section>
    }
}
