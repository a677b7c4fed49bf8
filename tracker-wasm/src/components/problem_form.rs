use std::collections::BTreeMap;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracker_client::validation::field_messages;
use tracker_client::{Problem, ProblemForm, ProblemLevel, ProblemStatus};

use crate::api;
use crate::display::field_error;
use crate::state::AppState;

/// Форма добавления задачи, а при переданной `initial` её редактирования.
#[component]
pub(crate) fn ProblemFormPanel(
    state: AppState,
    initial: Option<Problem>,
    on_close: Callback<()>,
) -> impl IntoView {
    let editing_id = initial.as_ref().map(|p| p.problem_id);
    let start = initial.as_ref().map(ProblemForm::from_problem).unwrap_or_default();

    let name = RwSignal::new(start.problem_name);
    let link = RwSignal::new(start.link);
    let level = RwSignal::new(start.level);
    let status = RwSignal::new(start.status);
    let comment = RwSignal::new(start.comment);
    let errors = RwSignal::new(BTreeMap::<String, String>::new());
    let saving = RwSignal::new(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let form = ProblemForm {
            problem_name: name.get(),
            link: link.get(),
            level: level.get(),
            status: status.get(),
            comment: comment.get(),
        };
        let draft = match form.submit() {
            Ok(draft) => draft,
            Err(invalid) => {
                errors.set(field_messages(&invalid));
                return;
            }
        };
        errors.set(BTreeMap::new());

        let token = state.token();
        saving.set(true);
        state.problems.update(|store| store.begin());
        spawn_local(async move {
            let result = match editing_id {
                Some(id) => api::update_problem(token.as_deref(), id, &draft).await,
                None => api::create_problem(token.as_deref(), &draft).await,
            };
            saving.set(false);
            match result {
                Ok(saved) => {
                    state.problems.update(|store| match editing_id {
                        Some(_) => store.apply_updated(saved),
                        None => store.apply_created(saved),
                    });
                    on_close.run(());
                }
                Err(err) => state.fail_problems(err),
            }
        });
    };

    view! {
        <form class="card" on:submit=on_submit>
            <h3>{if editing_id.is_some() { "Edit problem" } else { "Add problem" }}</h3>

            <label>"Problem name"</label>
            <input
                prop:value=move || name.get()
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <div class="field-error">{move || errors.with(|e| field_error(e, "problem_name"))}</div>

            <label>"Link"</label>
            <input
                type="url"
                placeholder="https://leetcode.com/problems/..."
                prop:value=move || link.get()
                on:input=move |ev| link.set(event_target_value(&ev))
            />
            <div class="field-error">{move || errors.with(|e| field_error(e, "link"))}</div>

            <label>"Level"</label>
            <select
                prop:value=move || level.get().as_str()
                on:change=move |ev| {
                    if let Ok(value) = event_target_value(&ev).parse::<ProblemLevel>() {
                        level.set(value);
                    }
                }
            >
                {ProblemLevel::ALL
                    .into_iter()
                    .map(|value| view! { <option value=value.as_str()>{value.label()}</option> })
                    .collect_view()}
            </select>

            <label>"Status"</label>
            <select
                prop:value=move || status.get().as_str()
                on:change=move |ev| {
                    if let Ok(value) = event_target_value(&ev).parse::<ProblemStatus>() {
                        status.set(value);
                    }
                }
            >
                {ProblemStatus::ALL
                    .into_iter()
                    .map(|value| view! { <option value=value.as_str()>{value.label()}</option> })
                    .collect_view()}
            </select>

            <label>"Comment"</label>
            <textarea
                prop:value=move || comment.get()
                on:input=move |ev| comment.set(event_target_value(&ev))
            ></textarea>
            <div class="field-error">{move || errors.with(|e| field_error(e, "comment"))}</div>

            <button type="submit" disabled=move || saving.get()>
                {if editing_id.is_some() { "Save" } else { "Add" }}
            </button>
            <button type="button" on:click=move |_| on_close.run(()) disabled=move || saving.get()>
                "Cancel"
            </button>
        </form>
    }
}
