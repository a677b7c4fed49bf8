use std::collections::BTreeMap;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracker_client::validation::field_messages;
use tracker_client::{AuthState, LoginForm, Role, Session, SignupForm};

use crate::api;
use crate::display::field_error;
use crate::routes::Route;
use crate::state::AppState;

#[component]
pub(crate) fn AuthPanel(state: AppState, mode: Route) -> impl IntoView {
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let role = RwSignal::new(Role::default());
    let errors = RwSignal::new(BTreeMap::<String, String>::new());

    let is_signup = mode == Route::Signup;

    let on_login = move || {
        let form = LoginForm::new(username.get(), password.get());
        let credentials = match form.submit() {
            Ok(credentials) => credentials,
            Err(invalid) => {
                errors.set(field_messages(&invalid));
                return;
            }
        };
        errors.set(BTreeMap::new());

        state.auth.set(AuthState::Loading);
        spawn_local(async move {
            match api::login(&credentials).await {
                Ok(auth) => state.sign_in(Session::from(auth)),
                Err(err) => state
                    .auth
                    .set(AuthState::Failed(err.auth_failure_message("Login failed"))),
            }
        });
    };

    let on_signup = move || {
        let form = SignupForm {
            username: username.get(),
            email: email.get(),
            password: password.get(),
            confirm_password: confirm_password.get(),
            role: role.get(),
        };
        let request = match form.submit() {
            Ok(request) => request,
            Err(invalid) => {
                errors.set(field_messages(&invalid));
                return;
            }
        };
        errors.set(BTreeMap::new());

        state.auth.set(AuthState::Loading);
        spawn_local(async move {
            let result = match api::signup(&request).await {
                Ok(response) => match response.into_session() {
                    Some(session) => Ok(session),
                    None => api::login(&request.credentials()).await.map(Session::from),
                },
                Err(err) => Err(err),
            };
            match result {
                Ok(session) => state.sign_in(session),
                Err(err) => state.auth.set(AuthState::Failed(
                    err.auth_failure_message("Registration failed"),
                )),
            }
        });
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        state.clear_error();
        state.auth.update(AuthState::clear_error);
        if is_signup { on_signup() } else { on_login() }
    };

    let switch_mode = move |_| {
        errors.set(BTreeMap::new());
        state.auth.update(AuthState::clear_error);
        state
            .route
            .set(if is_signup { Route::Login } else { Route::Signup });
    };

    let loading = move || state.auth.with(AuthState::is_loading);
    let auth_error = move || state.auth.with(|auth| auth.error().map(str::to_string));

    view! {
        <section class="card">
            <h2>{mode.title()}</h2>

            <Show when=move || auth_error().is_some()>
                <div class="error-banner">{move || auth_error().unwrap_or_default()}</div>
            </Show>

            <form on:submit=on_submit>
                <label>"Username"</label>
                <input
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <div class="field-error">{move || errors.with(|e| field_error(e, "username"))}</div>

                <Show when=move || is_signup>
                    <label>"Email"</label>
                    <input
                        type="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <div class="field-error">{move || errors.with(|e| field_error(e, "email"))}</div>
                </Show>

                <label>"Password"</label>
                <input
                    type="password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <div class="field-error">{move || errors.with(|e| field_error(e, "password"))}</div>

                <Show when=move || is_signup>
                    <label>"Confirm password"</label>
                    <input
                        type="password"
                        prop:value=move || confirm_password.get()
                        on:input=move |ev| confirm_password.set(event_target_value(&ev))
                    />
                    <div class="field-error">
                        {move || errors.with(|e| field_error(e, "confirm_password"))}
                    </div>

                    <label>"Role"</label>
                    <select
                        prop:value=move || role.get().as_str()
                        on:change=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<Role>() {
                                role.set(value);
                            }
                        }
                    >
                        {Role::ALL
                            .into_iter()
                            .map(|value| view! { <option value=value.as_str()>{value.label()}</option> })
                            .collect_view()}
                    </select>
                </Show>

                <button type="submit" disabled=loading>
                    {move || {
                        if loading() {
                            "Please wait..."
                        } else if is_signup {
                            "Create account"
                        } else {
                            "Log in"
                        }
                    }}
                </button>
            </form>

            <p>
                {if is_signup { "Already have an account? " } else { "No account yet? " }}
                <a href="#" on:click=move |ev| {
                    ev.prevent_default();
                    switch_mode(());
                }>
                    {if is_signup { "Log in" } else { "Sign up" }}
                </a>
            </p>
        </section>
    }
}
