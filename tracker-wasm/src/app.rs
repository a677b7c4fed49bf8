use leptos::prelude::*;

use crate::appearance;
use crate::components::admin_panel::AdminPanel;
use crate::components::auth_panel::AuthPanel;
use crate::components::problem_board::ProblemBoard;
use crate::routes::{self, Route};
use crate::state::AppState;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    // смена состояния входа (загрузка, ошибка) не должна пересоздавать экран
    let route = Memo::new(move |_| state.current_route());

    Effect::new(move |_| appearance::apply(state.theme.get()));

    let on_toggle_theme = move |_| {
        let next = state
            .theme
            .get_untracked()
            .toggled(appearance::system_prefers_dark());
        state.set_theme(next);
    };

    let on_logout = move |_| {
        state.sign_out();
        state.clear_error();
    };

    let user_text = move || {
        state
            .user()
            .map(|u| format!("{} ({})", u.username, u.role))
            .unwrap_or_default()
    };

    let nav = move || {
        let current = route.get();
        routes::nav_items(state.user().as_ref())
            .into_iter()
            .map(|route| {
                let class = if route == current { "active" } else { "" };
                view! {
                    <button class=class on:click=move |_| state.route.set(route)>
                        {route.title()}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <main class="page">
            <section class="container">
                <header class="topbar">
                    <h1>"Problem Tracker"</h1>
                    <nav class="tabs">{nav}</nav>
                    <div>
                        <span>{user_text}</span>
                        <button on:click=on_toggle_theme>
                            {move || {
                                if state.theme.get().is_dark(appearance::system_prefers_dark()) {
                                    "Light mode"
                                } else {
                                    "Dark mode"
                                }
                            }}
                        </button>
                        <Show when=move || state.user().is_some()>
                            <button on:click=on_logout>"Logout"</button>
                        </Show>
                    </div>
                </header>

                <Show when=move || state.error.get().is_some()>
                    <div class="error-banner">
                        <strong>"Error: "</strong>
                        {move || state.error.get().unwrap_or_default()}
                        <button on:click=move |_| state.clear_error()>"×"</button>
                    </div>
                </Show>

                {move || match route.get() {
                    Route::Login => view! { <AuthPanel state=state mode=Route::Login /> }.into_any(),
                    Route::Signup => view! { <AuthPanel state=state mode=Route::Signup /> }.into_any(),
                    Route::Board => view! { <ProblemBoard state=state /> }.into_any(),
                    Route::Admin => view! { <AdminPanel state=state /> }.into_any(),
                }}
            </section>
        </main>
    }
}
