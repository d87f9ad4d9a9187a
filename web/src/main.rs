use dioxus::prelude::*;

mod query;
mod views;

use types::UserSession;
use views::{GuardianStudents, Guardians, Login};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login?:error")]
    Login { error: Option<String> },
    #[layout(AuthenticatedLayout)]
        #[redirect("/", || Route::Guardians {})]
        #[route("/Home/Admin")]
        Guardians {},
        #[route("/Home/Admin/:guardian_id")]
        GuardianDetail { guardian_id: String },
}

impl Route {
    pub fn guardian(guardian_id: impl Into<String>) -> Self {
        Route::GuardianDetail {
            guardian_id: guardian_id.into(),
        }
    }
}

#[component]
fn GuardianDetail(guardian_id: String) -> Element {
    let session = use_context::<UserSession>();
    rsx! {
        GuardianStudents { owner_id: session.uid, guardian_id }
    }
}

fn main() {
    #[cfg(feature = "server")]
    {
        server::init_tracing();
        dioxus::serve(|| async move {
            let routes = server::init()?;

            Ok(dioxus::server::router(App).merge(routes))
        });
    }

    #[cfg(all(feature = "web", not(feature = "server")))]
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Title { "Roster" }
        document::Link { rel: "icon", href: asset!("/assets/favicon.svg") }
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        Router::<Route> {}
    }
}

#[component]
fn NavLink(to: Route, children: Element) -> Element {
    let current_route: Route = use_route();
    let is_active = matches!(
        (&current_route, &to),
        (Route::Guardians {}, Route::Guardians {})
            | (Route::GuardianDetail { .. }, Route::Guardians {})
    );

    rsx! {
        Link {
            to,
            class: if is_active { "active" },
            {children}
        }
    }
}

#[component]
fn AuthenticatedLayout() -> Element {
    let user = use_server_future(api::get_current_user)?;

    match &*user.read() {
        Some(Ok(Some(session))) => rsx! {
            SignedInLayout { session: session.clone() }
        },
        Some(Ok(None)) | Some(Err(_)) => {
            navigator().push(Route::Login { error: None });
            rsx! {
                div { class: "loading", "Redirecting to login..." }
            }
        }
        None => rsx! {
            div { class: "loading", "Loading..." }
        },
    }
}

/// Shell around every signed-in page. Provides the session to the routed page.
#[component]
fn SignedInLayout(session: UserSession) -> Element {
    use_context_provider(|| session.clone());
    let initial = session.initial();

    rsx! {
        div { class: "app-layout",
            aside { class: "sidebar",
                div { class: "sidebar-header",
                    span { class: "sidebar-logo", "Roster" }
                }
                nav { class: "sidebar-nav",
                    NavLink { to: Route::Guardians {}, "Guardians" }
                }
                div { class: "sidebar-footer",
                    div { class: "sidebar-user",
                        div { class: "sidebar-avatar", "{initial}" }
                        div { class: "sidebar-user-info",
                            div { class: "sidebar-user-name", "{session.display_name}" }
                            if let Some(email) = &session.email {
                                div { class: "sidebar-user-role", "{email}" }
                            }
                        }
                    }
                    a { href: "/auth/logout", rel: "external", class: "sidebar-logout", "Sign out" }
                }
            }
            main { class: "main-content",
                Outlet::<Route> {}
            }
        }
    }
}
