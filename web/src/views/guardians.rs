use dioxus::prelude::*;
use types::UserSession;
use ui::QueryLayer;

use crate::Route;
use crate::query::ServerQuery;

#[component]
pub fn Guardians() -> Element {
    let owner_id = use_context::<UserSession>().uid;

    let guardians = use_resource(move || {
        let owner_id = owner_id.clone();
        async move {
            ServerQuery
                .guardian_list(owner_id)
                .await
                .inspect_err(|error| tracing::error!(%error, "error fetching guardians"))
                .unwrap_or_default()
        }
    });

    let body = match &*guardians.read() {
        None => rsx! {
            div { class: "loading", "Loading..." }
        },
        Some(list) if list.is_empty() => rsx! {
            p { class: "text-muted", "No guardians" }
        },
        Some(list) => rsx! {
            div { class: "dashboard-grid",
                for guardian in list.iter() {
                    Link {
                        key: "{guardian.id}",
                        to: Route::guardian(guardian.id.clone()),
                        class: "dashboard-card",
                        h3 { class: "dashboard-card-title", "{guardian.name}" }
                        p { class: "dashboard-card-desc", "{guardian.email}" }
                    }
                }
            }
        },
    };

    rsx! {
        div {
            div { class: "page-header",
                h1 { class: "page-title", "Guardians" }
                p { class: "page-subtitle", "Select a guardian to see their students." }
            }
            {body}
        }
    }
}
