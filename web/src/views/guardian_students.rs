use std::rc::Rc;

use dioxus::core::Task;
use dioxus::prelude::*;
use futures_util::StreamExt;
use types::Guardian;
use ui::{Anchor, PageState, StudentTable};

use crate::Route;
use crate::query::ServerQuery;

/// Students of one guardian, with a breadcrumb dropdown to switch guardians.
///
/// Both lists are reloaded whenever `owner_id` or `guardian_id` changes. The
/// previous load is cancelled first, and anything it still delivers is dropped
/// by [`PageState::apply`].
#[component]
pub fn GuardianStudents(
    owner_id: ReadSignal<String>,
    guardian_id: ReadSignal<String>,
) -> Element {
    let mut page = use_signal(PageState::new);
    let mut in_flight = use_signal(|| None::<Task>);
    let mut trigger = use_signal(|| None::<Rc<MountedData>>);

    use_effect(move || {
        let scope = page.write().begin(owner_id(), guardian_id());

        let previous = in_flight.write().take();
        if let Some(task) = previous {
            task.cancel();
        }

        // Owned by this component's scope, so unmounting drops it too.
        let task = spawn(async move {
            let mut loads = std::pin::pin!(ui::load(&ServerQuery, scope));
            while let Some(loaded) = loads.next().await {
                page.write().apply(loaded);
            }
        });
        in_flight.set(Some(task));
    });

    if page.read().is_loading() {
        return rsx! {
            div { class: "loading", "Loading..." }
        };
    }

    let (label, guardians, students, anchor) = {
        let state = page.read();
        (
            state.breadcrumb_label(&guardian_id.read()).to_string(),
            state.guardians().to_vec(),
            state.students().to_vec(),
            state.menu.anchor(),
        )
    };

    rsx! {
        div {
            onkeydown: move |evt: KeyboardEvent| page.write().menu.key(&evt.key().to_string()),
            nav { class: "breadcrumbs",
                Link { to: Route::Guardians {}, class: "breadcrumb-link", "Guardians" }
                span { class: "breadcrumb-separator", "/" }
                button {
                    class: "breadcrumb-trigger",
                    onmounted: move |evt: MountedEvent| trigger.set(Some(evt.data())),
                    onclick: move |_| {
                        let Some(element) = trigger() else {
                            return;
                        };
                        spawn(async move {
                            match element.get_client_rect().await {
                                Ok(rect) => {
                                    let anchor =
                                        Anchor::below(rect.min_x(), rect.min_y(), rect.height());
                                    page.write().menu.activate(anchor);
                                }
                                Err(error) => {
                                    tracing::error!(?error, "failed to measure menu trigger");
                                }
                            }
                        });
                    },
                    "{label}"
                    span { class: "breadcrumb-caret", "▾" }
                }
                span { class: "breadcrumb-separator", "/" }
                span { class: "breadcrumb-current", "Students" }
            }

            if let Some(anchor) = anchor {
                div {
                    class: "menu-backdrop",
                    onclick: move |_| page.write().menu.dismiss(),
                }
                ul {
                    class: "menu",
                    style: "left: {anchor.x}px; top: {anchor.y}px;",
                    for guardian in guardians {
                        GuardianMenuItem {
                            key: "{guardian.id}",
                            guardian: guardian.clone(),
                            on_select: move |g: Guardian| {
                                let guardian_id = page.write().menu.select(&g);
                                navigator().push(Route::guardian(guardian_id));
                            },
                        }
                    }
                }
            }

            StudentTable { students }
        }
    }
}

#[component]
fn GuardianMenuItem(guardian: Guardian, on_select: EventHandler<Guardian>) -> Element {
    let name = guardian.name.clone();
    rsx! {
        li {
            class: "menu-item",
            onclick: move |_| on_select.call(guardian.clone()),
            "{name}"
        }
    }
}
