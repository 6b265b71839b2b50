use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CatalogCardVm, CatalogVm, RunBadge, map_catalog};

#[component]
pub fn CatalogView() -> Element {
    let ctx = use_context::<AppContext>();
    let practice_loop = ctx.practice_loop();

    let mut resource = use_resource(move || {
        let practice_loop = practice_loop.clone();
        async move {
            let entries = practice_loop.load_catalog().await.map_err(|err| {
                log::warn!("catalog failed to load: {err}");
                ViewError::Unknown
            })?;
            Ok::<_, ViewError>(map_catalog(&entries))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page catalog-page",
            h2 { "Conversations" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(catalog) => rsx! {
                    CatalogList { catalog }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "error",
                        p { "{err.message()}" }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| resource.restart(),
                            "Retry"
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn CatalogList(catalog: CatalogVm) -> Element {
    if catalog.is_empty() {
        return rsx! {
            p { class: "empty", "No conversations yet." }
        };
    }

    let cards = catalog.cards.into_iter().map(|card| {
        rsx! {
            CatalogCard { key: "{card.id}", card }
        }
    });

    rsx! {
        p { class: "catalog-summary", "{catalog.summary_label}" }
        ul { class: "catalog-list", {cards} }
    }
}

#[component]
fn CatalogCard(card: CatalogCardVm) -> Element {
    let action = if card.badge == RunBadge::New {
        "Start"
    } else {
        "Practice again"
    };
    let meta = match card.score_label.as_deref() {
        Some(score) => format!("{} · {score}", card.steps_label),
        None => card.steps_label.clone(),
    };

    rsx! {
        li { class: "catalog-card",
            div { class: "catalog-card-head",
                h3 { "{card.title}" }
                span { class: card.badge.class(), "{card.badge.label()}" }
            }
            if !card.subtitle.is_empty() {
                p { class: "translation", "{card.subtitle}" }
            }
            p { class: "meta", "{meta}" }
            Link {
                to: Route::Conversation { script_id: card.id.value() },
                class: "btn btn-primary",
                "{action}"
            }
        }
    }
}
