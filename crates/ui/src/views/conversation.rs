use dioxus::prelude::*;
use dioxus_router::Link;

use practice_core::model::ScriptId;
use practice_core::runner::Effect;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DialogueIntent, DialoguePhase, DialogueScreenVm, DialogueVm, start_dialogue};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[component]
pub fn ConversationView(script_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let practice_loop = ctx.practice_loop();
    let script_id = ScriptId::new(script_id);

    let vm = use_signal(|| None::<DialogueVm>);

    let practice_loop_for_resource = practice_loop.clone();
    let resource = use_resource(move || {
        let practice_loop = practice_loop_for_resource.clone();
        let mut vm = vm;

        async move {
            let started = start_dialogue(&practice_loop, script_id).await?;
            vm.set(Some(started));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    // Progress reports are spawned and never awaited by the page.
    let dispatch_intent = {
        let practice_loop = practice_loop.clone();
        use_callback(move |intent: DialogueIntent| {
            let mut vm = vm;
            let effect = vm.write().as_mut().and_then(|vm| vm.apply(intent));
            if let Some(Effect::PersistProgress(update)) = effect {
                let practice_loop = practice_loop.clone();
                spawn(async move {
                    practice_loop.report_progress(update).await;
                });
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<ConversationTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let screen = vm.read().as_ref().map(DialogueVm::screen);
    let ready = match screen {
        Some(screen) => rsx! {
            DialogueScreen { screen, on_intent: dispatch_intent }
        },
        None => rsx! {
            p { "Loading..." }
        },
    };

    rsx! {
        div { class: "page conversation-page",
            header { class: "view-header",
                Link { to: Route::Catalog {}, class: "btn btn-link", "Back to conversations" }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "error",
                        p { "{err.message()}" }
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| {
                                let mut resource = resource;
                                resource.restart();
                            },
                            "Retry"
                        }
                    }
                },
                ViewState::Ready(()) => ready,
            }
        }
    }
}

#[component]
fn DialogueScreen(screen: DialogueScreenVm, on_intent: Callback<DialogueIntent>) -> Element {
    let can_select = screen.can_select();
    let option_buttons = screen.options.iter().map(|option| {
        let option_id = option.id;
        rsx! {
            li { key: "{option_id}",
                button {
                    class: option.class(),
                    r#type: "button",
                    disabled: !can_select,
                    onclick: move |_| on_intent.call(DialogueIntent::Select(option_id)),
                    span { class: "option-text", "{option.text}" }
                    if !option.translation.is_empty() {
                        span { class: "option-translation", "{option.translation}" }
                    }
                }
            }
        }
    });

    rsx! {
        section { class: "dialogue",
            div { class: "dialogue-head",
                h2 { "{screen.title}" }
                div { class: "dialogue-stats",
                    span { class: "step-label", "{screen.step_label}" }
                    span { class: "score-label", "{screen.score_label}" }
                }
            }
            if let Some(previous) = screen.previous_label.clone() {
                p { class: "previous-run", "{previous}" }
            }

            if screen.phase == DialoguePhase::Finished {
                div { class: "dialogue-finished",
                    h3 { "Conversation complete" }
                    if let Some(summary) = screen.summary.clone() {
                        p { class: "summary", "{summary}" }
                    }
                    div { class: "actions",
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| on_intent.call(DialogueIntent::Restart),
                            "Practice again"
                        }
                        Link { to: Route::Catalog {}, class: "btn", "Choose another" }
                    }
                }
            } else {
                div { class: "bubble bubble-partner",
                    span { class: "speaker", "{screen.speaker_label}" }
                    p { class: "prompt", "{screen.prompt}" }
                    if !screen.translation.is_empty() {
                        p { class: "translation", "{screen.translation}" }
                    }
                }
                ul { class: "options", {option_buttons} }
                if let Some(feedback) = screen.feedback.clone() {
                    div { class: feedback.class(),
                        strong { "{feedback.headline}" }
                        if let Some(text) = feedback.text.clone() {
                            p { "{text}" }
                        }
                        if let Some(translation) = feedback.translation.clone() {
                            p { class: "translation", "{translation}" }
                        }
                    }
                }
                if let Some(label) = screen.advance_label {
                    div { class: "actions",
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| on_intent.call(DialogueIntent::Advance),
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ConversationTestHandles {
    dispatch: Rc<RefCell<Option<Callback<DialogueIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<DialogueVm>>>>>,
}

#[cfg(test)]
impl ConversationTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<DialogueIntent>,
        vm: Signal<Option<DialogueVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<DialogueIntent> {
        (*self.dispatch.borrow()).expect("conversation dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<DialogueVm>> {
        (*self.vm.borrow()).expect("conversation vm registered")
    }
}
