use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use practice_core::time::fixed_clock;
use services::{LocalBackend, PracticeLoopService};
use storage::repository::{ScriptRepository, Storage};
use storage::seed::sample_scripts;

use crate::context::{UiApp, build_app_context};
use crate::views::conversation::ConversationTestHandles;
use crate::views::{CatalogView, ConversationView};

#[derive(Clone)]
struct TestApp {
    practice_loop: Arc<PracticeLoopService>,
}

impl UiApp for TestApp {
    fn app_name(&self) -> &str {
        "Practice (test)"
    }

    fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Catalog,
    Conversation(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    conversation_handles: Option<ConversationTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.conversation_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Catalog => rsx! { CatalogView {} },
        ViewKind::Conversation(script_id) => rsx! { ConversationView { script_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub conversation_handles: Option<ConversationTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Harness over in-memory storage holding the bundled sample scripts.
pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = Storage::in_memory();
    for script in sample_scripts().expect("sample scripts parse") {
        storage
            .scripts
            .upsert_script(&script, fixed_clock().now())
            .await
            .expect("seed script");
    }
    setup_view_harness_with_storage(view, storage)
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: Storage) -> ViewHarness {
    let backend = Arc::new(LocalBackend::from_storage(&storage));
    let practice_loop = Arc::new(PracticeLoopService::new(
        fixed_clock(),
        backend.clone(),
        backend,
    ));
    let conversation_handles = match view {
        ViewKind::Conversation(_) => Some(ConversationTestHandles::default()),
        ViewKind::Catalog => None,
    };

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::new(TestApp { practice_loop }),
            view,
            conversation_handles: conversation_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        conversation_handles,
    }
}
