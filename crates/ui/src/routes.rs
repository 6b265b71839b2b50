use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{CatalogView, ConversationView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", CatalogView)] Catalog {},
        #[route("/run/:script_id", ConversationView)] Conversation { script_id: u64 },
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();

    rsx! {
        div { class: "app",
            nav { class: "topbar",
                Link { to: Route::Catalog {}, class: "brand", "{ctx.app_name()}" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
