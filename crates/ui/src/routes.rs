use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{MistakesView, PracticeView, ReviewView};
use crate::vm::{APP_TITLE, backend_label, not_found_label, sign_in_label};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", PracticeView)] Practice {},
        #[route("/mistakes", MistakesView)] Mistakes {},
        #[route("/review", ReviewView)] Review {},
    #[end_layout]
    #[route("/:..segments")] NotFound { segments: Vec<String> },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let signed_in = sign_in_label(&ctx.token());
    let backend = backend_label(ctx.config());

    rsx! {
        nav { class: "sidebar",
            h1 { "{APP_TITLE}" }
            ul {
                li { Link { to: Route::Practice {}, active_class: "active", "Sentences" } }
                li { Link { to: Route::Mistakes {}, active_class: "active", "Mistakes" } }
                li { Link { to: Route::Review {}, active_class: "active", "Review" } }
            }
            footer { class: "sidebar-status",
                p { "{signed_in}" }
                p { class: "hint", "{backend}" }
            }
        }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    rsx! {
        div { class: "page not-found",
            h2 { {not_found_label(&segments)} }
            Link { to: Route::Practice {}, "Back to practice" }
        }
    }
}
