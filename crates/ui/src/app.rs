use dioxus::prelude::*;
use dioxus_router::Router;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::APP_TITLE;

#[component]
pub fn App() -> Element {
    let signed_out = use_context::<AppContext>().token().is_missing();

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "{APP_TITLE}" }

        div { class: "app-root",
            if signed_out {
                div { class: "auth-banner",
                    "No access token. Set QUIZ_TOKEN or pass --token to load questions."
                }
            }
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "The practice screen failed" }
                        pre { "{errors:?}" }
                        p { class: "hint", "Restart the app; details are in the log." }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
