use dioxus::prelude::*;

use services::sources::WordExplanation;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Side panel explaining the word last clicked in the sentence.
///
/// Lookups are read-only and never touch the session.
#[component]
pub fn WordPanel(word: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let lookup = ctx.lookup();
    let token = ctx.token();

    let resource = use_resource(move || {
        let lookup = lookup.clone();
        let token = token.clone();
        let word = word();
        async move {
            let Some(word) = word else {
                return Ok(None);
            };
            lookup
                .explain(&word, &token)
                .await
                .map(Some)
                .map_err(|err| ViewError::from(&err))
        }
    });

    let Some(current) = word() else {
        return rsx! {};
    };
    let state: ViewState<Option<WordExplanation>> = view_state_from_resource(resource);
    let mut word = word;

    rsx! {
        aside { class: "word-panel",
            header {
                h3 { "{current}" }
                button { class: "btn close", onclick: move |_| word.set(None), "Close" }
            }
            {
                match state {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { class: "loading", "Looking up..." }
                    },
                    ViewState::Error(err) => rsx! {
                        p { class: "error", {err.message()} }
                    },
                    ViewState::Ready(None) => rsx! {},
                    ViewState::Ready(Some(explanation)) => rsx! {
                        if let Some(phonetic) = explanation.phonetic.as_ref() {
                            p { class: "phonetic", "{phonetic}" }
                        }
                        for definition in explanation.definitions.iter() {
                            div { class: "definition", key: "{definition.part_of_speech}",
                                strong { "{definition.part_of_speech}" }
                                ul {
                                    for meaning in definition.meanings.iter() {
                                        li { key: "{meaning}", "{meaning}" }
                                    }
                                }
                            }
                        }
                    },
                }
            }
        }
    }
}
