use dioxus::prelude::*;
use log::warn;

use quiz_core::model::{Difficulty, FilterCriteria, Topic};

use crate::context::AppContext;
use crate::views::question_flow::{QuestionFlow, spawn_load};
use crate::views::word_panel::WordPanel;
use crate::vm::{OptionVm, difficulty_options, topic_options};

#[component]
pub fn PracticeView() -> Element {
    let ctx = use_context::<AppContext>();
    let token = ctx.token();
    let session = use_signal(|| ctx.practice_session());
    let selected_word = use_signal(|| None::<String>);
    let mut topic = use_signal(Topic::default);
    let mut difficulty = use_signal(Difficulty::default);
    let mut notice = use_signal(|| None::<String>);

    {
        let ctx = ctx.clone();
        let token = token.clone();
        use_hook(move || {
            let api = ctx.api();
            let warm_token = token.clone();
            spawn(async move {
                if let Err(err) = api.initialize_cache(&warm_token).await {
                    warn!("question cache warm-up failed: {err}");
                    notice.set(Some(format!("Question cache unavailable: {err}")));
                }
            });
            spawn_load(session, token, FilterCriteria::default());
        });
    }

    let reload = {
        let token = token.clone();
        use_callback(move |()| {
            let criteria = FilterCriteria::new(topic(), difficulty());
            spawn_load(session, token.clone(), criteria);
        })
    };

    rsx! {
        div { class: "page practice",
            header { class: "page-header",
                h2 { "Sentence practice" }
                div { class: "filters",
                    FilterSelect {
                        id: "topic-select",
                        label: "Topic",
                        options: topic_options(),
                        value: topic().as_str(),
                        on_change: move |raw: String| {
                            if let Ok(parsed) = raw.parse() {
                                topic.set(parsed);
                                reload.call(());
                            }
                        },
                    }
                    FilterSelect {
                        id: "difficulty-select",
                        label: "Difficulty",
                        options: difficulty_options(),
                        value: difficulty().as_str(),
                        on_change: move |raw: String| {
                            if let Ok(parsed) = raw.parse() {
                                difficulty.set(parsed);
                                reload.call(());
                            }
                        },
                    }
                }
            }
            if let Some(message) = notice() {
                div { class: "notice",
                    span { "{message}" }
                    button { class: "btn close", onclick: move |_| notice.set(None), "Dismiss" }
                }
            }
            div { class: "practice-body",
                QuestionFlow {
                    session,
                    token,
                    on_word: move |word| {
                        let mut selected_word = selected_word;
                        selected_word.set(Some(word));
                    },
                }
                WordPanel { word: selected_word }
            }
        }
    }
}

#[component]
pub(crate) fn FilterSelect(
    id: &'static str,
    label: &'static str,
    options: Vec<OptionVm>,
    value: &'static str,
    on_change: EventHandler<String>,
) -> Element {
    rsx! {
        label { r#for: id, class: "filter",
            span { "{label}" }
            select {
                id,
                value,
                onchange: move |evt: FormEvent| on_change.call(evt.value()),
                for opt in options.iter() {
                    option {
                        key: "{opt.value}",
                        value: opt.value,
                        selected: opt.value == value,
                        "{opt.label}"
                    }
                }
            }
        }
    }
}
