use std::sync::Arc;

use dioxus::prelude::*;

use quiz_core::model::{Difficulty, FilterCriteria, Question};
use services::{DEFAULT_REVIEW_COUNT, ReviewSetSource, ScoreboardSink};

use crate::context::AppContext;
use crate::views::mistakes::use_mistake_pool;
use crate::views::practice::FilterSelect;
use crate::views::question_flow::{QuestionFlow, spawn_load};
use crate::views::word_panel::WordPanel;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{difficulty_options, parse_grammar_focus, parse_question_count, score_label};

#[component]
pub fn ReviewView() -> Element {
    let mut resource = use_mistake_pool();

    rsx! {
        div { class: "page review",
            header { class: "page-header",
                h2 { "Grammar review" }
            }
            {
                match view_state_from_resource(resource) {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { class: "loading", "Loading the review pool..." }
                    },
                    ViewState::Error(err) => rsx! {
                        div { class: "error-banner",
                            p { {err.message()} }
                            button { class: "btn", onclick: move |_| resource.restart(), "Retry" }
                        }
                    },
                    ViewState::Ready(records) => {
                        let pool: Vec<Question> =
                            records.into_iter().map(|record| record.question).collect();
                        rsx! {
                            ReviewSetup { pool }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ReviewSetup(pool: Vec<Question>) -> Element {
    let mut focus = use_signal(String::new);
    let mut difficulty = use_signal(Difficulty::default);
    let mut count = use_signal(|| DEFAULT_REVIEW_COUNT.to_string());
    let mut active = use_signal(|| None::<FilterCriteria>);
    let mut run = use_signal(|| 0_u32);
    let pool_size = pool.len();

    let start = move |_: MouseEvent| {
        let criteria = FilterCriteria::default()
            .with_difficulty(difficulty())
            .with_grammar_focus(parse_grammar_focus(&focus()))
            .with_question_count(parse_question_count(&count()).unwrap_or(DEFAULT_REVIEW_COUNT));
        active.set(Some(criteria));
        run += 1;
    };

    rsx! {
        div { class: "review-form",
            label { r#for: "review-focus", class: "filter",
                span { "Grammar focus" }
                input {
                    id: "review-focus",
                    r#type: "text",
                    placeholder: "e.g. subjunctive, passive voice",
                    value: "{focus}",
                    oninput: move |evt| focus.set(evt.value()),
                }
            }
            FilterSelect {
                id: "review-difficulty",
                label: "Difficulty",
                options: difficulty_options(),
                value: difficulty().as_str(),
                on_change: move |raw: String| {
                    if let Ok(parsed) = raw.parse() {
                        difficulty.set(parsed);
                    }
                },
            }
            label { r#for: "review-count", class: "filter",
                span { "Questions" }
                input {
                    id: "review-count",
                    r#type: "number",
                    min: "1",
                    max: "20",
                    value: "{count}",
                    oninput: move |evt| count.set(evt.value()),
                }
            }
            button { class: "btn primary", onclick: start, "Start review" }
            span { class: "counter", "{pool_size} in pool" }
        }
        if let Some(criteria) = active() {
            ReviewRun { key: "{run}", pool: pool.clone(), criteria }
        }
    }
}

/// One pass over a review set. Remounted for every new start.
#[component]
fn ReviewRun(pool: Vec<Question>, criteria: FilterCriteria) -> Element {
    let ctx = use_context::<AppContext>();
    let token = ctx.token();
    let source = use_hook(|| Arc::new(ReviewSetSource::new(pool.clone())));
    let sink = use_hook(|| Arc::new(ScoreboardSink::new(pool.clone())));
    let session = use_signal(|| ctx.local_session(source.clone(), sink.clone()));
    let selected_word = use_signal(|| None::<String>);

    {
        let token = token.clone();
        let criteria = criteria.clone();
        use_hook(move || spawn_load(session, token, criteria));
    }

    let submitted = session.read().state().is_submitted();
    let (served, total) = source.position();
    let finished = total > 0 && served == total && submitted;
    let score = sink.score();
    let perfect = sink.perfect();

    rsx! {
        div { class: "review-progress",
            span { class: "counter", "Question {served} of {total}" }
            span { class: "score", {score_label(score)} }
        }
        if finished {
            div { class: "review-summary",
                h3 { "Review complete" }
                p { "{perfect} of {total} answered fully correct." }
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
