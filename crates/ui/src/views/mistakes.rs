use std::sync::Arc;

use dioxus::prelude::*;

use quiz_core::model::{Difficulty, FilterCriteria, Topic};
use services::{
    DateWindow, MistakeFilter, MistakeRecord, MistakeSource, NavigationMode, ScoreboardSink,
};

use crate::context::AppContext;
use crate::views::practice::FilterSelect;
use crate::views::question_flow::{QuestionFlow, spawn_load, spawn_next};
use crate::views::word_panel::WordPanel;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    date_window_options, difficulty_filter_value, matching_label, mistake_difficulty_options,
    parse_difficulty_filter, score_label, topic_options,
};

/// Saved mistakes for the current learner. An empty list is reported as
/// `ViewError::Empty`.
pub(crate) fn use_mistake_pool() -> Resource<Result<Vec<MistakeRecord>, ViewError>> {
    let ctx = use_context::<AppContext>();
    let api = ctx.api();
    let token = ctx.token();

    use_resource(move || {
        let api = api.clone();
        let token = token.clone();
        async move {
            let records = api
                .fetch_mistakes(&token)
                .await
                .map_err(|err| ViewError::from(&err))?;
            if records.is_empty() {
                return Err(ViewError::Empty);
            }
            Ok(records)
        }
    })
}

#[component]
pub fn MistakesView() -> Element {
    let mut resource = use_mistake_pool();

    rsx! {
        div { class: "page mistakes",
            header { class: "page-header",
                h2 { "Mistake review" }
            }
            {
                match view_state_from_resource(resource) {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { class: "loading", "Loading your mistakes..." }
                    },
                    ViewState::Error(err) => rsx! {
                        div { class: "error-banner",
                            p { {err.message()} }
                            button { class: "btn", onclick: move |_| resource.restart(), "Retry" }
                        }
                    },
                    ViewState::Ready(records) => rsx! {
                        MistakePractice { records }
                    },
                }
            }
        }
    }
}

#[component]
fn MistakePractice(records: Vec<MistakeRecord>) -> Element {
    let ctx = use_context::<AppContext>();
    let token = ctx.token();
    let sink = use_hook(|| {
        Arc::new(ScoreboardSink::new(
            records.iter().map(|record| record.question.clone()),
        ))
    });
    let mut mode = use_signal(NavigationMode::default);
    let mut topic = use_signal(Topic::default);
    let mut difficulty = use_signal(|| None::<Difficulty>);
    let mut window = use_signal(DateWindow::default);
    let mut source = use_signal(|| Arc::new(MistakeSource::new(records.clone())));
    let mut session = use_signal(|| ctx.local_session(source(), sink.clone()));
    let selected_word = use_signal(|| None::<String>);

    {
        let token = token.clone();
        use_hook(move || spawn_load(session, token, FilterCriteria::default()));
    }

    // Any filter or order change starts over from the first match.
    let restart = {
        let ctx = ctx.clone();
        let records = records.clone();
        let sink = sink.clone();
        let token = token.clone();
        use_callback(move |()| {
            let filter = MistakeFilter::default()
                .with_difficulty(difficulty())
                .with_window(window());
            let fresh = Arc::new(
                MistakeSource::new(records.clone())
                    .with_mode(mode())
                    .with_filter(filter),
            );
            source.set(fresh.clone());
            session.set(ctx.local_session(fresh, sink.clone()));
            spawn_load(session, token.clone(), FilterCriteria::default().with_topic(topic()));
        })
    };

    let previous = {
        let token = token.clone();
        move |_: MouseEvent| {
            source.read().step_back();
            spawn_next(session, token.clone());
        }
    };

    let feedback = session
        .read()
        .last_receipt()
        .and_then(|receipt| receipt.feedback.clone());
    let matching = source
        .read()
        .matching_count(&FilterCriteria::default().with_topic(topic()));
    let counter = matching_label(matching, records.len());
    let mode_label = match mode() {
        NavigationMode::Sequential => "In order",
        NavigationMode::Random => "Shuffled",
    };
    let busy = session.read().is_loading() || session.read().is_submitting();

    rsx! {
        div { class: "mistake-toolbar",
            FilterSelect {
                id: "mistake-topic",
                label: "Topic",
                options: topic_options(),
                value: topic().as_str(),
                on_change: move |raw: String| {
                    if let Ok(parsed) = raw.parse() {
                        topic.set(parsed);
                        restart.call(());
                    }
                },
            }
            FilterSelect {
                id: "mistake-difficulty",
                label: "Difficulty",
                options: mistake_difficulty_options(),
                value: difficulty_filter_value(difficulty()),
                on_change: move |raw: String| {
                    difficulty.set(parse_difficulty_filter(&raw));
                    restart.call(());
                },
            }
            FilterSelect {
                id: "mistake-window",
                label: "Answered",
                options: date_window_options(),
                value: window().as_str(),
                on_change: move |raw: String| {
                    if let Some(parsed) = DateWindow::parse(&raw) {
                        window.set(parsed);
                        restart.call(());
                    }
                },
            }
            button {
                class: "btn secondary",
                onclick: move |_| {
                    let next = match mode() {
                        NavigationMode::Sequential => NavigationMode::Random,
                        NavigationMode::Random => NavigationMode::Sequential,
                    };
                    mode.set(next);
                    restart.call(());
                },
                "{mode_label}"
            }
            button { class: "btn secondary", disabled: busy, onclick: previous, "Previous" }
            span { class: "counter", "{counter}" }
            span { class: "score", {score_label(sink.score())} }
            if let Some(feedback) = feedback {
                span { class: "feedback", "{feedback}" }
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
