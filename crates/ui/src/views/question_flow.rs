use dioxus::prelude::*;
use log::{debug, warn};

use quiz_core::Stage;
use quiz_core::model::FilterCriteria;
use quiz_core::model::words::{SentencePart, clean_word, tokenize_sentence};
use services::sessions::{ChoiceView, ErrorView, ExplanationView};
use services::{AuthToken, RetryTarget, SessionController, SubmitOutcome};

use crate::vm::{
    candidate_class, error_hint, shortcut_label, stage_tab_class, stage_title, verdict_label,
};

/// Issue a load and apply the response when it arrives.
///
/// A newer load or submit makes this one stale; the controller drops it.
pub fn spawn_load(
    mut session: Signal<SessionController>,
    token: AuthToken,
    criteria: FilterCriteria,
) {
    let request = session.write().begin_load(criteria);
    spawn(async move {
        let response = request.run(&token).await;
        let outcome = session.write().finish_load(response);
        debug!("load finished: {outcome:?}");
    });
}

pub fn spawn_next(session: Signal<SessionController>, token: AuthToken) {
    let criteria = session.read().criteria().clone();
    spawn_load(session, token, criteria);
}

/// Submit both answers, then reveal the explanation after the configured pause.
pub fn spawn_submit(mut session: Signal<SessionController>, token: AuthToken) {
    let request = match session.write().begin_submit() {
        Ok(request) => request,
        Err(err) => {
            warn!("submit not started: {err}");
            return;
        }
    };
    spawn(async move {
        let response = request.run(&token).await;
        let outcome = session.write().finish_submit(response);
        if let SubmitOutcome::Accepted { reveal_after, .. } = outcome {
            tokio::time::sleep(reveal_after).await;
            if let Err(err) = session.write().advance_to_explanation() {
                debug!("explanation not shown: {err}");
            }
        }
    });
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FlowIntent {
    Select(Stage, String),
    Submit(Stage),
    Navigate(Stage),
    Next,
    Retry,
}

#[component]
pub fn QuestionFlow(
    session: Signal<SessionController>,
    token: AuthToken,
    on_word: EventHandler<String>,
) -> Element {
    let dispatch = use_callback(move |intent: FlowIntent| {
        let mut session = session;
        let result = match intent {
            FlowIntent::Select(Stage::WordChoice, text) => session.write().select_word_choice(text),
            FlowIntent::Select(_, text) => session.write().select_translation(text),
            FlowIntent::Submit(Stage::WordChoice) => session.write().submit_word_choice(),
            FlowIntent::Submit(_) => {
                spawn_submit(session, token.clone());
                Ok(())
            }
            FlowIntent::Navigate(stage) => session.write().navigate_to(stage),
            FlowIntent::Next => {
                spawn_next(session, token.clone());
                Ok(())
            }
            FlowIntent::Retry => {
                let target = session.read().retry_target().cloned();
                match target {
                    Some(RetryTarget::Load(criteria)) => spawn_load(session, token.clone(), criteria),
                    Some(RetryTarget::Submit) => spawn_submit(session, token.clone()),
                    None => debug!("nothing to retry"),
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            debug!("intent ignored: {err}");
        }
    });

    let on_key = move |evt: KeyboardEvent| {
        let snapshot = session.read().view();
        let stage = snapshot.active_stage;
        let choice = match stage {
            Stage::WordChoice => snapshot.word_choice,
            Stage::Translation => snapshot.translation,
            Stage::Explanation => None,
        };
        match evt.key() {
            Key::Character(value) => {
                let picked = value
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| choice.as_ref()?.candidates.get(idx).cloned());
                if let Some(candidate) = picked.filter(|candidate| candidate.enabled) {
                    evt.prevent_default();
                    dispatch.call(FlowIntent::Select(stage, candidate.text));
                }
            }
            Key::Enter => {
                evt.prevent_default();
                if stage == Stage::Explanation {
                    dispatch.call(FlowIntent::Next);
                } else if choice.is_some_and(|choice| choice.can_submit) {
                    dispatch.call(FlowIntent::Submit(stage));
                }
            }
            _ => {}
        }
    };

    let view = session.read().view();
    let busy = view.loading || view.submitting;
    let translation_label = if view.submitting {
        "Submitting..."
    } else {
        "Submit answers"
    };

    rsx! {
        div { class: "question-flow", tabindex: "0", onkeydown: on_key,
            if let Some(error) = view.error.clone() {
                ErrorBanner { error, on_retry: move |()| dispatch.call(FlowIntent::Retry) }
            }
            if view.loading {
                div { class: "loading", "Loading question..." }
            }
            if view.question_id.is_none() {
                if !view.loading {
                    p { class: "empty", "No question loaded yet." }
                }
            } else {
                div { class: "stage-tabs",
                    for tab in view.stages {
                        button {
                            key: "{tab.stage}",
                            class: stage_tab_class(&tab),
                            disabled: !tab.unlocked,
                            onclick: move |_| dispatch.call(FlowIntent::Navigate(tab.stage)),
                            {stage_title(tab.stage)}
                        }
                    }
                }
                Sentence { text: view.sentence.clone(), on_word }
                {
                    match view.active_stage {
                        Stage::WordChoice => rsx! {
                            if let Some(choice) = view.word_choice.clone() {
                                ChoicePanel {
                                    choice,
                                    submit_label: "Lock in word",
                                    on_select: move |text| dispatch.call(FlowIntent::Select(Stage::WordChoice, text)),
                                    on_submit: move |()| dispatch.call(FlowIntent::Submit(Stage::WordChoice)),
                                }
                            }
                        },
                        Stage::Translation => rsx! {
                            if let Some(choice) = view.translation.clone() {
                                ChoicePanel {
                                    choice,
                                    submit_label: translation_label,
                                    on_select: move |text| dispatch.call(FlowIntent::Select(Stage::Translation, text)),
                                    on_submit: move |()| dispatch.call(FlowIntent::Submit(Stage::Translation)),
                                }
                            }
                        },
                        Stage::Explanation => rsx! {
                            if let Some(explanation) = view.explanation.clone() {
                                ExplanationPanel { explanation }
                            }
                        },
                    }
                }
                div { class: "flow-actions",
                    button {
                        class: "btn secondary",
                        disabled: busy,
                        onclick: move |_| dispatch.call(FlowIntent::Next),
                        "Next question"
                    }
                }
            }
        }
    }
}

#[component]
fn Sentence(text: String, on_word: EventHandler<String>) -> Element {
    let parts = tokenize_sentence(&text);
    rsx! {
        p { class: "sentence",
            for (idx, part) in parts.into_iter().enumerate() {
                {
                    match part {
                        SentencePart::Word(word) => {
                            let lookup = clean_word(&word);
                            rsx! {
                                span {
                                    key: "{idx}",
                                    class: "word",
                                    onclick: move |_| {
                                        if let Some(word) = lookup.clone() {
                                            on_word.call(word);
                                        }
                                    },
                                    "{word}"
                                }
                            }
                        }
                        SentencePart::Blank(blank) => rsx! {
                            span { key: "{idx}", class: "blank", "{blank}" }
                        },
                        SentencePart::Space(space) => rsx! {
                            span { key: "{idx}", class: "space", "{space}" }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn ChoicePanel(
    choice: ChoiceView,
    submit_label: &'static str,
    on_select: EventHandler<String>,
    on_submit: EventHandler<()>,
) -> Element {
    let verdict = verdict_label(choice.is_correct);
    rsx! {
        section { class: "choice-panel",
            if let Some(prompt) = choice.prompt.as_ref() {
                h3 { class: "prompt", "{prompt}" }
            }
            div { class: "candidates",
                for (idx, candidate) in choice.candidates.iter().cloned().enumerate() {
                    button {
                        key: "{idx}",
                        class: candidate_class(&candidate),
                        disabled: !candidate.enabled,
                        onclick: {
                            let text = candidate.text.clone();
                            move |_| on_select.call(text.clone())
                        },
                        if let Some(label) = shortcut_label(idx) {
                            span { class: "shortcut", "{label}" }
                        }
                        "{candidate.text}"
                    }
                }
            }
            if let Some(verdict) = verdict {
                p { class: "verdict", "{verdict}" }
            }
            if !choice.locked {
                button {
                    class: "btn primary",
                    disabled: !choice.can_submit,
                    onclick: move |_| on_submit.call(()),
                    "{submit_label}"
                }
            }
        }
    }
}

#[component]
fn ExplanationPanel(explanation: ExplanationView) -> Element {
    let word_verdict = verdict_label(Some(explanation.word_choice_correct)).unwrap_or_default();
    let translation_verdict =
        verdict_label(Some(explanation.translation_correct)).unwrap_or_default();
    rsx! {
        section { class: "explanation-panel",
            div { class: "explanation-block",
                h3 { "Word choice: {word_verdict}" }
                p { class: "answer", "{explanation.correct_word}" }
                p { "{explanation.word_choice_explanation}" }
            }
            div { class: "explanation-block",
                h3 { "Translation: {translation_verdict}" }
                p { class: "answer", "{explanation.correct_translation}" }
                if explanation.translation_explanation != explanation.word_choice_explanation {
                    p { "{explanation.translation_explanation}" }
                }
            }
            if !explanation.grammar_points.is_empty() {
                div { class: "explanation-block",
                    h3 { "Grammar points" }
                    ul {
                        for point in explanation.grammar_points.iter() {
                            li { key: "{point}", "{point}" }
                        }
                    }
                }
            }
            if !explanation.vocabulary.is_empty() {
                div { class: "explanation-block",
                    h3 { "Vocabulary" }
                    ul {
                        for entry in explanation.vocabulary.iter() {
                            li { key: "{entry.term}",
                                strong { "{entry.term}" }
                                if let Some(pronunciation) = entry.pronunciation.as_ref() {
                                    span { class: "pronunciation", " {pronunciation}" }
                                }
                                " {entry.gloss}"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ErrorBanner(error: ErrorView, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "error-banner", role: "alert",
            p { "{error.message}" }
            p { class: "hint", {error_hint(&error)} }
            if error.retryable {
                button { class: "btn", onclick: move |_| on_retry.call(()), "Retry" }
            }
        }
    }
}
