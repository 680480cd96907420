use std::sync::Arc;

use quiz_core::Stage;
use quiz_core::model::{
    Difficulty, FilterCriteria, Question, QuestionDraft, QuestionId, Topic, TranslationStage,
    WordChoiceStage,
};
use services::{
    AuthToken, FailureKind, LoadOutcome, MistakeFilter, MistakeSource, ReviewSetSource,
    ScoreboardSink, SessionController, SubmitOutcome,
};

fn question(id: &str, topic: Topic, difficulty: Difficulty, grammar: &str) -> Question {
    QuestionDraft {
        id: QuestionId::new(id),
        sentence: format!("Sentence {id} with a ____."),
        word_choice: WordChoiceStage {
            prompt: "Choose the best word for the blank:".into(),
            candidates: vec!["right".into(), "wrong".into()],
            correct_answer: "right".into(),
            explanation: String::new(),
        },
        translation: TranslationStage {
            candidates: vec!["good".into(), "bad".into()],
            correct_answer: "good".into(),
            explanation: String::new(),
        },
        grammar_points: vec![grammar.into()],
        vocabulary: Vec::new(),
        difficulty: Some(difficulty),
        topic: Some(topic),
    }
    .validate()
    .unwrap()
}

fn pool() -> Vec<Question> {
    vec![
        question("M1", Topic::History, Difficulty::Easy, "past simple"),
        question("M2", Topic::Culture, Difficulty::Hard, "inversion"),
        question("M3", Topic::History, Difficulty::Hard, "past perfect"),
    ]
}

async fn answer(
    ctrl: &mut SessionController,
    token: &AuthToken,
    word: &str,
    translation: &str,
) -> SubmitOutcome {
    ctrl.select_word_choice(word).unwrap();
    ctrl.submit_word_choice().unwrap();
    ctrl.select_translation(translation).unwrap();
    ctrl.submit_final_answer(token).await.unwrap()
}

#[tokio::test]
async fn mistake_replay_grades_locally() {
    let questions = pool();
    let source = Arc::new(MistakeSource::new(questions.clone()));
    let sink = Arc::new(ScoreboardSink::new(questions));
    let mut ctrl = SessionController::new(source, sink.clone());
    let criteria = FilterCriteria::default().with_topic(Topic::History);
    let token = AuthToken::new("local");

    assert_eq!(ctrl.load_question(criteria, &token).await, LoadOutcome::Applied);
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M1");

    let outcome = answer(&mut ctrl, &token, "wrong", "good").await;
    let SubmitOutcome::Accepted { receipt, .. } = outcome else {
        panic!("expected acceptance, got {outcome:?}");
    };
    assert_eq!(receipt.correct, Some(false));
    ctrl.advance_to_explanation().unwrap();
    assert_eq!(ctrl.state().active_stage(), Stage::Explanation);

    assert_eq!(ctrl.request_next_question(&token).await, LoadOutcome::Applied);
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M3");
    assert_eq!(sink.score().answered, 1);
}

#[tokio::test]
async fn local_sources_still_require_a_token() {
    let questions = pool();
    let source = Arc::new(MistakeSource::new(questions.clone()));
    let sink = Arc::new(ScoreboardSink::new(questions));
    let mut ctrl = SessionController::new(source, sink);

    let outcome = ctrl
        .load_question(FilterCriteria::default(), &AuthToken::missing())
        .await;
    assert!(matches!(
        outcome,
        LoadOutcome::Failed(ref failure) if failure.kind() == FailureKind::Authentication
    ));
}

#[tokio::test]
async fn review_set_runs_to_exhaustion() {
    let questions = pool();
    let source = Arc::new(ReviewSetSource::new(questions.clone()));
    let sink = Arc::new(ScoreboardSink::new(questions));
    let mut ctrl = SessionController::new(source, sink.clone());
    let token = AuthToken::new("local");
    let criteria = FilterCriteria::default()
        .with_difficulty(Difficulty::Hard)
        .with_grammar_focus(["Perfect"])
        .with_question_count(2);

    let mut served = Vec::new();
    let mut outcome = ctrl.load_question(criteria, &token).await;
    while outcome == LoadOutcome::Applied {
        served.push(ctrl.state().question().unwrap().id().to_string());
        answer(&mut ctrl, &token, "right", "good").await;
        outcome = ctrl.request_next_question(&token).await;
    }

    assert_eq!(served, vec!["M3", "M1"]);
    assert!(matches!(
        outcome,
        LoadOutcome::Failed(ref failure) if failure.kind() == FailureKind::Validation
    ));
    let score = sink.score();
    assert_eq!(score.answered, 2);
    assert_eq!(score.word_choice_correct, 2);
    assert_eq!(sink.perfect(), 2);
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M1");
}

#[tokio::test]
async fn previous_mistake_through_the_controller() {
    let questions = pool();
    let source = Arc::new(
        MistakeSource::new(questions.clone())
            .with_filter(MistakeFilter::default().with_difficulty(Some(Difficulty::Hard))),
    );
    let sink = Arc::new(ScoreboardSink::new(questions));
    let mut ctrl = SessionController::new(source.clone(), sink);
    let token = AuthToken::new("local");

    assert_eq!(
        ctrl.load_question(FilterCriteria::default(), &token).await,
        LoadOutcome::Applied
    );
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M2");
    ctrl.request_next_question(&token).await;
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M3");

    source.step_back();
    assert_eq!(ctrl.request_next_question(&token).await, LoadOutcome::Applied);
    assert_eq!(ctrl.state().question().unwrap().id().as_str(), "M2");
    assert!(ctrl.state().word_choice().selection().is_none());
}
