use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use rand::rng;
use rand::seq::IndexedRandom;

use quiz_core::Clock;
use quiz_core::model::{Difficulty, FilterCriteria, Question};

use crate::auth::AuthToken;
use crate::error::ServiceError;
use crate::sources::QuestionSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationMode {
    #[default]
    Sequential,
    Random,
}

/// A question the learner got wrong, with when they answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistakeRecord {
    pub question: Question,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<Question> for MistakeRecord {
    fn from(question: Question) -> Self {
        Self {
            question,
            answered_at: None,
        }
    }
}

//
// ─── FILTERS ───────────────────────────────────────────────────────────────────
//

/// How far back `answered_at` may lie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateWindow {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl DateWindow {
    pub const ALL: [DateWindow; 4] = [
        DateWindow::All,
        DateWindow::Today,
        DateWindow::Week,
        DateWindow::Month,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DateWindow::All => "all",
            DateWindow::Today => "today",
            DateWindow::Week => "week",
            DateWindow::Month => "month",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DateWindow::All => "Any time",
            DateWindow::Today => "Today",
            DateWindow::Week => "Past 7 days",
            DateWindow::Month => "Past month",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|window| window.as_str() == needle)
    }

    /// Earliest accepted `answered_at`, or `None` when every record passes.
    ///
    /// `Today` starts at midnight UTC.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateWindow::All => None,
            DateWindow::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            DateWindow::Week => Some(now - Duration::days(7)),
            DateWindow::Month => now.checked_sub_months(Months::new(1)),
        }
    }
}

/// Filters that only make sense for saved mistakes. Topic and grammar focus
/// still come from the `FilterCriteria` of each fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MistakeFilter {
    /// `None` keeps every difficulty.
    pub difficulty: Option<Difficulty>,
    pub window: DateWindow,
}

impl MistakeFilter {
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

//
// ─── SOURCE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Default)]
struct Cursor {
    last: Option<usize>,
    back: bool,
}

/// Replays questions the learner previously got wrong.
///
/// Topic `General` matches every record; grammar focus tags match by
/// case-insensitive substring against the question's grammar points. A date
/// window drops records without a timestamp.
pub struct MistakeSource {
    records: Vec<MistakeRecord>,
    mode: NavigationMode,
    filter: MistakeFilter,
    clock: Clock,
    cursor: Mutex<Cursor>,
}

impl MistakeSource {
    #[must_use]
    pub fn new<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MistakeRecord>,
    {
        Self {
            records: records.into_iter().map(Into::into).collect(),
            mode: NavigationMode::Sequential,
            filter: MistakeFilter::default(),
            clock: Clock::system(),
            cursor: Mutex::new(Cursor::default()),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: MistakeFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    #[must_use]
    pub fn filter(&self) -> MistakeFilter {
        self.filter
    }

    #[must_use]
    pub fn records(&self) -> &[MistakeRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records the given filters would cycle through.
    #[must_use]
    pub fn matching_count(&self, criteria: &FilterCriteria) -> usize {
        self.matching(criteria).len()
    }

    /// Make the next fetch step one record back instead of forward. Random
    /// mode ignores the direction.
    pub fn step_back(&self) {
        if let Ok(mut cursor) = self.cursor.lock() {
            cursor.back = true;
        }
    }

    fn matching(&self, criteria: &FilterCriteria) -> Vec<usize> {
        let cutoff = self.filter.window.cutoff(self.clock.now());
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| matches_filters(&record.question, criteria))
            .filter(|(_, record)| {
                self.filter
                    .difficulty
                    .is_none_or(|wanted| record.question.difficulty() == Some(wanted))
            })
            .filter(|(_, record)| {
                cutoff.is_none_or(|cutoff| record.answered_at.is_some_and(|at| at >= cutoff))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    fn pick(&self, matching: &[usize], last: Option<usize>, back: bool) -> Option<usize> {
        match self.mode {
            NavigationMode::Sequential if back => {
                let before = last.unwrap_or(usize::MAX);
                matching
                    .iter()
                    .rev()
                    .copied()
                    .find(|idx| *idx < before)
                    .or_else(|| matching.last().copied())
            }
            NavigationMode::Sequential => {
                let after = last.map_or(0, |idx| idx + 1);
                matching
                    .iter()
                    .copied()
                    .find(|idx| *idx >= after)
                    .or_else(|| matching.first().copied())
            }
            NavigationMode::Random => {
                let fresh: Vec<usize> = matching
                    .iter()
                    .copied()
                    .filter(|idx| Some(*idx) != last)
                    .collect();
                let pool: &[usize] = if fresh.is_empty() { matching } else { &fresh };
                pool.choose(&mut rng()).copied()
            }
        }
    }
}

pub(crate) fn matches_filters(question: &Question, criteria: &FilterCriteria) -> bool {
    if let Some(topic) = criteria.topic_filter() {
        if question.topic() != Some(topic) {
            return false;
        }
    }
    matches_grammar_focus(question, &criteria.grammar_focus)
}

pub(crate) fn matches_grammar_focus(question: &Question, focus: &[String]) -> bool {
    if focus.is_empty() {
        return true;
    }
    question.grammar_points().iter().any(|point| {
        let point = point.to_lowercase();
        focus.iter().any(|tag| point.contains(&tag.to_lowercase()))
    })
}

#[async_trait]
impl QuestionSource for MistakeSource {
    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        _token: &AuthToken,
    ) -> Result<Question, ServiceError> {
        let matching = self.matching(criteria);
        let mut cursor = self
            .cursor
            .lock()
            .map_err(|e| ServiceError::transient(e.to_string()))?;
        let back = std::mem::take(&mut cursor.back);
        let idx = self
            .pick(&matching, cursor.last, back)
            .ok_or_else(|| ServiceError::Validation("no questions match the current filters".into()))?;
        cursor.last = Some(idx);
        Ok(self.records[idx].question.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quiz_core::model::{QuestionDraft, QuestionId, Topic, TranslationStage, WordChoiceStage};
    use quiz_core::time::fixed_now;

    fn mistake(id: &str, topic: Topic, grammar: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            sentence: format!("sentence {id}"),
            word_choice: WordChoiceStage {
                prompt: "pick".into(),
                candidates: vec!["a".into(), "b".into()],
                correct_answer: "a".into(),
                explanation: String::new(),
            },
            translation: TranslationStage {
                candidates: vec!["t".into()],
                correct_answer: "t".into(),
                explanation: String::new(),
            },
            grammar_points: vec![grammar.to_string()],
            vocabulary: Vec::new(),
            difficulty: Some(Difficulty::Medium),
            topic: Some(topic),
        }
        .validate()
        .unwrap()
    }

    async fn ids(source: &MistakeSource, criteria: &FilterCriteria, n: usize) -> Vec<String> {
        let token = AuthToken::missing();
        let mut seen = Vec::with_capacity(n);
        for _ in 0..n {
            let question = source.fetch(criteria, &token).await.unwrap();
            seen.push(question.id().to_string());
        }
        seen
    }

    fn pool() -> Vec<Question> {
        vec![
            mistake("M1", Topic::Grammar, "Relative clauses"),
            mistake("M2", Topic::Technology, "Present perfect continuous"),
            mistake("M3", Topic::Grammar, "Subjunctive mood"),
        ]
    }

    fn dated(question: Question, days_ago: i64) -> MistakeRecord {
        MistakeRecord {
            question,
            answered_at: Some(fixed_now() - Duration::days(days_ago)),
        }
    }

    #[tokio::test]
    async fn sequential_cycles_through_all_for_general_topic() {
        let source = MistakeSource::new(pool());
        let seen = ids(&source, &FilterCriteria::default(), 4).await;
        assert_eq!(seen, vec!["M1", "M2", "M3", "M1"]);
    }

    #[tokio::test]
    async fn topic_filter_limits_records() {
        let source = MistakeSource::new(pool());
        let criteria = FilterCriteria::default().with_topic(Topic::Grammar);
        assert_eq!(source.matching_count(&criteria), 2);
        assert_eq!(ids(&source, &criteria, 3).await, vec!["M1", "M3", "M1"]);
    }

    #[tokio::test]
    async fn grammar_focus_matches_substring_case_insensitively() {
        let source = MistakeSource::new(pool());
        let criteria = FilterCriteria::default().with_grammar_focus(["SUBJUNCTIVE"]);
        assert_eq!(ids(&source, &criteria, 2).await, vec!["M3", "M3"]);
    }

    #[tokio::test]
    async fn random_mode_avoids_immediate_repeat() {
        let source = MistakeSource::new(pool()).with_mode(NavigationMode::Random);
        let seen = ids(&source, &FilterCriteria::default(), 20).await;
        assert!(seen.windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[tokio::test]
    async fn no_match_is_validation_error() {
        let source = MistakeSource::new(pool());
        let criteria = FilterCriteria::default().with_topic(Topic::Life);
        let err = source
            .fetch(&criteria, &AuthToken::missing())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn step_back_moves_to_previous_record_and_wraps() {
        let source = MistakeSource::new(pool());
        let criteria = FilterCriteria::default();
        assert_eq!(ids(&source, &criteria, 2).await, vec!["M1", "M2"]);

        source.step_back();
        assert_eq!(ids(&source, &criteria, 1).await, vec!["M1"]);
        source.step_back();
        assert_eq!(ids(&source, &criteria, 1).await, vec!["M3"]);
        assert_eq!(ids(&source, &criteria, 1).await, vec!["M1"]);
    }

    #[tokio::test]
    async fn step_back_before_any_fetch_starts_at_the_end() {
        let source = MistakeSource::new(pool());
        let criteria = FilterCriteria::default().with_topic(Topic::Grammar);
        source.step_back();
        assert_eq!(ids(&source, &criteria, 2).await, vec!["M3", "M1"]);
    }

    #[tokio::test]
    async fn difficulty_filter_is_optional() {
        let mut hard = pool();
        hard.push(
            QuestionDraft {
                difficulty: Some(Difficulty::Hard),
                ..mistake_draft("M4")
            }
            .validate()
            .unwrap(),
        );

        let any = MistakeSource::new(hard.clone());
        assert_eq!(any.matching_count(&FilterCriteria::default()), 4);

        let only_hard = MistakeSource::new(hard)
            .with_filter(MistakeFilter::default().with_difficulty(Some(Difficulty::Hard)));
        assert_eq!(only_hard.matching_count(&FilterCriteria::default()), 1);
        assert_eq!(ids(&only_hard, &FilterCriteria::default(), 2).await, vec!["M4", "M4"]);
    }

    fn mistake_draft(id: &str) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(id),
            sentence: format!("sentence {id}"),
            word_choice: WordChoiceStage {
                prompt: "pick".into(),
                candidates: vec!["a".into()],
                correct_answer: "a".into(),
                explanation: String::new(),
            },
            translation: TranslationStage {
                candidates: vec!["t".into()],
                correct_answer: "t".into(),
                explanation: String::new(),
            },
            grammar_points: Vec::new(),
            vocabulary: Vec::new(),
            difficulty: None,
            topic: None,
        }
    }

    #[tokio::test]
    async fn date_window_keeps_recent_records_only() {
        let [m1, m2, m3] = <[Question; 3]>::try_from(pool()).unwrap();
        let records = vec![
            dated(m1, 0),
            dated(m2, 3),
            dated(m3, 20),
            MistakeRecord::from(mistake("M4", Topic::Life, "undated")),
        ];
        let source = |window| {
            MistakeSource::new(records.clone())
                .with_clock(Clock::fixed(fixed_now()))
                .with_filter(MistakeFilter::default().with_window(window))
        };
        let criteria = FilterCriteria::default();

        assert_eq!(source(DateWindow::All).matching_count(&criteria), 4);
        assert_eq!(source(DateWindow::Today).matching_count(&criteria), 1);
        assert_eq!(source(DateWindow::Week).matching_count(&criteria), 2);
        assert_eq!(source(DateWindow::Month).matching_count(&criteria), 3);
        assert_eq!(
            ids(&source(DateWindow::Week), &criteria, 3).await,
            vec!["M1", "M2", "M1"]
        );
    }

    #[test]
    fn window_cutoffs() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 15, 45, 0).unwrap();
        assert_eq!(DateWindow::All.cutoff(now), None);
        assert_eq!(
            DateWindow::Today.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(
            DateWindow::Week.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 24, 15, 45, 0).unwrap())
        );
        assert_eq!(
            DateWindow::Month.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 15, 45, 0).unwrap())
        );
    }

    #[test]
    fn window_parses_its_own_names() {
        for window in DateWindow::ALL {
            assert_eq!(DateWindow::parse(window.as_str()), Some(window));
        }
        assert_eq!(DateWindow::parse(" Week "), Some(DateWindow::Week));
        assert_eq!(DateWindow::parse("decade"), None);
    }
}
