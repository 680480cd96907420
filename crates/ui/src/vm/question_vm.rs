use quiz_core::Stage;
use quiz_core::model::{CandidateMark, Difficulty, Topic};
use services::sessions::{CandidateView, ErrorView, StageTab};
use services::sources::{DateWindow, Score};
use services::FailureKind;

pub const MAX_REVIEW_COUNT: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub value: &'static str,
    pub label: &'static str,
}

#[must_use]
pub fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::WordChoice => "1. Word choice",
        Stage::Translation => "2. Translation",
        Stage::Explanation => "3. Explanation",
    }
}

#[must_use]
pub fn stage_tab_class(tab: &StageTab) -> &'static str {
    if tab.active {
        "stage-tab active"
    } else if !tab.unlocked {
        "stage-tab disabled"
    } else if tab.locked {
        "stage-tab done"
    } else {
        "stage-tab"
    }
}

#[must_use]
pub fn candidate_class(candidate: &CandidateView) -> &'static str {
    match (candidate.mark, candidate.selected) {
        (Some(CandidateMark::Correct), _) => "candidate correct",
        (Some(CandidateMark::Wrong), _) => "candidate wrong",
        (Some(CandidateMark::Neutral), _) => "candidate neutral",
        (None, true) => "candidate selected",
        (None, false) => "candidate",
    }
}

/// Keyboard shortcut label for the candidate at `idx`, if it has one.
#[must_use]
pub fn shortcut_label(idx: usize) -> Option<char> {
    u32::try_from(idx + 1)
        .ok()
        .filter(|n| *n <= 9)
        .and_then(|n| char::from_digit(n, 10))
}

#[must_use]
pub fn verdict_label(correct: Option<bool>) -> Option<&'static str> {
    correct.map(|ok| if ok { "Correct" } else { "Incorrect" })
}

#[must_use]
pub fn topic_options() -> Vec<OptionVm> {
    Topic::ALL
        .into_iter()
        .map(|topic| OptionVm {
            value: topic.as_str(),
            label: topic.label(),
        })
        .collect()
}

#[must_use]
pub fn difficulty_options() -> Vec<OptionVm> {
    Difficulty::ALL
        .into_iter()
        .map(|difficulty| OptionVm {
            value: difficulty.as_str(),
            label: difficulty.label(),
        })
        .collect()
}

pub const ANY_DIFFICULTY: &str = "all";

/// Difficulty options for saved mistakes, led by a catch-all entry.
#[must_use]
pub fn mistake_difficulty_options() -> Vec<OptionVm> {
    let mut options = vec![OptionVm {
        value: ANY_DIFFICULTY,
        label: "All difficulties",
    }];
    options.extend(difficulty_options());
    options
}

/// `None` for the catch-all entry or anything unrecognised.
#[must_use]
pub fn parse_difficulty_filter(raw: &str) -> Option<Difficulty> {
    raw.parse().ok()
}

#[must_use]
pub fn difficulty_filter_value(difficulty: Option<Difficulty>) -> &'static str {
    difficulty.map_or(ANY_DIFFICULTY, Difficulty::as_str)
}

#[must_use]
pub fn date_window_options() -> Vec<OptionVm> {
    DateWindow::ALL
        .into_iter()
        .map(|window| OptionVm {
            value: window.as_str(),
            label: window.label(),
        })
        .collect()
}

#[must_use]
pub fn matching_label(matching: usize, total: usize) -> String {
    if matching == total {
        format!("{total} saved")
    } else {
        format!("{matching} of {total} match")
    }
}

/// Split a comma separated grammar focus field into tags.
#[must_use]
pub fn parse_grammar_focus(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Question count from a form field, clamped to `1..=MAX_REVIEW_COUNT`.
#[must_use]
pub fn parse_question_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .map(|count| count.clamp(1, MAX_REVIEW_COUNT))
}

#[must_use]
pub fn score_label(score: Score) -> String {
    if score.answered == 0 {
        return "No answers yet".to_string();
    }
    format!(
        "Answered {} · words {}/{} · translations {}/{}",
        score.answered,
        score.word_choice_correct,
        score.answered,
        score.translation_correct,
        score.answered
    )
}

#[must_use]
pub fn error_hint(error: &ErrorView) -> &'static str {
    match error.kind {
        FailureKind::TransientNetwork => "Check your connection and try again.",
        FailureKind::Validation => "Try different filters or load another question.",
        FailureKind::Authentication => "Please log in again.",
        FailureKind::IllegalTransition => "That action is not available right now.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mark: Option<CandidateMark>, selected: bool) -> CandidateView {
        CandidateView {
            text: "x".into(),
            selected,
            mark,
            enabled: mark.is_none(),
        }
    }

    #[test]
    fn revealed_marks_win_over_selection() {
        assert_eq!(
            candidate_class(&candidate(Some(CandidateMark::Wrong), true)),
            "candidate wrong"
        );
        assert_eq!(
            candidate_class(&candidate(Some(CandidateMark::Correct), false)),
            "candidate correct"
        );
        assert_eq!(candidate_class(&candidate(None, true)), "candidate selected");
        assert_eq!(candidate_class(&candidate(None, false)), "candidate");
    }

    #[test]
    fn tab_classes_follow_lock_state() {
        let tab = StageTab {
            stage: Stage::Translation,
            unlocked: false,
            locked: false,
            active: false,
        };
        assert_eq!(stage_tab_class(&tab), "stage-tab disabled");
        assert_eq!(
            stage_tab_class(&StageTab {
                unlocked: true,
                locked: true,
                ..tab
            }),
            "stage-tab done"
        );
        assert_eq!(
            stage_tab_class(&StageTab {
                unlocked: true,
                active: true,
                ..tab
            }),
            "stage-tab active"
        );
    }

    #[test]
    fn shortcuts_stop_at_nine() {
        assert_eq!(shortcut_label(0), Some('1'));
        assert_eq!(shortcut_label(8), Some('9'));
        assert_eq!(shortcut_label(9), None);
    }

    #[test]
    fn grammar_focus_splits_on_commas() {
        assert_eq!(
            parse_grammar_focus(" passive voice, ,conditionals;inversion "),
            vec!["passive voice", "conditionals", "inversion"]
        );
        assert!(parse_grammar_focus("  ").is_empty());
    }

    #[test]
    fn question_count_is_clamped() {
        assert_eq!(parse_question_count("5"), Some(5));
        assert_eq!(parse_question_count("0"), Some(1));
        assert_eq!(parse_question_count("500"), Some(MAX_REVIEW_COUNT));
        assert_eq!(parse_question_count("five"), None);
    }

    #[test]
    fn option_lists_cover_every_variant() {
        let topics = topic_options();
        assert_eq!(topics.len(), Topic::ALL.len());
        assert_eq!(topics[0].value, "general");
        assert_eq!(difficulty_options()[1].label, "Medium");
    }

    #[test]
    fn score_label_formats_tally() {
        assert_eq!(score_label(Score::default()), "No answers yet");
        let score = Score {
            answered: 3,
            word_choice_correct: 2,
            translation_correct: 1,
        };
        assert_eq!(
            score_label(score),
            "Answered 3 · words 2/3 · translations 1/3"
        );
    }

    #[test]
    fn mistake_difficulty_starts_with_catch_all() {
        let options = mistake_difficulty_options();
        assert_eq!(options[0].value, ANY_DIFFICULTY);
        assert_eq!(options.len(), Difficulty::ALL.len() + 1);
        assert_eq!(parse_difficulty_filter(ANY_DIFFICULTY), None);
        assert_eq!(parse_difficulty_filter("hard"), Some(Difficulty::Hard));
        assert_eq!(difficulty_filter_value(None), ANY_DIFFICULTY);
        assert_eq!(difficulty_filter_value(Some(Difficulty::Easy)), "easy");
    }

    #[test]
    fn date_window_options_cover_every_window() {
        let values: Vec<_> = date_window_options().iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["all", "today", "week", "month"]);
    }

    #[test]
    fn matching_label_shows_filtered_share() {
        assert_eq!(matching_label(4, 4), "4 saved");
        assert_eq!(matching_label(1, 4), "1 of 4 match");
    }

    #[test]
    fn hints_depend_on_failure_kind() {
        let error = ErrorView {
            kind: FailureKind::Authentication,
            message: "authentication required".into(),
            retryable: false,
            retry: None,
        };
        assert_eq!(error_hint(&error), "Please log in again.");
    }
}
