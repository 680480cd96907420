mod question_vm;
mod shell_vm;

pub use question_vm::{
    MAX_REVIEW_COUNT, OptionVm, candidate_class, date_window_options,
    difficulty_filter_value, difficulty_options, error_hint, matching_label,
    mistake_difficulty_options, parse_difficulty_filter, parse_grammar_focus,
    parse_question_count, score_label, shortcut_label, stage_tab_class, stage_title,
    topic_options, verdict_label,
};
pub use shell_vm::{APP_TITLE, backend_label, not_found_label, sign_in_label};
