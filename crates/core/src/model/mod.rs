mod filter;
mod ids;
mod question;
pub mod words;

pub use filter::{Difficulty, FilterCriteria, FilterParseError, Topic};
pub use ids::QuestionId;
pub use question::{
    CandidateMark, Question, QuestionDraft, QuestionError, TranslationStage, VocabEntry,
    WordChoiceStage,
};

#[cfg(test)]
pub(crate) use question::fixtures;
