use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, QuestionId, Topic};
use crate::session::Stage;

//
// ─── STAGE PAYLOADS ────────────────────────────────────────────────────────────
//

/// Stage 0: pick the word that best fits the blank in the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordChoiceStage {
    pub prompt: String,
    pub candidates: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

/// Stage 1: pick the translation that matches the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStage {
    pub candidates: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub term: String,
    pub gloss: String,
    pub pronunciation: Option<String>,
}

/// How a candidate is rendered once its stage has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateMark {
    Correct,
    Wrong,
    Neutral,
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id is blank")]
    BlankId,

    #[error("{stage} has no candidates")]
    NoCandidates { stage: Stage },

    #[error("{stage} correct answer {answer:?} is not one of its candidates")]
    AnswerNotACandidate { stage: Stage, answer: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unchecked question as assembled by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub sentence: String,
    pub word_choice: WordChoiceStage,
    pub translation: TranslationStage,
    pub grammar_points: Vec<String>,
    pub vocabulary: Vec<VocabEntry>,
    pub difficulty: Option<Difficulty>,
    pub topic: Option<Topic>,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError` if the id is blank, a stage has no candidates,
    /// or a correct answer is missing from its candidate list.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.is_blank() {
            return Err(QuestionError::BlankId);
        }
        check_stage(
            Stage::WordChoice,
            &self.word_choice.candidates,
            &self.word_choice.correct_answer,
        )?;
        check_stage(
            Stage::Translation,
            &self.translation.candidates,
            &self.translation.correct_answer,
        )?;

        Ok(Question {
            id: self.id,
            sentence: self.sentence,
            word_choice: self.word_choice,
            translation: self.translation,
            grammar_points: self.grammar_points,
            vocabulary: self.vocabulary,
            difficulty: self.difficulty,
            topic: self.topic,
        })
    }
}

fn check_stage(stage: Stage, candidates: &[String], correct: &str) -> Result<(), QuestionError> {
    if candidates.is_empty() {
        return Err(QuestionError::NoCandidates { stage });
    }
    if !candidates.iter().any(|candidate| candidate == correct) {
        return Err(QuestionError::AnswerNotACandidate {
            stage,
            answer: correct.to_string(),
        });
    }
    Ok(())
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated, answerable question.
///
/// Questions are replaced wholesale, never edited; the fields are only
/// reachable through accessors so the stage invariants hold for the whole
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    sentence: String,
    word_choice: WordChoiceStage,
    translation: TranslationStage,
    grammar_points: Vec<String>,
    vocabulary: Vec<VocabEntry>,
    difficulty: Option<Difficulty>,
    topic: Option<Topic>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    #[must_use]
    pub fn word_choice(&self) -> &WordChoiceStage {
        &self.word_choice
    }

    #[must_use]
    pub fn translation(&self) -> &TranslationStage {
        &self.translation
    }

    #[must_use]
    pub fn grammar_points(&self) -> &[String] {
        &self.grammar_points
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[VocabEntry] {
        &self.vocabulary
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn topic(&self) -> Option<Topic> {
        self.topic
    }

    /// Candidates for an answerable stage; the explanation stage has none.
    #[must_use]
    pub fn candidates(&self, stage: Stage) -> &[String] {
        match stage {
            Stage::WordChoice => &self.word_choice.candidates,
            Stage::Translation => &self.translation.candidates,
            Stage::Explanation => &[],
        }
    }

    #[must_use]
    pub fn correct_answer(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::WordChoice => Some(&self.word_choice.correct_answer),
            Stage::Translation => Some(&self.translation.correct_answer),
            Stage::Explanation => None,
        }
    }

    #[must_use]
    pub fn is_candidate(&self, stage: Stage, value: &str) -> bool {
        self.candidates(stage).iter().any(|candidate| candidate == value)
    }

    #[must_use]
    pub fn is_correct(&self, stage: Stage, answer: &str) -> bool {
        self.correct_answer(stage) == Some(answer)
    }

    /// Marks for every candidate of `stage` once it has been revealed.
    ///
    /// The correct candidate is always `Correct`; the selected one is `Wrong`
    /// when it differs; everything else stays `Neutral`.
    #[must_use]
    pub fn marks(&self, stage: Stage, selected: Option<&str>) -> Vec<CandidateMark> {
        let correct = self.correct_answer(stage);
        self.candidates(stage)
            .iter()
            .map(|candidate| {
                if Some(candidate.as_str()) == correct {
                    CandidateMark::Correct
                } else if Some(candidate.as_str()) == selected {
                    CandidateMark::Wrong
                } else {
                    CandidateMark::Neutral
                }
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn draft(id: &str, word: &[&str], correct_word: &str) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(id),
            sentence: "He insisted that the work ____ done by Friday.".to_string(),
            word_choice: WordChoiceStage {
                prompt: "Choose the best word for the blank:".to_string(),
                candidates: word.iter().map(|s| (*s).to_string()).collect(),
                correct_answer: correct_word.to_string(),
                explanation: "Subjunctive after 'insisted that'.".to_string(),
            },
            translation: TranslationStage {
                candidates: vec!["t1".to_string(), "t2".to_string()],
                correct_answer: "t1".to_string(),
                explanation: "t1 keeps the mood.".to_string(),
            },
            grammar_points: vec!["subjunctive".to_string()],
            vocabulary: Vec::new(),
            difficulty: Some(Difficulty::Medium),
            topic: None,
        }
    }

    pub(crate) fn question(id: &str, word: &[&str], correct_word: &str) -> Question {
        draft(id, word, correct_word).validate().unwrap()
    }
}
