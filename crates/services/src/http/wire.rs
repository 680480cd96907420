//! JSON shapes exchanged with the practice backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    Difficulty, Question, QuestionDraft, QuestionError, QuestionId, Topic, TranslationStage,
    WordChoiceStage,
};

use crate::sources::{AnswerSubmission, MistakeRecord, SubmissionReceipt};

pub(crate) const WORD_CHOICE_PROMPT: &str = "Choose the best word for the blank:";

/// Ids arrive as integers from the database-backed endpoints and as strings
/// from the cache; both map onto the opaque `QuestionId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for QuestionId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => QuestionId::new(n.to_string()),
            RawId::Text(s) => QuestionId::new(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SentenceDto {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub grammar_point: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PracticeQuestionDto {
    pub id: RawId,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub translation_options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_translation: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub knowledge_point: Option<String>,
    #[serde(default)]
    pub sentence: Option<SentenceDto>,
}

impl PracticeQuestionDto {
    /// The backend does not echo the topic, so the caller passes the one it
    /// asked for.
    pub(crate) fn into_question(self, topic: Option<Topic>) -> Result<Question, QuestionError> {
        let sentence = self.sentence.unwrap_or(SentenceDto {
            text: None,
            grammar_point: None,
            difficulty: None,
        });
        let explanation = self.explanation.unwrap_or_default();
        let grammar_points = self
            .knowledge_point
            .or(sentence.grammar_point)
            .filter(|point| !point.trim().is_empty())
            .into_iter()
            .collect();
        let difficulty = self.difficulty.or(sentence.difficulty);

        QuestionDraft {
            id: self.id.into(),
            sentence: self.question_text.or(sentence.text).unwrap_or_default(),
            word_choice: WordChoiceStage {
                prompt: WORD_CHOICE_PROMPT.to_string(),
                candidates: self.options.unwrap_or_default(),
                correct_answer: self.correct_answer.unwrap_or_default(),
                explanation: explanation.clone(),
            },
            translation: TranslationStage {
                candidates: self.translation_options.unwrap_or_default(),
                correct_answer: self.correct_translation.unwrap_or_default(),
                explanation,
            },
            grammar_points,
            vocabulary: Vec::new(),
            difficulty: parse_difficulty(difficulty.as_deref()),
            topic,
        }
        .validate()
    }
}

/// One entry of `GET mistakes/`.
#[derive(Debug, Deserialize)]
pub(crate) struct MistakeRecordDto {
    pub question_id: RawId,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub correct_translation: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub grammar_points: Option<Vec<String>>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub translation_options: Option<Vec<String>>,
    #[serde(default)]
    pub answered_at: Option<String>,
}

impl MistakeRecordDto {
    pub(crate) fn into_record(self) -> Result<MistakeRecord, QuestionError> {
        let answered_at = self.answered_at.as_deref().and_then(parse_timestamp);
        let question = self.into_question()?;
        Ok(MistakeRecord {
            question,
            answered_at,
        })
    }

    fn into_question(self) -> Result<Question, QuestionError> {
        let explanation = self.explanation.unwrap_or_default();
        let sentence = self
            .question_text
            .filter(|text| !text.trim().is_empty())
            .or(self.sentence)
            .unwrap_or_default();

        QuestionDraft {
            id: self.question_id.into(),
            sentence,
            word_choice: WordChoiceStage {
                prompt: WORD_CHOICE_PROMPT.to_string(),
                candidates: self.options.unwrap_or_default(),
                correct_answer: self.correct_answer.unwrap_or_default(),
                explanation: explanation.clone(),
            },
            translation: TranslationStage {
                candidates: self.translation_options.unwrap_or_default(),
                correct_answer: self.correct_translation.unwrap_or_default(),
                explanation,
            },
            grammar_points: self.grammar_points.unwrap_or_default(),
            vocabulary: Vec::new(),
            difficulty: parse_difficulty(self.difficulty.as_deref()),
            topic: self.topic.as_deref().and_then(|raw| raw.parse().ok()),
        }
        .validate()
    }
}

/// RFC 3339, or a naive ISO timestamp which the backend writes in UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|at| at.and_utc())
        })
}

fn parse_difficulty(raw: Option<&str>) -> Option<Difficulty> {
    raw.and_then(|raw| raw.parse().ok())
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerDto<'a> {
    pub question_id: &'a str,
    pub selected_word_answer: &'a str,
    pub selected_translation_answer: &'a str,
    pub answered_at: DateTime<Utc>,
}

impl<'a> From<&'a AnswerSubmission> for SubmitAnswerDto<'a> {
    fn from(submission: &'a AnswerSubmission) -> Self {
        Self {
            question_id: submission.question_id.as_str(),
            selected_word_answer: &submission.word_choice_answer,
            selected_translation_answer: &submission.translation_answer,
            answered_at: submission.answered_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluatedAnswerDto {
    #[serde(default)]
    pub is_correct: Option<bool>,
}

/// An empty evaluation list means the backend dropped the answer.
pub(crate) fn receipt_from(evaluated: Vec<EvaluatedAnswerDto>) -> SubmissionReceipt {
    let correct = evaluated.first().and_then(|answer| answer.is_correct);
    SubmissionReceipt {
        accepted: !evaluated.is_empty(),
        correct,
        feedback: correct.map(|ok| if ok { "Correct" } else { "Incorrect" }.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Detail>,
    #[serde(default)]
    error: Option<String>,
}

/// Human-readable message from an error body, if it carries one.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            let text = body.trim();
            return (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string());
        }
    };
    let message = match parsed.detail {
        Some(Detail::Text(text)) => Some(text),
        Some(Detail::Items(items)) => {
            let joined = items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; ");
            Some(joined)
        }
        None => parsed.error,
    };
    message.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Stage;

    const QUESTION_JSON: &str = r#"{
        "id": 17,
        "sentence_id": 4,
        "question_text": "He insisted that the work ____ done by Friday.",
        "options": ["was", "is", "were", "be"],
        "correct_answer": "be",
        "explanation": "Subjunctive after 'insisted that'.",
        "translation_options": ["a", "b", "c"],
        "correct_translation": "a",
        "difficulty": "medium",
        "knowledge_point": "Subjunctive Mood"
    }"#;

    #[test]
    fn practice_question_converts() {
        let dto: PracticeQuestionDto = serde_json::from_str(QUESTION_JSON).unwrap();
        let question = dto.into_question(Some(Topic::Culture)).unwrap();

        assert_eq!(question.id().as_str(), "17");
        assert_eq!(question.word_choice().prompt, WORD_CHOICE_PROMPT);
        assert_eq!(question.correct_answer(Stage::WordChoice), Some("be"));
        assert_eq!(question.translation().explanation, question.word_choice().explanation);
        assert_eq!(question.grammar_points(), ["Subjunctive Mood".to_string()]);
        assert_eq!(question.difficulty(), Some(Difficulty::Medium));
        assert_eq!(question.topic(), Some(Topic::Culture));
    }

    #[test]
    fn practice_question_with_string_id_and_nested_sentence() {
        let json = r#"{
            "id": "cache-9",
            "options": ["x", "y"],
            "correct_answer": "y",
            "translation_options": ["t"],
            "correct_translation": "t",
            "sentence": {"id": 3, "text": "A ____ B", "translation": "...", "grammar_point": "articles", "difficulty": "hard"}
        }"#;
        let dto: PracticeQuestionDto = serde_json::from_str(json).unwrap();
        let question = dto.into_question(None).unwrap();
        assert_eq!(question.id().as_str(), "cache-9");
        assert_eq!(question.sentence(), "A ____ B");
        assert_eq!(question.grammar_points(), ["articles".to_string()]);
        assert_eq!(question.difficulty(), Some(Difficulty::Hard));
    }

    #[test]
    fn practice_question_missing_translation_is_invalid() {
        let json = r#"{"id": 1, "options": ["x"], "correct_answer": "x"}"#;
        let dto: PracticeQuestionDto = serde_json::from_str(json).unwrap();
        assert!(matches!(
            dto.into_question(None),
            Err(QuestionError::NoCandidates {
                stage: Stage::Translation
            })
        ));
    }

    #[test]
    fn mistake_record_converts() {
        let json = r#"{
            "id": "55",
            "question_id": 12,
            "sentence": "The report was finished.",
            "question_type": "word_choice",
            "question_text": "The report ____ finished.",
            "selected_word_answer": "is",
            "correct_answer": "was",
            "correct_translation": "t1",
            "explanation": "Past tense.",
            "grammar_points": ["past simple passive"],
            "answered_at": "2024-05-01T10:00:00",
            "difficulty": "easy",
            "topic": "history",
            "options": ["is", "was"],
            "translation_options": ["t1", "t2"]
        }"#;
        let dto: MistakeRecordDto = serde_json::from_str(json).unwrap();
        let record = dto.into_record().unwrap();
        assert_eq!(
            record.answered_at.map(|at| at.to_rfc3339()),
            Some("2024-05-01T10:00:00+00:00".to_string())
        );
        let question = record.question;
        assert_eq!(question.id().as_str(), "12");
        assert_eq!(question.sentence(), "The report ____ finished.");
        assert_eq!(question.topic(), Some(Topic::History));
        assert_eq!(question.difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn timestamps_accept_offsets_and_naive_utc() {
        let offset = parse_timestamp("2024-01-15T16:30:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2024-01-15T14:30:00+00:00");
        let naive = parse_timestamp("2024-01-15T14:30:00.250").unwrap();
        assert_eq!(naive.timestamp(), offset.timestamp());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn mistake_without_timestamp_still_converts() {
        let json = r#"{
            "question_id": "Q9",
            "question_text": "It ____ raining.",
            "correct_answer": "is",
            "correct_translation": "t1",
            "options": ["is", "are"],
            "translation_options": ["t1"],
            "answered_at": "not a date"
        }"#;
        let dto: MistakeRecordDto = serde_json::from_str(json).unwrap();
        let record = dto.into_record().unwrap();
        assert!(record.answered_at.is_none());
        assert_eq!(record.question.id().as_str(), "Q9");
    }

    #[test]
    fn submission_serializes_backend_field_names() {
        let submission = AnswerSubmission {
            question_id: QuestionId::new("17"),
            word_choice_answer: "be".into(),
            translation_answer: "a".into(),
            answered_at: quiz_core::time::fixed_now(),
        };
        let value = serde_json::to_value([SubmitAnswerDto::from(&submission)]).unwrap();
        assert_eq!(value[0]["question_id"], "17");
        assert_eq!(value[0]["selected_word_answer"], "be");
        assert_eq!(value[0]["selected_translation_answer"], "a");
        assert!(value[0]["answered_at"].is_string());
    }

    #[test]
    fn empty_evaluation_is_not_accepted() {
        assert!(!receipt_from(Vec::new()).accepted);

        let receipt = receipt_from(vec![EvaluatedAnswerDto {
            is_correct: Some(false),
        }]);
        assert!(receipt.accepted);
        assert_eq!(receipt.correct, Some(false));
    }

    #[test]
    fn detail_variants() {
        assert_eq!(
            detail_from_body(r#"{"detail": "Could not retrieve a question"}"#).as_deref(),
            Some("Could not retrieve a question")
        );
        assert_eq!(
            detail_from_body(r#"{"detail": [{"loc": ["query"], "msg": "bad value", "type": "x"}]}"#)
                .as_deref(),
            Some("bad value")
        );
        assert_eq!(
            detail_from_body(r#"{"error": "boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(detail_from_body("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(detail_from_body(""), None);
        assert_eq!(detail_from_body("{}"), None);
    }
}
