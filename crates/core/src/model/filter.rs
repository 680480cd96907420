use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterParseError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// Fixed set of topics the question backend knows about.
///
/// `General` means "no particular topic" and is never sent as a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    Technology,
    Culture,
    History,
    Life,
    Grammar,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::General,
        Topic::Technology,
        Topic::Culture,
        Topic::History,
        Topic::Life,
        Topic::Grammar,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::Technology => "technology",
            Topic::Culture => "culture",
            Topic::History => "history",
            Topic::Life => "life",
            Topic::Grammar => "grammar",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::General => "General",
            Topic::Technology => "Technology",
            Topic::Culture => "Culture",
            Topic::History => "History",
            Topic::Life => "Life",
            Topic::Grammar => "Grammar",
        }
    }

    #[must_use]
    pub fn is_general(self) -> bool {
        matches!(self, Topic::General)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == needle)
            .ok_or_else(|| FilterParseError::UnknownTopic(s.to_string()))
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Advanced,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Advanced => "advanced",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == needle)
            .ok_or_else(|| FilterParseError::UnknownDifficulty(s.to_string()))
    }
}

//
// ─── FILTER CRITERIA ───────────────────────────────────────────────────────────
//

/// Parameters that pick which question the source hands out next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub grammar_focus: Vec<String>,
    pub question_count: Option<u32>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new(topic: Topic, difficulty: Difficulty) -> Self {
        Self {
            topic,
            difficulty,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Blank tags are dropped; the rest are trimmed.
    #[must_use]
    pub fn with_grammar_focus<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grammar_focus = tags
            .into_iter()
            .map(Into::into)
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = Some(count);
        self
    }

    /// Topic to send upstream, `None` for the catch-all topic.
    #[must_use]
    pub fn topic_filter(&self) -> Option<Topic> {
        (!self.topic.is_general()).then_some(self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_general_medium() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.topic, Topic::General);
        assert_eq!(criteria.difficulty, Difficulty::Medium);
        assert!(criteria.topic_filter().is_none());
    }

    #[test]
    fn topic_parses_case_insensitively() {
        assert_eq!("Culture".parse::<Topic>().unwrap(), Topic::Culture);
        assert!(matches!(
            "astrology".parse::<Topic>(),
            Err(FilterParseError::UnknownTopic(_))
        ));
    }

    #[test]
    fn difficulty_round_trips_through_str() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.as_str().parse::<Difficulty>().unwrap(), difficulty);
        }
    }

    #[test]
    fn grammar_focus_drops_blank_tags() {
        let criteria = FilterCriteria::default().with_grammar_focus([" passive ", "", "  "]);
        assert_eq!(criteria.grammar_focus, vec!["passive".to_string()]);
    }

    #[test]
    fn specific_topic_is_sent_as_filter() {
        let criteria = FilterCriteria::new(Topic::History, Difficulty::Hard);
        assert_eq!(criteria.topic_filter(), Some(Topic::History));
    }
}
