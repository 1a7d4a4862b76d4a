//! Shared QCM types.
//!
//! Field names on the wire follow the browser client (`question`, `correctAnswer`,
//! `selectedAnswer`, `qcmId`, ...), so these types can be (de)serialized directly
//! from and to request and response bodies.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// The `includeDifficulties` toggles sent by the exam form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyFilter {
    pub easy: bool,
    pub medium: bool,
    pub hard: bool,
}

impl DifficultyFilter {
    /// Difficulties switched on, in `easy`, `medium`, `hard` order.
    pub fn allowed(&self) -> Vec<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .filter(|d| match d {
                Difficulty::Easy => self.easy,
                Difficulty::Medium => self.medium,
                Difficulty::Hard => self.hard,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    #[serde(rename = "correctAnswer")]
    pub correct_answer_index: usize,
    #[serde(default)]
    pub competency: String,
    pub difficulty: Difficulty,
}

impl Question {
    /// Text of the correct option, if the index is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPool {
    pub subject: String,
    pub questions: Vec<Question>,
}

/// A single issued exam. Questions are copies of pool entries with their
/// options reordered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamInstance {
    pub id: String,
    pub subject: String,
    pub questions: Vec<Question>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    /// `None` if the question was left unanswered
    #[serde(rename = "selectedAnswer")]
    pub selected_answer_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "question")]
    pub question_text: String,
    /// `-1` on the wire when unanswered
    #[serde(rename = "studentAnswer", with = "unanswered_as_negative")]
    pub selected_answer_index: Option<usize>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer_index: usize,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub competency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(rename = "score")]
    pub score_percent: u8,
    #[serde(rename = "totalQuestions")]
    pub total_questions: usize,
    #[serde(rename = "correctAnswers")]
    pub correct_count: usize,
    #[serde(rename = "incorrectAnswers")]
    pub incorrect_count: usize,
    #[serde(rename = "answers")]
    pub per_question: Vec<QuestionResult>,
    /// Overall feedback first, then one line per question in exam order
    #[serde(rename = "feedback")]
    pub feedback_lines: Vec<String>,
    #[serde(rename = "completedAt")]
    pub completed_at: DateTime<Utc>,
    #[serde(rename = "qcmId")]
    pub exam_id: String,
}

/// Language of generated feedback text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Fr => write!(f, "fr"),
        }
    }
}

/// The browser client expects `-1` for a question left unanswered.
mod unanswered_as_negative {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<i64>::deserialize(deserializer)?;
        Ok(value.and_then(|i| usize::try_from(i).ok()))
    }
}
