use std::collections::HashSet;

use qcm_schema::{Difficulty, Question, QuestionPool};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;

const DEFAULT_SUBJECT: &str = "Generated Exam";

/// Validate Question:
/// - `id` is not empty
/// - `text` is not empty
/// - at least two options, none of them empty
/// - `correct_answer_index` points at an option
pub fn validate_question(question: &Question) -> Result<(), Error> {
    if question.id.trim().is_empty() {
        return Err(Error::InvalidQuestion("question has empty id".into()));
    }
    if question.text.trim().is_empty() {
        return Err(Error::InvalidQuestion(format!(
            "question {} has empty text",
            question.id
        )));
    }
    if question.options.len() < 2 {
        return Err(Error::InvalidQuestion(format!(
            "question {} needs at least 2 options, has {}",
            question.id,
            question.options.len()
        )));
    }
    if let Some(position) = question.options.iter().position(|o| o.trim().is_empty()) {
        return Err(Error::InvalidQuestion(format!(
            "option {} of question {} has empty text",
            position, question.id
        )));
    }
    if question.correct_answer_index >= question.options.len() {
        return Err(Error::InvalidQuestion(format!(
            "question {} has correct answer {} but only {} options",
            question.id,
            question.correct_answer_index,
            question.options.len()
        )));
    }

    Ok(())
}

/// Builds a pool, rejecting malformed questions and duplicate ids.
pub fn build_pool(subject: String, questions: Vec<Question>) -> Result<QuestionPool, Error> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(questions.len());
    for question in &questions {
        validate_question(question).map_err(|e| Error::InvalidPool(e.to_string()))?;
        if !ids.insert(question.id.as_str()) {
            return Err(Error::InvalidPool(format!(
                "duplicate question id {}",
                question.id
            )));
        }
    }

    Ok(QuestionPool {
        subject,
        questions,
    })
}

/// Strictly reads a pool sent back by a client.
///
/// Unlike [`parse_question_bank`], any malformed question fails the whole pool.
pub fn pool_from_value(value: &Value) -> Result<QuestionPool, Error> {
    let Some(entries) = value.get("questions").and_then(Value::as_array) else {
        return Err(Error::InvalidPool("`questions` must be an array".into()));
    };
    let subject = value
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SUBJECT)
        .to_string();

    let questions = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<Question>(entry.clone())
                .map_err(|e| Error::InvalidPool(format!("question at index {index}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    build_pool(subject, questions)
}

/// Pulls `choices[0].message.content` out of a chat completion response.
pub fn extract_completion_content(response: &Value) -> Result<&str, Error> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::InvalidPool("no content received from completion".into()))
}

/// Parses a question bank out of model output.
///
/// The text may wrap the JSON object in prose or code fences, so if it does not
/// parse as a whole, the span from the first `{` to the last `}` is tried.
/// Questions that fail validation are dropped, not fatal.
pub fn parse_question_bank(content: &str) -> Result<QuestionPool, Error> {
    let value = parse_json_lenient(content)?;

    let Some(entries) = value.get("questions").and_then(Value::as_array) else {
        return Err(Error::InvalidPool(
            "invalid question bank format: `questions` must be an array".into(),
        ));
    };

    let subject = value
        .get("subject")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT)
        .to_string();

    let mut questions: Vec<Question> = Vec::with_capacity(entries.len());
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let question = match question_from_value(index, entry) {
            Ok(q) => q,
            Err(e) => {
                warn!(index, error = %e, "dropping invalid generated question");
                continue;
            }
        };
        if !seen_ids.insert(question.id.clone()) {
            warn!(index, id = %question.id, "dropping generated question with duplicate id");
            continue;
        }
        questions.push(question);
    }

    if questions.is_empty() {
        return Err(Error::InvalidPool("no valid questions generated".into()));
    }

    debug!(
        %subject,
        kept = questions.len(),
        received = entries.len(),
        "parsed question bank"
    );

    build_pool(subject, questions)
}

fn parse_json_lenient(content: &str) -> Result<Value, Error> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }

    let unparseable = || Error::InvalidPool("could not parse response as JSON".into());
    let start = content.find('{').ok_or_else(unparseable)?;
    let end = content.rfind('}').ok_or_else(unparseable)?;
    if end < start {
        return Err(unparseable());
    }

    serde_json::from_str(&content[start..=end]).map_err(|_| unparseable())
}

fn question_from_value(index: usize, entry: &Value) -> Result<Question, Error> {
    let id = match entry.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("q{}", index + 1),
    };

    let text = entry
        .get("question")
        .or_else(|| entry.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidQuestion(format!("question {id} has no text")))?
        .to_string();

    let options = entry
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidQuestion(format!("question {id} has no options array")))?
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| Error::InvalidQuestion(format!("question {id} has non-text options")))?;

    let correct_answer_index = entry
        .get("correctAnswer")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            Error::InvalidQuestion(format!("question {id} has no valid correct answer index"))
        })? as usize;

    let difficulty = entry
        .get("difficulty")
        .cloned()
        .map(serde_json::from_value::<Difficulty>)
        .transpose()
        .ok()
        .flatten()
        .ok_or_else(|| Error::InvalidQuestion(format!("question {id} has unknown difficulty")))?;

    let competency = entry
        .get("competency")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let question = Question {
        id,
        text,
        options,
        correct_answer_index,
        competency,
        difficulty,
    };
    validate_question(&question)?;

    Ok(question)
}
