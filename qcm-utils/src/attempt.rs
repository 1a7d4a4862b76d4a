use std::collections::HashMap;

use chrono::{DateTime, Utc};
use qcm_schema::{ExamInstance, Locale, QuestionResult, ScoreReport, SubmittedAnswer};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::Error,
    feedback::{Outcome, overall_feedback, question_feedback},
    generation::validate_exam,
};

/// Scores a submission against the exam it was taken from.
///
/// Answers are matched to questions by id. Questions without an answer, or
/// with an index outside the options, count as incorrect.
pub fn score_exam(
    exam: &ExamInstance,
    answers: &[SubmittedAnswer],
    locale: Locale,
) -> Result<ScoreReport, Error> {
    score_exam_at(exam, answers, locale, Utc::now())
}

/// As [`score_exam`], with the completion time supplied by the caller.
pub fn score_exam_at(
    exam: &ExamInstance,
    answers: &[SubmittedAnswer],
    locale: Locale,
    completed_at: DateTime<Utc>,
) -> Result<ScoreReport, Error> {
    validate_exam(exam)?;

    let total_questions = exam.questions.len();
    let mut correct_count: usize = 0;
    let mut per_question = Vec::with_capacity(total_questions);
    let mut question_lines = Vec::with_capacity(total_questions);

    // First answer wins if a question was submitted more than once
    let mut selected_by_id: HashMap<&str, Option<usize>> = HashMap::with_capacity(answers.len());
    for answer in answers {
        selected_by_id
            .entry(answer.question_id.as_str())
            .or_insert(answer.selected_answer_index);
    }

    for (index, question) in exam.questions.iter().enumerate() {
        let selected_answer_index = selected_by_id
            .get(question.id.as_str())
            .copied()
            .flatten();

        let is_correct = compare_answer(question.correct_answer_index, selected_answer_index);
        if is_correct {
            correct_count += 1;
        }

        let outcome = if is_correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        question_lines.push(question_feedback(
            locale,
            index + 1,
            &question.competency,
            outcome,
            question.correct_option().unwrap_or_default(),
        ));

        per_question.push(QuestionResult {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            selected_answer_index,
            correct_answer_index: question.correct_answer_index,
            is_correct,
            competency: question.competency.clone(),
        });
    }

    let score_percent = calculate_score_percent(correct_count, total_questions)?;

    let mut feedback_lines = Vec::with_capacity(total_questions + 1);
    feedback_lines.push(overall_feedback(locale, score_percent));
    feedback_lines.extend(question_lines);

    debug!(
        exam_id = %exam.id,
        correct_count,
        total_questions,
        score_percent,
        "scored exam"
    );

    Ok(ScoreReport {
        score_percent,
        total_questions,
        correct_count,
        incorrect_count: total_questions - correct_count,
        per_question,
        feedback_lines,
        completed_at,
        exam_id: exam.id.clone(),
    })
}

pub fn compare_answer(correct_answer_index: usize, selected_answer_index: Option<usize>) -> bool {
    selected_answer_index == Some(correct_answer_index)
}

/// `correct / total * 100`, rounded half up.
pub fn calculate_score_percent(correct: usize, total: usize) -> Result<u8, Error> {
    if total == 0 {
        return Err(Error::InvalidExam("exam has no questions".into()));
    }
    if correct > total {
        return Err(Error::InvalidExam(format!(
            "{correct} correct answers out of {total} questions"
        )));
    }

    let percent = (correct * 100 + total / 2) / total;
    u8::try_from(percent).map_err(|_| Error::InvalidExam(format!("score {percent} out of range")))
}

/// Reads an exam sent back by a client with its submission.
pub fn parse_exam(value: &Value) -> Result<ExamInstance, Error> {
    let exam: ExamInstance = serde_json::from_value(value.clone())
        .map_err(|e| Error::InvalidExam(format!("exam could not be read: {e}")))?;
    validate_exam(&exam)?;
    Ok(exam)
}

/// Reads an answer set sent by a client.
///
/// Expects an array of objects with a string `questionId`. `selectedAnswer`
/// may be missing, `null`, or negative to mean unanswered.
pub fn parse_submitted_answers(value: &Value) -> Result<Vec<SubmittedAnswer>, Error> {
    let Some(entries) = value.as_array() else {
        return Err(Error::MalformedAnswerSet("answers must be an array".into()));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let Some(question_id) = entry.get("questionId").and_then(Value::as_str) else {
                return Err(Error::MalformedAnswerSet(format!(
                    "answer at index {index} has no questionId"
                )));
            };

            let selected_answer_index = match entry.get("selectedAnswer") {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) if n.as_i64().is_some_and(|i| i < 0) => None,
                Some(Value::Number(n)) => match n.as_u64() {
                    Some(i) => Some(i as usize),
                    None => {
                        return Err(Error::MalformedAnswerSet(format!(
                            "answer at index {index} has non-integer selectedAnswer {n}"
                        )));
                    }
                },
                Some(other) => {
                    return Err(Error::MalformedAnswerSet(format!(
                        "answer at index {index} has invalid selectedAnswer {other}"
                    )));
                }
            };

            Ok(SubmittedAnswer {
                question_id: question_id.to_string(),
                selected_answer_index,
            })
        })
        .collect()
}
