use std::collections::HashSet;

use chrono::{DateTime, Utc};
use qcm_schema::{Difficulty, ExamInstance, Question, QuestionPool};
use rand::Rng;
use tracing::{debug, trace};

use crate::{bank::validate_question, error::Error, shuffle::shuffle};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Draws up to `count` distinct questions whose difficulty is in `allowed`.
///
/// A `count` larger than the number of matching questions is clamped, so the
/// exam may be shorter than requested.
pub fn select_questions<R, D>(
    pool: &QuestionPool,
    count: usize,
    allowed: D,
    rng: &mut R,
) -> Result<Vec<Question>, Error>
where
    R: Rng + ?Sized,
    D: IntoIterator<Item = Difficulty>,
{
    if count < 1 {
        return Err(Error::InvalidCount(count));
    }

    let allowed: HashSet<Difficulty> = allowed.into_iter().collect();
    let filtered: Vec<&Question> = pool
        .questions
        .iter()
        .filter(|q| allowed.contains(&q.difficulty))
        .collect();

    if filtered.is_empty() {
        return Err(Error::EmptySelection);
    }

    let take = count.min(filtered.len());
    trace!(
        requested = count,
        available = filtered.len(),
        take,
        "selecting questions"
    );

    Ok(shuffle(&filtered, rng)
        .into_iter()
        .take(take)
        .cloned()
        .collect())
}

/// Returns a copy of `question` with its options shuffled and the correct
/// index moved to wherever the correct option landed.
///
/// If several options share the correct option's text, the first of them in
/// the new order is marked correct.
pub fn randomize_options<R>(question: &Question, rng: &mut R) -> Result<Question, Error>
where
    R: Rng + ?Sized,
{
    let correct_option = question.correct_option().ok_or_else(|| {
        Error::InvalidQuestion(format!(
            "question {} has correct answer {} but only {} options",
            question.id,
            question.correct_answer_index,
            question.options.len()
        ))
    })?;

    let options = shuffle(&question.options, rng);
    let correct_answer_index = options
        .iter()
        .position(|o| o == correct_option)
        .ok_or_else(|| {
            Error::InvalidQuestion(format!(
                "correct option of question {} lost while shuffling",
                question.id
            ))
        })?;

    trace!(
        id = %question.id,
        from = question.correct_answer_index,
        to = correct_answer_index,
        "remapped correct answer"
    );

    Ok(Question {
        options,
        correct_answer_index,
        ..question.clone()
    })
}

/// `qcm_<unix millis>_<9 base36 chars>`
pub fn generate_exam_id<R>(now: DateTime<Utc>, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("qcm_{}_{}", now.timestamp_millis(), suffix)
}

/// Packages questions into an exam with the given id and creation time.
pub fn assemble_exam_with(
    subject: &str,
    questions: Vec<Question>,
    id: String,
    created_at: DateTime<Utc>,
) -> ExamInstance {
    ExamInstance {
        id,
        subject: subject.to_string(),
        questions,
        created_at,
    }
}

/// Packages questions into an exam stamped with the current time and a fresh id.
pub fn assemble_exam<R>(subject: &str, questions: Vec<Question>, rng: &mut R) -> ExamInstance
where
    R: Rng + ?Sized,
{
    let now = Utc::now();
    let id = generate_exam_id(now, rng);
    debug!(%id, subject, questions = questions.len(), "assembled exam");
    assemble_exam_with(subject, questions, id, now)
}

/// Select, randomize and assemble in one step.
pub fn create_exam<R, D>(
    pool: &QuestionPool,
    count: usize,
    allowed: D,
    rng: &mut R,
) -> Result<ExamInstance, Error>
where
    R: Rng + ?Sized,
    D: IntoIterator<Item = Difficulty>,
{
    let selected = select_questions(pool, count, allowed, rng)?;
    let questions = selected
        .iter()
        .map(|q| randomize_options(q, rng))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(assemble_exam(&pool.subject, questions, rng))
}

/// Given an exam, validate it for basic properties:
/// 1) At least one question
/// 2) No duplicate question ids
/// 3) Every question well formed
pub fn validate_exam(exam: &ExamInstance) -> Result<(), Error> {
    if exam.questions.is_empty() {
        return Err(Error::InvalidExam(format!("exam {} has no questions", exam.id)));
    }

    let mut q_ids: HashSet<&str> = HashSet::with_capacity(exam.questions.len());
    for q in &exam.questions {
        if !q_ids.insert(q.id.as_str()) {
            return Err(Error::InvalidExam(format!("duplicate question id {}", q.id)));
        }
        validate_question(q).map_err(|e| Error::InvalidExam(e.to_string()))?;
    }

    Ok(())
}
