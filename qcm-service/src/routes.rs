use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use qcm_schema::{DifficultyFilter, ExamInstance, Locale, QuestionPool, ScoreReport};
use qcm_utils::{attempt, bank, generation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{config::AppState, error::Error};

#[derive(Serialize, Deserialize)]
pub struct ParseBankRequest {
    /// Raw model output
    pub content: Option<String>,
    /// Or the whole chat completion response
    pub choices: Option<Value>,
}

#[derive(Serialize, Deserialize)]
pub struct QuestionBankResponse {
    pub success: bool,
    #[serde(rename = "questionBank")]
    pub question_bank: QuestionBank,
}

#[derive(Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(flatten)]
    pub pool: QuestionPool,
    #[serde(rename = "totalQuestions")]
    pub total_questions: usize,
}

#[derive(Serialize, Deserialize)]
pub struct CreateExamRequest {
    #[serde(rename = "questionBank", default)]
    pub question_bank: Value,
    #[serde(rename = "numQuestions")]
    pub num_questions: usize,
    #[serde(rename = "includeDifficulties", default)]
    pub include_difficulties: DifficultyFilter,
}

#[derive(Serialize, Deserialize)]
pub struct CreateExamResponse {
    pub success: bool,
    pub qcm: ExamInstance,
}

#[derive(Serialize, Deserialize)]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub qcm: Value,
    #[serde(default)]
    pub answers: Value,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SubmitExamResponse {
    pub success: bool,
    pub result: ScoreReport,
}

pub async fn get_status_ping() -> impl IntoResponse {
    info!("Status");
    (StatusCode::OK, "pong")
}

#[instrument(skip_all)]
pub async fn post_parse_question_bank(
    Json(request): Json<ParseBankRequest>,
) -> Result<Json<QuestionBankResponse>, Error> {
    let content = match (request.content, request.choices) {
        (Some(content), _) => content,
        (None, Some(choices)) => {
            bank::extract_completion_content(&serde_json::json!({ "choices": choices }))?
                .to_string()
        }
        (None, None) => {
            return Err(Error::Server(
                StatusCode::BAD_REQUEST,
                "content or choices is required".into(),
            ));
        }
    };

    let pool = bank::parse_question_bank(&content)?;
    let total_questions = pool.questions.len();
    info!(subject = %pool.subject, total_questions, "question bank parsed");

    Ok(Json(QuestionBankResponse {
        success: true,
        question_bank: QuestionBank {
            pool,
            total_questions,
        },
    }))
}

#[instrument(skip_all)]
pub async fn post_create_exam(
    State(state): State<AppState>,
    Json(request): Json<CreateExamRequest>,
) -> Result<Json<CreateExamResponse>, Error> {
    let pool = bank::pool_from_value(&request.question_bank)?;

    let max_questions = state.env_vars.max_questions;
    let count = if request.num_questions > max_questions {
        warn!(
            requested = request.num_questions,
            max_questions, "clamping number of questions"
        );
        max_questions
    } else {
        request.num_questions
    };

    let mut rng = rand::rng();
    let qcm = generation::create_exam(
        &pool,
        count,
        request.include_difficulties.allowed(),
        &mut rng,
    )?;
    info!(id = %qcm.id, questions = qcm.questions.len(), "exam created");

    Ok(Json(CreateExamResponse { success: true, qcm }))
}

#[instrument(skip_all)]
pub async fn post_submit_exam(
    State(state): State<AppState>,
    Json(request): Json<SubmitExamRequest>,
) -> Result<Json<SubmitExamResponse>, Error> {
    let exam = attempt::parse_exam(&request.qcm)?;
    let answers = attempt::parse_submitted_answers(&request.answers)?;

    let locale = match request.language.as_deref().map(str::parse::<Locale>) {
        Some(Ok(locale)) => locale,
        Some(Err(e)) => {
            warn!(error = %e, "falling back to default language");
            state.env_vars.default_language
        }
        None => state.env_vars.default_language,
    };

    let result = attempt::score_exam(&exam, &answers, locale)?;
    info!(id = %exam.id, score = result.score_percent, "exam submitted");

    Ok(Json(SubmitExamResponse {
        success: true,
        result,
    }))
}
