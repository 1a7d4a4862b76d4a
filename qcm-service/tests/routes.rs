use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use qcm_schema::Locale;
use qcm_service::{
    app,
    config::{AppState, EnvVars, Environment},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app(max_questions: usize) -> Router {
    let env_vars = EnvVars {
        environment: Environment::Development,
        port: 0,
        request_body_size_limit: 1024 * 1024,
        request_timeout_in_ms: 5_000,
        default_language: Locale::En,
        max_questions,
        sentry_dsn: None,
    };
    app(AppState { env_vars })
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn question_bank() -> Value {
    let difficulties = ["easy", "easy", "easy", "medium", "medium", "hard"];
    let questions: Vec<Value> = difficulties
        .iter()
        .enumerate()
        .map(|(i, difficulty)| {
            json!({
                "id": format!("q{}", i + 1),
                "question": format!("Question {}", i + 1),
                "options": [
                    format!("right {}", i + 1),
                    format!("wrong a{}", i + 1),
                    format!("wrong b{}", i + 1),
                    format!("wrong c{}", i + 1)
                ],
                "correctAnswer": 0,
                "competency": format!("Skill {}", i + 1),
                "difficulty": difficulty
            })
        })
        .collect();
    json!({ "subject": "Rust fundamentals", "questions": questions })
}

#[tokio::test]
async fn status_ping_is_ok() {
    let response = test_app(100)
        .oneshot(
            Request::builder()
                .uri("/status/ping")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn create_then_submit_round_trip() {
    let (status, body) = post_json(
        test_app(100),
        "/exam/create",
        json!({
            "questionBank": question_bank(),
            "numQuestions": 10,
            "includeDifficulties": { "easy": true, "medium": false, "hard": false }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let qcm = body["qcm"].clone();
    assert_eq!(qcm["subject"], "Rust fundamentals");
    assert!(qcm["id"].as_str().unwrap().starts_with("qcm_"));

    let questions = qcm["questions"].as_array().unwrap();
    // Clamped to the three easy questions
    assert_eq!(questions.len(), 3);
    for q in questions {
        assert_eq!(q["difficulty"], "easy");
        let correct = q["correctAnswer"].as_u64().unwrap() as usize;
        let correct_text = q["options"][correct].as_str().unwrap();
        assert!(correct_text.starts_with("right "));
    }

    // Answer the first question correctly and leave the others wrong or blank
    let first = &questions[0];
    let wrong_index = (first["correctAnswer"].as_u64().unwrap() + 1) % 4;
    let answers = json!([
        { "questionId": first["id"], "selectedAnswer": first["correctAnswer"] },
        { "questionId": questions[1]["id"], "selectedAnswer": -1 },
        { "questionId": questions[2]["id"], "selectedAnswer": wrong_index }
    ]);

    let (status, body) = post_json(
        test_app(100),
        "/exam/submit",
        json!({ "qcm": qcm, "answers": answers, "language": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(result["score"], 33);
    assert_eq!(result["totalQuestions"], 3);
    assert_eq!(result["correctAnswers"], 1);
    assert_eq!(result["incorrectAnswers"], 2);
    assert_eq!(result["qcmId"], qcm["id"]);
    assert_eq!(
        result["feedback"][0],
        "Performance faible. Une révision approfondie est nécessaire."
    );
    assert_eq!(result["answers"][1]["studentAnswer"], -1);
    assert_eq!(result["answers"][1]["isCorrect"], false);
}

#[tokio::test]
async fn num_questions_is_capped_by_config() {
    let (status, body) = post_json(
        test_app(2),
        "/exam/create",
        json!({
            "questionBank": question_bank(),
            "numQuestions": 50,
            "includeDifficulties": { "easy": true, "medium": true, "hard": true }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["qcm"]["questions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_selection_is_unprocessable() {
    let (status, body) = post_json(
        test_app(100),
        "/exam/create",
        json!({
            "questionBank": question_bank(),
            "numQuestions": 1,
            "includeDifficulties": { "easy": false, "medium": false, "hard": false }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "no questions match the selected difficulty criteria"
    );
}

#[tokio::test]
async fn zero_questions_requested_is_bad_request() {
    let (status, body) = post_json(
        test_app(100),
        "/exam/create",
        json!({
            "questionBank": question_bank(),
            "numQuestions": 0,
            "includeDifficulties": { "easy": true }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_question_array_is_bad_request() {
    let (status, body) = post_json(
        test_app(100),
        "/exam/create",
        json!({
            "questionBank": { "subject": "Rust" },
            "numQuestions": 3,
            "includeDifficulties": { "easy": true }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("questions"));
}

#[tokio::test]
async fn submit_without_answers_is_bad_request() {
    let (_, created) = post_json(
        test_app(100),
        "/exam/create",
        json!({
            "questionBank": question_bank(),
            "numQuestions": 2,
            "includeDifficulties": { "medium": true }
        }),
    )
    .await;

    let (status, body) = post_json(
        test_app(100),
        "/exam/submit",
        json!({ "qcm": created["qcm"], "answers": "none" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("malformed answer set"));
}

#[tokio::test]
async fn submit_empty_exam_is_bad_request() {
    let qcm = json!({
        "id": "qcm_0_empty",
        "subject": "Rust",
        "questions": [],
        "createdAt": "2025-01-01T00:00:00Z"
    });
    let (status, body) = post_json(
        test_app(100),
        "/exam/submit",
        json!({ "qcm": qcm, "answers": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid exam"));
}

#[tokio::test]
async fn parses_bank_from_completion_envelope() {
    let content = format!(
        "Sure! Here is the bank:\n{}",
        json!({
            "subject": "Traits",
            "questions": [
                { "question": "What is a trait?", "options": ["A", "B", "C", "D"], "correctAnswer": 1, "competency": "Traits", "difficulty": "easy" },
                { "question": "Broken", "options": ["A"], "correctAnswer": 0, "difficulty": "easy" }
            ]
        })
    );

    let (status, body) = post_json(
        test_app(100),
        "/question-bank/parse",
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let bank = &body["questionBank"];
    assert_eq!(bank["subject"], "Traits");
    assert_eq!(bank["totalQuestions"], 1);
    assert_eq!(bank["questions"][0]["id"], "q1");
}

#[tokio::test]
async fn parse_without_content_is_bad_request() {
    let (status, body) = post_json(test_app(100), "/question-bank/parse", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
