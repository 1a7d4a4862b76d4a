use std::env::var;

use qcm_schema::Locale;
use sentry::types::Dsn;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env_vars: EnvVars,
}

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub environment: Environment,
    pub port: u16,
    pub request_body_size_limit: usize,
    pub request_timeout_in_ms: u64,
    /// Used when a submission does not say which language it wants
    pub default_language: Locale,
    /// Upper bound on `numQuestions` accepted per exam
    pub max_questions: usize,
    pub sentry_dsn: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                warn!(
                    "ENVIRONMENT value '{}' is not valid. Defaulting to 'production'.",
                    other
                );
                Environment::Production
            }
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl EnvVars {
    pub fn new() -> Self {
        let port = match var("PORT") {
            Ok(port_string) => port_string.parse().expect("PORT to be parseable as u16"),
            Err(_e) => {
                let default_port = 3003;
                warn!("PORT not set. Defaulting to {default_port}");
                default_port
            }
        };

        let request_timeout_in_ms = match var("REQUEST_TIMEOUT_IN_MS") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_TIMEOUT_IN_MS to be valid unsigned integer"),
            Err(_e) => {
                let default_request_timeout = 30_000;
                warn!("REQUEST_TIMEOUT_IN_MS not set. Defaulting to {default_request_timeout}");
                default_request_timeout
            }
        };

        let request_body_size_limit = match var("REQUEST_BODY_SIZE_LIMIT") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_BODY_SIZE_LIMIT to be valid unsigned integer"),
            Err(_e) => {
                let default_request_body_size_limit = 5 * 1024 * 1024;
                warn!(
                    "REQUEST_BODY_SIZE_LIMIT not set. Defaulting to {default_request_body_size_limit}"
                );
                default_request_body_size_limit
            }
        };

        let default_language = match var("DEFAULT_LANGUAGE") {
            Ok(s) => match s.parse::<Locale>() {
                Ok(locale) => locale,
                Err(e) => panic!("DEFAULT_LANGUAGE must be 'en' or 'fr': {e}"),
            },
            Err(_e) => {
                warn!("DEFAULT_LANGUAGE not set. Defaulting to '{}'", Locale::En);
                Locale::En
            }
        };

        let max_questions = match var("MAX_QUESTIONS") {
            Ok(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => panic!("MAX_QUESTIONS must be a whole number greater than 0, got '{s}'"),
            },
            Err(_e) => {
                let default_max_questions = 100;
                warn!("MAX_QUESTIONS not set. Defaulting to {default_max_questions}");
                default_max_questions
            }
        };

        let sentry_dsn = match var("SENTRY_DSN") {
            Ok(dsn_string) => {
                assert!(
                    valid_sentry_dsn(&dsn_string),
                    "SENTRY_DSN is not valid DSN."
                );
                Some(dsn_string)
            }
            Err(_e) => {
                warn!("SENTRY_DSN not set.");
                None
            }
        };

        let environment = match var("ENVIRONMENT") {
            Ok(v) => v.into(),
            Err(_e) => {
                warn!("ENVIRONMENT not set. Defaulting to 'production'.");
                Environment::Production
            }
        };

        EnvVars {
            environment,
            port,
            request_body_size_limit,
            request_timeout_in_ms,
            default_language,
            max_questions,
            sentry_dsn,
        }
    }
}

fn valid_sentry_dsn(url: &str) -> bool {
    url.parse::<Dsn>().is_ok()
}
