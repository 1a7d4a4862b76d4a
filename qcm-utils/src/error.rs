#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid question bank: {0}")]
    InvalidPool(String),
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
    #[error("number of questions must be at least 1, got {0}")]
    InvalidCount(usize),
    #[error("no questions match the selected difficulty criteria")]
    EmptySelection,
    #[error("invalid exam: {0}")]
    InvalidExam(String),
    #[error("malformed answer set: {0}")]
    MalformedAnswerSet(String),
}

impl Error {
    /// Only an empty selection is expected in normal use. The caller should
    /// ask for different filters instead of treating it as bad input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::EmptySelection)
    }
}
