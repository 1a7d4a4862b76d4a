//! QCM Utility Functions
//!
//! ## Current API
//!
//! - Shuffle sequences
//! - Select questions from a pool
//! - Randomize answer options
//! - Assemble and validate exams
//! - Score submissions
//! - Parse and validate generated question banks
//!
pub mod attempt;
pub mod bank;
pub mod error;
pub mod feedback;
pub mod generation;
pub mod shuffle;
