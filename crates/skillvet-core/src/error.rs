//! Session and bank error types.
//!
//! Provider failures are deliberately absent here: the evaluator and the
//! generative question source recover from them locally, so they never
//! surface past the component boundary.

use thiserror::Error;

use crate::session::InterviewStage;

/// Errors raised at the session state-machine boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested stage transition is not in the transition table.
    #[error("invalid stage transition: {from} -> {to}")]
    InvalidTransition {
        from: InterviewStage,
        to: InterviewStage,
    },

    /// An operation required a different stage than the session is in.
    #[error("operation requires stage {required}, session is in {actual}")]
    WrongStage {
        required: InterviewStage,
        actual: InterviewStage,
    },

    /// Candidate info must be provided before the interview starts.
    #[error("candidate info is required before starting the interview")]
    MissingCandidate,

    /// An answer was submitted with no question pending.
    #[error("no question is pending an answer")]
    NoPendingQuestion,
}

/// Errors raised when constructing questions or banks.
#[derive(Debug, Error)]
pub enum BankError {
    /// Question text must be non-empty.
    #[error("question '{0}' has empty text")]
    EmptyText(String),

    /// Question ids must be unique within a bank.
    #[error("duplicate question id: {0}")]
    DuplicateId(String),
}
