use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// The question bank returned nothing for the requested scope. Fatal to
    /// that start attempt only; the caller picks a different scope.
    #[error("no questions available for the requested scope")]
    EmptyQuestionSet,

    /// An operation that needs an active session was called without one.
    #[error("no active session")]
    NoSession,

    /// A checkpoint or history write failed. The in-memory transition has
    /// already been applied and is never rolled back; only resumability and
    /// history are affected.
    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}
