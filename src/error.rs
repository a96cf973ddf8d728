use thiserror::Error;

/// The only hard-failure surface the planner exposes.
///
/// An infeasible catalog, a per-item placement failure, or a genetic search
/// that ran out of time is reported inside a successful
/// [`crate::OptimizeResult`] or [`crate::Scenario`] rather than through this
/// type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("unknown algorithm {0:?}, expected \"simple\" or \"genetic\"")]
    UnknownAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
