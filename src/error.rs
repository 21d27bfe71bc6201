use thiserror::Error;

use crate::{OperatorError, TreeError};

/// Unified error type for callers that both build and evaluate trees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Operator(#[from] OperatorError),
}
