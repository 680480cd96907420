use thiserror::Error;

use crate::model::{FilterParseError, QuestionError};
use crate::session::TransitionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Filter(#[from] FilterParseError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
