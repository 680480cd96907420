use dioxus::prelude::*;

use services::{FailureKind, ServiceError, SessionFailure};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unauthorized,
    Unavailable,
    Empty,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unauthorized => "Please log in to continue.",
            ViewError::Unavailable => "The practice server is not reachable. Please try again.",
            ViewError::Empty => "Nothing to practice yet.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&ServiceError> for ViewError {
    fn from(err: &ServiceError) -> Self {
        match SessionFailure::Service(err.clone()).kind() {
            FailureKind::Authentication => ViewError::Unauthorized,
            FailureKind::TransientNetwork => ViewError::Unavailable,
            FailureKind::Validation | FailureKind::IllegalTransition => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
