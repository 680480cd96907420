//! Coordinates the pure session state machine with the question source and
//! the answer sink.

mod controller;
mod request;
mod view;

pub use controller::{LoadOutcome, SessionController, SubmitOutcome};
pub use request::{
    LoadRequest, LoadResponse, RequestSeq, RetryTarget, SubmitRequest, SubmitResponse,
};
pub use view::{CandidateView, ChoiceView, ErrorView, ExplanationView, SessionView, StageTab};
