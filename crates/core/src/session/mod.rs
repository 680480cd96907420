//! Stage sequencing for a single question.
//!
//! `SessionState` is a plain value; every change goes through
//! [`SessionState::apply`], which never performs I/O. Side effects the caller
//! must carry out (the combined answer submission) come back as an [`Effect`].

mod event;
mod machine;
mod state;

pub use event::{Effect, SessionEvent, Transition, TransitionError};
pub use state::{SessionPhase, SessionState, Stage, StageAnswer};
