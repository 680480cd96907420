#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use session::{
    Effect, SessionEvent, SessionPhase, SessionState, Stage, StageAnswer, Transition,
    TransitionError,
};
pub use time::Clock;
