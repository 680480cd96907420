mod mistakes;
mod practice;
mod question_flow;
mod review;
mod state;
mod word_panel;

pub use mistakes::MistakesView;
pub use practice::PracticeView;
pub use review::ReviewView;
pub use state::{ViewError, ViewState, view_state_from_resource};
