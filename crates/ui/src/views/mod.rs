mod quiz;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

#[cfg(test)]
pub(crate) use quiz::QuizTestHandles;
pub use quiz::{PendingAdvance, QuizIntent, QuizScreen, QuizView};
pub use state::ViewError;
