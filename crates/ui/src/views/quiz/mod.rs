mod advance;
mod screen;
mod view;

pub use advance::PendingAdvance;
pub use screen::QuizScreen;
#[cfg(test)]
pub(crate) use view::QuizTestHandles;
pub use view::{QuizIntent, QuizView};
