mod choices;
mod ids;
mod prompt;
mod score;

pub use choices::{ChoiceSet, ChoiceSetError};
pub use ids::{AdvanceTicket, FetchTicket, Generation};
pub use prompt::{Prompt, PromptError};
pub use score::{ScoreError, SessionScore};
