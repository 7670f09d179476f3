mod quiz_vm;

pub use quiz_vm::{ChoiceVm, QuizScreenVm, QuizStage, ScoreboardVm, map_quiz_screen};
