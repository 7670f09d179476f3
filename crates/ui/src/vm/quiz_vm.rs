use quiz_core::{QuizSnapshot, SessionPhase};

use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizStage {
    Intro,
    Loading,
    LoadFailed,
    Playing,
    Revealed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreboardVm {
    pub streak_label: String,
    pub streak_hot: bool,
    pub total_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub title: String,
    pub label: String,
    pub is_answer: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizScreenVm {
    pub stage: QuizStage,
    pub scoreboard: ScoreboardVm,
    pub line: Option<String>,
    pub choices: Vec<ChoiceVm>,
    pub fetch_error: Option<String>,
    pub confirming_restart: bool,
    pub notice: Option<&'static str>,
}

#[must_use]
pub fn map_quiz_screen(snapshot: &QuizSnapshot, error: Option<ViewError>) -> QuizScreenVm {
    let stage = match snapshot.phase {
        SessionPhase::Intro => QuizStage::Intro,
        SessionPhase::Loading if snapshot.fetch_error.is_some() => QuizStage::LoadFailed,
        SessionPhase::Loading => QuizStage::Loading,
        SessionPhase::Playing => QuizStage::Playing,
        SessionPhase::Revealed => QuizStage::Revealed,
    };

    let score = snapshot.score;
    let scoreboard = ScoreboardVm {
        streak_label: format!("🔥 {}", score.streak_correct()),
        streak_hot: score.streak_correct() > 0,
        total_label: format!("{} / {}", score.total_correct(), score.total_played()),
    };

    let choices = snapshot
        .choices
        .iter()
        .map(|choice| ChoiceVm {
            title: choice.title.clone(),
            label: if choice.is_answer {
                format!("✅ {}", choice.title)
            } else {
                choice.title.clone()
            },
            is_answer: choice.is_answer,
            disabled: snapshot.revealed,
        })
        .collect();

    QuizScreenVm {
        stage,
        scoreboard,
        line: snapshot.line.clone(),
        choices,
        fetch_error: snapshot.fetch_error.clone(),
        confirming_restart: snapshot.confirming_restart,
        notice: error.map(ViewError::message),
    }
}
