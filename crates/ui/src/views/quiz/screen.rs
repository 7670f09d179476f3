use dioxus::prelude::*;

use crate::vm::{ChoiceVm, QuizScreenVm, QuizStage, ScoreboardVm};

/// Draws a quiz snapshot. Every interaction is reported through the handlers;
/// this component owns no state.
#[component]
pub fn QuizScreen(
    vm: QuizScreenVm,
    on_start: EventHandler<()>,
    on_choice: EventHandler<String>,
    on_retry: EventHandler<()>,
    on_restart_request: EventHandler<()>,
    on_restart_confirm: EventHandler<()>,
    on_restart_cancel: EventHandler<()>,
) -> Element {
    let notice = vm.notice;
    let body = match vm.stage {
        QuizStage::Intro => rsx! {
            IntroPanel { on_start }
        },
        QuizStage::Loading => rsx! {
            div { class: "state--loading",
                Scoreboard { scoreboard: vm.scoreboard.clone() }
                p { class: "loadingMessage", "Loading next lyric..." }
                div { class: "loader" }
                StartOverButton { on_restart_request }
            }
        },
        QuizStage::LoadFailed => rsx! {
            div { class: "state--error",
                Scoreboard { scoreboard: vm.scoreboard.clone() }
                p { class: "errorMessage", "Couldn't load the next lyric." }
                if let Some(detail) = vm.fetch_error.clone() {
                    p { class: "errorDetail", "{detail}" }
                }
                button {
                    class: "block retryButton",
                    r#type: "button",
                    onclick: move |_| on_retry.call(()),
                    "Retry"
                }
                StartOverButton { on_restart_request }
            }
        },
        QuizStage::Playing | QuizStage::Revealed => rsx! {
            div { class: "state--playing",
                Scoreboard { scoreboard: vm.scoreboard.clone() }
                if let Some(line) = vm.line.clone() {
                    div { class: "lyric", "{line}" }
                }
                div { class: "choices",
                    for choice in vm.choices.clone() {
                        ChoiceButton { key: "{choice.title}", choice, on_choice }
                    }
                    div { class: "aux",
                        StartOverButton { on_restart_request }
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "quiz",
            if let Some(message) = notice {
                p { class: "notice", "{message}" }
            }
            {body}
            if vm.confirming_restart {
                RestartModal { on_restart_confirm, on_restart_cancel }
            }
        }
    }
}

#[component]
fn IntroPanel(on_start: EventHandler<()>) -> Element {
    rsx! {
        div { class: "state--loaded",
            h1 { "Guess that song" }
            p { "Guess the correct song from a line from the track!" }
            button {
                class: "block startButton",
                r#type: "button",
                onclick: move |_| on_start.call(()),
                "🎤 Start!"
            }
        }
    }
}

#[component]
fn Scoreboard(scoreboard: ScoreboardVm) -> Element {
    let streak_class = if scoreboard.streak_hot {
        "accent fixed block streakScoreboard"
    } else {
        "fixed block streakScoreboard"
    };
    rsx! {
        div { class: "scoreboard",
            div { class: "streak", title: "Correct answer streak",
                div { class: "{streak_class}", "{scoreboard.streak_label}" }
            }
            div { class: "totalScore",
                "Score"
                div { class: "fixed block totalScoreboard", "{scoreboard.total_label}" }
            }
        }
    }
}

#[component]
fn ChoiceButton(choice: ChoiceVm, on_choice: EventHandler<String>) -> Element {
    let class = if choice.is_answer {
        "accent choice block"
    } else {
        "choice block"
    };
    let title = choice.title.clone();
    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            disabled: choice.disabled,
            onclick: move |_| on_choice.call(title.clone()),
            "{choice.label}"
        }
    }
}

#[component]
fn StartOverButton(on_restart_request: EventHandler<()>) -> Element {
    rsx! {
        button {
            class: "block startOverButton",
            r#type: "button",
            onclick: move |_| on_restart_request.call(()),
            "Start over"
        }
    }
}

#[component]
fn RestartModal(on_restart_confirm: EventHandler<()>, on_restart_cancel: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_restart_cancel.call(()),
            div {
                class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal-title", "Restart quiz?" }
                p { class: "modal-body", "You'll lose your progress." }
                div { class: "modal-actions",
                    button {
                        class: "btn modal-cancel",
                        r#type: "button",
                        onclick: move |_| on_restart_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn modal-confirm",
                        r#type: "button",
                        onclick: move |_| on_restart_confirm.call(()),
                        "Restart"
                    }
                }
            }
        }
    }
}
