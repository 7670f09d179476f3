use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use dioxus::prelude::*;
use quiz_core::SessionPhase;
use quiz_core::model::Prompt;
use services::{PromptSource, PromptSourceError};
use storage::repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
use tokio::sync::Notify;

use super::{QuizIntent, QuizScreen};
use super::test_harness::{
    CountingPrompts, drive_dom, quick_config, setup_quiz_harness, setup_quiz_harness_with,
    setup_quiz_harness_with_storage,
};
use crate::vm::{ChoiceVm, QuizScreenVm, QuizStage, ScoreboardVm};

#[derive(Props, Clone, PartialEq)]
struct ScreenProps {
    vm: QuizScreenVm,
}

#[component]
fn ScreenHarness(props: ScreenProps) -> Element {
    rsx! {
        QuizScreen {
            vm: props.vm,
            on_start: move |()| {},
            on_choice: move |_title: String| {},
            on_retry: move |()| {},
            on_restart_request: move |()| {},
            on_restart_confirm: move |()| {},
            on_restart_cancel: move |()| {},
        }
    }
}

fn render_screen(vm: QuizScreenVm) -> String {
    let mut dom = VirtualDom::new_with_props(ScreenHarness, ScreenProps { vm });
    dom.rebuild_in_place();
    drive_dom(&mut dom);
    dioxus_ssr::render(&dom)
}

fn screen_vm(stage: QuizStage) -> QuizScreenVm {
    QuizScreenVm {
        stage,
        scoreboard: ScoreboardVm {
            streak_label: "🔥 2".to_string(),
            streak_hot: true,
            total_label: "4 / 6".to_string(),
        },
        line: None,
        choices: Vec::new(),
        fetch_error: None,
        confirming_restart: false,
        notice: None,
    }
}

fn choice(title: &str, is_answer: bool, disabled: bool) -> ChoiceVm {
    let label = if is_answer {
        format!("✅ {title}")
    } else {
        title.to_string()
    };
    ChoiceVm {
        title: title.to_string(),
        label,
        is_answer,
        disabled,
    }
}

struct BrokenStore;

#[async_trait::async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

/// Keeps written values, but `clear` waits for `release` and then fails.
struct StuckClearStore {
    inner: InMemoryStore,
    release: Arc<Notify>,
}

#[async_trait::async_trait]
impl KeyValueStore for StuckClearStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.release.notified().await;
        Err(StorageError::Connection("disk full".to_string()))
    }
}

/// Serves the first prompt at once; later fetches wait for `release`.
struct GatedPrompts {
    served: AtomicU32,
    release: Arc<Notify>,
}

#[async_trait::async_trait]
impl PromptSource for GatedPrompts {
    async fn fetch_prompt(&self) -> Result<Prompt, PromptSourceError> {
        let n = self.served.fetch_add(1, Ordering::SeqCst) + 1;
        if n > 1 {
            self.release.notified().await;
        }
        let prompt = Prompt::new(
            format!("Lyric {n}"),
            format!("Song {n}"),
            vec!["Other A".into(), "Other B".into(), "Other C".into()],
        )?;
        Ok(prompt)
    }
}

fn stuck_clear_storage(release: &Arc<Notify>) -> Storage {
    Storage {
        kv: Arc::new(StuckClearStore {
            inner: InMemoryStore::new(),
            release: Arc::clone(release),
        }),
    }
}

#[test]
fn intro_screen_offers_start() {
    let html = render_screen(screen_vm(QuizStage::Intro));
    assert!(html.contains("Guess that song"), "missing title in {html}");
    assert!(html.contains("🎤 Start!"), "missing start button in {html}");
    assert!(!html.contains("Start over"), "unexpected start over in {html}");
}

#[test]
fn loading_screen_shows_scoreboard() {
    let html = render_screen(screen_vm(QuizStage::Loading));
    assert!(html.contains("Loading next lyric"), "missing loader in {html}");
    assert!(html.contains("🔥 2"), "missing streak in {html}");
    assert!(html.contains("4 / 6"), "missing total in {html}");
}

#[test]
fn revealed_screen_marks_answer_and_disables_choices() {
    let mut vm = screen_vm(QuizStage::Revealed);
    vm.line = Some("Is this the real life?".to_string());
    vm.choices = vec![
        choice("Bohemian Rhapsody", true, true),
        choice("Under Pressure", false, true),
    ];
    let html = render_screen(vm);
    assert!(html.contains("Is this the real life?"), "missing lyric in {html}");
    assert!(html.contains("✅ Bohemian Rhapsody"), "missing mark in {html}");
    assert!(html.contains("Under Pressure"), "missing choice in {html}");
    assert!(html.contains("disabled"), "choices not disabled in {html}");
}

#[test]
fn failed_load_offers_retry() {
    let mut vm = screen_vm(QuizStage::LoadFailed);
    vm.fetch_error = Some("server returned 503".to_string());
    let html = render_screen(vm);
    assert!(html.contains("Couldn't load the next lyric."), "missing message in {html}");
    assert!(html.contains("server returned 503"), "missing detail in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[test]
fn restart_modal_renders_over_playing_screen() {
    let mut vm = screen_vm(QuizStage::Playing);
    vm.confirming_restart = true;
    let html = render_screen(vm);
    assert!(html.contains("Restart quiz?"), "missing modal in {html}");
    assert!(html.contains("You'll lose your progress."), "missing warning in {html}");
    assert!(html.contains("Cancel"), "missing cancel in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_starts_in_intro() {
    let mut harness = setup_quiz_harness(quick_config());
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("🎤 Start!"), "missing start in {html}");
    assert_eq!(harness.snapshot().phase, SessionPhase::Intro);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_loads_a_prompt_after_start() {
    let mut harness = setup_quiz_harness(quick_config());
    harness.rebuild();

    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Playing);
    assert_eq!(snapshot.line.as_deref(), Some("Lyric 1"));
    assert_eq!(snapshot.choices.len(), 4);
    let html = harness.render();
    assert!(html.contains("Lyric 1"), "missing lyric in {html}");
    assert!(html.contains("Song 1"), "missing answer choice in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_scores_and_saves_an_answer() {
    let config = services::QuizConfig {
        answer_delay: Duration::from_secs(60),
        ..quick_config()
    };
    let mut harness = setup_quiz_harness(config);
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    harness.dispatch(QuizIntent::Choose("Song 1".to_string()));
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Revealed);
    assert_eq!(snapshot.score.total_correct(), 1);
    assert_eq!(snapshot.score.total_played(), 1);
    let html = harness.render();
    assert!(html.contains("✅ Song 1"), "missing reveal in {html}");
    assert!(html.contains("1 / 1"), "missing total in {html}");

    let saved = harness.storage.kv.get("playState").await.expect("read store");
    assert_eq!(saved.as_deref(), Some(r#"{"sc":1,"tc":1,"tp":1}"#));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_advances_after_delay() {
    let mut harness = setup_quiz_harness(quick_config());
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    harness.dispatch(QuizIntent::Choose("Other A".to_string()));
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Playing);
    assert_eq!(snapshot.line.as_deref(), Some("Lyric 2"));
    assert_eq!(snapshot.score.streak_correct(), 0);
    assert_eq!(snapshot.score.total_played(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_restores_saved_score() {
    let storage = Storage::in_memory();
    storage
        .kv
        .set("playState", r#"{"sc":1,"tc":2,"tp":3}"#)
        .await
        .expect("seed store");
    let mut harness = setup_quiz_harness_with_storage(quick_config(), storage);
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("2 / 3"), "missing restored total in {html}");
    assert!(html.contains("🔥 1"), "missing restored streak in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_restart_needs_confirmation() {
    let config = services::QuizConfig {
        answer_delay: Duration::from_secs(60),
        ..quick_config()
    };
    let mut harness = setup_quiz_harness(config);
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;
    harness.dispatch(QuizIntent::Choose("Song 1".to_string()));
    harness.settle().await;

    harness.dispatch(QuizIntent::RequestRestart);
    harness.settle().await;
    assert!(harness.snapshot().confirming_restart);
    assert!(harness.render().contains("Restart quiz?"));

    harness.dispatch(QuizIntent::CancelRestart);
    harness.settle().await;
    assert!(!harness.snapshot().confirming_restart);
    assert_eq!(harness.snapshot().score.total_played(), 1);

    harness.dispatch(QuizIntent::RequestRestart);
    harness.dispatch(QuizIntent::ConfirmRestart);
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Intro);
    assert!(snapshot.score.is_zero());
    let saved = harness.storage.kv.get("playState").await.expect("read store");
    assert_eq!(saved, None);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_reports_unreadable_storage() {
    let storage = Storage {
        kv: Arc::new(BrokenStore),
    };
    let mut harness = setup_quiz_harness_with_storage(quick_config(), storage);
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    assert_eq!(harness.snapshot().phase, SessionPhase::Intro);
    let html = harness.render();
    assert!(
        html.contains("Your progress could not be saved or loaded."),
        "missing notice in {html}"
    );
    assert!(html.contains("🎤 Start!"), "missing start in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_retries_a_failed_fetch() {
    let mut harness = setup_quiz_harness_with(
        quick_config(),
        Storage::in_memory(),
        Arc::new(CountingPrompts::failing_first(1)),
    );
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Loading);
    assert!(snapshot.fetch_error.is_some());
    let html = harness.render();
    assert!(html.contains("Retry"), "missing retry in {html}");
    assert!(html.contains("lyrics server down"), "missing detail in {html}");

    harness.dispatch(QuizIntent::Retry);
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Playing);
    assert_eq!(snapshot.line.as_deref(), Some("Lyric 1"));
    assert_eq!(snapshot.fetch_error, None);
    assert!(snapshot.score.is_zero());
}

#[tokio::test(flavor = "current_thread")]
async fn fetch_landing_during_failed_restart_is_kept() {
    let clear_gate = Arc::new(Notify::new());
    let fetch_gate = Arc::new(Notify::new());
    let prompts = Arc::new(GatedPrompts {
        served: AtomicU32::new(0),
        release: Arc::clone(&fetch_gate),
    });
    let mut harness =
        setup_quiz_harness_with(quick_config(), stuck_clear_storage(&clear_gate), prompts);
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;
    assert_eq!(harness.snapshot().phase, SessionPhase::Playing);

    harness.dispatch(QuizIntent::Choose("Other A".to_string()));
    harness.settle().await;
    assert_eq!(harness.snapshot().phase, SessionPhase::Loading);

    harness.dispatch(QuizIntent::RequestRestart);
    harness.dispatch(QuizIntent::ConfirmRestart);
    harness.settle().await;

    fetch_gate.notify_one();
    harness.settle().await;
    clear_gate.notify_one();
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Playing);
    assert_eq!(snapshot.line.as_deref(), Some("Lyric 2"));
    assert_eq!(snapshot.score.total_played(), 1);
    let html = harness.render();
    assert!(
        html.contains("Your progress could not be saved or loaded."),
        "missing notice in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn advance_firing_during_failed_restart_is_kept() {
    let clear_gate = Arc::new(Notify::new());
    let config = services::QuizConfig {
        answer_delay: Duration::from_millis(300),
        ..quick_config()
    };
    let mut harness = setup_quiz_harness_with(
        config,
        stuck_clear_storage(&clear_gate),
        Arc::new(CountingPrompts::default()),
    );
    harness.rebuild();
    harness.dispatch(QuizIntent::Start);
    harness.settle().await;

    harness.dispatch(QuizIntent::Choose("Song 1".to_string()));
    harness.drive_async().await;
    harness.drive_async().await;
    assert_eq!(harness.snapshot().phase, SessionPhase::Revealed);

    harness.dispatch(QuizIntent::RequestRestart);
    harness.dispatch(QuizIntent::ConfirmRestart);
    harness.drive_async().await;

    // Let the advance timer elapse while the clear is still pending.
    tokio::time::sleep(Duration::from_millis(400)).await;
    harness.settle().await;
    clear_gate.notify_one();
    harness.settle().await;

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Playing);
    assert_eq!(snapshot.line.as_deref(), Some("Lyric 2"));
    assert_eq!(snapshot.score.total_correct(), 1);
}
