use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::QuizSnapshot;
use quiz_core::model::Prompt;
use services::{PromptSource, PromptSourceError, QuizConfig, QuizServices};
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{QuizIntent, QuizTestHandles, QuizView};

/// Serves "Lyric N" / "Song N" prompts with three fixed distractors.
#[derive(Default)]
pub struct CountingPrompts {
    served: AtomicU32,
    failures_left: AtomicU32,
}

impl CountingPrompts {
    /// Fail the first `failures` fetches before serving prompts.
    pub fn failing_first(failures: u32) -> Self {
        Self {
            served: AtomicU32::new(0),
            failures_left: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl PromptSource for CountingPrompts {
    async fn fetch_prompt(&self) -> Result<Prompt, PromptSourceError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PromptSourceError::Unavailable("lyrics server down".to_string()));
        }
        let n = self.served.fetch_add(1, Ordering::SeqCst) + 1;
        let prompt = Prompt::new(
            format!("Lyric {n}"),
            format!("Song {n}"),
            vec!["Other A".into(), "Other B".into(), "Other C".into()],
        )?;
        Ok(prompt)
    }
}

#[derive(Clone)]
struct TestApp {
    quiz_services: QuizServices,
}

impl UiApp for TestApp {
    fn quiz_services(&self) -> QuizServices {
        self.quiz_services.clone()
    }
}

#[derive(Props, Clone)]
struct QuizHarnessProps {
    app: Arc<TestApp>,
    handles: QuizTestHandles,
}

impl PartialEq for QuizHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for QuizHarnessProps {}

#[component]
fn QuizRouterHarness(props: QuizHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    rsx! { QuizView {} }
}

pub struct QuizHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    handles: QuizTestHandles,
}

impl QuizHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub fn dispatch(&self, intent: QuizIntent) {
        self.handles.dispatch().call(intent);
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        self.handles.snapshot()
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive spawned work for a few rounds so chained tasks can finish.
    pub async fn settle(&mut self) {
        for _ in 0..6 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn quick_config() -> QuizConfig {
    QuizConfig {
        answer_delay: Duration::ZERO,
        ..QuizConfig::default()
    }
}

pub fn setup_quiz_harness(config: QuizConfig) -> QuizHarness {
    setup_quiz_harness_with_storage(config, Storage::in_memory())
}

pub fn setup_quiz_harness_with_storage(config: QuizConfig, storage: Storage) -> QuizHarness {
    setup_quiz_harness_with(config, storage, Arc::new(CountingPrompts::default()))
}

pub fn setup_quiz_harness_with(
    config: QuizConfig,
    storage: Storage,
    prompts: Arc<dyn PromptSource>,
) -> QuizHarness {
    let quiz_services = QuizServices::new(config, prompts, &storage);
    let handles = QuizTestHandles::default();

    let dom = VirtualDom::new_with_props(
        QuizRouterHarness,
        QuizHarnessProps {
            app: Arc::new(TestApp { quiz_services }),
            handles: handles.clone(),
        },
    );

    QuizHarness {
        dom,
        storage,
        handles,
    }
}
