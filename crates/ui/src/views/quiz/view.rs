#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use tracing::debug;

use quiz_core::QuizSnapshot;
use quiz_core::model::{AdvanceTicket, FetchTicket};
use services::{FetchCompletion, PromptSource, QuizController, fetch_prompt};

use super::advance::PendingAdvance;
use super::screen::QuizScreen;
use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::map_quiz_screen;

/// Everything the player can do on the quiz screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Start,
    Choose(String),
    Retry,
    RequestRestart,
    ConfirmRestart,
    CancelRestart,
}

/// Work that needs the controller and arrived while it was out of its signal.
enum Deferred {
    Fetch(FetchCompletion),
    Advance(AdvanceTicket),
}

/// Signals backing one mounted quiz.
///
/// The controller is taken out of its signal while a store call is awaited and
/// put back afterwards. Prompt fetches and advance timers never wait for it:
/// whatever lands in the meantime is queued in `deferred` and replayed, in
/// arrival order, when the controller is put back. Tickets decide whether the
/// replayed work still applies.
#[derive(Clone, Copy)]
struct QuizHandles {
    controller: Signal<Option<QuizController>>,
    source: Signal<Arc<dyn PromptSource>>,
    deferred: Signal<Vec<Deferred>>,
    snapshot: Signal<QuizSnapshot>,
    error: Signal<Option<ViewError>>,
    pending: Signal<Option<PendingAdvance>>,
}

impl QuizHandles {
    fn publish(mut self) {
        let snapshot = self
            .controller
            .read()
            .as_ref()
            .map(QuizController::snapshot);
        if let Some(snapshot) = snapshot {
            self.snapshot.set(snapshot);
        }
    }

    fn with_controller<R>(mut self, f: impl FnOnce(&mut QuizController) -> R) -> Option<R> {
        let result = self.controller.write().as_mut().map(f);
        self.publish();
        result
    }

    fn take(mut self) -> Option<QuizController> {
        self.controller.write().take()
    }

    fn put_back(mut self, controller: QuizController) {
        *self.controller.write() = Some(controller);
        let queued = std::mem::take(&mut *self.deferred.write());
        for work in queued {
            self.apply(work);
        }
        self.publish();
    }

    fn apply_or_defer(mut self, work: Deferred) {
        if self.controller.read().is_none() {
            debug!("controller busy, deferring quiz work");
            self.deferred.write().push(work);
            return;
        }
        self.apply(work);
    }

    fn apply(self, work: Deferred) {
        match work {
            Deferred::Fetch(completion) => {
                self.with_controller(|controller| controller.complete_fetch(completion));
            }
            Deferred::Advance(ticket) => {
                let next = self
                    .with_controller(|controller| controller.advance(ticket))
                    .flatten();
                if let Some(next) = next {
                    spawn(async move {
                        self.load(next).await;
                    });
                }
            }
        }
    }

    fn report(mut self, error: Option<ViewError>) {
        self.error.set(error);
    }

    fn start(self) {
        spawn(async move {
            let Some(mut controller) = self.take() else {
                return;
            };
            let started = controller.start().await;
            self.put_back(controller);
            match started {
                Ok(Some(ticket)) => {
                    self.report(None);
                    self.load(ticket).await;
                }
                Ok(None) => {}
                Err(_) => self.report(Some(ViewError::Storage)),
            }
        });
    }

    async fn load(self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source.read());
        let completion = fetch_prompt(source, ticket).await;
        self.apply_or_defer(Deferred::Fetch(completion));
    }

    fn choose(self, title: String) {
        spawn(async move {
            let Some(mut controller) = self.take() else {
                return;
            };
            let scored = controller.submit_answer(&title).await;
            let delay = controller.answer_delay();
            self.put_back(controller);

            if let Some(scored) = scored {
                let error = (!scored.persisted).then_some(ViewError::Storage);
                self.report(error);
                self.schedule_advance(scored.outcome.advance, delay);
            }
        });
    }

    fn schedule_advance(mut self, ticket: AdvanceTicket, delay: Duration) {
        let task = spawn(async move {
            tokio::time::sleep(delay).await;
            let mut pending = self.pending;
            if pending.read().as_ref().map(PendingAdvance::ticket) == Some(ticket) {
                pending.set(None);
            }
            self.apply_or_defer(Deferred::Advance(ticket));
        });
        debug!(%ticket, ?delay, "advance scheduled");
        let previous = self.pending.write().replace(PendingAdvance::new(ticket, task));
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn retry(self) {
        let ticket = self
            .with_controller(QuizController::retry_fetch)
            .flatten();
        if let Some(ticket) = ticket {
            spawn(async move {
                self.load(ticket).await;
            });
        }
    }

    fn request_restart(self) {
        self.with_controller(QuizController::request_restart);
    }

    fn cancel_restart(self) {
        self.with_controller(QuizController::cancel_restart);
    }

    fn confirm_restart(mut self) {
        spawn(async move {
            let Some(mut controller) = self.take() else {
                return;
            };
            let result = controller.confirm_restart().await;
            self.put_back(controller);
            match result {
                Ok(restarted) => {
                    if restarted {
                        if let Some(pending) = self.pending.write().take() {
                            pending.cancel();
                        }
                    }
                    self.report(None);
                }
                Err(_) => self.report(Some(ViewError::Storage)),
            }
        });
    }
}

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let services = ctx.quiz_services();

    let source = use_signal({
        let services = services.clone();
        move || services.prompt_source()
    });
    let controller = use_signal(move || Some(services.controller()));
    let deferred = use_signal(Vec::<Deferred>::new);
    let snapshot = use_signal(QuizSnapshot::default);
    let error = use_signal(|| None::<ViewError>);
    let pending = use_signal(|| None::<PendingAdvance>);
    let handles = QuizHandles {
        controller,
        source,
        deferred,
        snapshot,
        error,
        pending,
    };

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        debug!(?intent, "quiz intent");
        match intent {
            QuizIntent::Start => handles.start(),
            QuizIntent::Choose(title) => handles.choose(title),
            QuizIntent::Retry => handles.retry(),
            QuizIntent::RequestRestart => handles.request_restart(),
            QuizIntent::ConfirmRestart => handles.confirm_restart(),
            QuizIntent::CancelRestart => handles.cancel_restart(),
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(test_handles) = try_consume_context::<QuizTestHandles>() {
                test_handles.register(dispatch_intent, snapshot);
            }
        }
    }

    let vm = map_quiz_screen(&snapshot.read(), error());

    rsx! {
        div { class: "page",
            QuizScreen {
                vm,
                on_start: move |()| dispatch_intent.call(QuizIntent::Start),
                on_choice: move |title: String| dispatch_intent.call(QuizIntent::Choose(title)),
                on_retry: move |()| dispatch_intent.call(QuizIntent::Retry),
                on_restart_request: move |()| dispatch_intent.call(QuizIntent::RequestRestart),
                on_restart_confirm: move |()| dispatch_intent.call(QuizIntent::ConfirmRestart),
                on_restart_cancel: move |()| dispatch_intent.call(QuizIntent::CancelRestart),
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    snapshot: Rc<RefCell<Option<Signal<QuizSnapshot>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>, snapshot: Signal<QuizSnapshot>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.snapshot.borrow_mut() = Some(snapshot);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn snapshot(&self) -> QuizSnapshot {
        let signal = (*self.snapshot.borrow()).expect("quiz snapshot registered");
        signal.read().clone()
    }
}
