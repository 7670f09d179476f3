use std::sync::Arc;

use services::QuizServices;

pub trait UiApp: Send + Sync {
    fn quiz_services(&self) -> QuizServices;
}

#[derive(Clone)]
pub struct AppContext {
    quiz_services: QuizServices,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            quiz_services: app.quiz_services(),
        }
    }

    #[must_use]
    pub fn quiz_services(&self) -> QuizServices {
        self.quiz_services.clone()
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
