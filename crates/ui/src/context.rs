use std::sync::Arc;

use services::PracticeLoopService;

pub trait UiApp: Send + Sync {
    fn app_name(&self) -> &str;
    fn practice_loop(&self) -> Arc<PracticeLoopService>;
}

#[derive(Clone)]
pub struct AppContext {
    app_name: String,
    practice_loop: Arc<PracticeLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app_name: app.app_name().to_string(),
            practice_loop: app.practice_loop(),
        }
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
