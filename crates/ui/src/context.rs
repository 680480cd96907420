use std::sync::Arc;

use services::sources::{AnswerSink, QuestionSource, WordLookup};
use services::{ApiConfig, AuthToken, HttpPracticeApi, SessionController};

/// What the application shell hands to the UI.
pub trait UiApp: Send + Sync {
    fn token(&self) -> AuthToken;
    fn config(&self) -> ApiConfig;
    fn api(&self) -> Arc<HttpPracticeApi>;
}

#[derive(Clone)]
pub struct AppContext {
    token: AuthToken,
    config: ApiConfig,
    api: Arc<HttpPracticeApi>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            token: app.token(),
            config: app.config(),
            api: app.api(),
        }
    }

    #[must_use]
    pub fn token(&self) -> AuthToken {
        self.token.clone()
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn api(&self) -> Arc<HttpPracticeApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn lookup(&self) -> Arc<dyn WordLookup> {
        self.api()
    }

    /// Session backed by the practice endpoints.
    #[must_use]
    pub fn practice_session(&self) -> SessionController {
        SessionController::new(self.api(), self.api()).with_config(&self.config)
    }

    /// Session over locally held questions, e.g. mistakes or a review set.
    #[must_use]
    pub fn local_session(
        &self,
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn AnswerSink>,
    ) -> SessionController {
        SessionController::new(source, sink).with_config(&self.config)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
