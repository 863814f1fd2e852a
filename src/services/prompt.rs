//! User interaction capability used by row actions.

use async_trait::async_trait;

/// Blocking user-input dialogs, injected so the controller can run without a UI.
#[async_trait]
pub trait UserPrompt {
    /// Asks a yes/no question; `true` means the user confirmed.
    async fn confirm(&self, message: &str) -> bool;

    /// Asks for free text; `None` means the user dismissed the dialog.
    async fn ask(&self, message: &str) -> Option<String>;
}

/// Prompt that replays fixed answers, for scripted and non-interactive runs.
#[derive(Clone, Debug, Default)]
pub struct FixedPrompt {
    pub confirm: bool,
    pub answer: Option<String>,
}

impl FixedPrompt {
    pub fn accepting(answer: impl Into<String>) -> Self {
        Self {
            confirm: true,
            answer: Some(answer.into()),
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserPrompt for FixedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        log::debug!("Prompt `{message}` answered {}", self.confirm);
        self.confirm
    }

    async fn ask(&self, message: &str) -> Option<String> {
        log::debug!("Prompt `{message}` answered {:?}", self.answer);
        self.answer.clone()
    }
}

#[cfg(any(test, feature = "test-mocks"))]
pub mod mock {
    use async_trait::async_trait;
    use mockall::mock;

    use super::UserPrompt;

    mock! {
        pub Prompt {}

        #[async_trait]
        impl UserPrompt for Prompt {
            async fn confirm(&self, message: &str) -> bool;
            async fn ask(&self, message: &str) -> Option<String>;
        }
    }
}
