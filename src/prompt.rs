//! Boundary to whatever user interface drives the engine.

use async_trait::async_trait;

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

/// Confirmation prompts and notifications.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask the user to confirm a destructive or bulk action.
    async fn confirm(&self, message: &str) -> bool;

    fn notify(&self, notice: Notice);
}

/// Confirms everything and writes notices to the log. For headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Prompter for AutoConfirm {
    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, "auto-confirming");
        true
    }

    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(m) => tracing::info!("{}", m),
            Notice::Warning(m) => tracing::warn!("{}", m),
            Notice::Error(m) => tracing::error!("{}", m),
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use parking_lot::Mutex;

    /// Answers every prompt with a fixed value and records everything.
    #[derive(Debug)]
    pub(crate) struct RecordingPrompter {
        answer: bool,
        pub(crate) prompts: Mutex<Vec<String>>,
        pub(crate) notices: Mutex<Vec<Notice>>,
    }

    impl RecordingPrompter {
        pub(crate) fn answering(answer: bool) -> Self {
            Self {
                answer,
                prompts: Mutex::new(Vec::new()),
                notices: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn errors(&self) -> Vec<String> {
            self.notices
                .lock()
                .iter()
                .filter_map(|n| match n {
                    Notice::Error(m) => Some(m.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl Prompter for RecordingPrompter {
        async fn confirm(&self, message: &str) -> bool {
            self.prompts.lock().push(message.to_string());
            self.answer
        }

        fn notify(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }
    }
}
