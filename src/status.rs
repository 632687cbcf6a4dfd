//! Process-wide status indicator (the "3/5 uploaded" text in a status bar).
//!
//! Writers must hold a [`StatusGuard`]. Only the guard that set the text may
//! reset it, so a finishing operation cannot clear another one's progress.
//! Concurrent operations still overwrite each other's text.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusText {
    #[default]
    Idle,
    Busy(String),
}

#[derive(Debug, Default)]
struct Slot {
    owner: Option<u64>,
    text: StatusText,
}

#[derive(Debug, Default)]
pub struct StatusIndicator {
    slot: Mutex<Slot>,
    next_token: AtomicU64,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared indicator for this process.
    pub fn global() -> Arc<StatusIndicator> {
        static GLOBAL: OnceLock<Arc<StatusIndicator>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(StatusIndicator::new())))
    }

    pub fn text(&self) -> StatusText {
        self.slot.lock().text.clone()
    }

    /// Start writing to the indicator. The returned guard resets it on drop.
    pub fn acquire(self: &Arc<Self>) -> StatusGuard {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        StatusGuard {
            indicator: Arc::clone(self),
            token,
        }
    }

    fn set(&self, token: u64, text: String) {
        let mut slot = self.slot.lock();
        slot.owner = Some(token);
        slot.text = StatusText::Busy(text);
    }

    fn reset(&self, token: u64) {
        let mut slot = self.slot.lock();
        if slot.owner == Some(token) {
            slot.owner = None;
            slot.text = StatusText::Idle;
        }
    }
}

/// Write access to a [`StatusIndicator`] for one operation.
#[derive(Debug)]
pub struct StatusGuard {
    indicator: Arc<StatusIndicator>,
    token: u64,
}

impl StatusGuard {
    pub fn set(&self, text: impl Into<String>) {
        self.indicator.set(self.token, text.into());
    }

    /// Reset to idle, if this guard wrote the current text.
    pub fn reset(&self) {
        self.indicator.reset(self.token);
    }
}

impl Drop for StatusGuard {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_sets_and_resets() {
        let indicator = Arc::new(StatusIndicator::new());
        {
            let guard = indicator.acquire();
            guard.set("1/3");
            assert_eq!(indicator.text(), StatusText::Busy("1/3".to_string()));
        }
        assert_eq!(indicator.text(), StatusText::Idle);
    }

    #[test]
    fn test_only_owner_resets() {
        let indicator = Arc::new(StatusIndicator::new());
        let first = indicator.acquire();
        let second = indicator.acquire();

        first.set("1/4");
        second.set("2/9");
        drop(first);
        assert_eq!(indicator.text(), StatusText::Busy("2/9".to_string()));

        drop(second);
        assert_eq!(indicator.text(), StatusText::Idle);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&StatusIndicator::global(), &StatusIndicator::global()));
    }
}
