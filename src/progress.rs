//! Progress reporting for uploads and recursive deletes.

/// Progress of a counted bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    /// Items finished so far
    pub done: u64,
    /// Total items, fixed before the operation starts
    pub total: u64,
    /// Item that was just finished (file name, folder path, ...)
    pub label: String,
}

impl TransferProgress {
    /// Create a new progress report.
    pub fn new(done: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            done,
            total,
            label: label.into(),
        }
    }

    /// Get progress as a percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).min(100.0)
    }

    /// Share of the whole that one finished item represents, in percent.
    pub fn increment(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 / self.total as f64
    }

    /// Check if the operation is complete.
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }

    /// Short "done/total" form used by the status indicator.
    pub fn fraction(&self) -> String {
        format!("{}/{}", self.done, self.total)
    }
}

/// Type alias for progress callback function.
pub type ProgressCallback = Box<dyn FnMut(&TransferProgress) + Send>;

/// A callback that ignores every report.
pub fn no_progress() -> ProgressCallback {
    Box::new(|_| {})
}

/// Create a simple progress callback that prints to stdout.
///
/// # Example
/// ```no_run
/// use spacefs::progress::make_progress_bar;
///
/// let callback = make_progress_bar();
/// ```
pub fn make_progress_bar() -> ProgressCallback {
    Box::new(|progress: &TransferProgress| {
        let percent = progress.percent();
        let bar_width = 40;
        let filled = ((percent / 100.0 * bar_width as f64) as usize).min(bar_width);
        let empty = bar_width - filled;

        print!(
            "\r[{}{}] {:.1}% {} - {}",
            "=".repeat(filled),
            " ".repeat(empty),
            percent,
            progress.fraction(),
            progress.label,
        );

        if progress.is_complete() {
            println!();
        }

        use std::io::Write;
        let _ = std::io::stdout().flush();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_and_increment() {
        let p = TransferProgress::new(2, 5, "b.txt");
        assert_eq!(p.percent(), 40.0);
        assert_eq!(p.increment(), 20.0);
        assert_eq!(p.fraction(), "2/5");
        assert!(!p.is_complete());

        let done = TransferProgress::new(5, 5, "e.txt");
        assert_eq!(done.percent(), 100.0);
        assert!(done.is_complete());
    }

    #[test]
    fn test_zero_total() {
        let p = TransferProgress::new(0, 0, "");
        assert_eq!(p.percent(), 0.0);
        assert_eq!(p.increment(), 0.0);
        assert!(p.is_complete());
    }

    #[test]
    fn test_percent_is_capped() {
        assert_eq!(TransferProgress::new(7, 5, "x").percent(), 100.0);
    }
}
