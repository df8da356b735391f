//! Presentation surface the run reports into.
//!
//! The core never renders anything itself; a CLI, a TUI or a test recorder
//! implements this trait and decides how each call is shown.

/// Receives progress and status updates for one run.
pub trait ProgressSurface: Send + Sync {
    /// Progress bar value for `category`, in `0..=100`.
    fn set_progress(&self, category: &str, percent: u8);

    /// Raw accumulated processed count for `category`.
    fn set_count(&self, category: &str, processed: u64);

    /// Accessibility-style announcement (run started, run completed).
    fn announce(&self, message: &str);

    /// Replace the status region with `text`, shown verbatim.
    fn set_status(&self, text: &str);

    /// The run stalled and will not advance any further.
    fn report_fault(&self, message: &str);
}
