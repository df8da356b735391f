//! Terminal rendering of run progress.

use reindex_core::ProgressSurface;
use std::io::Write;
use std::sync::Mutex;

/// Prints one line per batch; remembers the last bar value so the percentage
/// and the counter print together.
#[derive(Default)]
pub struct ConsoleSurface {
    last_percent: Mutex<Option<(String, u8)>>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSurface for ConsoleSurface {
    fn set_progress(&self, category: &str, percent: u8) {
        let mut last = self.last_percent.lock().unwrap_or_else(|e| e.into_inner());
        let already_full = matches!(last.as_ref(), Some((c, 100)) if c == category);
        if percent == 100 && !already_full {
            println!("  {:<10} {:>3}%", category, percent);
        }
        *last = Some((category.to_string(), percent));
    }

    fn set_count(&self, category: &str, processed: u64) {
        let last = self.last_percent.lock().unwrap_or_else(|e| e.into_inner());
        let pct = match last.as_ref() {
            Some((c, p)) if c == category => *p,
            _ => 0,
        };
        if pct < 100 {
            println!("  {:<10} {:>3}%  {} processed", category, pct, processed);
        } else {
            println!("  {:<10}       {} processed", category, processed);
        }
    }

    fn announce(&self, message: &str) {
        println!("{}", message);
    }

    fn set_status(&self, text: &str) {
        println!("{}", text);
        let _ = std::io::stdout().flush();
    }

    fn report_fault(&self, message: &str) {
        eprintln!("reindex stalled: {}", message);
    }
}
