//! Progress reporting for long-running operations.
//!
//! The install engine reports through the [`ProgressSink`] trait instead of
//! talking to a rendering library directly: the CLI installs
//! [`TerminalProgress`] (indicatif multi-bar), tests and non-TTY runs use
//! [`NoopProgress`].

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Opaque handle for one tracked task.
pub type TaskId = usize;

/// Receiver for progress events emitted by install workers.
pub trait ProgressSink: Send + Sync {
    /// Begin tracking a task; the returned id is passed to every other call.
    fn start(&self, label: &str) -> TaskId;
    /// Total byte count, once known (from `Content-Length`).
    fn set_total(&self, id: TaskId, total: u64);
    /// Bytes written since the last call.
    fn advance(&self, id: TaskId, bytes: u64);
    /// Replace the task label (phase changes, retries).
    fn set_label(&self, id: TaskId, label: &str);
    /// Mark the task finished.
    fn finish(&self, id: TaskId);
}

/// Sink that discards everything.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&self, _label: &str) -> TaskId {
        0
    }
    fn set_total(&self, _id: TaskId, _total: u64) {}
    fn advance(&self, _id: TaskId, _bytes: u64) {}
    fn set_label(&self, _id: TaskId, _label: &str) {}
    fn finish(&self, _id: TaskId) {}
}

/// Terminal sink rendering one indicatif bar per task.
pub struct TerminalProgress {
    multi: MultiProgress,
    bars: Mutex<Vec<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(Vec::new()),
        }
    }

    fn bar(&self, id: TaskId) -> Option<ProgressBar> {
        self.bars.lock().expect("progress mutex poisoned").get(id).cloned()
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn start(&self, label: &str) -> TaskId {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("static template"),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        let mut bars = self.bars.lock().expect("progress mutex poisoned");
        bars.push(pb);
        bars.len() - 1
    }

    fn set_total(&self, id: TaskId, total: u64) {
        if let Some(pb) = self.bar(id) {
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("static template")
                    .progress_chars("━━╸"),
            );
            pb.set_length(total);
        }
    }

    fn advance(&self, id: TaskId, bytes: u64) {
        if let Some(pb) = self.bar(id) {
            pb.inc(bytes);
        }
    }

    fn set_label(&self, id: TaskId, label: &str) {
        if let Some(pb) = self.bar(id) {
            pb.set_message(label.to_string());
        }
    }

    fn finish(&self, id: TaskId) {
        if let Some(pb) = self.bar(id) {
            pb.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_hands_out_ids() {
        let sink = NoopProgress;
        let id = sink.start("anything");
        sink.set_total(id, 100);
        sink.advance(id, 50);
        sink.set_label(id, "halfway");
        sink.finish(id);
    }

    #[test]
    fn terminal_sink_ids_are_sequential() {
        let sink = TerminalProgress::new();
        let a = sink.start("a");
        let b = sink.start("b");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        sink.finish(a);
        sink.finish(b);
    }
}
