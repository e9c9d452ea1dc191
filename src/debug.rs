use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use itertools::Itertools as _;

/// Where the engine sends its diagnostic events (drag lifecycle, hit changes, move decisions).
///
/// Injected into [`crate::DragBoard`], so hosts can route them into their own debug UI.
pub trait DiagnosticsSink {
    fn record(&mut self, frame: u64, message: &str);
}

/// Forwards every event to the `log` facade at debug level. The default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn record(&mut self, frame: u64, message: &str) {
        log::debug!("[frame {frame}] {message}");
    }
}

/// A bounded ring buffer of event lines, for easy copy-paste.
#[derive(Clone, Debug)]
pub struct DebugLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(200)
    }
}

impl DebugLog {
    /// `capacity` is clamped to `1..=10_000`.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.clamp(1, 10_000),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn text(&self) -> String {
        self.lines.iter().join("\n")
    }

    /// Does any line contain `needle`?
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticsSink for DebugLog {
    fn record(&mut self, frame: u64, message: &str) {
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(format!("[frame {frame}] {message}"));
    }
}

impl<T: DiagnosticsSink> DiagnosticsSink for Rc<RefCell<T>> {
    fn record(&mut self, frame: u64, message: &str) {
        if let Ok(mut sink) = self.try_borrow_mut() {
            sink.record(frame, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut log = DebugLog::new(2);
        log.record(1, "a");
        log.record(2, "b");
        log.record(3, "c");
        assert_eq!(log.len(), 2);
        assert_eq!(log.text(), "[frame 2] b\n[frame 3] c");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = DebugLog::new(0);
        log.record(1, "only");
        log.record(2, "latest");
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["[frame 2] latest"]);
    }
}
