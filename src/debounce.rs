use std::collections::HashMap;

/// One prediction as reported by the backend each poll tick.
/// Confidence is a percentage in `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSample {
    pub label: String,
    pub confidence: f64,
}

/// Fixed lookup from gesture label to the text fragment it appends.
/// Labels without an entry are recognized but produce no output.
#[derive(Debug, Clone)]
pub struct GestureLexicon {
    entries: HashMap<String, String>,
}

impl Default for GestureLexicon {
    fn default() -> Self {
        let entries = [
            ("Hi", "Hello "),
            ("No", "No "),
            ("Ok", "Okay "),
            ("Talk", "Let's talk "),
            ("You", "You "),
        ]
        .into_iter()
        .map(|(label, fragment)| (label.to_string(), fragment.to_string()))
        .collect();

        Self { entries }
    }
}

impl GestureLexicon {
    pub fn fragment(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }
}

/// Debounces noisy per-frame predictions into discrete commits.
///
/// A gesture commits once it has been observed at or above the
/// confidence threshold for `min_stable` consecutive samples, and a
/// held gesture never commits twice: the label must change and
/// re-stabilize before it can commit again.
#[derive(Debug, Clone)]
pub struct StableDetector {
    threshold: f64,
    min_stable: u32,
    current_label: String,
    last_label: String,
    stable_count: u32,
    last_committed: String,
}

impl StableDetector {
    pub fn new(threshold: f64, min_stable: u32) -> Self {
        Self {
            threshold,
            min_stable,
            current_label: String::new(),
            last_label: String::new(),
            stable_count: 0,
            last_committed: String::new(),
        }
    }

    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    /// Feed one sample. Returns the label to commit, if this sample
    /// completed a fresh stable run.
    pub fn observe(&mut self, sample: &PredictionSample) -> Option<String> {
        if sample.confidence < self.threshold {
            // A confidence dip breaks the run but must not let the same
            // held gesture commit again, so last_committed survives.
            self.reset_run();
            return None;
        }

        self.current_label = sample.label.clone();
        if self.current_label == self.last_label {
            self.stable_count += 1;
        } else {
            self.stable_count = 1;
        }
        self.last_label = self.current_label.clone();

        if self.stable_count >= self.min_stable && self.current_label != self.last_committed {
            self.last_committed = self.current_label.clone();
            return Some(self.current_label.clone());
        }

        None
    }

    /// Clear the in-progress run only.
    fn reset_run(&mut self) {
        self.current_label.clear();
        self.last_label.clear();
        self.stable_count = 0;
    }

    /// Full reset for session stop: the next session starts with a
    /// clean slate, including the re-commit guard.
    pub fn reset(&mut self) {
        self.reset_run();
        self.last_committed.clear();
    }
}
