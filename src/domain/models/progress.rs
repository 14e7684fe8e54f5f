#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;

use std::fmt;

/// Percentage reported once extraction has been requested.
pub const EXTRACTION_PERCENT: u8 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineStage {
    #[default]
    Idle,
    Extracting,
    Summarizing {
        done: usize,
        total: usize,
    },
    Complete,
    Error,
}

impl PipelineStage {
    pub fn is_running(&self) -> bool {
        return matches!(
            self,
            PipelineStage::Extracting | PipelineStage::Summarizing { .. }
        );
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => return write!(f, "Idle"),
            PipelineStage::Extracting => return write!(f, "Extracting slides"),
            PipelineStage::Summarizing { done, total } => {
                return write!(f, "Summarizing slide {done}/{total}");
            }
            PipelineStage::Complete => return write!(f, "Done"),
            PipelineStage::Error => return write!(f, "Error"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub label: String,
}

/// `round(completed / total * 100)`, where an empty deck still counts as one unit.
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    let total = total.max(1);
    let completed = completed.min(total);
    let percent = (completed as f64 / total as f64 * 100.0).round();
    return percent as u8;
}

/// Keeps a run's progress non-decreasing and reserves 100 for completion.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: u8,
    finished: bool,
}

impl ProgressTracker {
    pub fn advance(&mut self, percent: u8) -> u8 {
        if !self.finished {
            self.last = self.last.max(percent.min(99));
        }
        return self.last;
    }

    /// Returns 100 the first time it is called, None afterwards.
    pub fn finish(&mut self) -> Option<u8> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.last = 100;
        return Some(100);
    }

    pub fn current(&self) -> u8 {
        return self.last;
    }
}
