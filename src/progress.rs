// src/progress.rs
// =============================================================================
// Turns raw counters into a progress line for the operator.
//
// This is plain arithmetic: elapsed time, throughput, percent done and an
// ETA. It doesn't know about threads, terminals or files, so the crawler can
// call it at any moment and tests can feed it made-up numbers.
// =============================================================================

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Which phase the numbers belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressKind {
    Html,
    Images,
}

impl ProgressKind {
    fn unit(self) -> &'static str {
        match self {
            ProgressKind::Html => "urls",
            ProgressKind::Images => "imgs",
        }
    }

    fn title(self) -> &'static str {
        match self {
            ProgressKind::Html => "HTML",
            ProgressKind::Images => "IMAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub kind: ProgressKind,
    pub elapsed_secs: f64,
    pub completed: usize,
    pub total: usize,
    /// Percent of total, capped at 100
    pub percent: f64,
    /// None until something has completed and time has passed
    pub speed_per_sec: Option<f64>,
    /// None until at least one item completed
    pub eta_secs: Option<f64>,
    pub folder: PathBuf,
}

impl ProgressSnapshot {
    // Computes a snapshot
    //
    // Parameters:
    //   elapsed: time spent in this phase so far (frozen once it ended)
    //   completed: items finished
    //   total: items expected (page budget, or unique images found)
    //   folder: where the items are written
    pub fn compute(
        kind: ProgressKind,
        elapsed: Duration,
        completed: usize,
        total: usize,
        folder: &Path,
    ) -> Self {
        let elapsed_nanos = elapsed.as_nanos();
        let elapsed_secs = elapsed.as_secs_f64();
        let capped = completed.min(total);

        let percent = if total == 0 {
            0.0
        } else {
            capped as f64 / total as f64 * 100.0
        };

        let speed_per_sec = if completed == 0 || elapsed_nanos == 0 {
            None
        } else {
            Some(completed as f64 / elapsed_secs)
        };

        // remaining items times the average time per item
        let eta_secs = if completed == 0 {
            None
        } else {
            let remaining = (total - capped) as u128;
            let average_nanos = elapsed_nanos / completed as u128;
            Some((remaining * average_nanos) as f64 / 1e9)
        };

        Self {
            kind,
            elapsed_secs,
            completed,
            total,
            percent,
            speed_per_sec,
            eta_secs,
            folder: folder.to_path_buf(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let speed = match self.speed_per_sec {
            Some(speed) => format!("{:.1} {}/s", speed, self.kind.unit()),
            None => "n/a".to_string(),
        };
        let eta = match self.eta_secs {
            Some(eta) => format!("{:.1} s", eta),
            None => "n/a".to_string(),
        };

        write!(
            f,
            "{} status: {{timeElapsed: {:.2} s}} {{avgSpeed: {}}} {{downloaded: {}/{} [{:.1}%]}} {{eta: {}}} {{folder: {}}}",
            self.kind.title(),
            self.elapsed_secs,
            speed,
            self.completed,
            self.total,
            self.percent,
            eta,
            self.folder.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder() -> PathBuf {
        PathBuf::from("/archive/html")
    }

    #[test]
    fn test_halfway() {
        let snap = ProgressSnapshot::compute(ProgressKind::Html, Duration::from_secs(10), 50, 100, &folder());
        assert_eq!(snap.percent, 50.0);
        assert_eq!(snap.speed_per_sec, Some(5.0));
        // 50 remaining * 0.2 s each
        assert_eq!(snap.eta_secs, Some(10.0));
        assert!(!snap.is_done());
    }

    #[test]
    fn test_nothing_completed_yet() {
        let snap = ProgressSnapshot::compute(ProgressKind::Images, Duration::from_secs(3), 0, 20, &folder());
        assert_eq!(snap.speed_per_sec, None);
        assert_eq!(snap.eta_secs, None);
        assert_eq!(snap.percent, 0.0);
        let line = snap.to_string();
        assert!(line.starts_with("IMAGE status:"));
        assert!(line.contains("{avgSpeed: n/a}"));
        assert!(line.contains("{eta: n/a}"));
    }

    #[test]
    fn test_zero_elapsed_and_empty_total() {
        let snap = ProgressSnapshot::compute(ProgressKind::Images, Duration::ZERO, 0, 0, &folder());
        assert_eq!(snap.percent, 0.0);
        assert_eq!(snap.speed_per_sec, None);
    }

    #[test]
    fn test_overshoot_is_capped() {
        let snap = ProgressSnapshot::compute(ProgressKind::Html, Duration::from_secs(4), 12, 10, &folder());
        assert_eq!(snap.percent, 100.0);
        assert_eq!(snap.eta_secs, Some(0.0));
        assert!(snap.is_done());
        assert!(snap.to_string().contains("{downloaded: 12/10 [100.0%]}"));
    }
}
