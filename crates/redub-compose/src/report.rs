//! Per-run composition reporting.
//!
//! One outcome per segment, in index order. Skips are first-class data,
//! not log lines: the orchestrating pipeline reads the report to decide
//! whether a run degraded silently.

use serde::{Deserialize, Serialize};

/// Why a segment produced no overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Synthesis produced no clip for this segment.
    NoAudio,
    /// The referenced clip could not be decoded.
    DecodeFailed(String),
    /// The clip decoded but could not be conformed or stretched.
    PrepareFailed(String),
}

/// Terminal per-segment state of one composition run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOutcome {
    Overlaid {
        /// Whether the clip was time-stretched to fit its window.
        stretched: bool,
        /// Whether loudness normalization was applied (false when the
        /// clip was too quiet to measure).
        normalized: bool,
    },
    Skipped { reason: SkipReason },
}

impl SegmentOutcome {
    /// True for any `Overlaid` variant.
    pub fn is_overlaid(&self) -> bool {
        matches!(self, SegmentOutcome::Overlaid { .. })
    }
}

/// Summary of one composition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionReport {
    /// One outcome per segment, ascending index order.
    pub outcomes: Vec<SegmentOutcome>,
    /// Duration of the exported track in seconds.
    pub output_duration_secs: f64,
}

impl CompositionReport {
    /// Build a report from per-segment outcomes.
    pub fn new(outcomes: Vec<SegmentOutcome>, output_duration_secs: f64) -> Self {
        Self {
            outcomes,
            output_duration_secs,
        }
    }

    /// Total number of segments processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of segments overlaid onto the track.
    pub fn overlaid(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_overlaid()).count()
    }

    /// Number of segments skipped.
    pub fn skipped(&self) -> usize {
        self.total() - self.overlaid()
    }

    /// Number of overlaid segments that needed a time-stretch.
    pub fn stretched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SegmentOutcome::Overlaid { stretched: true, .. }))
            .count()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{}/{} segments overlaid ({} stretched, {} skipped), output {:.2}s",
            self.overlaid(),
            self.total(),
            self.stretched(),
            self.skipped(),
            self.output_duration_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = CompositionReport::new(
            vec![
                SegmentOutcome::Overlaid {
                    stretched: true,
                    normalized: true,
                },
                SegmentOutcome::Skipped {
                    reason: SkipReason::NoAudio,
                },
                SegmentOutcome::Overlaid {
                    stretched: false,
                    normalized: true,
                },
            ],
            12.5,
        );
        assert_eq!(report.total(), 3);
        assert_eq!(report.overlaid(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.stretched(), 1);
        assert!(report.summary().contains("2/3"));
    }

    #[test]
    fn test_empty_run() {
        let report = CompositionReport::new(Vec::new(), 10.0);
        assert_eq!(report.total(), 0);
        assert_eq!(report.overlaid(), 0);
        assert_eq!(report.skipped(), 0);
    }
}
