//! Gap-aware segmentation of a chronological record sequence.

use crate::log_record::LogRecord;

/// Neighbors further apart than this belong to different segments.
const GAP_THRESHOLD_MS: i64 = 60 * 1000;

/// A contiguous run of records with no internal gap over the threshold.
#[derive(Debug, Clone)]
pub struct Segment {
    pub records: Vec<LogRecord>,
}

impl Segment {
    /// Span between the first and last record, in seconds.
    pub fn duration_secs(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }
}

/// Split a chronologically ordered sequence wherever the gap between
/// adjacent records strictly exceeds the threshold. Concatenating the
/// result reproduces the input.
pub fn split_on_gaps(records: Vec<LogRecord>) -> Vec<Segment> {
    let mut segments = Vec::new();
    if records.is_empty() {
        return segments;
    }
    let mut current: Vec<LogRecord> = Vec::new();
    for record in records {
        if let Some(previous) = current.last() {
            let gap_ms = (record.timestamp - previous.timestamp).num_milliseconds();
            if gap_ms > GAP_THRESHOLD_MS {
                segments.push(Segment {
                    records: std::mem::take(&mut current),
                });
            }
        }
        current.push(record);
    }
    segments.push(Segment { records: current });
    segments
}

/// Drop segments spanning less than `min_minutes`; `0` (or anything
/// non-positive) keeps everything. A segment with fewer than two records
/// has no measurable span and is dropped whenever a threshold is set.
/// Surviving segments keep their order; nothing is merged or split.
pub fn filter_short(segments: Vec<Segment>, min_minutes: f64) -> Vec<Segment> {
    if min_minutes <= 0.0 {
        return segments;
    }
    let threshold_secs = min_minutes * 60.0;
    segments
        .into_iter()
        .filter(|segment| segment.records.len() >= 2 && segment.duration_secs() >= threshold_secs)
        .collect()
}
