//! Cross-segment summary statistics.

use crate::segments::Segment;

/// Aggregated view over every record retained after filtering. The
/// `*_values` vectors are the flattened distributions a histogram
/// consumer needs; the means are plain arithmetic means over whatever
/// records are present (an empty input reports `0.0`, not an error).
#[derive(Debug, Default)]
pub struct Summary {
    pub segment_count: usize,
    pub record_count: usize,
    pub mean_avg_ping: f64,
    pub mean_jitter: f64,
    pub mean_packet_loss: f64,
    /// Timeouts across every record's attempt list.
    pub timeout_count: usize,
    pub ping_values: Vec<u32>,
    pub jitter_values: Vec<f64>,
    pub loss_values: Vec<f64>,
}

pub fn summarize(segments: &[Segment]) -> Summary {
    let mut summary = Summary {
        segment_count: segments.len(),
        ..Default::default()
    };
    let mut avg_ping_sum = 0.0;
    let mut avg_ping_count = 0usize;

    for record in segments.iter().flat_map(|segment| segment.records.iter()) {
        summary.record_count += 1;
        if let Some(avg) = record.avg_time {
            avg_ping_sum += f64::from(avg);
            avg_ping_count += 1;
        }
        summary.jitter_values.push(record.jitter);
        summary.loss_values.push(record.packet_loss);
        for attempt in &record.ping_results {
            match attempt {
                Some(ms) => summary.ping_values.push(*ms),
                None => summary.timeout_count += 1,
            }
        }
    }

    summary.mean_avg_ping = mean_or_zero(avg_ping_sum, avg_ping_count);
    summary.mean_jitter = mean_or_zero(summary.jitter_values.iter().sum::<f64>(), summary.jitter_values.len());
    summary.mean_packet_loss = mean_or_zero(summary.loss_values.iter().sum::<f64>(), summary.loss_values.len());
    summary
}

fn mean_or_zero(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}
