//! Exported analysis artifacts: the sample excerpt and the summary report.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};

use crate::log_record;
use crate::summary::Summary;

/// Minutes of data included in the sample excerpt.
const SAMPLE_WINDOW_MINUTES: i64 = 30;

/// Write `sample_data.md`: the verbatim record lines within the first
/// 30 minutes of data, fenced in a markdown block. Returns the path
/// written.
pub fn write_sample(log_path: &Path, first_timestamp: Option<NaiveDateTime>, out_dir: &Path) -> Result<PathBuf> {
    let mut sample_lines: Vec<String> = Vec::new();
    if let Some(first) = first_timestamp {
        let sample_end = first + Duration::minutes(SAMPLE_WINDOW_MINUTES);
        let file = File::open(log_path)
            .with_context(|| format!("cannot open log file {}", log_path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("error reading {}", log_path.display()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(record) = log_record::parse_log_line(line) {
                if record.timestamp <= sample_end {
                    sample_lines.push(line.to_string());
                }
            }
        }
    }

    let mut text = String::from("### 30-Minute Data Sample (Exact Excerpt from Log File)\n\n");
    if sample_lines.is_empty() {
        text.push_str("No data available.\n");
    } else {
        text.push_str("```\n");
        text.push_str(&sample_lines.join("\n"));
        text.push_str("\n```\n");
    }

    let path = out_dir.join("sample_data.md");
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write `report.md`, a templated summary of the aggregated metrics.
pub fn write_report(summary: &Summary, out_dir: &Path) -> Result<PathBuf> {
    let text = format!(
        "# Network Quality Report\n\
         \n\
         ## Dataset\n\
         \n\
         - Records analyzed: {}\n\
         - Contiguous runs: {}\n\
         - Recorded timeouts: {}\n\
         \n\
         ## Averages\n\
         \n\
         - Ping: {:.1} ms\n\
         - Jitter: {:.1} ms\n\
         - Packet loss: {:.1}%\n\
         \n\
         ## What do these mean?\n\
         \n\
         - Ping: the delay between sending and receiving data.\n\
         - Jitter: how much that delay varies.\n\
         - Packet loss: the amount of data that never arrives.\n",
        summary.record_count,
        summary.segment_count,
        summary.timeout_count,
        summary.mean_avg_ping,
        summary.mean_jitter,
        summary.mean_packet_loss,
    );
    let path = out_dir.join("report.md");
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
