//! Re-parses persisted log lines into structured records.
//!
//! This is the inverse of `PingResult::to_log_entry`. Lines that do not
//! match the record format (partial writes, truncated tails, stray
//! output) are skipped rather than treated as errors, so analysis can
//! run against a log that is still being appended to.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// One measurement record reconstructed from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub connected: bool,
    pub packet_loss: f64,
    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    pub avg_time: Option<u32>,
    pub jitter: f64,
    /// Cycle duration in milliseconds, as recorded.
    pub duration: f64,
    pub ping_results: Vec<Option<u32>>,
}

/// Parse one log line, or `None` when the line does not match the
/// record format.
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let (timestamp_str, rest) = line.split_once(" - ")?;
    let timestamp = NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S%.f").ok()?;

    let (status, rest) = rest.split_once(": ")?;
    let connected = match status {
        "Connected" => true,
        "Disconnected" => false,
        _ => return None,
    };

    let (loss_str, rest) = rest.split_once("% packet loss (")?;
    let packet_loss: f64 = loss_str.parse().ok()?;
    let (counts, rest) = rest.split_once(')')?;
    let sent = field_u32(counts, "Sent: ")?;
    let received = field_u32(counts, "Received: ")?;
    let lost = field_u32(counts, "Lost: ")?;

    // Between the counts and the jitter clause sits the optional
    // Min/Max/Avg clause; absent means no replies carried a time.
    let (rtt_part, rest) = rest.split_once(" | Jitter: ")?;
    let (min_time, max_time, avg_time) = if rtt_part.trim().is_empty() {
        (None, None, None)
    } else {
        (
            Some(field_u32(rtt_part, "Min: ")?),
            Some(field_u32(rtt_part, "Max: ")?),
            Some(field_u32(rtt_part, "Avg: ")?),
        )
    };

    let (jitter_str, rest) = rest.split_once("ms, Duration: ")?;
    let jitter: f64 = jitter_str.parse().ok()?;
    let (duration_str, rest) = rest.split_once("ms | Ping Results: [")?;
    let duration: f64 = duration_str.parse().ok()?;

    let (results_str, _) = rest.split_once(']')?;
    let ping_results = parse_attempt_tokens(results_str);

    Some(LogRecord {
        timestamp,
        connected,
        packet_loss,
        sent,
        received,
        lost,
        min_time,
        max_time,
        avg_time,
        jitter,
        duration,
        ping_results,
    })
}

/// Load every parsable record from a log file. A missing or unreadable
/// file is an error; malformed lines are skipped silently.
pub fn load_records(path: &Path) -> Result<Vec<LogRecord>> {
    let file = File::open(path).with_context(|| format!("cannot open log file {}", path.display()))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("error reading {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(record) = parse_log_line(line) {
            records.push(record);
        }
    }
    Ok(records)
}

/// `timeout` maps to an absent value; so does anything else that is not
/// a plain number.
fn parse_attempt_tokens(text: &str) -> Vec<Option<u32>> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|token| {
            let token = token.trim().to_ascii_lowercase();
            if token == "timeout" { None } else { token.parse().ok() }
        })
        .collect()
}

fn field_u32(text: &str, key: &str) -> Option<u32> {
    let pos = text.find(key)?;
    let rest = &text[pos + key.len()..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse().ok()
}
