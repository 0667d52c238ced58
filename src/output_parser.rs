//! Turns raw ping output into a structured result.
//!
//! The summary lines the ping binary prints are authoritative when
//! present; otherwise every metric is derived from the individual reply
//! lines. Both the Windows dialect (`Reply from … time=9ms`,
//! `Sent = 4, Received = 3, Lost = 1`) and the iputils dialect
//! (`64 bytes from … time=9.83 ms`, `4 packets transmitted, 3 received`,
//! `rtt min/avg/max/mdev = …`) are recognized.

use chrono::NaiveDateTime;

use crate::ping::PingResult;

/// Parse one ping invocation's captured output.
///
/// `attempts` is the configured packet count, used when no summary line
/// is found.
pub fn parse_ping_output(
    output: &str,
    stderr: &str,
    attempts: u32,
    timestamp: NaiveDateTime,
    test_duration: f64,
) -> PingResult {
    let ping_results = classify_attempts(output);
    let valid: Vec<u32> = ping_results.iter().flatten().copied().collect();
    let jitter = jitter(&valid);

    let (sent, received, lost) = match summary_counts(output) {
        Some(counts) => counts,
        None => {
            let received = valid.len() as u32;
            (attempts, received, attempts.saturating_sub(received))
        }
    };
    let loss_percent = if sent > 0 {
        f64::from(lost) / f64::from(sent) * 100.0
    } else {
        100.0
    };

    let (min_time, max_time, avg_time) = match summary_times(output) {
        Some((min, max, avg)) => (Some(min), Some(max), Some(avg)),
        None if !valid.is_empty() => {
            let min = valid.iter().copied().min().unwrap_or(0);
            let max = valid.iter().copied().max().unwrap_or(0);
            // Floor division, matching the recorded integer format.
            let avg = valid.iter().map(|&v| u64::from(v)).sum::<u64>() / valid.len() as u64;
            (Some(min), Some(max), Some(avg as u32))
        }
        None => (None, None, None),
    };

    PingResult {
        timestamp,
        connected: received > 0,
        loss_percent,
        sent,
        received,
        lost,
        min_time,
        max_time,
        avg_time,
        jitter,
        test_duration,
        ping_results,
        error: stderr.trim().to_string(),
    }
}

/// Mean absolute difference between consecutive samples; `0.0` with
/// fewer than two samples.
pub fn jitter(samples: &[u32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let total: f64 = samples
        .windows(2)
        .map(|pair| (f64::from(pair[1]) - f64::from(pair[0])).abs())
        .sum();
    total / (samples.len() - 1) as f64
}

/// One entry per attempt line, in output order. Reply lines without a
/// readable time still count as an attempt; unrelated lines do not.
fn classify_attempts(output: &str) -> Vec<Option<u32>> {
    let mut results = Vec::new();
    for line in output.lines() {
        if line.contains("Reply from") || line.contains("bytes from") {
            results.push(extract_reply_time(line));
        } else if line.contains("Request timed out") {
            results.push(None);
        }
    }
    results
}

fn extract_reply_time(line: &str) -> Option<u32> {
    let pos = line.find("time=").or_else(|| line.find("time<"))?;
    let rest = &line[pos + 5..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    rest[..end].parse::<f64>().ok().map(|ms| ms as u32)
}

/// Sent/received/lost from the summary line, if one was printed.
fn summary_counts(output: &str) -> Option<(u32, u32, u32)> {
    for line in output.lines() {
        if line.contains("Sent = ") {
            let sent = number_after(line, "Sent = ")?;
            let received = number_after(line, "Received = ")?;
            let lost = number_after(line, "Lost = ")?;
            return Some((sent, received, lost));
        }
        if let Some(counts) = unix_counts(line) {
            return Some(counts);
        }
    }
    None
}

fn unix_counts(line: &str) -> Option<(u32, u32, u32)> {
    let transmitted = line.find(" packets transmitted")?;
    let sent: u32 = line[..transmitted].trim().parse().ok()?;
    let received_end = line.find(" received")?;
    let received_start = line[..received_end].rfind(", ")? + 2;
    let received: u32 = line[received_start..received_end].trim().parse().ok()?;
    Some((sent, received, sent.saturating_sub(received)))
}

/// Min/max/average round-trip times from the summary line, if printed.
fn summary_times(output: &str) -> Option<(u32, u32, u32)> {
    for line in output.lines() {
        if line.contains("Minimum = ") {
            let min = number_after(line, "Minimum = ")?;
            let max = number_after(line, "Maximum = ")?;
            let avg = number_after(line, "Average = ")?;
            return Some((min, max, avg));
        }
        if let Some(pos) = line.find("min/avg/max") {
            // rtt min/avg/max/mdev = 9.830/10.343/11.200/0.585 ms
            let equals = line[pos..].find('=')? + pos;
            let mut parts = line[equals + 1..].trim_start().split('/');
            let min = parts.next()?.trim().parse::<f64>().ok()? as u32;
            let avg = parts.next()?.trim().parse::<f64>().ok()? as u32;
            let max = parts.next()?.trim().parse::<f64>().ok()? as u32;
            return Some((min, max, avg));
        }
    }
    None
}

fn number_after(line: &str, key: &str) -> Option<u32> {
    let pos = line.find(key)?;
    let rest = &line[pos + key.len()..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const WINDOWS_OUTPUT: &str = "\
Pinging 8.8.8.8 with 32 bytes of data:
Reply from 8.8.8.8: bytes=32 time=9ms TTL=117
Reply from 8.8.8.8: bytes=32 time=12ms TTL=117
Request timed out.
Reply from 8.8.8.8: bytes=32 time=10ms TTL=117

Ping statistics for 8.8.8.8:
    Packets: Sent = 4, Received = 3, Lost = 1 (25% loss),
Approximate round trip times in milli-seconds:
    Minimum = 9ms, Maximum = 12ms, Average = 10ms
";

    const UNIX_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=9.83 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=11.2 ms
64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=10.0 ms

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 9.830/10.343/11.200/0.585 ms
";

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(9, 26, 53, 0)
            .unwrap()
    }

    #[test]
    fn parses_windows_output_with_summary() {
        let result = parse_ping_output(WINDOWS_OUTPUT, "", 4, timestamp(), 0.5);
        assert!(result.connected);
        assert_eq!((result.sent, result.received, result.lost), (4, 3, 1));
        assert_eq!(result.loss_percent, 25.0);
        assert_eq!(result.min_time, Some(9));
        assert_eq!(result.max_time, Some(12));
        assert_eq!(result.avg_time, Some(10));
        assert_eq!(result.ping_results, vec![Some(9), Some(12), None, Some(10)]);
        // |12-9| and |10-12| over two steps
        assert_eq!(result.jitter, 2.5);
    }

    #[test]
    fn parses_unix_output_with_summary() {
        let result = parse_ping_output(UNIX_OUTPUT, "", 3, timestamp(), 2.1);
        assert!(result.connected);
        assert_eq!((result.sent, result.received, result.lost), (3, 3, 0));
        assert_eq!(result.loss_percent, 0.0);
        assert_eq!((result.min_time, result.avg_time, result.max_time), (Some(9), Some(10), Some(11)));
        assert_eq!(result.ping_results, vec![Some(9), Some(11), Some(10)]);
    }

    #[test]
    fn falls_back_to_observed_attempts_without_summary() {
        let output = "\
Reply from 8.8.8.8: bytes=32 time=20ms TTL=117
Reply from 8.8.8.8: bytes=32 time=30ms TTL=117
";
        let result = parse_ping_output(output, "", 10, timestamp(), 0.2);
        assert_eq!((result.sent, result.received, result.lost), (10, 2, 8));
        assert_eq!(result.loss_percent, 80.0);
        // Derived arithmetically from the two samples.
        assert_eq!((result.min_time, result.max_time, result.avg_time), (Some(20), Some(30), Some(25)));
    }

    #[test]
    fn fallback_average_uses_floor_division() {
        let output = "\
Reply from 8.8.8.8: bytes=32 time=10ms TTL=117
Reply from 8.8.8.8: bytes=32 time=11ms TTL=117
";
        let result = parse_ping_output(output, "", 2, timestamp(), 0.1);
        assert_eq!(result.avg_time, Some(10));
    }

    #[test]
    fn no_replies_yields_disconnected_with_absent_times() {
        let output = "Request timed out.\nRequest timed out.\n";
        let result = parse_ping_output(output, "", 2, timestamp(), 2.0);
        assert!(!result.connected);
        assert_eq!(result.loss_percent, 100.0);
        assert_eq!((result.min_time, result.max_time, result.avg_time), (None, None, None));
        assert_eq!(result.ping_results, vec![None, None]);
        assert_eq!(result.jitter, 0.0);
    }

    #[test]
    fn sub_millisecond_reply_reads_as_one() {
        assert_eq!(extract_reply_time("Reply from 10.0.0.1: bytes=32 time<1ms TTL=64"), Some(1));
    }

    #[test]
    fn unreadable_reply_counts_as_unparsed_attempt() {
        let output = "Reply from 10.0.0.1: Destination host unreachable.\n";
        let result = parse_ping_output(output, "", 1, timestamp(), 1.0);
        assert_eq!(result.ping_results, vec![None]);
    }

    #[test]
    fn unrelated_lines_are_not_attempts() {
        let result = parse_ping_output("Pinging 8.8.8.8 with 32 bytes of data:\n", "", 4, timestamp(), 1.0);
        assert!(result.ping_results.is_empty());
    }

    #[test]
    fn jitter_needs_two_samples() {
        assert_eq!(jitter(&[]), 0.0);
        assert_eq!(jitter(&[42]), 0.0);
        assert_eq!(jitter(&[10, 14, 12]), 3.0);
    }

    #[test]
    fn stderr_is_captured_as_error() {
        let result = parse_ping_output("", "ping: unknown host\n", 4, timestamp(), 0.1);
        assert_eq!(result.error, "ping: unknown host");
    }
}
