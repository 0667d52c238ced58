//! End-to-end check of the on-disk record format: what the measurement
//! side writes, the analysis side must read back unchanged.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::tempdir;

use uptime_monitor::log_record;
use uptime_monitor::log_writer::RotatingLog;
use uptime_monitor::ping::PingResult;
use uptime_monitor::{segments, summary};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_micro_opt(12, 0, 0, 250_000).unwrap()
}

fn connected_result(timestamp: NaiveDateTime) -> PingResult {
    PingResult {
        timestamp,
        connected: true,
        loss_percent: 25.0,
        sent: 4,
        received: 3,
        lost: 1,
        min_time: Some(9),
        max_time: Some(12),
        avg_time: Some(10),
        jitter: 2.5,
        test_duration: 0.5,
        ping_results: vec![Some(9), Some(12), None, Some(10)],
        error: String::new(),
    }
}

#[test]
fn written_records_parse_back_field_for_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("all_attempts.log");
    let mut log = RotatingLog::open(&path).unwrap();

    let ok = connected_result(base());
    let down = PingResult::failure(base() + Duration::seconds(10), 4, 4.0, "ping: sendmsg failed".into());
    log.write_line(&ok.to_log_entry()).unwrap();
    log.write_line(&down.to_log_entry()).unwrap();
    drop(log);

    let records = log_record::load_records(&path).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.timestamp, ok.timestamp);
    assert!(first.connected);
    assert_eq!(first.packet_loss, ok.loss_percent);
    assert_eq!((first.sent, first.received, first.lost), (4, 3, 1));
    assert_eq!((first.min_time, first.max_time, first.avg_time), (Some(9), Some(12), Some(10)));
    assert_eq!(first.jitter, 2.5);
    assert_eq!(first.duration, 500.0);
    assert_eq!(first.ping_results, ok.ping_results);

    // The failed cycle round-trips with its omissions intact: no RTT
    // clause comes back as absent, not zero, and the attempt list stays
    // empty.
    let second = &records[1];
    assert!(!second.connected);
    assert_eq!(second.packet_loss, 100.0);
    assert_eq!((second.min_time, second.max_time, second.avg_time), (None, None, None));
    assert!(second.ping_results.is_empty());
}

#[test]
fn partial_trailing_line_does_not_break_analysis() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("all_attempts.log");
    let mut log = RotatingLog::open(&path).unwrap();
    log.write_line(&connected_result(base()).to_log_entry()).unwrap();
    drop(log);

    // Simulate a write cut short mid-record.
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("2025-03-14 12:00:01.000000 - Connected: 0.0% pack");
    std::fs::write(&path, content).unwrap();

    let records = log_record::load_records(&path).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn recorded_history_segments_and_summarizes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("all_attempts.log");
    let mut log = RotatingLog::open(&path).unwrap();
    for offset in [0, 10, 20, 200, 210] {
        let result = connected_result(base() + Duration::seconds(offset));
        log.write_line(&result.to_log_entry()).unwrap();
    }
    drop(log);

    let records = log_record::load_records(&path).unwrap();
    let split = segments::split_on_gaps(records);
    assert_eq!(split.len(), 2);

    let summary = summary::summarize(&split);
    assert_eq!(summary.record_count, 5);
    assert_eq!(summary.mean_avg_ping, 10.0);
    assert_eq!(summary.timeout_count, 5);

    // Both runs span well under a minute.
    let kept = segments::filter_short(split, 1.0);
    assert!(kept.is_empty());
}
