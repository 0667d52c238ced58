use chrono::NaiveDateTime;

/// Everything measured in one probe cycle.
#[derive(Debug, Clone)]
pub struct PingResult {
    pub timestamp: NaiveDateTime,
    pub connected: bool,
    pub loss_percent: f64,
    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    pub avg_time: Option<u32>,
    /// Mean absolute difference between consecutive received samples.
    pub jitter: f64,
    /// Wall-clock span of the cycle, in seconds.
    pub test_duration: f64,
    /// One entry per attempt in send order; `None` is a timeout or an
    /// attempt whose reply could not be read. Not reconciled with `sent`.
    pub ping_results: Vec<Option<u32>>,
    pub error: String,
}

impl PingResult {
    /// Result for a cycle where the ping process could not be run at all.
    pub fn failure(timestamp: NaiveDateTime, attempts: u32, test_duration: f64, error: String) -> Self {
        Self {
            timestamp,
            connected: false,
            loss_percent: 100.0,
            sent: attempts,
            received: 0,
            lost: attempts,
            min_time: None,
            max_time: None,
            avg_time: None,
            jitter: 0.0,
            test_duration,
            ping_results: Vec::new(),
            error,
        }
    }

    /// Format the result as one on-disk record line (no trailing newline).
    ///
    /// The Min/Max/Avg clause is omitted when no replies carried a time,
    /// and the Error clause is omitted when no diagnostic was captured.
    pub fn to_log_entry(&self) -> String {
        let status = if self.connected { "Connected" } else { "Disconnected" };
        let mut entry = format!(
            "{} - {}: {:.1}% packet loss (Sent: {}, Received: {}, Lost: {})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            status,
            self.loss_percent,
            self.sent,
            self.received,
            self.lost
        );
        if let (Some(min), Some(max), Some(avg)) = (self.min_time, self.max_time, self.avg_time) {
            entry.push_str(&format!(" Min: {min}ms, Max: {max}ms, Avg: {avg}ms"));
        }
        entry.push_str(&format!(
            " | Jitter: {:.1}ms, Duration: {:.1}ms",
            self.jitter,
            self.test_duration * 1000.0
        ));
        let results: Vec<String> = self
            .ping_results
            .iter()
            .map(|r| match r {
                Some(ms) => ms.to_string(),
                None => "timeout".to_string(),
            })
            .collect();
        entry.push_str(&format!(" | Ping Results: [{}]", results.join(", ")));
        if !self.error.trim().is_empty() {
            // The log is line oriented; stderr may span several lines.
            let flattened = self.error.trim().replace("\r\n", "; ").replace('\n', "; ");
            entry.push_str(&format!(" | Error: {flattened}"));
        }
        entry
    }
}
