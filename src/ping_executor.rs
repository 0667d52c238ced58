use std::process::Command;
use std::time::Instant;

use chrono::Local;

use crate::config::MonitorConfig;
use crate::log_writer;
use crate::output_parser::parse_ping_output;
use crate::ping::PingResult;

pub struct PingExecutor;

impl PingExecutor {
    /// Run one probe cycle: spawn the platform ping, wait for it, and
    /// parse whatever it printed.
    ///
    /// A process that cannot be spawned at all is reported as a failed
    /// cycle with the error captured; it never aborts the caller.
    pub fn execute(config: &MonitorConfig) -> PingResult {
        let timestamp = Local::now().naive_local();
        let started = Instant::now();
        let output = Self::ping_command(&config.target, config.count, config.timeout).output();
        let test_duration = started.elapsed().as_secs_f64();

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                parse_ping_output(&stdout, &stderr, config.count, timestamp, test_duration)
            }
            Err(spawn_error) => {
                let message = format!("failed to invoke ping: {spawn_error}");
                log::error!("{message}");
                if let Err(log_error) =
                    log_writer::append_error(&config.error_log, "Error in ping cycle", &message)
                {
                    log::warn!("could not write to {}: {log_error}", config.error_log);
                }
                PingResult::failure(timestamp, config.count, test_duration, message)
            }
        }
    }

    fn ping_command(target: &str, count: u32, timeout_ms: u64) -> Command {
        let mut command = Command::new("ping");
        if cfg!(target_os = "windows") {
            // -w takes milliseconds
            command.args(["-n", &count.to_string(), "-w", &timeout_ms.to_string(), target]);
        } else {
            // -W takes seconds
            let timeout_secs = timeout_ms as f64 / 1000.0;
            command.args(["-c", &count.to_string(), "-W", &timeout_secs.to_string(), target]);
        }
        command
    }
}
