//! The measurement loop: probe, record, pace, repeat.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::MonitorConfig;
use crate::log_writer::RotatingLog;
use crate::ping_executor::PingExecutor;

/// Run probe cycles at the configured cadence until the optional duration
/// ceiling is reached or the stop flag is raised.
///
/// Each cycle is appended to the all-attempts log, echoed to stdout, and
/// additionally appended to the lost-connection log when no reply came
/// back. Both writers are owned by this function and therefore released
/// on every exit path.
pub fn run(config: &MonitorConfig, duration_minutes: Option<f64>, stop: Arc<AtomicBool>) -> Result<()> {
    let mut log_all = RotatingLog::open(&config.all_attempts_log)
        .with_context(|| format!("cannot open {}", config.all_attempts_log))?;
    let mut log_fail = RotatingLog::open(&config.lost_connection_log)
        .with_context(|| format!("cannot open {}", config.lost_connection_log))?;

    log::info!(
        "monitoring {} ({} packets per cycle, every {}s)",
        config.target,
        config.count,
        config.desired_interval
    );
    let started = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        if let Some(minutes) = duration_minutes {
            let elapsed_minutes = started.elapsed().as_secs_f64() / 60.0;
            if elapsed_minutes >= minutes {
                log::info!("test completed after {elapsed_minutes:.1} minutes");
                break;
            }
        }

        let result = PingExecutor::execute(config);
        let entry = result.to_log_entry();
        log_all
            .write_line(&entry)
            .with_context(|| format!("writing {}", config.all_attempts_log))?;
        if !result.connected {
            log_fail
                .write_line(&entry)
                .with_context(|| format!("writing {}", config.lost_connection_log))?;
        }
        println!("{entry}");

        // Hold the cadence: subtract what the cycle itself consumed.
        let sleep_secs = (config.desired_interval - result.test_duration).max(0.0);
        thread::sleep(Duration::from_secs_f64(sleep_secs));
    }

    Ok(())
}
