use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use uptime_monitor::config::MonitorConfig;
use uptime_monitor::{log_record, log_writer, monitor, report, segments, summary};

#[derive(Parser)]
#[command(name = "uptime-monitor", version, about = "Network uptime monitoring and log analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Continuously probe the configured target and record the results
    Monitor {
        /// Configuration file (created with defaults when absent)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Stop after this many minutes; runs until interrupted when omitted
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Re-parse a recorded log into gap-aware statistics and reports
    Analyze {
        /// Log file produced by the monitor
        log_file: PathBuf,
        /// Drop contiguous runs spanning less than this many minutes (0 keeps all)
        #[arg(long, default_value_t = 0.0)]
        min_segment: f64,
        /// Directory for the sample excerpt and the report
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::Monitor { config, duration } => run_monitor(config, duration),
        Command::Analyze { log_file, min_segment, out } => run_analyze(&log_file, min_segment, &out),
    }
}

fn run_monitor(config_path: Option<PathBuf>, duration_minutes: Option<f64>) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path,
        None => MonitorConfig::default_path()?,
    };
    let config = MonitorConfig::load(&config_path)?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        log::info!("interrupt received, finishing the current cycle");
        stop_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install the interrupt handler")?;

    if let Err(error) = monitor::run(&config, duration_minutes, stop) {
        // Continuing with an unknown writer state risks corrupt output,
        // so record the diagnostic and surface the failure.
        if log_writer::append_error(&config.error_log, "Fatal error in monitor", &format!("{error:#}")).is_err() {
            log::error!("could not record the failure in {}", config.error_log);
        }
        return Err(error);
    }
    Ok(())
}

fn run_analyze(log_file: &Path, min_segment: f64, out_dir: &Path) -> Result<()> {
    let records = log_record::load_records(log_file)?;
    log::info!("parsed {} records from {}", records.len(), log_file.display());
    let first_timestamp = records.iter().map(|record| record.timestamp).min();

    let split = segments::split_on_gaps(records);
    if split.len() > 1 {
        log::warn!(
            "large time gaps detected: the data was split into {} separate runs",
            split.len()
        );
    }
    let kept = segments::filter_short(split, min_segment);
    let summary = summary::summarize(&kept);

    println!("Records: {}", summary.record_count);
    println!("Contiguous runs: {}", summary.segment_count);
    println!("Average ping: {:.1} ms", summary.mean_avg_ping);
    println!("Average jitter: {:.1} ms", summary.mean_jitter);
    println!("Average packet loss: {:.1}%", summary.mean_packet_loss);
    println!("Timeouts: {}", summary.timeout_count);

    std::fs::create_dir_all(out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;
    let sample_path = report::write_sample(log_file, first_timestamp, out_dir)?;
    println!("Sample data file saved at: {}", sample_path.display());
    let report_path = report::write_report(&summary, out_dir)?;
    println!("Report saved at: {}", report_path.display());
    Ok(())
}
