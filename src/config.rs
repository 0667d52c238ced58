use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Dotted-quad address to probe.
    pub target: String,
    /// Packets sent per probe cycle (1-100).
    pub count: u32,
    /// Per-attempt timeout in milliseconds (100-60000).
    pub timeout: u64,
    /// Seconds between the start of consecutive cycles (0.1-60).
    pub desired_interval: f64,
    pub all_attempts_log: String,
    pub lost_connection_log: String,
    pub error_log: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target: "8.8.8.8".to_string(),
            count: 10,
            timeout: 1000,
            desired_interval: 0.1,
            all_attempts_log: "all_attempts.log".to_string(),
            lost_connection_log: "lost_connection.log".to_string(),
            error_log: "error.log".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine the user configuration directory")?
            .join("uptime-monitor");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("failed to create {}", config_dir.display()))?;
        Ok(config_dir.join("config.json"))
    }

    /// Load the configuration, writing a default file first when none
    /// exists. Out-of-range values are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            let config = Self::default();
            config.save(path)?;
            log::info!("created default configuration at {}", path.display());
            config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if !is_dotted_quad(&self.target) {
            bail!("invalid target address: {:?}", self.target);
        }
        if !(1..=100).contains(&self.count) {
            bail!("count must be between 1 and 100");
        }
        if !(100..=60_000).contains(&self.timeout) {
            bail!("timeout must be between 100ms and 60000ms");
        }
        if !(0.1..=60.0).contains(&self.desired_interval) {
            bail!("desired_interval must be between 0.1 and 60 seconds");
        }
        Ok(())
    }
}

fn is_dotted_quad(target: &str) -> bool {
    let octets: Vec<&str> = target.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|octet| (1..=3).contains(&octet.len()) && octet.bytes().all(|b| b.is_ascii_digit()))
}
