//! Configuration loading from sortbench.toml
//!
//! The configuration is automatically discovered by walking up from the
//! current directory. Command-line flags override every value found here.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up by [`SortbenchConfig::discover`]
pub const CONFIG_FILE: &str = "sortbench.toml";

/// sortbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SortbenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Instruction file location
    #[serde(default)]
    pub input: InputConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Isolation mode for job execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationMode {
    /// Run each sort in a worker process that can be killed (default)
    #[default]
    Process,
    /// Run each sort on its own thread, abandoned on timeout. The abandoned
    /// thread keeps its CPU and memory until the sort returns.
    Thread,
    /// Run on the driver thread without a timeout (debugging)
    InProcess,
}

impl IsolationMode {
    /// Name used in config files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            IsolationMode::Process => "process",
            IsolationMode::Thread => "thread",
            IsolationMode::InProcess => "in-process",
        }
    }
}

impl std::fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IsolationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "process" => Ok(IsolationMode::Process),
            "thread" => Ok(IsolationMode::Thread),
            "in-process" | "inprocess" => Ok(IsolationMode::InProcess),
            other => Err(anyhow::anyhow!(
                "Unknown isolation mode: {} (expected process, thread or in-process)",
                other
            )),
        }
    }
}

/// Runner configuration for job execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timeout for a single sort (e.g., "7200s", "90m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Isolation mode: "process", "thread", or "in-process"
    #[serde(default)]
    pub isolation: IsolationMode,
    /// Spawn a fresh worker process for every job
    #[serde(default)]
    pub one_shot: bool,
    /// Seed for random vectors; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            isolation: IsolationMode::default(),
            one_shot: false,
            seed: None,
        }
    }
}

fn default_timeout() -> String {
    "7200s".to_string()
}

/// Instruction input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Instruction file, one `method,size,vectorType` per line
    #[serde(default = "default_input_path")]
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> String {
    "input.txt".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format: "table", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Report file
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: default_output_path(),
        }
    }
}

fn default_format() -> String {
    "table".to_string()
}
fn default_output_path() -> String {
    "output.txt".to_string()
}

impl SortbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!("loaded config from {}", config_path.display());
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# sortbench configuration

[runner]
# Hard timeout for a single sort (ns, us, ms, s, m, h)
timeout = "7200s"
# Isolation mode: "process", "thread", or "in-process"
isolation = "process"
# Spawn a fresh worker process for every job
one_shot = false
# Fixed seed for random vectors (uncomment to enable)
# seed = 42

[input]
# Instruction file: one "method,size,vectorType" per line
path = "input.txt"

[output]
# Report format: table, json, csv
format = "table"
# Report file
path = "output.txt"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "7200s", "500ms", "2h")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SortbenchConfig::default();
        assert_eq!(config.runner.timeout, "7200s");
        assert_eq!(config.runner.isolation, IsolationMode::Process);
        assert!(!config.runner.one_shot);
        assert_eq!(config.runner.seed, None);
        assert_eq!(config.input.path, "input.txt");
        assert_eq!(config.output.path, "output.txt");
    }

    #[test]
    fn test_parse_duration() {
        let parse = |s| SortbenchConfig::parse_duration(s).unwrap();
        assert_eq!(parse("7200s"), Duration::from_secs(7200));
        assert_eq!(parse("500ms"), Duration::from_millis(500));
        assert_eq!(parse("100us"), Duration::from_micros(100));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("2h"), Duration::from_secs(7200));
        assert_eq!(parse("1.5s"), Duration::from_millis(1500));
        assert_eq!(parse("30"), Duration::from_secs(30));
        assert!(SortbenchConfig::parse_duration("").is_err());
        assert!(SortbenchConfig::parse_duration("10 parsecs").is_err());
        assert!(SortbenchConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            timeout = "5s"
            isolation = "in-process"
            seed = 7
        "#;

        let config: SortbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.timeout, "5s");
        assert_eq!(config.runner.isolation, IsolationMode::InProcess);
        assert_eq!(config.runner.seed, Some(7));
        // Defaults should still apply
        assert_eq!(config.output.format, "table");
        assert_eq!(config.input.path, "input.txt");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: SortbenchConfig = toml::from_str(&SortbenchConfig::default_toml()).unwrap();
        assert_eq!(config.runner.timeout, "7200s");
        assert_eq!(config.runner.isolation, IsolationMode::Process);
    }

    #[test]
    fn test_isolation_mode_names() {
        for mode in [IsolationMode::Process, IsolationMode::Thread, IsolationMode::InProcess] {
            assert_eq!(mode.as_str().parse::<IsolationMode>().unwrap(), mode);
        }
        assert!("fork".parse::<IsolationMode>().is_err());
    }
}
