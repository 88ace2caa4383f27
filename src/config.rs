//! Configuration management for herakles-netmon.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel, OutputFormat};
use herakles_netmon::{PollingConfig, SamplerConfig, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_WINDOW_TICKS: usize = herakles_netmon::DEFAULT_WINDOW_TICKS;
pub const DEFAULT_PROBE_TARGET: &str = "8.8.8.8";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_RESELECT_EVERY_TICKS: u64 = herakles_netmon::poller::DEFAULT_RESELECT_EVERY_TICKS;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Sampling
    #[serde(alias = "interval-ms")]
    pub interval_ms: Option<u64>,
    #[serde(alias = "window-ticks")]
    pub window_ticks: Option<usize>,

    // Latency probe
    #[serde(alias = "probe-target")]
    pub probe_target: Option<String>,
    #[serde(alias = "probe-timeout-ms")]
    pub probe_timeout_ms: Option<u64>,
    #[serde(alias = "ping-program")]
    pub ping_program: Option<String>,

    // Interface selection
    pub interface: Option<String>,
    #[serde(alias = "exclude-virtual")]
    pub exclude_virtual: Option<bool>,
    #[serde(alias = "reselect-every-ticks")]
    pub reselect_every_ticks: Option<u64>,

    // Output
    /// "text" | "line" | "json"
    pub output: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: Some(DEFAULT_INTERVAL_MS),
            window_ticks: Some(DEFAULT_WINDOW_TICKS),
            probe_target: Some(DEFAULT_PROBE_TARGET.to_string()),
            probe_timeout_ms: Some(DEFAULT_PROBE_TIMEOUT_MS),
            ping_program: Some("ping".into()),
            interface: None,
            exclude_virtual: Some(false),
            reselect_every_ticks: Some(DEFAULT_RESELECT_EVERY_TICKS),
            output: Some("text".into()),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
    }

    pub fn window_ticks(&self) -> usize {
        self.window_ticks.unwrap_or(DEFAULT_WINDOW_TICKS)
    }

    pub fn probe_target(&self) -> &str {
        self.probe_target.as_deref().unwrap_or(DEFAULT_PROBE_TARGET)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS))
    }

    pub fn ping_program(&self) -> &str {
        self.ping_program.as_deref().unwrap_or("ping")
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
            .as_deref()
            .and_then(OutputFormat::parse)
            .unwrap_or(OutputFormat::Text)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Info)
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            tick_interval: self.interval(),
            probe_target: self.probe_target().to_string(),
            probe_timeout: self.probe_timeout(),
        }
    }

    pub fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            interval: self.interval(),
            reselect_every_ticks: self
                .reselect_every_ticks
                .unwrap_or(DEFAULT_RESELECT_EVERY_TICKS),
        }
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            pinned: self.interface.clone(),
            exclude_virtual: self.exclude_virtual.unwrap_or(false),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.interval_ms == Some(0) {
        return Err("interval_ms must be greater than 0".into());
    }

    if cfg.window_ticks == Some(0) {
        return Err("window_ticks must be greater than 0".into());
    }

    if cfg.probe_timeout_ms == Some(0) {
        return Err("probe_timeout_ms must be greater than 0".into());
    }

    if cfg.probe_target.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err("probe_target must not be empty".into());
    }

    if cfg.ping_program.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err("ping_program must not be empty".into());
    }

    if cfg.interface.as_deref().is_some_and(|i| i.trim().is_empty()) {
        return Err("interface must not be empty when set".into());
    }

    if let Some(output) = cfg.output.as_deref() {
        if OutputFormat::parse(output).is_none() {
            return Err(format!(
                "Invalid output '{}', expected 'text', 'line' or 'json'",
                output
            )
            .into());
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::parse(level).is_none() {
            return Err(format!("Invalid log_level '{}'", level).into());
        }
    }

    Ok(())
}

/// Non-fatal findings on a valid config, logged once logging is up.
pub fn config_warnings(cfg: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    // A probe longer than the interval only delays ticks
    if cfg.probe_timeout() > cfg.interval() {
        warnings.push(format!(
            "probe_timeout_ms ({}) exceeds interval_ms ({}); slow probes will delay ticks",
            cfg.probe_timeout().as_millis(),
            cfg.interval().as_millis()
        ));
    }

    warnings
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = Some(interval_ms);
    }
    if let Some(window_ticks) = args.window_ticks {
        config.window_ticks = Some(window_ticks);
    }
    if let Some(target) = &args.target {
        config.probe_target = Some(target.clone());
    }
    if let Some(timeout) = args.probe_timeout_ms {
        config.probe_timeout_ms = Some(timeout);
    }
    if let Some(interface) = &args.interface {
        config.interface = Some(interface.clone());
    }
    if args.exclude_virtual {
        config.exclude_virtual = Some(true);
    }
    if let Some(n) = args.reselect_every_ticks {
        config.reselect_every_ticks = Some(n);
    }
    if let Some(output) = args.output {
        config.output = Some(output.as_str().to_string());
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    Ok(config)
}

/// Default config file locations, first existing one wins
const DEFAULT_LOCATIONS: [&str; 6] = [
    "/etc/herakles/netmon.yaml",
    "/etc/herakles/netmon.yml",
    "/etc/herakles/netmon.json",
    "./herakles-netmon.yaml",
    "./herakles-netmon.yml",
    "./herakles-netmon.json",
];

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_LOCATIONS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)?,
    };

    info!("Loaded configuration from: {}", path.display());
    Ok(merge_defaults(config))
}

/// Fills fields missing from a config file with the defaults.
fn merge_defaults(cfg: Config) -> Config {
    let d = Config::default();
    Config {
        interval_ms: cfg.interval_ms.or(d.interval_ms),
        window_ticks: cfg.window_ticks.or(d.window_ticks),
        probe_target: cfg.probe_target.or(d.probe_target),
        probe_timeout_ms: cfg.probe_timeout_ms.or(d.probe_timeout_ms),
        ping_program: cfg.ping_program.or(d.ping_program),
        interface: cfg.interface,
        exclude_virtual: cfg.exclude_virtual.or(d.exclude_virtual),
        reselect_every_ticks: cfg.reselect_every_ticks.or(d.reselect_every_ticks),
        output: cfg.output.or(d.output),
        log_level: cfg.log_level.or(d.log_level),
    }
}

/// Renders configuration in requested format
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
