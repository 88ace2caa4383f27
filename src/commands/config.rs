//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("herakles-netmon.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Network Monitor Configuration
# ======================================
#
# Sampling
# --------
# interval_ms: 1000            # Time between ticks, also the rate divisor
# window_ticks: 3600           # Usage window length in ticks (3600 = 1h at 1s)
#
# Latency Probe
# -------------
# probe_target: "8.8.8.8"      # Host or IP receiving one echo request per tick
# probe_timeout_ms: 1000       # Reply deadline; keep <= interval_ms
# ping_program: "ping"         # iputils compatible ping binary
#
# Interface Selection
# -------------------
# interface: null              # Pin one interface (null = first up, non-loopback)
# exclude_virtual: false       # Skip bridges, veth pairs and tunnels
# reselect_every_ticks: 30     # Re-run selection every N ticks (0 = only when none active)
#
# Output
# ------
# output: "text"               # text, line or json
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_prefix_yaml() {
        let out = add_config_comments("interval_ms: 1000\n".to_string());
        assert!(out.starts_with("# Herakles Network Monitor Configuration"));
        assert!(out.ends_with("interval_ms: 1000\n"));
    }

    #[test]
    fn test_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netmon.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml, true).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("window_ticks: 3600"));
    }
}
