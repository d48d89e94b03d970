//! Gate configuration — loaded entirely from environment variables.
//!
//! Unlike `AgentConfig` in the teacher, the gate has no config file of its
//! own (the routing table is the only file-backed input, see
//! `routes::load`); this mirrors `original_source/gate.py`'s top-of-file
//! `os.environ.get(...)` block exactly, just validated on the way in.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub bind_host: String,
    pub host_port: u16,
    pub startup_timeout: Duration,
    pub idle_sweep: Duration,
    pub api_key: Option<String>,
    /// Runtime CLI binary name. Overridable so tests don't need a real
    /// container runtime on PATH.
    pub runtime_bin: String,
}

impl GateConfig {
    /// Load configuration from environment variables with the defaults
    /// named in spec.md §6.4.
    pub fn load() -> Self {
        Self {
            bind_host: std::env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            host_port: std::env::var("HOST_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            startup_timeout: std::env::var("STARTUP_TIMEOUT")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .map(Duration::from_secs_f64)
                .unwrap_or(Duration::from_secs(20)),
            idle_sweep: std::env::var("IDLE_SWEEP_SEC")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .map(Duration::from_secs_f64)
                .unwrap_or(Duration::from_secs(1)),
            api_key: std::env::var("API_KEY").ok().filter(|s| !s.is_empty()),
            runtime_bin: std::env::var("GATE_RUNTIME_BIN")
                .unwrap_or_else(|_| "docker".to_string()),
        }
    }

    /// Validate configuration values are sane.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_host.is_empty() {
            return Err("BIND_HOST must not be empty".to_string());
        }
        if self.host_port == 0 {
            return Err("HOST_PORT must be > 0".to_string());
        }
        if self.startup_timeout.is_zero() {
            return Err("STARTUP_TIMEOUT must be > 0".to_string());
        }
        if self.idle_sweep.is_zero() {
            return Err("IDLE_SWEEP_SEC must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            host_port: 8080,
            startup_timeout: Duration::from_secs(20),
            idle_sweep: Duration::from_secs(1),
            api_key: None,
            runtime_bin: "docker".to_string(),
        }
    }
}
