//! Configuration for the gateway server and the client tool

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::AdmissionPolicy;

/// Gateway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub udp_ip: String,
    pub udp_port: u16,
    pub session_timeout_sec: u64,
    /// Audit (CDR) log path
    pub cdr_file: PathBuf,
    pub http_port: u16,
    /// Sessions removed per drain batch
    pub graceful_shutdown_rate: usize,
    pub log_file: PathBuf,
    pub log_level: String,
    pub blacklist: Vec<String>,
    pub max_sessions: usize,

    #[serde(default = "default_http_ip")]
    pub http_ip: String,
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
    #[serde(default = "default_sweep_interval_sec")]
    pub sweep_interval_sec: u64,
}

fn default_http_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_drain_interval_ms() -> u64 {
    1000
}

fn default_sweep_interval_sec() -> u64 {
    5
}

impl ServerConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = read_config(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.udp_addr()?;
        self.http_addr()?;

        if self.graceful_shutdown_rate == 0 {
            return Err(Error::invalid_config(
                "graceful_shutdown_rate must be greater than zero",
            ));
        }
        if self.max_sessions == 0 {
            return Err(Error::invalid_config("max_sessions must be greater than zero"));
        }
        if self.drain_interval_ms == 0 {
            return Err(Error::invalid_config("drain_interval_ms must be greater than zero"));
        }
        if self.sweep_interval_sec == 0 {
            return Err(Error::invalid_config("sweep_interval_sec must be greater than zero"));
        }
        Ok(())
    }

    pub fn udp_addr(&self) -> Result<SocketAddr> {
        socket_addr("udp_ip", &self.udp_ip, self.udp_port)
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        socket_addr("http_ip", &self.http_ip, self.http_port)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_sec)
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_sec)
    }

    pub fn admission_policy(&self) -> AdmissionPolicy {
        AdmissionPolicy::new(
            self.blacklist.iter().cloned(),
            self.max_sessions,
            self.session_timeout(),
        )
    }
}

/// Client tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_ip: String,
    pub server_port: u16,
    pub log_file: PathBuf,
    pub log_level: String,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

fn default_response_timeout_ms() -> u64 {
    2000
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = read_config(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.server_addr()?;
        Ok(config)
    }

    pub fn server_addr(&self) -> Result<SocketAddr> {
        socket_addr("server_ip", &self.server_ip, self.server_port)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::ConfigNotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn socket_addr(field: &str, ip: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = ip
        .parse()
        .map_err(|_| Error::invalid_config(format!("{field}: invalid IP address '{ip}'")))?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"{
        "udp_ip": "0.0.0.0",
        "udp_port": 9000,
        "session_timeout_sec": 30,
        "cdr_file": "cdr.log",
        "http_port": 8080,
        "graceful_shutdown_rate": 10,
        "log_file": "pgw.log",
        "log_level": "INFO",
        "blacklist": ["001010123456789", "001010000000001"],
        "max_sessions": 10000
    }"#;

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = ServerConfig::load(file.path()).unwrap();

        assert_eq!(config.udp_ip, "0.0.0.0");
        assert_eq!(config.udp_port, 9000);
        assert_eq!(config.session_timeout(), Duration::from_secs(30));
        assert_eq!(config.cdr_file, PathBuf::from("cdr.log"));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.graceful_shutdown_rate, 10);
        assert_eq!(config.log_file, PathBuf::from("pgw.log"));
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.blacklist.len(), 2);
        assert_eq!(config.blacklist[0], "001010123456789");
        assert_eq!(config.max_sessions, 10000);

        // Defaults for optional fields
        assert_eq!(config.http_ip, "0.0.0.0");
        assert_eq!(config.drain_interval(), Duration::from_secs(1));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.udp_addr().unwrap(), "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::load("missing.json").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_wrong_field_type() {
        let err = ServerConfig::from_json_str(r#"{ "udp_port": "invalid_value" }"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_ip() {
        let text = VALID.replace("\"0.0.0.0\"", "\"not-an-ip\"");
        let err = ServerConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_zero_drain_rate_rejected() {
        let text = VALID.replace("\"graceful_shutdown_rate\": 10", "\"graceful_shutdown_rate\": 0");
        let err = ServerConfig::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("graceful_shutdown_rate"));
    }

    #[test]
    fn test_admission_policy_from_config() {
        let config = ServerConfig::from_json_str(VALID).unwrap();
        let policy = config.admission_policy();

        assert!(policy.is_blacklisted("001010000000001"));
        assert!(!policy.is_blacklisted("001010000000002"));
        assert_eq!(policy.max_sessions, 10000);
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::from_json_str(
            r#"{
                "server_ip": "127.0.0.1",
                "server_port": 9000,
                "log_file": "client.log",
                "log_level": "debug"
            }"#,
        )
        .unwrap();

        assert_eq!(config.server_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.response_timeout(), Duration::from_secs(2));
    }
}
