use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Backend tag, e.g. "openai" or "camogpt".
    #[serde(default = "default_llm_tag")]
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_logger_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_llm_tag() -> String {
    "openai".to_string()
}

fn default_logger_name() -> String {
    "milton".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Settings {
    /// Defaults, then an optional `milton.{yaml,toml}`, then `MILTON_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("milton")
    }

    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("llm.tag", default_llm_tag())?
            .set_default("logging.name", default_logger_name())?
            .set_default("logging.level", default_log_level())?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix("MILTON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("MILTON_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_file_or_env() {
        clean_env();
        let settings = Settings::load_from("does-not-exist").unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8501);
        assert_eq!(settings.llm.tag, "openai");
        assert_eq!(settings.logging.name, "milton");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("milton");
        std::fs::write(
            dir.path().join("milton.yaml"),
            "server:\n  port: 9000\nllm:\n  tag: camogpt\n",
        )
        .unwrap();

        env::set_var("MILTON_SERVER__PORT", "9100");
        let settings = Settings::load_from(stem.to_str().unwrap()).unwrap();
        env::remove_var("MILTON_SERVER__PORT");

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.llm.tag, "camogpt");
    }

    #[test]
    fn socket_addr_conversion() {
        let server = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 8501,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:8501");
    }
}
