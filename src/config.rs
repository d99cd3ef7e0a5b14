use serde::Deserialize;
use std::fs;
use std::path::Path;

// Bundled defaults; build.rs validates that this file parses.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub anythingllm: AnythingLlmConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnythingLlmConfig {
    /// Base URL of the AnythingLLM instance, e.g. "http://192.168.1.5:3001".
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AnythingLlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.gofile.io".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// The defaults bundled into the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Environment overrides, applied after file load. The AnythingLLM
    /// variable names match the ones the hosted deployment already uses.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("ANYTHINGLLM_API_URL") {
            self.anythingllm.base_url = value;
        }
        if let Ok(value) = std::env::var("ANYTHINGLLM_API_KEY") {
            self.anythingllm.api_key = value;
        }
        if let Ok(value) = std::env::var("SOWDOC_HOST") {
            self.server.host = value;
        }
        if let Some(port) = std::env::var("SOWDOC_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_parses() {
        let config = Config::compiled_default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.anythingllm.timeout_secs, 15);
        assert_eq!(config.upload.api_base, "https://api.gofile.io");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/sowdoc.toml"));
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9001\n").unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upload.timeout_secs, 30);
    }
}
