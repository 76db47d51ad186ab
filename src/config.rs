use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_LOG_FILTER: &str = "info,api_errors=debug";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub log_filter: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_port(&env::var("API_PORT").unwrap_or_else(|_| "8080".to_string()))?,
            },
            log_filter: env::var("LOG_FILTER").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse()
        .context("API_PORT must be a valid port number")
}
