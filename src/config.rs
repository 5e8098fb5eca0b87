use crate::error::{AppError, Result};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_PRICE_PERIOD: &str = "1y";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub yahoo_base_url: String,
    pub price_period: String,
    pub http_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(AppError::MissingConfig("OPENAI_API_KEY"))?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(value.trim().parse().map_err(|_| {
                AppError::InvalidConfig {
                    key: "HTTP_TIMEOUT_SECS",
                    value,
                }
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let host: IpAddr = match get("HOST") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidConfig { key: "HOST", value })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port: u16 = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidConfig { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            openai: OpenAiConfig {
                api_key,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            },
            yahoo_base_url: get("YAHOO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
            price_period: get("PRICE_PERIOD").unwrap_or_else(|| DEFAULT_PRICE_PERIOD.to_string()),
            http_timeout,
            bind_addr: SocketAddr::new(host, port),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.openai.api_key, "sk-test");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.yahoo_base_url, "https://query2.finance.yahoo.com");
        assert_eq!(config.price_period, "1y");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8001");
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(lookup(&[("PORT", "9000")]));
        assert!(matches!(result, Err(AppError::MissingConfig("OPENAI_API_KEY"))));

        let blank = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("PRICE_PERIOD", "2y"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.price_period, "2y");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk"), ("PORT", "abc")]));
        match result {
            Err(AppError::InvalidConfig { key, value }) => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
