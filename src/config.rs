use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Validating gateway in front of the ML prediction API
#[derive(Parser, Debug, Clone)]
#[command(name = "prediction-gateway", version, about)]
pub struct Config {
    /// Gateway listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Prediction API base URL (versioned prefix included)
    #[arg(
        long,
        env = "ML_API_URL",
        default_value = "http://localhost:8000/api/v1"
    )]
    pub ml_api_url: String,

    /// Timeout for a single prediction API request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Comma-separated CORS origins allowed to call the gateway ("*" for any)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid listen_addr '{}': {}", self.listen_addr, e))?;
        let url = Url::parse(&self.ml_api_url)
            .map_err(|e| anyhow::anyhow!("invalid ml_api_url '{}': {}", self.ml_api_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("ml_api_url must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.allowed_origins.iter().all(|o| o.trim().is_empty()) {
            anyhow::bail!("allowed_origins must name at least one origin");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["prediction-gateway"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_origins_split_on_comma() {
        let config = parse(&["--allowed-origins", "http://a.test,http://b.test"]);
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--ml-api-url", "ftp://host/api"]).validate().is_err());
        assert!(parse(&["--ml-api-url", "nonsense"]).validate().is_err());
        assert!(parse(&["--listen-addr", "localhost"]).validate().is_err());
        assert!(parse(&["--request-timeout-secs", "0"]).validate().is_err());
    }
}
