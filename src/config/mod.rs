/// Application configuration module
use anyhow::Context;
use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub catalog: CatalogConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_concurrency: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url =
            env::var("DG_CATALOG_API_URL").context("DG_CATALOG_API_URL is required")?;
        let api_key =
            env::var("DG_CATALOG_API_KEY").context("DG_CATALOG_API_KEY is required")?;

        let catalog = CatalogConfig {
            api_url,
            api_key,
            timeout_seconds: env_parse("CATALOG_TIMEOUT_SECONDS", 30),
            max_concurrency: env_parse::<usize>("CATALOG_MAX_CONCURRENCY", 16).max(1),
        };

        Ok(Self {
            port: env_parse("PORT", 8080),
            catalog,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        env::set_var("POINT_IMAGERY_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse("POINT_IMAGERY_TEST_GARBAGE", 7u64), 7);
    }

    #[test]
    fn test_env_parse_reads_value() {
        env::set_var("POINT_IMAGERY_TEST_PORT", " 9090 ");
        assert_eq!(env_parse("POINT_IMAGERY_TEST_PORT", 8080u16), 9090);
    }

    #[test]
    fn test_env_parse_missing_uses_default() {
        assert_eq!(env_parse("POINT_IMAGERY_TEST_UNSET", 16usize), 16);
    }
}
