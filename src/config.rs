use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::ProductCatalog;
use crate::cli::Cli;
use crate::client::{
    ApiSettings, BackoffPolicy, DEFAULT_API_HOST, DEFAULT_BACKOFF, DEFAULT_BASE_URL,
    DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT,
};
use crate::error::{Error, Result};
use crate::orchestrator::{DEFAULT_COURTESY_DELAY, DEFAULT_MAX_RETRIES, RunOptions};

pub const DEFAULT_CONFIG_FILE: &str = "bloxpulse.toml";
pub const API_KEY_ENV: &str = "RAPID_API_KEY";
pub const ENV_FILE: &str = ".env";
pub const DEFAULT_MAX_REVIEWS: u32 = 1000;
pub const DEFAULT_OUTPUT_FILE: &str = "scraped_reviews.json";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
    pub products: Option<Vec<String>>,
    pub product: Option<String>,
    pub max_reviews: Option<u32>,
    pub output_file: Option<String>,
    pub mock: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_deadline_secs: Option<u64>,
    pub courtesy_delay_secs: Option<u64>,
    pub raw_response_dir: Option<String>,
    pub save_raw_responses: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub run: RunOptions,
    pub api: ApiSettings,
    pub backoff: BackoffPolicy,
    pub catalog: ProductCatalog,
    pub max_retries: u32,
    pub courtesy_delay: Duration,
    pub skip_fetch: bool,
}

impl Config {
    /// Read the config file (if any), merge CLI flags over it and resolve the
    /// API key, consulting `.env` before the process environment.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let mut config = merge(file_config, cli);
        load_env_file(Path::new(ENV_FILE));
        config.run.api_key = resolve_api_key(config.run.api_key.take(), config.run.use_mock);
        Ok(config)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if config.max_reviews == Some(0) {
        return Err(Error::ConfigValidation(
            "max_reviews must be > 0".to_string(),
        ));
    }
    if config.request_timeout_secs == Some(0) {
        return Err(Error::ConfigValidation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }
    if let Some(host) = &config.api_host
        && host.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "api_host must not be empty".to_string(),
        ));
    }
    if let Some(products) = &config.products {
        if products.is_empty() {
            return Err(Error::ConfigValidation(
                "products must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for product in products {
            if product.is_empty() {
                return Err(Error::ConfigValidation(
                    "product names must not be empty".to_string(),
                ));
            }
            if !seen.insert(product.as_str()) {
                return Err(Error::ConfigValidation(format!(
                    "duplicate product: {product}"
                )));
            }
        }
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    let raw_response_dir = if cli.no_raw_dump || file.save_raw_responses == Some(false) {
        None
    } else {
        Some(PathBuf::from(
            cli.raw_dir
                .clone()
                .or(file.raw_response_dir)
                .unwrap_or_else(|| ".".to_string()),
        ))
    };

    let catalog = file
        .products
        .map(ProductCatalog::new)
        .unwrap_or_default();

    Config {
        run: RunOptions {
            api_key: cli
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .or(file.api_key.filter(|k| !k.is_empty())),
            product: cli.product.clone().or(file.product).filter(|p| !p.is_empty()),
            max_reviews: cli
                .max_reviews
                .or(file.max_reviews)
                .unwrap_or(DEFAULT_MAX_REVIEWS),
            output_file: PathBuf::from(
                cli.output
                    .clone()
                    .or(file.output_file)
                    .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
            ),
            use_mock: cli.mock || file.mock.unwrap_or(false),
        },
        api: ApiSettings {
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_host: file.api_host.unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            endpoint: file.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            raw_response_dir,
        },
        backoff: BackoffPolicy {
            default_backoff: DEFAULT_BACKOFF,
            deadline: file.retry_deadline_secs.map(Duration::from_secs),
        },
        catalog,
        max_retries: file.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        courtesy_delay: file
            .courtesy_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_COURTESY_DELAY),
        skip_fetch: cli.skip_fetch,
    }
}

/// Export the `KEY=VALUE` pairs in `path` into the process environment.
/// Variables that are already set keep their value. A missing file is not an
/// error, and a malformed one is only logged.
pub fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not load environment file"),
    }
}

/// Use the explicit key if there is one; otherwise, unless running in mock
/// mode, look in `$RAPID_API_KEY`.
pub fn resolve_api_key(explicit: Option<String>, use_mock: bool) -> Option<String> {
    if explicit.is_some() || use_mock {
        return explicit;
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => {
            info!("using API key from environment variable");
            Some(key)
        }
        _ => {
            warn!(
                "no API key provided; pass --api-key, set api_key in the config file, \
                 set ${API_KEY_ENV}, or use --mock"
            );
            None
        }
    }
}
