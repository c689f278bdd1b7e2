use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::review::Review;
use crate::upstream::{G2Response, translate_response};

pub const DEFAULT_BASE_URL: &str = "https://g2-data-api.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "g2-data-api.p.rapidapi.com";
pub const DEFAULT_ENDPOINT: &str = "g2-products";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";
const STATUS_OK: u16 = 200;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;
const PARSE_PREVIEW_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Seams (for testability)
// ---------------------------------------------------------------------------

/// Status, `Retry-After` header and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

/// Abstraction over the HTTP GET the client issues. `query` pairs are raw
/// values; the transport is responsible for encoding them.
pub trait HttpTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse>;
}

/// Abstraction over blocking sleeps, so backoff can be observed in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Source of canonical reviews for one product.
pub trait ReviewFetcher {
    fn fetch_reviews(&self, product: &str, max_reviews: u32, retries: u32) -> Result<Vec<Review>>;
}

impl<F: ReviewFetcher + ?Sized> ReviewFetcher for &F {
    fn fetch_reviews(&self, product: &str, max_reviews: u32, retries: u32) -> Result<Vec<Review>> {
        (**self).fetch_reviews(product, max_reviews, retries)
    }
}

/// `ureq`-backed transport. Error statuses are returned as responses, not
/// errors, so the caller can apply its own status policy.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut request = self.agent.get(url);
        for (name, value) in query {
            request = request.query(name, value);
        }
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                return Err(Error::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        let retry_after = response.header("Retry-After").map(str::to_string);
        let body = response.into_string().map_err(|e| Error::Transport {
            url: url.to_string(),
            message: format!("error reading response body: {e}"),
        })?;

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_host: String,
    pub endpoint: String,
    pub request_timeout: Duration,
    /// Where raw response bodies are dumped; `None` disables the dump.
    pub raw_response_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            raw_response_dir: Some(PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Used when `Retry-After` is missing or not a whole number of seconds.
    pub default_backoff: Duration,
    /// Upper bound on time spent inside one fetch, retries included.
    pub deadline: Option<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            default_backoff: DEFAULT_BACKOFF,
            deadline: None,
        }
    }
}

impl BackoffPolicy {
    pub fn backoff_for(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_backoff)
    }
}

// ---------------------------------------------------------------------------
// G2Client
// ---------------------------------------------------------------------------

pub struct G2Client<T = UreqTransport, S = ThreadSleeper> {
    api_key: String,
    settings: ApiSettings,
    backoff: BackoffPolicy,
    transport: T,
    sleeper: S,
}

impl G2Client {
    pub fn new(api_key: impl Into<String>, settings: ApiSettings, backoff: BackoffPolicy) -> Self {
        let transport = UreqTransport::new(settings.request_timeout);
        Self::with_transport(api_key, settings, backoff, transport, ThreadSleeper)
    }
}

impl<T: HttpTransport, S: Sleeper> G2Client<T, S> {
    pub fn with_transport(
        api_key: impl Into<String>,
        settings: ApiSettings,
        backoff: BackoffPolicy,
        transport: T,
        sleeper: S,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            settings,
            backoff,
            transport,
            sleeper,
        }
    }

    /// Endpoint URL, without the query string.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.endpoint.trim_start_matches('/'),
        )
    }

    /// GET the endpoint, backing off on 429 while `retries` remain.
    fn get_with_backoff(
        &self,
        url: &str,
        query: &[(&str, &str)],
        mut retries: u32,
    ) -> Result<HttpResponse> {
        let started = Instant::now();
        let headers = [
            (API_KEY_HEADER, self.api_key.as_str()),
            (API_HOST_HEADER, self.settings.api_host.as_str()),
        ];

        loop {
            let response = self.transport.get(url, query, &headers)?;
            if response.status != STATUS_TOO_MANY_REQUESTS || retries == 0 {
                return Ok(response);
            }

            let backoff = self.backoff.backoff_for(response.retry_after.as_deref());
            if let Some(deadline) = self.backoff.deadline
                && started.elapsed() + backoff > deadline
            {
                return Err(Error::RetryDeadline { deadline, backoff });
            }

            warn!(
                backoff_secs = backoff.as_secs_f64(),
                retries_left = retries,
                "rate limited, waiting before retry"
            );
            self.sleeper.sleep(backoff);
            retries -= 1;
        }
    }

    fn dump_raw_response(&self, product: &str, body: &str) {
        let Some(dir) = &self.settings.raw_response_dir else {
            return;
        };
        let path = dir.join(format!("{product}_raw_response.json"));
        match std::fs::write(&path, body) {
            Ok(()) => debug!(path = %path.display(), "saved raw response"),
            Err(e) => debug!(path = %path.display(), error = %e, "could not save raw response"),
        }
    }
}

impl<T: HttpTransport, S: Sleeper> ReviewFetcher for G2Client<T, S> {
    fn fetch_reviews(&self, product: &str, max_reviews: u32, retries: u32) -> Result<Vec<Review>> {
        let url = self.endpoint_url();
        let page = product_page_url(product);
        let max = max_reviews.to_string();
        let query = [("product", page.as_str()), ("max_reviews", max.as_str())];
        let response = self.get_with_backoff(&url, &query, retries)?;

        if response.status != STATUS_OK {
            return Err(Error::UpstreamStatus {
                status: response.status,
                body: response.body,
            });
        }

        self.dump_raw_response(product, &response.body);

        let parsed: G2Response = serde_json::from_str(&response.body).map_err(|e| {
            let preview: String = response.body.chars().take(PARSE_PREVIEW_CHARS).collect();
            warn!(product, preview = %preview, "failed to parse response");
            Error::UpstreamSchema(e)
        })?;

        let reviews = translate_response(&parsed, product);
        info!(
            product,
            product_name = %parsed.product_name,
            count = reviews.len(),
            "parsed reviews"
        );
        Ok(reviews)
    }
}

/// Canonical G2 product page whose reviews the API scrapes.
pub fn product_page_url(product: &str) -> String {
    format!("https://www.g2.com/products/{product}/reviews")
}
