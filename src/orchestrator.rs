use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::catalog::ProductCatalog;
use crate::client::{ReviewFetcher, Sleeper, ThreadSleeper};
use crate::error::Result;
use crate::fallback;
use crate::review::Review;
use crate::store;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_COURTESY_DELAY: Duration = Duration::from_secs(2);

/// What the caller asked for in one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub api_key: Option<String>,
    /// Single product to collect; `None` collects the whole catalog.
    pub product: Option<String>,
    pub max_reviews: u32,
    pub output_file: PathBuf,
    pub use_mock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSource {
    Live,
    /// Live fetch failed and synthetic records were substituted.
    Fallback,
    Mock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductOutcome {
    pub product: String,
    pub source: ReviewSource,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ProductOutcome>,
    pub total: usize,
    pub output_file: PathBuf,
}

impl RunReport {
    pub fn fallback_products(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.source == ReviewSource::Fallback)
            .map(|o| o.product.as_str())
            .collect()
    }
}

pub struct Orchestrator<F, S = ThreadSleeper> {
    fetcher: F,
    catalog: ProductCatalog,
    sleeper: S,
    max_retries: u32,
    courtesy_delay: Duration,
}

impl<F: ReviewFetcher> Orchestrator<F> {
    pub fn new(fetcher: F, catalog: ProductCatalog) -> Self {
        Self::with_sleeper(fetcher, catalog, ThreadSleeper)
    }
}

impl<F: ReviewFetcher, S: Sleeper> Orchestrator<F, S> {
    pub fn with_sleeper(fetcher: F, catalog: ProductCatalog, sleeper: S) -> Self {
        Self {
            fetcher,
            catalog,
            sleeper,
            max_retries: DEFAULT_MAX_RETRIES,
            courtesy_delay: DEFAULT_COURTESY_DELAY,
        }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }

    /// Collect reviews for every resolved product and write them out.
    pub fn run(&self, options: &RunOptions) -> Result<RunReport> {
        let (reviews, report) = self.collect(options)?;

        store::save_reviews(&reviews, &options.output_file)?;
        info!(
            count = reviews.len(),
            path = %options.output_file.display(),
            "saved reviews"
        );
        Ok(report)
    }

    /// Collect reviews without persisting them.
    ///
    /// Only an unknown product name fails; per-product fetch errors are
    /// replaced with fallback records.
    pub fn collect(&self, options: &RunOptions) -> Result<(Vec<Review>, RunReport)> {
        let products = self.catalog.resolve(options.product.as_deref())?;
        if options.product.as_deref().is_none_or(str::is_empty) {
            info!(count = products.len(), "no product specified, processing all products");
        }

        let use_mock = options.use_mock || options.api_key.is_none();
        if use_mock && !options.use_mock {
            warn!("no API key provided, falling back to mock data");
        }

        let mut all_reviews = Vec::new();
        let mut outcomes = Vec::with_capacity(products.len());

        for (index, product) in products.iter().enumerate() {
            if use_mock {
                let reviews = fallback::generate(product);
                outcomes.push(outcome(product, ReviewSource::Mock, reviews.len()));
                all_reviews.extend(reviews);
                continue;
            }

            info!(product = %product, max = options.max_reviews, "fetching reviews");
            let mut reviews =
                match self
                    .fetcher
                    .fetch_reviews(product, options.max_reviews, self.max_retries)
                {
                    Ok(reviews) => reviews,
                    Err(e) => {
                        if e.is_recoverable() {
                            warn!(product = %product, error = %e, "fetch failed, using fallback data");
                        } else {
                            error!(product = %product, error = %e, "unexpected fetch error, using fallback data");
                        }
                        let reviews = fallback::generate(product);
                        outcomes.push(outcome(product, ReviewSource::Fallback, reviews.len()));
                        all_reviews.extend(reviews);
                        continue;
                    }
                };

            info!(product = %product, count = reviews.len(), "fetched reviews");
            for review in &mut reviews {
                review.ensure_tag(product);
            }
            outcomes.push(outcome(product, ReviewSource::Live, reviews.len()));
            all_reviews.extend(reviews);

            if index + 1 < products.len() {
                info!(
                    delay_secs = self.courtesy_delay.as_secs_f64(),
                    "waiting before next product"
                );
                self.sleeper.sleep(self.courtesy_delay);
            }
        }

        info!(total = all_reviews.len(), "collected reviews");
        let report = RunReport {
            outcomes,
            total: all_reviews.len(),
            output_file: options.output_file.clone(),
        };
        Ok((all_reviews, report))
    }
}

fn outcome(product: &str, source: ReviewSource, count: usize) -> ProductOutcome {
    ProductOutcome {
        product: product.to_string(),
        source,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_helpers::make_review;
    use std::cell::RefCell;

    struct StubFetcher {
        calls: RefCell<Vec<(String, u32, u32)>>,
    }

    impl ReviewFetcher for StubFetcher {
        fn fetch_reviews(&self, product: &str, max: u32, retries: u32) -> Result<Vec<Review>> {
            self.calls.borrow_mut().push((product.to_string(), max, retries));
            if product == "infoblox-nios" {
                return Err(Error::UpstreamStatus {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(vec![make_review(1, &[]), make_review(2, &[product])])
        }
    }

    #[derive(Default)]
    struct CountingSleeper {
        slept: RefCell<Vec<Duration>>,
    }

    impl Sleeper for CountingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }

    fn orchestrator() -> Orchestrator<StubFetcher, CountingSleeper> {
        Orchestrator::with_sleeper(
            StubFetcher {
                calls: RefCell::new(Vec::new()),
            },
            ProductCatalog::default(),
            CountingSleeper::default(),
        )
    }

    fn options(product: Option<&str>) -> RunOptions {
        RunOptions {
            api_key: Some("key".to_string()),
            product: product.map(str::to_string),
            max_reviews: 25,
            output_file: PathBuf::from("unused.json"),
            use_mock: false,
        }
    }

    #[test]
    fn test_passes_cap_and_retry_budget() {
        let orch = orchestrator();
        orch.collect(&options(Some("bloxone-ddi"))).unwrap();
        assert_eq!(
            *orch.fetcher.calls.borrow(),
            vec![("bloxone-ddi".to_string(), 25, 3)]
        );
    }

    #[test]
    fn test_live_records_get_product_tag_once() {
        let orch = orchestrator();
        let (reviews, _) = orch.collect(&options(Some("bloxone-ddi"))).unwrap();
        for review in &reviews {
            assert_eq!(review.tags.iter().filter(|t| *t == "bloxone-ddi").count(), 1);
        }
    }

    #[test]
    fn test_failure_falls_back_per_product() {
        let orch = orchestrator();
        let (reviews, report) = orch.collect(&options(None)).unwrap();
        assert_eq!(report.fallback_products(), vec!["infoblox-nios"]);
        assert_eq!(report.total, 6);
        assert_eq!(reviews.len(), 6);
        assert_eq!(reviews[2].author, "John Doe");
        assert!(reviews[2].has_tag("infoblox-nios"));
    }

    #[test]
    fn test_courtesy_delay_only_after_live_success_before_last() {
        let orch = orchestrator();
        orch.collect(&options(None)).unwrap();
        // ddi succeeds (sleep), nios falls back (no sleep), threat-defense is last
        assert_eq!(*orch.sleeper.slept.borrow(), vec![DEFAULT_COURTESY_DELAY]);
    }

    #[test]
    fn test_ids_restart_per_product() {
        let orch = orchestrator();
        let (reviews, _) = orch.collect(&options(None)).unwrap();
        let ids: Vec<u32> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn test_mock_mode_skips_fetcher() {
        let orch = orchestrator();
        let opts = RunOptions {
            use_mock: true,
            ..options(None)
        };
        let (_, report) = orch.collect(&opts).unwrap();
        assert!(orch.fetcher.calls.borrow().is_empty());
        assert!(orch.sleeper.slept.borrow().is_empty());
        assert!(report.outcomes.iter().all(|o| o.source == ReviewSource::Mock));
    }

    #[test]
    fn test_missing_key_forces_mock() {
        let orch = orchestrator();
        let opts = RunOptions {
            api_key: None,
            ..options(Some("bloxone-ddi"))
        };
        let (reviews, report) = orch.collect(&opts).unwrap();
        assert!(orch.fetcher.calls.borrow().is_empty());
        assert_eq!(reviews.len(), 2);
        assert_eq!(report.outcomes[0].source, ReviewSource::Mock);
    }

    #[test]
    fn test_invalid_product_fails_before_fetching() {
        let orch = orchestrator();
        let err = orch.collect(&options(Some("nios"))).unwrap_err();
        assert!(matches!(err, Error::InvalidProduct { .. }));
        assert!(orch.fetcher.calls.borrow().is_empty());
    }
}
