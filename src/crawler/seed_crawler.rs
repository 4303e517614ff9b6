use crate::crawler::crawl_context::CrawlContext;
use crate::crawler::crawl_summary::CrawlSummary;
use crate::crawler::crawler_config::CrawlSettings;
use crate::crawler::crawler_state::CrawlerState;
use crate::crawler::page_fetcher::PageFetcher;
use crate::crawler::page_processor::PageProcessor;
use crate::crawler::page_summary::PageSummary;
use crate::crawler::progress_reporter::ProgressReporter;
use crate::crawler::robots::RobotsTxtSource;
use crate::crawler::url_normalizer::NormalizedUrl;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Crawls outward from one seed URL, handing every fetched page to the shared
/// `PageProcessor` and queueing the links it returns.
pub struct SeedCrawler<TP>
where
    TP: ProgressReporter,
{
    shutdown_notify: Arc<tokio::sync::Notify>,
    seed: NormalizedUrl,
    processor: Arc<PageProcessor>,
    fetcher: PageFetcher,
    progress_reporter: TP,
}

impl<TP> SeedCrawler<TP>
where
    TP: ProgressReporter,
{
    pub fn new(
        shutdown_notify: Arc<tokio::sync::Notify>,
        seed: NormalizedUrl,
        processor: Arc<PageProcessor>,
        fetcher: PageFetcher,
        progress_reporter: TP,
    ) -> Self {
        Self {
            shutdown_notify,
            seed,
            processor,
            fetcher,
            progress_reporter,
        }
    }

    pub async fn crawl(&self, settings: &CrawlSettings) -> anyhow::Result<CrawlSummary> {
        let shutdown_requested = Arc::new(AtomicBool::new(false));
        {
            let shutdown_notify = Arc::clone(&self.shutdown_notify);
            let shutdown_requested = Arc::clone(&shutdown_requested);
            tokio::task::spawn(async move {
                shutdown_notify.notified().await;
                shutdown_requested.store(true, Ordering::Relaxed);
            });
        }

        self.progress_reporter.begin();

        let crawl_delay = settings.crawl_delay();
        let robots_txt_source = match RobotsTxtSource::load_from_url(
            self.fetcher.client(),
            self.seed.url(),
            &settings.user_agent,
        )
        .await
        {
            Ok(source) => source,
            Err(e) => {
                warn!(seed = %self.seed, "robots.txt unavailable, allowing all paths: {e}");
                RobotsTxtSource::new(String::new(), &settings.user_agent)
            }
        };

        let robots_txt_rules = robots_txt_source.rules();

        let mut crawl_context = CrawlContext::new();
        crawl_context.add_url_to_crawl(&self.seed);

        self.progress_reporter
            .crawler_state_changed(CrawlerState::Crawling);

        let mut crawl_summary = CrawlSummary::new(self.seed.url().clone());
        let mut pages_fetched = 0;
        while !shutdown_requested.load(Ordering::Relaxed)
            && !crawl_context.is_crawling_complete()
            && pages_fetched < settings.max_pages
        {
            let (num_urls_to_crawl, num_urls_crawled) = crawl_context.progress();
            self.progress_reporter
                .progress_update(num_urls_to_crawl, num_urls_crawled);

            let Some(url_to_crawl) = crawl_context.pop_url_to_crawl() else {
                break;
            };

            // Ensure this URL is allowed to be crawled by robots.txt
            if !robots_txt_rules.allows(url_to_crawl.url().path()) {
                crawl_summary.add_page_summary(PageSummary::denied_by_robots_txt(url_to_crawl));
                continue;
            }

            self.progress_reporter
                .progress_message(&format!("Crawling {}", url_to_crawl));
            pages_fetched += 1;

            let response = match self.fetcher.fetch(&url_to_crawl).await {
                Ok(response) => Some(response),
                Err(e) => {
                    warn!(url = %url_to_crawl, "fetch failed: {e}");
                    None
                }
            };
            let status_code = response.as_ref().map(|response| response.status_code);
            let outcome = self.processor.process(url_to_crawl.as_str(), response.as_ref());
            crawl_context.add_urls_to_crawl(outcome.links());
            crawl_summary.add_page_summary(PageSummary::new(url_to_crawl, status_code, &outcome));

            if let Some(crawl_delay) = crawl_delay {
                if !crawl_context.is_crawling_complete() {
                    if shutdown_requested.load(Ordering::Relaxed) {
                        break;
                    }

                    self.progress_reporter
                        .crawler_state_changed(CrawlerState::Paused);
                    tokio::time::sleep(crawl_delay).await;
                    self.progress_reporter
                        .crawler_state_changed(CrawlerState::Crawling);
                }
            }
        }

        self.progress_reporter.end();

        Ok(crawl_summary)
    }
}
