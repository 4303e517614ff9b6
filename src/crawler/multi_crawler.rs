use crate::crawler::crawl_summary::CrawlSummary;
use crate::crawler::crawler_config::CrawlSettings;
use crate::crawler::page_fetcher::PageFetcher;
use crate::crawler::page_processor::PageProcessor;
use crate::crawler::progress_reporter::LogProgressReporter;
use crate::crawler::seed_crawler::SeedCrawler;
use crate::crawler::url_normalizer::NormalizedUrl;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::error;

/// Runs one `SeedCrawler` per seed, all feeding the same `PageProcessor`.
#[derive(Clone)]
pub struct MultiCrawler {
    shutdown_notify: Arc<tokio::sync::Notify>,
    settings: CrawlSettings,
    processor: Arc<PageProcessor>,
    fetcher: PageFetcher,
    seeds: Vec<NormalizedUrl>,
}

impl MultiCrawler {
    pub fn new(
        shutdown_notify: Arc<tokio::sync::Notify>,
        settings: CrawlSettings,
        processor: Arc<PageProcessor>,
        fetcher: PageFetcher,
    ) -> Self {
        Self {
            shutdown_notify,
            settings,
            processor,
            fetcher,
            seeds: Vec::new(),
        }
    }

    pub fn add_seed(&mut self, seed: NormalizedUrl) {
        self.seeds.push(seed);
    }

    pub async fn run(self) -> anyhow::Result<Vec<CrawlSummary>> {
        let handles = self
            .seeds
            .iter()
            .cloned()
            .enumerate()
            .map(|(crawler_index, seed)| {
                let shutdown_notify = Arc::clone(&self.shutdown_notify);
                let processor = Arc::clone(&self.processor);
                let fetcher = self.fetcher.clone();
                let settings = self.settings.clone();
                tokio::task::spawn(async move {
                    let progress_reporter =
                        LogProgressReporter::new(crawler_index, seed.url().clone());
                    let seed_crawler =
                        SeedCrawler::new(shutdown_notify, seed, processor, fetcher, progress_reporter);
                    seed_crawler.crawl(&settings).await
                })
            })
            .collect::<Vec<JoinHandle<anyhow::Result<CrawlSummary>>>>();

        let mut results = Vec::new();
        for task_result in join_all(handles).await {
            match task_result {
                Ok(Ok(crawl_summary)) => results.push(crawl_summary),
                Ok(Err(e)) => error!("crawler failed: {e:#}"),
                Err(e) => error!("crawler task panicked: {e}"),
            }
        }
        Ok(results)
    }
}
