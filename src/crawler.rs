pub mod admission_gate;
pub mod crawl_context;
pub mod crawl_error;
pub mod crawl_report;
pub mod crawl_response;
pub mod crawl_stats;
pub mod crawl_summary;
pub mod crawler_config;
pub mod crawler_state;
pub mod link_extractor;
pub mod multi_crawler;
pub mod near_duplicate;
pub mod page_fetcher;
pub mod page_processor;
pub mod page_summary;
pub mod progress_reporter;
pub mod query_validator;
pub mod robots;
mod seed_crawler;
pub mod tokenizer;
pub mod trap_filter;
pub mod url_normalizer;

pub use seed_crawler::*;
