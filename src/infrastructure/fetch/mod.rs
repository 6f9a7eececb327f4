//! Remote image download.

mod http_fetcher;

pub use http_fetcher::HttpImageFetcher;
