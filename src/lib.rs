pub mod aliases;
pub mod analysis;
pub mod attendance;
pub mod dataset;
pub mod elo;
pub mod export;
pub mod http_cache;
pub mod http_client;
pub mod record;
pub mod scrape;
