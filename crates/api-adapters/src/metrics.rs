//! Prometheus counters for the write paths.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

pub struct Metrics {
    registry: Registry,
    pub posts_created: Counter,
    pub threads_created: Counter,
    pub votes_cast: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("forum");
        let posts_created = Counter::default();
        let threads_created = Counter::default();
        let votes_cast = Counter::default();
        registry.register("posts_created", "Posts committed by batch creation", posts_created.clone());
        registry.register("threads_created", "Threads created", threads_created.clone());
        registry.register("votes_cast", "Vote events appended", votes_cast.clone());
        Self {
            registry,
            posts_created,
            threads_created,
            votes_cast,
        }
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
