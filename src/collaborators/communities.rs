use std::time::{Duration, Instant};

use log::{info, warn};

use crate::errors::{Error, Result};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Entries of the community directory are passed through untouched.
pub type Community = serde_json::Value;

/// Holds one value and when it was stored.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(T, Instant)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache { ttl, entry: None }
    }

    pub fn fresh(&self, now: Instant) -> Option<&T> {
        match &self.entry {
            Some((value, stored_at)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                Some(value)
            },
            _ => None,
        }
    }

    /// The cached value regardless of age.
    pub fn stale(&self) -> Option<&T> {
        self.entry.as_ref().map(|(value, _)| value)
    }

    pub fn store(&mut self, value: T, now: Instant) {
        self.entry = Some((value, now));
    }
}

pub trait CommunitySource {
    fn fetch(&self) -> Result<Vec<Community>>;
}

pub fn decode_communities(body: &str) -> Result<Vec<Community>> {
    serde_json::from_str(body)
        .map_err(|err| Error::upstream(format!("unreadable community list: {}", err)))
}

/// A community source behind its own cache.
pub struct CachedCommunities<S> {
    source: S,
    cache: TtlCache<Vec<Community>>,
}

impl<S: CommunitySource> CachedCommunities<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        CachedCommunities {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Fresh cache first, then the source, then whatever is cached however old.
    pub fn load(&mut self, now: Instant) -> Result<Vec<Community>> {
        if let Some(cached) = self.cache.fresh(now) {
            info!(count = cached.len(); "Serving communities from cache");
            return Ok(cached.clone());
        }
        match self.source.fetch() {
            Ok(communities) => {
                info!(count = communities.len(); "Communities fetched and cached");
                self.cache.store(communities.clone(), now);
                Ok(communities)
            },
            Err(err) => match self.cache.stale() {
                Some(stale) => {
                    warn!(err = err.message.as_str(); "Community fetch failed, serving stale cache");
                    Ok(stale.clone())
                },
                None => Err(Error::upstream(format!("failed to load communities: {}", err.message))),
            },
        }
    }
}
