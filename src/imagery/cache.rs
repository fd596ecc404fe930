use super::ImageSource;
use crate::{geometry::BoundingBox, Error, Result};
use futures_util::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

type Fetch = Shared<BoxFuture<'static, Result<Arc<Vec<u8>>, Arc<Error>>>>;

/// Memoizes static images by bounding box.
///
/// Concurrent requests for the same box share a single in-flight fetch. Failed
/// fetches are dropped so the next request tries again. Once `capacity` boxes
/// are stored the oldest one is evicted.
pub struct StaticImageCache {
    source: Arc<dyn ImageSource>,
    capacity: usize,
    entries: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    fetches: HashMap<[u64; 4], Fetch>,
    order: VecDeque<[u64; 4]>,
}

impl Entries {
    fn insert(&mut self, key: [u64; 4], fetch: Fetch, capacity: usize) {
        while self.order.len() >= capacity.max(1) {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.fetches.remove(&oldest);
                }
                None => break,
            }
        }
        self.fetches.insert(key, fetch);
        self.order.push_back(key);
    }

    /// Drops `fetch` only if it is still the one stored under `key`, a retry
    /// may have replaced it already.
    fn remove(&mut self, key: &[u64; 4], fetch: &Fetch) {
        if !self.fetches.get(key).is_some_and(|it| it.ptr_eq(fetch)) {
            return;
        }
        self.fetches.remove(key);
        self.order.retain(|it| it != key);
    }
}

impl StaticImageCache {
    pub fn new(source: Arc<dyn ImageSource>, capacity: usize) -> Self {
        StaticImageCache {
            source,
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub async fn get(&self, bbox: &BoundingBox) -> Result<Arc<Vec<u8>>> {
        let key = bbox.key();
        let fetch = {
            let mut entries = self.entries();
            match entries.fetches.get(&key) {
                Some(fetch) => {
                    debug!(bbox = %bbox.to_query(), "Static image cache hit");
                    fetch.clone()
                }
                None => {
                    debug!(bbox = %bbox.to_query(), "Static image cache miss");
                    let fetch = self
                        .source
                        .fetch(*bbox)
                        .map(|res| res.map(Arc::new).map_err(Arc::new))
                        .boxed()
                        .shared();
                    entries.insert(key, fetch.clone(), self.capacity);
                    fetch
                }
            }
        };
        // Await a clone, a completed Shared no longer compares equal
        match fetch.clone().await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                self.entries().remove(&key, &fetch);
                Err(e.into())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries().fetches.len()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
