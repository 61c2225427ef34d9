// Process-wide event cache. Each slug is fetched at most once; concurrent
// loads of the same slug share the in-flight fetch and its outcome.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};

use crate::error::{Result, ScoutError};
use crate::hydrate::{parse_event_data, parse_match_results};
use crate::metrics;
use crate::model::Event;
use crate::source::{validate_slug, EventSource, Resource};

/// Outcome of one load attempt, cloned out to every caller that shared it.
pub type LoadResult = std::result::Result<Arc<Event>, Arc<ScoutError>>;

type EventLoad = Shared<BoxFuture<'static, LoadResult>>;

pub struct EventStore<S> {
    source: Arc<S>,
    /// Pending or completed loads. Failed loads are removed.
    events: Mutex<HashMap<String, EventLoad>>,
}

impl<S: EventSource + 'static> EventStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            events: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn pending(&self, slug: &str) -> EventLoad {
        let mut events = self.events.lock().unwrap();
        events
            .entry(slug.to_string())
            .or_insert_with(|| {
                let source = Arc::clone(&self.source);
                let slug = slug.to_string();
                async move { fetch_event(&*source, &slug).await.map_err(Arc::new) }
                    .boxed()
                    .shared()
            })
            .clone()
    }

    /// Load an event, fetching it on first use.
    ///
    /// Callers already waiting share a failure; the failed load is then
    /// evicted, so calling again retries.
    pub async fn load_event(&self, slug: &str) -> LoadResult {
        validate_slug(slug).map_err(Arc::new)?;

        let load = self.pending(slug);
        if let Some(Ok(event)) = load.peek() {
            tracing::debug!(slug, "event cache hit");
            return Ok(event.clone());
        }

        let result = load.clone().await;
        if result.is_err() {
            let mut events = self.events.lock().unwrap();
            if events.get(slug).is_some_and(|current| current.ptr_eq(&load)) {
                events.remove(slug);
            }
        }
        result
    }

    /// The cached event, if it has finished loading.
    pub fn get_event(&self, slug: &str) -> Option<Arc<Event>> {
        let events = self.events.lock().unwrap();
        match events.get(slug)?.peek() {
            Some(Ok(event)) => Some(event.clone()),
            _ => None,
        }
    }

    /// Slugs of all fully loaded events, sorted.
    pub fn loaded_slugs(&self) -> Vec<String> {
        let events = self.events.lock().unwrap();
        let mut slugs: Vec<String> = events
            .iter()
            .filter(|(_, load)| matches!(load.peek(), Some(Ok(_))))
            .map(|(slug, _)| slug.clone())
            .collect();
        slugs.sort();
        slugs
    }

    /// Load several events concurrently, logging failures. Returns how many loaded.
    pub async fn preload(&self, slugs: &[String]) -> usize {
        let results = join_all(slugs.iter().map(|slug| self.load_event(slug))).await;
        let mut loaded = 0;
        for (slug, result) in slugs.iter().zip(results) {
            match result {
                Ok(_) => loaded += 1,
                Err(e) => tracing::error!(slug = %slug, "Failed to preload event: {e}"),
            }
        }
        loaded
    }
}

async fn fetch<S: EventSource>(source: &S, resource: Resource<'_>) -> Result<String> {
    metrics::SOURCE_FETCHES_TOTAL
        .with_label_values(&[resource.kind()])
        .inc();
    let result = source.fetch(resource).await;
    if result.is_err() {
        metrics::SOURCE_FETCH_ERRORS_TOTAL
            .with_label_values(&[resource.kind()])
            .inc();
    }
    result
}

async fn fetch_event<S: EventSource>(source: &S, slug: &str) -> Result<Arc<Event>> {
    tracing::info!(slug, "Fetching event data");

    let robot_entries = match fetch(source, Resource::EventData(slug)).await {
        Ok(text) => parse_event_data(&text)?,
        Err(e) => {
            tracing::error!(slug, "Event data fetch failed: {e}");
            return Err(e);
        }
    };

    // Results are published after the event starts; scouting data alone is usable.
    let matches = match fetch(source, Resource::MatchResults(slug)).await {
        Ok(text) => parse_match_results(&text)?,
        Err(ScoutError::NotFound { resource }) => {
            tracing::warn!(slug, %resource, "No match results yet");
            Default::default()
        }
        Err(e) => {
            tracing::error!(slug, "Match results fetch failed: {e}");
            return Err(e);
        }
    };

    metrics::ROBOT_ENTRIES_LOADED_TOTAL.inc_by(robot_entries.len() as u64);
    metrics::EVENTS_CACHED.inc();
    tracing::info!(
        slug,
        entries = robot_entries.len(),
        matches = matches.len(),
        "Event loaded"
    );

    Ok(Arc::new(Event {
        slug: slug.to_string(),
        robot_entries,
        matches,
        loaded_at: Utc::now(),
    }))
}
