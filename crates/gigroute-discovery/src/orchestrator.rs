//! The discovery orchestrator: runs route analysis across the candidate
//! roster against the external catalog, with caching, bounded concurrency,
//! per-performer timeouts, filtering, and deterministic ordering.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Duration as ChronoDuration;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use gigroute_catalog::{demo_events, normalize_events, CatalogClient, CatalogError, CatalogEvent};
use gigroute_core::{assess_route, score_match, PerformerProfile, RouteLeg, ScoringWeights, VenueProfile};

use crate::cache::{cache_key, ResultCache};
use crate::error::DiscoveryError;
use crate::stores::{PerformerStore, VenueStore};
use crate::types::{DiscoveryEvent, DiscoveryQuery, DiscoveryResponse, DiscoveryStats, MatchedPerformer};

/// Outcome of processing one performer. Failures are terminal for the
/// performer only, never for the run.
enum PerformerOutcome {
    Matched {
        matched: Box<MatchedPerformer>,
        events_seen: usize,
    },
    NoEvents,
    FilteredOut {
        events_seen: usize,
    },
    Failed,
}

enum FetchError {
    Catalog(CatalogError),
    TimedOut,
}

/// The discovery engine, shared across requests.
///
/// The cache is the only mutable state; everything else is configuration
/// fixed at startup.
pub struct DiscoveryEngine {
    catalog: Option<CatalogClient>,
    venues: VenueStore,
    performers: PerformerStore,
    cache: ResultCache<Vec<CatalogEvent>>,
    weights: ScoringWeights,
    max_concurrent: usize,
    fetch_timeout: Duration,
}

impl DiscoveryEngine {
    /// Builds an engine. `catalog` is `None` when no credential is
    /// configured, in which case every run falls back to the demo catalog.
    #[must_use]
    pub fn new(
        catalog: Option<CatalogClient>,
        venues: VenueStore,
        performers: PerformerStore,
        cache_ttl: Duration,
        weights: ScoringWeights,
        max_concurrent: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            venues,
            performers,
            cache: ResultCache::new(cache_ttl),
            weights,
            max_concurrent: max_concurrent.max(1),
            fetch_timeout,
        }
    }

    /// Whether a live catalog credential is configured.
    #[must_use]
    pub fn has_live_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Resolves a venue from the store.
    #[must_use]
    pub fn venue(&self, venue_id: &str) -> Option<&VenueProfile> {
        self.venues.get(venue_id)
    }

    /// Resolves a performer from the store.
    #[must_use]
    pub fn performer(&self, performer_id: &str) -> Option<&PerformerProfile> {
        self.performers.get(performer_id)
    }

    /// Scoring weights configured for this engine.
    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Empties the result cache.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Runs discovery and returns the complete response.
    ///
    /// Total catalog unavailability degrades to an empty `data` array with
    /// zeroed stats instead of an error, so batch consumers keep working.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownVenue`] if the venue is not in the
    /// store; validation errors never originate here because the query type
    /// is already well-formed.
    pub async fn run(&self, query: &DiscoveryQuery) -> Result<DiscoveryResponse, DiscoveryError> {
        let venue = self
            .venue(&query.venue_id)
            .ok_or_else(|| DiscoveryError::UnknownVenue(query.venue_id.clone()))?
            .clone();

        match self.execute(query, &venue, None).await {
            Ok((data, stats)) => Ok(DiscoveryResponse { data, venue, stats }),
            Err(DiscoveryError::ExternalService(message)) => {
                tracing::error!(error = %message, "catalog unavailable; degrading to empty result");
                Ok(DiscoveryResponse {
                    data: Vec::new(),
                    venue,
                    stats: DiscoveryStats::default(),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Runs discovery incrementally, emitting [`DiscoveryEvent`] records on
    /// the returned channel: zero or more `InProgress` batches in completion
    /// order, then exactly one terminal `Complete` or `Error`.
    ///
    /// Dropping the receiver cancels the run cooperatively; in-flight
    /// performer work is abandoned and nothing further is emitted. Cache
    /// writes already applied stay valid.
    #[must_use]
    pub fn run_streaming(self: Arc<Self>, query: DiscoveryQuery) -> mpsc::Receiver<DiscoveryEvent> {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let Some(venue) = self.venue(&query.venue_id).cloned() else {
                let _ = tx
                    .send(DiscoveryEvent::Error {
                        message: format!("unknown venue: {}", query.venue_id),
                    })
                    .await;
                return;
            };

            match self.execute(&query, &venue, Some(&tx)).await {
                Ok((results, stats)) => {
                    let _ = tx
                        .send(DiscoveryEvent::Complete {
                            results,
                            venue,
                            stats,
                        })
                        .await;
                }
                Err(e) => {
                    let _ = tx
                        .send(DiscoveryEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        });
        rx
    }

    /// The shared run loop behind both delivery modes.
    ///
    /// Performers are fetched and analysed with bounded concurrency; results
    /// arrive in completion order and are re-sorted deterministically at the
    /// end (routing score descending, performer name ascending).
    async fn execute(
        &self,
        query: &DiscoveryQuery,
        venue: &VenueProfile,
        progress: Option<&mpsc::Sender<DiscoveryEvent>>,
    ) -> Result<(Vec<MatchedPerformer>, DiscoveryStats), DiscoveryError> {
        let started = Instant::now();
        // Owned profiles: the per-performer futures must not borrow the
        // iteration items once they are spawned behind `run_streaming`.
        let roster = self.performers.roster().to_vec();

        let mut stats = DiscoveryStats {
            performers_queried: roster.len(),
            ..DiscoveryStats::default()
        };

        let mut outcomes = stream::iter(roster)
            .map(|performer| async move {
                let outcome = self.process_performer(&performer, query, venue).await;
                (performer, outcome)
            })
            .buffer_unordered(self.max_concurrent);

        let mut matched: Vec<MatchedPerformer> = Vec::new();
        let mut failed = 0usize;
        let mut cancelled = false;

        while let Some((performer, outcome)) = outcomes.next().await {
            match outcome {
                PerformerOutcome::Matched {
                    matched: m,
                    events_seen,
                } => {
                    stats.performers_with_events += 1;
                    stats.performers_passing_filter += 1;
                    stats.total_events_seen += events_seen;
                    if let Some(tx) = progress {
                        if tx
                            .send(DiscoveryEvent::InProgress {
                                results: vec![(*m).clone()],
                            })
                            .await
                            .is_err()
                        {
                            // Consumer went away; stop doing work for it.
                            tracing::debug!("stream consumer disconnected; abandoning run");
                            cancelled = true;
                            break;
                        }
                    }
                    matched.push(*m);
                }
                PerformerOutcome::NoEvents => {}
                PerformerOutcome::FilteredOut { events_seen } => {
                    stats.performers_with_events += 1;
                    stats.total_events_seen += events_seen;
                }
                PerformerOutcome::Failed => {
                    tracing::warn!(
                        performer = %performer.name,
                        "excluding performer after fetch/analysis failure"
                    );
                    failed += 1;
                }
            }
        }
        drop(outcomes);

        if cancelled {
            // The terminal send would fail anyway; return what we have.
            return Ok((matched, stats));
        }

        if stats.performers_queried > 0 && failed == stats.performers_queried {
            return Err(DiscoveryError::ExternalService(format!(
                "all {failed} performer lookups failed"
            )));
        }

        matched.sort_by(|a, b| {
            b.route
                .routing_score
                .partial_cmp(&a.route.routing_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.performer.name.cmp(&b.performer.name))
        });
        matched.truncate(query.max_results);

        stats.elapsed_millis = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        stats.cache = self.cache.stats().await;
        Ok((matched, stats))
    }

    /// Fetch, analyse, and filter one performer.
    async fn process_performer(
        &self,
        performer: &PerformerProfile,
        query: &DiscoveryQuery,
        venue: &VenueProfile,
    ) -> PerformerOutcome {
        let events = match self.fetch_events(&performer.name, query).await {
            Ok(events) => events,
            Err(FetchError::TimedOut) => {
                tracing::warn!(performer = %performer.name, "catalog fetch timed out");
                return PerformerOutcome::Failed;
            }
            Err(FetchError::Catalog(e)) => {
                tracing::warn!(performer = %performer.name, error = %e, "catalog fetch failed");
                return PerformerOutcome::Failed;
            }
        };

        let events_seen = events.len();
        if events.is_empty() {
            return PerformerOutcome::NoEvents;
        }

        let stops = normalize_events(&performer.name, &events);
        let assessment = assess_route(
            &stops,
            query.venue_position,
            query.window_start,
            query.window_end,
        );

        if matches!(assessment.leg, RouteLeg::Neither) {
            // Either no usable stops or nothing bracketing the window.
            if stops.is_empty() {
                tracing::warn!(
                    performer = %performer.name,
                    "all events malformed; excluding performer"
                );
                return PerformerOutcome::Failed;
            }
            return PerformerOutcome::FilteredOut { events_seen };
        }

        let within_radius = assessment
            .distance_to_venue
            .is_some_and(|d| d <= query.radius_miles);
        let acceptable_detour = assessment
            .detour_distance
            .is_some_and(|d| d <= query.radius_miles * 2.0);
        if !within_radius && !acceptable_detour {
            return PerformerOutcome::FilteredOut { events_seen };
        }

        if !genre_passes(performer, &query.genre_filter) {
            return PerformerOutcome::FilteredOut { events_seen };
        }

        let compatibility = score_match(performer, venue, Some(&assessment), &self.weights);
        PerformerOutcome::Matched {
            matched: Box::new(MatchedPerformer {
                performer: performer.clone(),
                route: assessment,
                compatibility,
                upcoming_events: stops,
            }),
            events_seen,
        }
    }

    /// Cached catalog lookup for one performer's events around the window.
    async fn fetch_events(
        &self,
        performer_name: &str,
        query: &DiscoveryQuery,
    ) -> Result<Vec<CatalogEvent>, FetchError> {
        let from = query.window_start - ChronoDuration::days(query.look_ahead_days);
        let to = query.window_end + ChronoDuration::days(query.look_ahead_days);
        let use_demo = query.demo_mode || self.catalog.is_none();

        let endpoint = if use_demo { "demo-events" } else { "events" };
        let from_s = from.to_string();
        let to_s = to.to_string();
        let key = cache_key(
            endpoint,
            &[
                ("performer", performer_name),
                ("from", &from_s),
                ("to", &to_s),
            ],
        );

        if let Some(events) = self.cache.get(&key).await {
            return Ok(events);
        }

        let events = if use_demo {
            demo_events(performer_name, from, to)
        } else {
            // `use_demo` is false only when the client exists.
            let Some(client) = self.catalog.as_ref() else {
                return Err(FetchError::Catalog(CatalogError::MissingCredential));
            };
            match tokio::time::timeout(
                self.fetch_timeout,
                client.upcoming_events(performer_name, from, to),
            )
            .await
            {
                Err(_elapsed) => return Err(FetchError::TimedOut),
                Ok(Err(e)) => return Err(FetchError::Catalog(e)),
                Ok(Ok(events)) => events,
            }
        };

        self.cache.insert(key, events.clone()).await;
        Ok(events)
    }
}

/// Substring-tolerant genre filter; an empty filter admits everyone.
fn genre_passes(performer: &PerformerProfile, filter: &[String]) -> bool {
    if filter.is_empty() {
        return true;
    }
    let Some(genre) = performer.genre.as_deref() else {
        return false;
    };
    let genre = genre.to_lowercase();
    filter.iter().any(|wanted| {
        let wanted = wanted.trim().to_lowercase();
        !wanted.is_empty() && (genre.contains(&wanted) || wanted.contains(&genre))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigroute_core::GeoPoint;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    fn demo_engine() -> DiscoveryEngine {
        DiscoveryEngine::new(
            None,
            VenueStore::demo_directory(),
            PerformerStore::demo_roster(),
            Duration::from_secs(3600),
            ScoringWeights::default(),
            4,
            Duration::from_secs(5),
        )
    }

    fn chicago_query() -> DiscoveryQuery {
        DiscoveryQuery {
            venue_id: "thalia-hall".to_owned(),
            venue_position: GeoPoint::new(41.8576, -87.6573).expect("valid"),
            window_start: date("2026-09-10"),
            window_end: date("2026-09-12"),
            radius_miles: 300.0,
            genre_filter: Vec::new(),
            max_results: 10,
            look_ahead_days: 14,
            demo_mode: true,
        }
    }

    #[test]
    fn empty_genre_filter_admits_everyone() {
        let roster = PerformerStore::demo_roster();
        for p in roster.roster() {
            assert!(genre_passes(p, &[]));
        }
    }

    #[test]
    fn genre_filter_is_substring_tolerant() {
        let roster = PerformerStore::demo_roster();
        let indie = roster.get("mile-markers").expect("exists");
        assert!(genre_passes(indie, &["rock".to_owned()]));
        assert!(!genre_passes(indie, &["techno".to_owned()]));
    }

    #[tokio::test]
    async fn unknown_venue_is_an_error() {
        let engine = demo_engine();
        let mut query = chicago_query();
        query.venue_id = "no-such-venue".to_owned();
        let result = engine.run(&query).await;
        assert!(matches!(result, Err(DiscoveryError::UnknownVenue(_))));
    }

    #[tokio::test]
    async fn demo_discovery_is_deterministic() {
        let engine = demo_engine();
        let query = chicago_query();
        let first = engine.run(&query).await.expect("first run");
        let second = engine.run(&query).await.expect("second run");

        let names = |r: &DiscoveryResponse| {
            r.data
                .iter()
                .map(|m| m.performer.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(first.stats.performers_queried, 8);
    }

    #[tokio::test]
    async fn results_sort_by_routing_score_descending() {
        let engine = demo_engine();
        let response = engine.run(&chicago_query()).await.expect("run");
        for pair in response.data.windows(2) {
            assert!(
                pair[0].route.routing_score >= pair[1].route.routing_score,
                "results out of order"
            );
        }
    }

    #[tokio::test]
    async fn max_results_truncates_the_list() {
        let engine = demo_engine();
        let mut query = chicago_query();
        query.max_results = 1;
        let response = engine.run(&query).await.expect("run");
        assert!(response.data.len() <= 1);
    }

    #[tokio::test]
    async fn genre_filter_restricts_results() {
        let engine = demo_engine();
        let mut query = chicago_query();
        query.genre_filter = vec!["folk".to_owned()];
        let response = engine.run(&query).await.expect("run");
        for m in &response.data {
            let genre = m.performer.genre.as_deref().unwrap_or_default();
            assert!(genre.contains("folk"), "unexpected genre {genre}");
        }
    }

    #[tokio::test]
    async fn second_identical_run_hits_the_cache() {
        let engine = demo_engine();
        let query = chicago_query();
        let first = engine.run(&query).await.expect("first");
        assert_eq!(first.stats.cache.hits, 0);
        assert_eq!(first.stats.cache.misses, 8, "one miss per performer");

        let second = engine.run(&query).await.expect("second");
        assert_eq!(second.stats.cache.hits, 8, "every lookup served from cache");
        assert_eq!(second.stats.cache.misses, 8, "miss counter is cumulative");
    }

    #[tokio::test]
    async fn streaming_ends_with_a_complete_record() {
        let engine = Arc::new(demo_engine());
        let mut rx = engine.run_streaming(chicago_query());

        let mut saw_complete = false;
        let mut progress_count = 0usize;
        while let Some(event) = rx.recv().await {
            match event {
                DiscoveryEvent::InProgress { results } => {
                    assert!(!saw_complete, "progress after terminal record");
                    assert_eq!(results.len(), 1);
                    progress_count += 1;
                }
                DiscoveryEvent::Complete { results, stats, .. } => {
                    saw_complete = true;
                    // max_results exceeds the roster, so nothing is truncated
                    // and the final list matches the progress emissions.
                    assert_eq!(results.len(), progress_count);
                    assert_eq!(stats.performers_queried, 8);
                }
                DiscoveryEvent::Error { message } => panic!("unexpected error: {message}"),
            }
        }
        assert!(saw_complete, "stream must end with Complete");
    }

    #[tokio::test]
    async fn streaming_unknown_venue_emits_terminal_error() {
        let engine = Arc::new(demo_engine());
        let mut query = chicago_query();
        query.venue_id = "no-such-venue".to_owned();
        let mut rx = engine.run_streaming(query);

        let first = rx.recv().await.expect("one record");
        assert!(matches!(first, DiscoveryEvent::Error { .. }));
        assert!(rx.recv().await.is_none(), "error record is terminal");
    }
}
