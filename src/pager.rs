//! Paginated, enriched catalog loading.
//!
//! A [`Pager`] drives fetch cycles against a [`CatalogClient`] and records the
//! results in its [`StateStore`]. At most one cycle runs at a time: a cycle
//! requested while another is in flight is skipped.
//!
//! Within a cycle every entry of the page is enriched concurrently and the
//! cycle waits for all of them before the page is merged, in page order.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use pokedex_core::{CatalogEntry, LoadOutcome, Toggles};

use crate::catalog::{parse_entry_id, CatalogClient, PageRef};
use crate::state::{Action, CatalogState, StateStore};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub struct Pager {
    client: CatalogClient,
    state: StateStore,
    page_size: u32,
}

impl Pager {
    pub fn new(client: CatalogClient, toggles: Toggles, page_size: u32) -> Self {
        Self {
            client,
            state: StateStore::new(CatalogState::new(toggles)),
            page_size: page_size.max(1),
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn snapshot(&self) -> Arc<CatalogState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogState>> {
        self.state.subscribe()
    }

    /// Toggles take effect from the next cycle on.
    pub fn set_toggles(&self, toggles: Toggles) {
        self.state.dispatch(Action::SetToggles(toggles));
    }

    /// Drop everything loaded so far and load the first page.
    pub async fn refresh(&self) -> LoadOutcome {
        self.state.dispatch(Action::Reset);
        self.load(true).await
    }

    /// Load the next page, if there is one and nothing is loading.
    pub async fn load_more(&self) -> LoadOutcome {
        let state = self.state.snapshot();
        if !state.has_more || state.loading {
            debug!(
                "Load more skipped (has_more={}, loading={})",
                state.has_more, state.loading
            );
            return LoadOutcome::Skipped;
        }
        self.load(false).await
    }

    /// Run one fetch cycle.
    ///
    /// With `reset` the page at offset 0 replaces the entries; otherwise the
    /// page at the current offset is appended. If the state is reset while
    /// the cycle is in flight its result is discarded and the cycle starts
    /// over from offset 0, still holding the loading flag.
    ///
    /// Dropping the returned future mid-cycle releases the loading flag.
    pub async fn load(&self, reset: bool) -> LoadOutcome {
        let Some(mut start) = self.state.begin_load() else {
            debug!("Load skipped: a fetch cycle is already running");
            return LoadOutcome::Skipped;
        };
        let mut guard = LoadingGuard::new(&self.state);
        let mut reset = reset;

        loop {
            let generation = start.generation;
            let offset = if reset { 0 } else { start.offset };

            let listing = match self.client.fetch_page(self.page_size, offset).await {
                Ok(listing) => listing,
                Err(e) => {
                    let mut message = e.to_string();
                    if message.is_empty() {
                        message = "unknown error".to_string();
                    }
                    let committed = self.state.commit(
                        generation,
                        [Action::SetError(Some(message.clone())), Action::SetLoading(false)],
                    );
                    if committed {
                        guard.disarm();
                        warn!("Catalog page at offset {} failed: {}", offset, message);
                        return LoadOutcome::Failed;
                    }
                    start = self.restart();
                    reset = true;
                    continue;
                }
            };

            let entries = self.enrich_all(listing.entries, start.toggles).await;
            let count = entries.len();
            let merge = if reset {
                Action::SetEntries(entries)
            } else {
                Action::AppendEntries(entries)
            };

            let committed = self.state.commit(
                generation,
                [
                    merge,
                    Action::SetOffset(offset.saturating_add(self.page_size)),
                    Action::SetHasMore(listing.next_available),
                    Action::SetLoading(false),
                ],
            );
            if committed {
                guard.disarm();
                info!(
                    "Loaded {} catalog entries at offset {} (more: {})",
                    count, offset, listing.next_available
                );
                return LoadOutcome::Completed;
            }

            start = self.restart();
            reset = true;
        }
    }

    fn restart(&self) -> Arc<CatalogState> {
        warn!("Catalog was reset while loading; discarding stale page");
        self.state.snapshot()
    }

    async fn enrich_all(&self, refs: Vec<PageRef>, toggles: Toggles) -> Vec<CatalogEntry> {
        join_all(refs.into_iter().map(|r| self.enrich(r, toggles))).await
    }

    async fn enrich(&self, page_ref: PageRef, toggles: Toggles) -> CatalogEntry {
        let PageRef { name, url } = page_ref;

        let Some(id) = parse_entry_id(&url) else {
            warn!("Unrecognized resource URL for {}: {}", name, url);
            return CatalogEntry {
                id: 0,
                name,
                source_url: url,
                image_url: String::new(),
                stats: None,
                types: None,
                abilities: None,
                height: None,
                weight: None,
            };
        };

        let client = &self.client;
        let (stats, types, abilities, details) = tokio::join!(
            async {
                if toggles.stats {
                    Some(client.fetch_stats(id).await)
                } else {
                    None
                }
            },
            async {
                if toggles.types {
                    Some(client.fetch_types(id).await)
                } else {
                    None
                }
            },
            async {
                if toggles.abilities {
                    Some(client.fetch_abilities(id).await)
                } else {
                    None
                }
            },
            client.fetch_details(id),
        );

        CatalogEntry {
            id,
            name,
            source_url: url,
            image_url: client.image_url(id),
            stats,
            types,
            abilities,
            height: Some(details.height),
            weight: Some(details.weight),
        }
    }
}

/// Clears `loading` if a cycle is abandoned before it commits.
struct LoadingGuard<'a> {
    state: &'a StateStore,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a StateStore) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Fetch cycle cancelled before completion");
            self.state.dispatch(Action::SetLoading(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use pokedex_core::Stats;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::fake::FakeCatalog;

    fn pager(fake: &Arc<FakeCatalog>, toggles: Toggles) -> Arc<Pager> {
        let client = CatalogClient::new(fake.clone(), "https://sprites.test");
        Arc::new(Pager::new(client, toggles, DEFAULT_PAGE_SIZE))
    }

    fn ids(state: &CatalogState) -> Vec<u32> {
        state.entries.iter().map(|e| e.id).collect()
    }

    async fn wait_until_loading(pager: &Pager) {
        let mut rx = pager.subscribe();
        rx.wait_for(|s| s.loading).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_loads_first_page_in_order() {
        let fake = Arc::new(FakeCatalog::new(50));
        let pager = pager(&fake, Toggles::default());

        assert_eq!(pager.refresh().await, LoadOutcome::Completed);

        let state = pager.snapshot();
        assert_eq!(ids(&state), (1..=20).collect::<Vec<_>>());
        assert_eq!(state.offset, 20);
        assert!(state.has_more);
        assert!(!state.loading);
        assert!(state.error.is_none());

        let first = &state.entries[0];
        assert_eq!(first.name, "mon-1");
        assert_eq!(first.image_url, "https://sprites.test/pokemon/1.png");
        assert_eq!(first.stats, Some(FakeCatalog::stats_for(1)));
        assert_eq!(first.types.as_ref().map(Vec::len), Some(1));
        assert_eq!(first.abilities, None);
        assert_eq!((first.height, first.weight), (Some(1), Some(10)));
    }

    #[tokio::test]
    async fn has_more_follows_next() {
        let fake = Arc::new(FakeCatalog::new(20));
        let pager = pager(&fake, Toggles::default());

        pager.refresh().await;
        let state = pager.snapshot();
        assert_eq!(state.entries.len(), 20);
        assert_eq!(state.offset, 20);
        assert!(!state.has_more);

        assert_eq!(pager.load_more().await, LoadOutcome::Skipped);
        assert_eq!(fake.page_calls(), 1);
    }

    #[tokio::test]
    async fn load_more_appends_and_advances_by_page_size() {
        let fake = Arc::new(FakeCatalog::new(45));
        let pager = pager(&fake, Toggles::default());

        pager.refresh().await;
        pager.load_more().await;
        assert_eq!(pager.load_more().await, LoadOutcome::Completed);

        let state = pager.snapshot();
        assert_eq!(ids(&state), (1..=45).collect::<Vec<_>>());
        // Short last page still advances by the full page size.
        assert_eq!(state.offset, 60);
        assert!(!state.has_more);
    }

    #[tokio::test]
    async fn failed_enrichment_uses_fallback_for_that_entry_only() {
        let fake = Arc::new(FakeCatalog::new(20));
        fake.fail_pokemon(7);
        let pager = pager(&fake, Toggles::default());

        assert_eq!(pager.refresh().await, LoadOutcome::Completed);

        let state = pager.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.entries.len(), 20);

        let broken = &state.entries[6];
        assert_eq!(broken.id, 7);
        assert_eq!(broken.stats, Some(Stats::fallback()));
        assert_eq!(broken.types, Some(Vec::new()));
        assert_eq!((broken.height, broken.weight), (Some(0), Some(0)));

        assert_eq!(state.entries[5].stats, Some(FakeCatalog::stats_for(6)));
        assert_eq!(state.entries[7].stats, Some(FakeCatalog::stats_for(8)));
    }

    #[tokio::test]
    async fn page_failure_sets_error_and_keeps_entries() {
        let fake = Arc::new(FakeCatalog::new(60));
        let pager = pager(&fake, Toggles::default());
        pager.refresh().await;

        fake.fail_pages(true);
        assert_eq!(pager.load_more().await, LoadOutcome::Failed);

        let state = pager.snapshot();
        assert_eq!(state.error.as_deref(), Some("Internal error: simulated network error"));
        assert_eq!(state.entries.len(), 20);
        assert_eq!(state.offset, 20);
        assert!(!state.loading);

        fake.fail_pages(false);
        assert_eq!(pager.load_more().await, LoadOutcome::Completed);
        let state = pager.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.entries.len(), 40);
    }

    #[tokio::test]
    async fn load_more_while_loading_issues_no_request() {
        let fake = Arc::new(FakeCatalog::new(60));
        let gate = fake.gate(0);
        let pager = pager(&fake, Toggles::default());

        let running = tokio::spawn({
            let pager = pager.clone();
            async move { pager.refresh().await }
        });
        wait_until_loading(&pager).await;

        assert_eq!(pager.load_more().await, LoadOutcome::Skipped);
        assert_eq!(pager.load(false).await, LoadOutcome::Skipped);
        assert_eq!(fake.page_calls(), 1);

        gate.add_permits(1);
        assert_eq!(running.await.unwrap(), LoadOutcome::Completed);
        assert_eq!(fake.page_calls(), 1);
        assert_eq!(pager.snapshot().entries.len(), 20);
    }

    #[tokio::test]
    async fn refresh_replaces_paginated_entries() {
        let fake = Arc::new(FakeCatalog::new(100));
        let pager = pager(&fake, Toggles::default());

        pager.refresh().await;
        pager.load_more().await;
        pager.load_more().await;
        assert_eq!(pager.snapshot().entries.len(), 60);

        assert_eq!(pager.refresh().await, LoadOutcome::Completed);
        let state = pager.snapshot();
        assert_eq!(ids(&state), (1..=20).collect::<Vec<_>>());
        assert_eq!(state.offset, 20);
    }

    #[tokio::test]
    async fn refresh_during_load_discards_stale_page() {
        let fake = Arc::new(FakeCatalog::new(100));
        let gate = fake.gate(1);
        let pager = pager(&fake, Toggles::default());
        pager.refresh().await;

        let running = tokio::spawn({
            let pager = pager.clone();
            async move { pager.load_more().await }
        });
        wait_until_loading(&pager).await;

        // The in-flight cycle owns the loading flag, so this only resets.
        assert_eq!(pager.refresh().await, LoadOutcome::Skipped);
        assert!(pager.snapshot().entries.is_empty());

        gate.add_permits(2);
        assert_eq!(running.await.unwrap(), LoadOutcome::Completed);

        let state = pager.snapshot();
        assert_eq!(ids(&state), (1..=20).collect::<Vec<_>>());
        assert_eq!(state.offset, 20);
        assert!(!state.loading);
        assert_eq!(fake.page_calls(), 3);
    }

    #[tokio::test]
    async fn cancelled_cycle_releases_loading() {
        let fake = Arc::new(FakeCatalog::new(60));
        let gate = fake.gate(0);
        let pager = pager(&fake, Toggles::default());

        let running = tokio::spawn({
            let pager = pager.clone();
            async move { pager.refresh().await }
        });
        wait_until_loading(&pager).await;

        running.abort();
        assert!(running.await.unwrap_err().is_cancelled());
        assert!(!pager.snapshot().loading);

        gate.add_permits(1);
        assert_eq!(pager.refresh().await, LoadOutcome::Completed);
        let state = pager.snapshot();
        assert_eq!(state.entries.len(), 20);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn offset_saturates_for_huge_page_sizes() {
        let fake = Arc::new(FakeCatalog::new(5));
        let client = CatalogClient::new(fake.clone(), "https://sprites.test");
        let pager = Pager::new(client, Toggles::default(), u32::MAX - 1);

        assert_eq!(pager.refresh().await, LoadOutcome::Completed);
        assert_eq!(pager.snapshot().offset, u32::MAX - 1);

        assert_eq!(pager.load(false).await, LoadOutcome::Completed);
        let state = pager.snapshot();
        assert_eq!(state.offset, u32::MAX);
        assert_eq!(state.entries.len(), 5);
    }

    #[tokio::test]
    async fn toggles_gate_enrichment_requests() {
        let fake = Arc::new(FakeCatalog::new(20));
        let toggles = Toggles { stats: false, types: false, abilities: false };
        let pager = pager(&fake, toggles);

        pager.refresh().await;
        let state = pager.snapshot();
        assert!(state.entries.iter().all(|e| e.stats.is_none() && e.types.is_none()));
        assert!(state.entries.iter().all(|e| e.height.is_some()));
        // Details only.
        assert_eq!(fake.pokemon_calls(), 20);

        pager.set_toggles(Toggles { stats: true, types: true, abilities: true });
        pager.refresh().await;
        let entry = &pager.snapshot().entries[0];
        assert!(entry.stats.is_some());
        assert_eq!(entry.abilities.as_ref().map(Vec::len), Some(2));
        assert_eq!(fake.pokemon_calls(), 20 + 20 * 4);
    }

    #[tokio::test]
    async fn unparseable_url_yields_sentinel_entry() {
        let fake = Arc::new(FakeCatalog::new(1));
        let pager = pager(&fake, Toggles::default());

        let entry = pager
            .enrich(
                PageRef {
                    name: "missingno".into(),
                    url: "https://pokeapi.test/api/v2/pokemon/missingno".into(),
                },
                Toggles::default(),
            )
            .await;

        assert!(entry.is_sentinel());
        assert_eq!(entry.name, "missingno");
        assert!(entry.stats.is_none());
        assert_eq!(fake.pokemon_calls(), 0);
    }
}
