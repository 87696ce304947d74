//! In-memory catalog source for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::catalog::{
    AbilitySlot, CatalogSource, NamedResource, PageRef, PageResponse, PokemonResponse, Stats,
    StatSlot, TypeSlot,
};
use crate::error::{Error, Result};

/// Serves `total` entries with ids `1..=total`.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    total: u32,
    page_calls: AtomicUsize,
    pokemon_calls: AtomicUsize,
    fail_pages: AtomicBool,
    failing: Mutex<HashSet<u32>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeCatalog {
    pub(crate) fn new(total: u32) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub(crate) fn entry_url(id: u32) -> String {
        format!("https://pokeapi.test/api/v2/pokemon/{}/", id)
    }

    pub(crate) fn stats_for(id: u32) -> Stats {
        Stats {
            hp: id * 10,
            attack: id * 10 + 1,
            defense: id * 10 + 2,
            special_attack: id * 10 + 3,
            special_defense: id * 10 + 4,
            speed: id * 10 + 5,
        }
    }

    pub(crate) fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_pokemon(&self, id: u32) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Make page requests wait for a permit. Starts with `permits` available.
    pub(crate) fn gate(&self, permits: usize) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(permits));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn pokemon_calls(&self) -> usize {
        self.pokemon_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PageResponse> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(Error::Internal("simulated network error".into()));
        }

        let end = offset.saturating_add(limit).min(self.total);
        let results = (offset + 1..=end)
            .map(|id| PageRef {
                name: format!("mon-{}", id),
                url: Self::entry_url(id),
            })
            .collect();
        let next = (end < self.total)
            .then(|| format!("https://pokeapi.test/api/v2/pokemon?offset={}&limit={}", end, limit));

        Ok(PageResponse {
            count: self.total,
            next,
            previous: None,
            results,
        })
    }

    async fn pokemon(&self, id: u32) -> Result<PokemonResponse> {
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&id) || id > self.total {
            return Err(Error::Internal(format!("simulated network error for #{}", id)));
        }

        let s = Self::stats_for(id);
        let stats = [s.hp, s.attack, s.defense, s.special_attack, s.special_defense, s.speed]
            .into_iter()
            .map(|base_stat| StatSlot { base_stat })
            .collect();
        let named = |name: &str| NamedResource {
            name: name.to_string(),
            url: format!("https://pokeapi.test/api/v2/{}/", name),
        };

        Ok(PokemonResponse {
            height: id,
            weight: id * 10,
            stats,
            types: vec![TypeSlot { kind: named("normal") }],
            abilities: vec![
                AbilitySlot { ability: named("run-away"), is_hidden: false },
                AbilitySlot { ability: named("guts"), is_hidden: true },
            ],
        })
    }
}
