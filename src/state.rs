//! Single-writer catalog state.
//!
//! [`CatalogState`] is changed only through [`Action`]s applied by a
//! [`StateStore`], which publishes every result as an immutable
//! `Arc<CatalogState>` snapshot over a `tokio::sync::watch` channel. A batch
//! of actions is applied as one step, so readers never see a half-merged page.

use std::sync::Arc;

use tokio::sync::watch;

use pokedex_core::{CatalogEntry, CatalogSnapshot, Toggles};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    pub entries: Vec<CatalogEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub offset: u32,
    pub toggles: Toggles,
    /// Bumped on every reset; fetch cycles from an older generation are stale.
    pub generation: u64,
}

/// Closed set of state transitions.
#[derive(Debug, Clone)]
pub enum Action {
    SetLoading(bool),
    SetError(Option<String>),
    SetEntries(Vec<CatalogEntry>),
    AppendEntries(Vec<CatalogEntry>),
    SetHasMore(bool),
    SetOffset(u32),
    SetToggles(Toggles),
    /// Clear entries, rewind the cursor and start a new generation.
    Reset,
}

impl CatalogState {
    pub fn new(toggles: Toggles) -> Self {
        Self {
            entries: Vec::new(),
            loading: false,
            error: None,
            has_more: true,
            offset: 0,
            toggles,
            generation: 0,
        }
    }

    /// Produce the state that follows `action`, leaving `self` untouched.
    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::SetLoading(loading) => self.loading = loading,
            Action::SetError(error) => self.error = error,
            Action::SetEntries(entries) => self.entries = entries,
            Action::AppendEntries(entries) => self.entries.extend(entries),
            Action::SetHasMore(has_more) => self.has_more = has_more,
            Action::SetOffset(offset) => self.offset = offset,
            Action::SetToggles(toggles) => self.toggles = toggles,
            Action::Reset => {
                self.entries.clear();
                self.offset = 0;
                self.has_more = true;
                self.generation += 1;
            }
        }
    }

    pub fn to_snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            entries: self.entries.clone(),
            loading: self.loading,
            error: self.error.clone(),
            has_more: self.has_more,
            offset: self.offset,
            toggles: self.toggles,
        }
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(Toggles::default())
    }
}

/// Owner of the catalog state. All writes go through `dispatch*`.
pub struct StateStore {
    tx: watch::Sender<Arc<CatalogState>>,
}

impl StateStore {
    pub fn new(initial: CatalogState) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Current snapshot. Holding it does not block writers.
    pub fn snapshot(&self) -> Arc<CatalogState> {
        self.tx.borrow().clone()
    }

    /// Receiver notified after every published change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogState>> {
        self.tx.subscribe()
    }

    pub fn dispatch(&self, action: Action) {
        self.dispatch_all([action]);
    }

    /// Apply `actions` in order and publish a single snapshot.
    pub fn dispatch_all<I>(&self, actions: I)
    where
        I: IntoIterator<Item = Action>,
    {
        self.tx.send_modify(|state| {
            let state = Arc::make_mut(state);
            for action in actions {
                state.apply(action);
            }
        });
    }

    /// Mark a fetch cycle as started unless one is already running.
    ///
    /// Sets `loading` and clears `error` in one step and returns the
    /// resulting snapshot, or `None` when the state was already loading.
    pub fn begin_load(&self) -> Option<Arc<CatalogState>> {
        let mut started = None;
        self.tx.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            let inner = Arc::make_mut(state);
            inner.apply(Action::SetLoading(true));
            inner.apply(Action::SetError(None));
            started = Some(Arc::clone(state));
            true
        });
        started
    }

    /// Apply `actions` only if the state is still at `generation`.
    ///
    /// Returns `false`, leaving the state untouched, when a reset happened
    /// since the caller read `generation`.
    pub fn commit<I>(&self, generation: u64, actions: I) -> bool
    where
        I: IntoIterator<Item = Action>,
    {
        self.tx.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            let inner = Arc::make_mut(state);
            for action in actions {
                inner.apply(action);
            }
            true
        })
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(CatalogState::default())
    }
}
