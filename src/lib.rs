//! Headless catalog browser and item list service.
//!
//! Two independent parts share one process:
//!
//! - [`pager::Pager`] pages through the remote PokeAPI catalog, enriching every
//!   entry with stats, types, abilities and dimensions, and keeps the result in
//!   a single-writer [`state::StateStore`].
//! - [`items::ItemStore`] is an in-memory list of titled records.
//!
//! [`api`] exposes both over a small JSON HTTP API.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use pokedex::catalog::{http::HttpCatalog, CatalogClient};
//! use pokedex::pager::{Pager, DEFAULT_PAGE_SIZE};
//! use pokedex_core::Toggles;
//!
//! let source = Arc::new(HttpCatalog::new("https://pokeapi.co/api/v2", None)?);
//! let client = CatalogClient::new(source, "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites");
//! let pager = Pager::new(client, Toggles::default(), DEFAULT_PAGE_SIZE);
//!
//! pager.refresh().await;
//! pager.load_more().await;
//! println!("{} entries", pager.snapshot().entries.len());
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod items;
pub mod pager;
pub mod state;

pub use catalog::{CatalogClient, CatalogSource};
pub use error::{Error, Result};
pub use items::ItemStore;
pub use pager::Pager;
pub use state::{Action, CatalogState, StateStore};
