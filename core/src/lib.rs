//! Core types for the pokedex catalog and item service.
//!
//! This crate provides the shared data types used by both the pokedex
//! service and clients that talk to its JSON API.
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`ListItem`] - A record in the local item list
//! - [`CatalogEntry`] - An enriched entry of the remote catalog
//! - [`CatalogSnapshot`] - The browsable catalog state at one point in time
//! - [`LoadReport`] - The result of a refresh or load-more request
//! - [`Toggles`] - Which enrichment categories are fetched per entry
//!
//! # Example
//!
//! Paging through the catalog of a running pokedex service:
//!
//! ```ignore
//! use pokedex_core::{CatalogSnapshot, LoadReport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//!
//! // Load the next page
//! let report: LoadReport = client
//!     .post("http://localhost:8080/api/v1/catalog/more")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//!
//! for entry in &report.state.entries {
//!     println!("#{} {}", entry.id, entry.name);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

/// A record in the local item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Unique identifier, generated by the store.
    pub id: String,
    /// Trimmed, non-empty title.
    pub title: String,
}

/// Request body for creating or renaming a [`ListItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub title: String,
}

/// Base stats of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub special_attack: u32,
    pub special_defense: u32,
}

impl Stats {
    /// Value used for every field when stats cannot be fetched.
    pub const FALLBACK_VALUE: u32 = 50;

    /// Stats with every field set to [`Stats::FALLBACK_VALUE`].
    ///
    /// ```
    /// use pokedex_core::Stats;
    ///
    /// let stats = Stats::fallback();
    /// assert_eq!(stats.hp, 50);
    /// assert_eq!(stats.special_defense, 50);
    /// ```
    pub fn fallback() -> Self {
        let v = Self::FALLBACK_VALUE;
        Self {
            hp: v,
            attack: v,
            defense: v,
            speed: v,
            special_attack: v,
            special_defense: v,
        }
    }
}

/// An elemental type reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub url: String,
}

/// An ability of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

/// Height and weight, in the units the remote API reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: u32,
    pub weight: u32,
}

/// Enrichment categories fetched for every entry of a page.
///
/// Height and weight are always fetched and have no toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    #[serde(default = "default_true")]
    pub stats: bool,
    #[serde(default = "default_true")]
    pub types: bool,
    #[serde(default)]
    pub abilities: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            stats: true,
            types: true,
            abilities: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// An entry of the remote catalog.
///
/// Optional fields are only present when the matching [`Toggles`] flag was
/// enabled at fetch time. Entries whose resource URL could not be parsed carry
/// id `0` and no enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Numeric id parsed from the entry's resource URL.
    pub id: u32,
    /// Entry name (e.g., `"bulbasaur"`).
    pub name: String,
    /// Resource URL reported by the list endpoint.
    pub source_url: String,
    /// Sprite URL derived from the id.
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Vec<Ability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl CatalogEntry {
    /// Whether this entry was built from an unparseable resource URL.
    pub fn is_sentinel(&self) -> bool {
        self.id == 0
    }
}

/// The browsable catalog state.
///
/// Returned from `/api/v1/catalog` and embedded in every [`LoadReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Entries loaded so far, in source order.
    pub entries: Vec<CatalogEntry>,
    /// Whether a fetch cycle is in flight.
    pub loading: bool,
    /// Message of the last failed page fetch, cleared when a cycle starts.
    #[serde(default)]
    pub error: Option<String>,
    /// Whether the remote source reported a further page.
    pub has_more: bool,
    /// Offset of the next page to load.
    pub offset: u32,
    /// Enrichment categories used by the next cycle.
    pub toggles: Toggles,
}

/// How a refresh or load-more request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOutcome {
    /// A page was fetched and merged.
    Completed,
    /// The page fetch failed; see [`CatalogSnapshot::error`].
    Failed,
    /// Nothing was fetched: a cycle was already running or no page remains.
    Skipped,
}

/// Response of `/api/v1/catalog/refresh` and `/api/v1/catalog/more`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub state: CatalogSnapshot,
}

/// Sprite URLs of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub default: String,
    pub shiny: String,
}
