use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use pokedex_core::{Ability, Dimensions, Stats, TypeRef};

use crate::error::Result;

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

/// Body of `GET {base}/pokemon?limit=&offset=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<PageRef>,
}

/// A list entry as reported by the page endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub name: String,
    pub url: String,
}

/// Body of `GET {base}/pokemon/{id}`, reduced to the fields we read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PokemonResponse {
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Transport for the remote catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of list entries
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PageResponse>;

    /// Fetch the detail resource of one entry
    async fn pokemon(&self, id: u32) -> Result<PokemonResponse>;
}

/// One page of the catalog, before enrichment
#[derive(Debug, Clone)]
pub struct PageListing {
    pub entries: Vec<PageRef>,
    pub next_available: bool,
}

/// Map the positional stats array of the remote API.
///
/// Index 5 is speed; special attack and special defense sit at 3 and 4.
pub fn stats_from_slots(slots: &[StatSlot]) -> Option<Stats> {
    let at = |i: usize| slots.get(i).map(|s| s.base_stat);
    Some(Stats {
        hp: at(0)?,
        attack: at(1)?,
        defense: at(2)?,
        special_attack: at(3)?,
        special_defense: at(4)?,
        speed: at(5)?,
    })
}

/// Parse the numeric id from an entry URL such as
/// `https://pokeapi.co/api/v2/pokemon/25/`.
///
/// The id is the second-to-last `/`-separated segment, so the trailing slash
/// is significant. Zero is reserved for unparseable entries.
pub fn parse_entry_id(url: &str) -> Option<u32> {
    url.rsplit('/')
        .nth(1)?
        .parse()
        .ok()
        .filter(|id| *id != 0)
}

/// Catalog client with the per-call failure policy applied.
///
/// Only [`CatalogClient::fetch_page`] reports failures. Every enrichment call
/// logs the failure and falls back to a default value.
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    sprite_base: String,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>, sprite_base: impl Into<String>) -> Self {
        let sprite_base = sprite_base.into().trim_end_matches('/').to_string();
        Self {
            source,
            sprite_base,
        }
    }

    pub async fn fetch_page(&self, limit: u32, offset: u32) -> Result<PageListing> {
        debug!("Fetching catalog page limit={} offset={}", limit, offset);
        let page = self.source.list_page(limit, offset).await?;
        Ok(PageListing {
            entries: page.results,
            next_available: page.next.is_some(),
        })
    }

    pub async fn fetch_types(&self, id: u32) -> Vec<TypeRef> {
        match self.source.pokemon(id).await {
            Ok(p) => p
                .types
                .into_iter()
                .map(|slot| TypeRef {
                    name: slot.kind.name,
                    url: slot.kind.url,
                })
                .collect(),
            Err(e) => {
                warn!("Failed to fetch types for #{}: {}", id, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_abilities(&self, id: u32) -> Vec<Ability> {
        match self.source.pokemon(id).await {
            Ok(p) => p
                .abilities
                .into_iter()
                .map(|slot| Ability {
                    name: slot.ability.name,
                    is_hidden: slot.is_hidden,
                })
                .collect(),
            Err(e) => {
                warn!("Failed to fetch abilities for #{}: {}", id, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_details(&self, id: u32) -> Dimensions {
        match self.source.pokemon(id).await {
            Ok(p) => Dimensions {
                height: p.height,
                weight: p.weight,
            },
            Err(e) => {
                warn!("Failed to fetch details for #{}: {}", id, e);
                Dimensions::default()
            }
        }
    }

    pub async fn fetch_stats(&self, id: u32) -> Stats {
        match self.source.pokemon(id).await {
            Ok(p) => stats_from_slots(&p.stats).unwrap_or_else(|| {
                warn!("Incomplete stats for #{} ({} slots)", id, p.stats.len());
                Stats::fallback()
            }),
            Err(e) => {
                warn!("Failed to fetch stats for #{}: {}", id, e);
                Stats::fallback()
            }
        }
    }

    pub fn image_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}.png", self.sprite_base, id)
    }

    pub fn shiny_image_url(&self, id: u32) -> String {
        format!("{}/pokemon/shiny/{}.png", self.sprite_base, id)
    }
}
