//! HTTP client example for pokedex
//!
//! Demonstrates how to page through the catalog and edit the item list.
//!
//! Usage:
//!   cargo run -p api-client [--url http://localhost:8080]

use pokedex_core::{ItemInput, ListItem, LoadOutcome, LoadReport};

const DEFAULT_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::args()
        .nth(1)
        .filter(|arg| !arg.starts_with('-'))
        .or_else(|| {
            std::env::args()
                .skip_while(|arg| arg != "--url")
                .nth(1)
        })
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    println!("Pokedex API Client Demo");
    println!("=======================\n");
    println!("Connecting to: {}\n", base_url);

    let client = reqwest::Client::new();

    // 1. Load the first page from scratch
    println!("1. Refreshing catalog...\n");
    let report: LoadReport = client
        .post(format!("{}/api/v1/catalog/refresh", base_url))
        .send()
        .await?
        .json()
        .await?;

    if report.outcome == LoadOutcome::Failed {
        println!(
            "   Catalog unavailable: {}",
            report.state.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(());
    }

    for entry in &report.state.entries {
        let types = entry
            .types
            .as_ref()
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        println!("   #{:<4} {:<12} {}", entry.id, entry.name, types);
        if let Some(stats) = &entry.stats {
            println!(
                "         hp {} atk {} def {} spd {}",
                stats.hp, stats.attack, stats.defense, stats.speed
            );
        }
    }
    println!();

    // 2. Load one more page
    println!("2. Loading more...\n");
    let report: LoadReport = client
        .post(format!("{}/api/v1/catalog/more", base_url))
        .send()
        .await?
        .json()
        .await?;

    println!(
        "   Outcome: {:?}, {} entries loaded, next offset {}, more available: {}",
        report.outcome,
        report.state.entries.len(),
        report.state.offset,
        report.state.has_more
    );
    println!();

    // 3. Add, rename and delete an item
    println!("3. Editing the item list...\n");
    let item: ListItem = client
        .post(format!("{}/api/v1/items", base_url))
        .json(&ItemInput { title: "Milk".to_string() })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("   Added {} ({})", item.title, item.id);

    let item: ListItem = client
        .put(format!("{}/api/v1/items/{}", base_url, item.id))
        .json(&ItemInput { title: "Oat milk".to_string() })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("   Renamed to {}", item.title);

    let rejected = client
        .post(format!("{}/api/v1/items", base_url))
        .json(&ItemInput { title: "   ".to_string() })
        .send()
        .await?;
    println!("   Blank title rejected with {}", rejected.status());

    client
        .delete(format!("{}/api/v1/items/{}", base_url, item.id))
        .send()
        .await?
        .error_for_status()?;

    let items: Vec<ListItem> = client
        .get(format!("{}/api/v1/items", base_url))
        .send()
        .await?
        .json()
        .await?;
    println!("   Deleted it; {} item(s) remain:", items.len());
    for item in &items {
        println!("   - {}", item.title);
    }

    println!("\nDemo complete!");

    Ok(())
}
