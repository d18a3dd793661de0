//! Populate - builds the movies data file from the raw film locations export
//!
//! Usage: `populate <export.json> <movies.json>`
//!
//! Every address is geocoded unless `GEOCODE_ATTEMPTS` is 0.

use std::env;

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movies_search::error::StoreError;
use movies_search::movies::import::movies_from_export;
use movies_search::movies::Geocoder;
use movies_search::store::{Collection, Query, MOVIES_COLLECTION};
use movies_search::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movies_search=info,populate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <export.json> <movies.json>", args[0]);
    }
    let (export_path, output_path) = (&args[1], &args[2]);

    let raw = tokio::fs::read_to_string(export_path)
        .await
        .with_context(|| format!("failed to read {}", export_path))?;
    let export: Value = serde_json::from_str(&raw).context("export is not valid JSON")?;
    let mut movies = movies_from_export(&export)?;
    info!("Read {} movies from {}", movies.len(), export_path);

    let config = Config::from_env();
    match Geocoder::from_config(&config) {
        Some(geocoder) => {
            info!("Geocoding addresses with {}", config.geocode_endpoint);
            geocoder.locate_movies(&mut movies).await;
        }
        None => info!("Geocoding disabled, locations keep only their address"),
    }

    let collection = Collection::new(MOVIES_COLLECTION).into_shared();
    Query::new(collection.clone()).ensure_indexes().await;

    let mut skipped = 0;
    for movie in movies {
        let document = match serde_json::to_value(&movie)? {
            Value::Object(document) => document,
            _ => continue,
        };

        match Query::new(collection.clone()).insert(vec![document]).await {
            Ok(_) => {}
            Err(StoreError::DuplicateKey { key, .. }) => {
                warn!("Document already inserted: {}", key);
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let collection = collection.read().await;
    collection
        .save(output_path)
        .await
        .with_context(|| format!("failed to write {}", output_path))?;

    info!(
        "Wrote {} movies to {} ({} skipped)",
        collection.len(),
        output_path,
        skipped
    );
    Ok(())
}
