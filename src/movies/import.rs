//! Movies Import
//!
//! Turns the raw San Francisco film locations export into movie documents.
//!
//! The export is a JSON object whose `data` member holds one array per filming
//! location. Rows are grouped by title, so every movie appears once with all
//! of its addresses.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::movies::{Location, Movie};

// == Row Columns ==
const TITLE: usize = 8;
const RELEASE_YEAR: usize = 9;
const ADDRESS: usize = 10;
const FUN_FACTS: usize = 11;
const PRODUCTION_COMPANY: usize = 12;
const DISTRIBUTOR: usize = 13;
const DIRECTOR: usize = 14;
const WRITER: usize = 15;
const ACTORS: std::ops::Range<usize> = 16..19;

// == Movies From Export ==
/// Builds one movie per distinct title, in order of first appearance.
pub fn movies_from_export(export: &Value) -> Result<Vec<Movie>> {
    let rows = export
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::InvalidRequest("export has no 'data' array".to_string()))?;

    let mut movies: Vec<Movie> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let Some(row) = row.as_array() else {
            warn!("Skipping row {}: not an array", index);
            continue;
        };
        let Some(title) = text(row, TITLE) else {
            warn!("Skipping row {}: no title", index);
            continue;
        };
        let location = text(row, ADDRESS).map(Location::from_address);

        match positions.get(&title) {
            Some(&position) => {
                if let Some(location) = location {
                    movies[position].locations.push(location);
                }
            }
            None => {
                positions.insert(title.clone(), movies.len());
                movies.push(Movie {
                    title,
                    release_year: year(row.get(RELEASE_YEAR)),
                    locations: location.into_iter().collect(),
                    fun_facts: text(row, FUN_FACTS),
                    production_company: text(row, PRODUCTION_COMPANY),
                    distributor: text(row, DISTRIBUTOR),
                    director: text(row, DIRECTOR),
                    writer: text(row, WRITER),
                    actors: ACTORS.filter_map(|column| text(row, column)).collect(),
                    ..Movie::default()
                });
            }
        }
    }

    Ok(movies)
}

/// Non-empty trimmed string at `column`.
fn text(row: &[Value], column: usize) -> Option<String> {
    row.get(column)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Release year given either as a number or as a numeric string.
fn year(value: Option<&Value>) -> Option<u16> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
