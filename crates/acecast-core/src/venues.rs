// In-memory venue reference store.
//
// Seeded once from a static CSV at startup and enriched opportunistically as
// the stats provider returns fuller venue records. Shared between concurrent
// per-game assembly tasks, so every access goes through a mutex.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use tracing::debug;

use crate::model::{FieldDimensions, Venue};

#[derive(Debug, thiserror::Error)]
pub enum VenueSeedError {
    #[error("failed to read venue seed {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in venue seed {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// One row of the venue seed CSV. Numeric columns may be blank.
#[derive(Debug, Deserialize)]
struct RawVenueRow {
    id: u32,
    name: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    left_line: Option<f64>,
    #[serde(default)]
    left_center: Option<f64>,
    #[serde(default)]
    center: Option<f64>,
    #[serde(default)]
    right_center: Option<f64>,
    #[serde(default)]
    right_line: Option<f64>,
}

impl From<RawVenueRow> for Venue {
    fn from(row: RawVenueRow) -> Self {
        let dims = FieldDimensions {
            left_line: row.left_line,
            left_center: row.left_center,
            center: row.center,
            right_center: row.right_center,
            right_line: row.right_line,
        };
        let dimensions = if dims == FieldDimensions::default() {
            None
        } else {
            Some(dims)
        };
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Venue {
            id: row.id,
            name: row.name,
            city: non_empty(row.city),
            region: non_empty(row.region),
            country: non_empty(row.country),
            elevation: row.elevation,
            latitude: row.latitude,
            longitude: row.longitude,
            dimensions,
        }
    }
}

/// Keyed venue lookup safe for concurrent readers and writers.
#[derive(Debug, Default)]
pub struct VenueStore {
    venues: Mutex<HashMap<u32, Venue>>,
}

impl VenueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(venues: impl IntoIterator<Item = Venue>) -> Self {
        let map = venues.into_iter().map(|v| (v.id, v)).collect();
        Self {
            venues: Mutex::new(map),
        }
    }

    /// Build a store from a venue CSV file.
    pub fn load_csv(path: &Path) -> Result<Self, VenueSeedError> {
        let file = std::fs::File::open(path).map_err(|e| VenueSeedError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let venues = parse_venue_csv(file, &path.display().to_string())?;
        debug!(count = venues.len(), "loaded venue seed");
        Ok(Self::seeded(venues))
    }

    /// Panics if the mutex is poisoned, which only happens if another thread
    /// panicked mid-update.
    fn venues(&self) -> MutexGuard<'_, HashMap<u32, Venue>> {
        self.venues.lock().expect("venue store mutex poisoned")
    }

    pub fn lookup(&self, id: u32) -> Option<Venue> {
        self.venues().get(&id).cloned()
    }

    /// Insert or enrich a venue. Fields present on `venue` replace stored
    /// values; fields it lacks keep whatever was known. Returns the record
    /// now held by the store.
    pub fn upsert(&self, venue: Venue) -> Venue {
        let mut venues = self.venues();
        let merged = match venues.remove(&venue.id) {
            Some(existing) => venue.merged_over(existing),
            None => venue,
        };
        venues.insert(merged.id, merged.clone());
        merged
    }

    /// All venues, ordered by id.
    pub fn all(&self) -> Vec<Venue> {
        let mut all: Vec<Venue> = self.venues().values().cloned().collect();
        all.sort_by_key(|v| v.id);
        all
    }

    pub fn len(&self) -> usize {
        self.venues().len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues().is_empty()
    }
}

/// Parse venue rows from any reader. `path` is only used in error messages.
pub fn parse_venue_csv<R: Read>(reader: R, path: &str) -> Result<Vec<Venue>, VenueSeedError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<RawVenueRow>()
        .map(|row| {
            row.map(Venue::from).map_err(|e| VenueSeedError::Csv {
                path: path.to_string(),
                source: e,
            })
        })
        .collect()
}
