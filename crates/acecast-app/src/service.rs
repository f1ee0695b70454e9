// Top-level prediction policy: serve the day's cached pick when there is one,
// otherwise assemble a fresh one, and fall back to the cache or the sample
// pick when assembly fails. Callers always get a prediction back.

use acecast_core::db::Database;
use acecast_core::model::{HistoryEntry, HistorySummary, Prediction};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::assemble::Assembler;
use crate::sample::sample_prediction;

pub struct PredictionService {
    assembler: Assembler,
    db: Database,
}

impl PredictionService {
    pub fn new(assembler: Assembler, db: Database) -> Self {
        Self { assembler, db }
    }

    /// The prediction for `date`.
    ///
    /// Unless `force_refresh` is set, a cached prediction is returned without
    /// touching the network. A fresh result is persisted before returning.
    /// When assembly fails the cached prediction is used if one exists by
    /// now, otherwise the sample prediction is persisted and returned, so the
    /// date stays settled until the next forced refresh.
    pub async fn fetch_prediction(
        &self,
        date: NaiveDate,
        force_refresh: bool,
        include_weather: bool,
    ) -> Prediction {
        if !force_refresh {
            if let Some(cached) = self.cached_prediction(date) {
                info!(%date, pitcher = %cached.candidate.name, "serving cached prediction");
                return cached;
            }
        }

        match self.assembler.assemble(date, include_weather).await {
            Ok(prediction) => {
                info!(
                    %date,
                    pitcher = %prediction.candidate.name,
                    score = prediction.confidence_score,
                    "fresh prediction assembled"
                );
                self.persist(&prediction, date);
                prediction
            }
            Err(e) => {
                warn!(%date, error = %e, "prediction assembly failed; falling back");
                self.fallback(date)
            }
        }
    }

    fn fallback(&self, date: NaiveDate) -> Prediction {
        if let Some(cached) = self.cached_prediction(date) {
            info!(%date, "falling back to cached prediction");
            return cached;
        }
        info!(%date, "falling back to sample prediction");
        let sample = sample_prediction(date);
        self.persist(&sample, date);
        sample
    }

    fn persist(&self, prediction: &Prediction, date: NaiveDate) {
        if let Err(e) = self.db.put(prediction, date) {
            warn!(%date, error = %e, "failed to persist prediction");
        }
    }

    /// The stored prediction for `date`. Read errors count as a miss.
    pub fn cached_prediction(&self, date: NaiveDate) -> Option<Prediction> {
        match self.db.get(date) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(%date, error = %e, "failed to read cached prediction");
                None
            }
        }
    }

    /// All history entries, most recent first.
    pub fn history_entries(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        self.db.history_entries()
    }

    pub fn history_summary(&self) -> anyhow::Result<HistorySummary> {
        self.db.history_summary()
    }
}
