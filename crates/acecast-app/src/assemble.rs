// Acquisition orchestrator.
//
// For a date: list the probable starters, then build every candidate
// concurrently. Within one game the pitcher's recent form, the opponent's
// offense and the venue/weather chain run side by side; only the weather
// fetch waits, because it needs the resolved venue's coordinates.
//
// Failure policy per fetch:
//   schedule      -> fatal for the whole pass
//   recent form   -> the candidate is dropped
//   offense       -> field left empty
//   venue detail  -> partial venue kept
//   weather       -> field left empty

use std::sync::Arc;

use acecast_core::gateway::{SourceError, StatsGateway, WeatherGateway};
use acecast_core::model::{
    season_for, Candidate, Matchup, Prediction, ScheduleEntry, Venue, WeatherSnapshot,
};
use acecast_core::scoring;
use acecast_core::venues::VenueStore;
use chrono::NaiveDate;
use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("failed to fetch schedule: {0}")]
    Schedule(#[from] SourceError),

    #[error("no probable starters scheduled for {date}")]
    NoCandidates { date: NaiveDate },

    /// Every scheduled candidate was dropped before scoring.
    #[error("no candidate could be scored for {date}")]
    ScoringFailure { date: NaiveDate },
}

pub struct Assembler {
    stats: Arc<dyn StatsGateway>,
    weather: Arc<dyn WeatherGateway>,
    venues: Arc<VenueStore>,
}

impl Assembler {
    pub fn new(
        stats: Arc<dyn StatsGateway>,
        weather: Arc<dyn WeatherGateway>,
        venues: Arc<VenueStore>,
    ) -> Self {
        Self {
            stats,
            weather,
            venues,
        }
    }

    pub fn venues(&self) -> &Arc<VenueStore> {
        &self.venues
    }

    /// Build and score every candidate for `date`. Weather is only fetched
    /// when `include_weather` is set.
    pub async fn assemble(
        &self,
        date: NaiveDate,
        include_weather: bool,
    ) -> Result<Prediction, AssembleError> {
        let schedule = self.stats.scheduled_candidates(date).await?;
        if schedule.is_empty() {
            return Err(AssembleError::NoCandidates { date });
        }

        let season = season_for(date);
        info!(%date, season, games = schedule.len(), "assembling candidates");

        let built = join_all(
            schedule
                .iter()
                .map(|entry| self.build_candidate(entry, season, include_weather)),
        )
        .await;
        let candidates: Vec<Candidate> = built.into_iter().flatten().collect();
        info!(
            %date,
            scheduled = schedule.len(),
            scored = candidates.len(),
            "candidates assembled"
        );

        scoring::score(&candidates, date).ok_or(AssembleError::ScoringFailure { date })
    }

    /// Gather everything for one probable starter. Returns `None` when the
    /// pitcher's recent form is unavailable.
    async fn build_candidate(
        &self,
        entry: &ScheduleEntry,
        season: i32,
        include_weather: bool,
    ) -> Option<Candidate> {
        let (form, offense, (venue, weather)) = tokio::join!(
            self.stats.recent_form(entry.pitcher_id, season),
            self.stats.offense(entry.opponent.id, season),
            self.venue_and_weather(entry, include_weather),
        );

        let recent_form = match form {
            Ok(form) => form,
            Err(e) => {
                warn!(
                    pitcher_id = entry.pitcher_id,
                    pitcher = %entry.pitcher_name,
                    error = %e,
                    "recent form unavailable; dropping candidate"
                );
                return None;
            }
        };

        let opponent_offense = match offense {
            Ok(offense) => Some(offense),
            Err(e) => {
                warn!(team_id = entry.opponent.id, error = %e, "opponent offense unavailable");
                None
            }
        };

        Some(Candidate {
            id: entry.pitcher_id,
            name: entry.pitcher_name.clone(),
            hand: entry.hand,
            team: entry.team.clone(),
            recent_form: Some(recent_form),
            matchup: Some(Matchup {
                date: entry.date,
                opponent: entry.opponent.clone(),
                venue,
                opponent_offense,
                weather,
            }),
        })
    }

    async fn venue_and_weather(
        &self,
        entry: &ScheduleEntry,
        include_weather: bool,
    ) -> (Venue, Option<WeatherSnapshot>) {
        let venue = self.resolve_venue(entry).await;
        if !include_weather {
            return (venue, None);
        }
        let weather = match self.weather.weather(&venue, entry.date).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                warn!(venue_id = venue.id, error = %e, "weather unavailable");
                None
            }
        };
        (venue, weather)
    }

    /// The best venue record available: the reference store's, enriched
    /// from the provider when it lacks dimensions or coordinates. A failed
    /// enrichment keeps the partial record.
    async fn resolve_venue(&self, entry: &ScheduleEntry) -> Venue {
        let known = self
            .venues
            .lookup(entry.venue_id)
            .unwrap_or_else(|| Venue::stub(entry.venue_id, entry.venue_name.clone()));
        if !known.needs_detail() {
            return known;
        }

        match self.stats.venue_detail(entry.venue_id).await {
            Ok(detail) => {
                debug!(venue_id = entry.venue_id, "venue enriched from provider");
                self.venues.upsert(detail.merged_over(known))
            }
            Err(e) => {
                warn!(venue_id = entry.venue_id, error = %e, "venue detail unavailable");
                known
            }
        }
    }
}
