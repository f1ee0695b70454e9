// Boundaries to the external data providers.
//
// Each operation is an independent, fallible fetch. Callers decide which
// failures are fatal; the gateways only report what went wrong.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{OffenseStats, RecentForm, ScheduleEntry, Venue, WeatherSnapshot};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned HTTP {code}")]
    Status { code: u16 },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("no appearances for pitcher {pitcher_id} in {season}")]
    NoAppearances { pitcher_id: u32, season: i32 },

    #[error("venue {venue_id} has no coordinates")]
    MissingCoordinates { venue_id: u32 },

    #[error("no hourly weather samples for {date}")]
    NoHourlySamples { date: NaiveDate },

    #[error("{0} not found")]
    NotFound(String),
}

/// Schedule, player, team and venue data from the stats provider.
#[async_trait]
pub trait StatsGateway: Send + Sync {
    /// Probable starters for every game on `date`.
    async fn scheduled_candidates(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, SourceError>;

    /// Performance over the pitcher's most recent appearances in `season`.
    /// Fails when the pitcher has not appeared yet.
    async fn recent_form(&self, pitcher_id: u32, season: i32) -> Result<RecentForm, SourceError>;

    /// Season batting line for a team.
    async fn offense(&self, team_id: u32, season: i32) -> Result<OffenseStats, SourceError>;

    /// Full venue record including location and field dimensions.
    async fn venue_detail(&self, venue_id: u32) -> Result<Venue, SourceError>;
}

/// Day-level weather at a venue.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Mean conditions over the hourly samples for `date`. Requires the
    /// venue's coordinates.
    async fn weather(&self, venue: &Venue, date: NaiveDate) -> Result<WeatherSnapshot, SourceError>;
}
