// In-process gateway fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use acecast_core::gateway::{SourceError, StatsGateway, WeatherGateway};
use acecast_core::model::{
    FieldDimensions, Handedness, OffenseStats, RecentForm, ScheduleEntry, Team, Venue,
    WeatherSnapshot,
};
use acecast_core::venues::VenueStore;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::assemble::Assembler;

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
}

pub fn entry(pitcher_id: u32, venue_id: u32) -> ScheduleEntry {
    ScheduleEntry {
        game_id: u64::from(pitcher_id) * 10,
        date: date(),
        pitcher_id,
        pitcher_name: format!("Pitcher {pitcher_id}"),
        hand: Handedness::Right,
        team: Team {
            id: 100 + pitcher_id,
            name: format!("Club {pitcher_id}"),
        },
        opponent: Team {
            id: 200 + pitcher_id,
            name: format!("Rivals {pitcher_id}"),
        },
        venue_id,
        venue_name: format!("Park {venue_id}"),
    }
}

pub fn form(era: f64) -> RecentForm {
    RecentForm {
        era,
        whip: 1.0,
        strikeout_rate: 0.28,
        walk_rate: 0.07,
        hits_per_nine: 7.0,
        innings_pitched: 18.0,
    }
}

pub fn offense() -> OffenseStats {
    OffenseStats {
        batting_average: 0.240,
        on_base_plus_slugging: 0.700,
        strikeout_rate: 0.24,
    }
}

pub fn full_venue(id: u32) -> Venue {
    Venue {
        elevation: Some(500.0),
        latitude: Some(40.0),
        longitude: Some(-75.0),
        dimensions: Some(FieldDimensions {
            center: Some(400.0),
            ..FieldDimensions::default()
        }),
        ..Venue::stub(id, format!("Park {id}"))
    }
}

pub fn mild_weather() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: 68.0,
        humidity: 55.0,
        wind_speed: 0.0,
        wind_direction: 90.0,
    }
}

/// Stats provider backed by fixed maps. Missing keys fail the fetch.
#[derive(Default)]
pub struct FakeStats {
    /// `None` makes the schedule fetch itself fail.
    pub schedule: Option<Vec<ScheduleEntry>>,
    pub forms: HashMap<u32, RecentForm>,
    pub offense: HashMap<u32, OffenseStats>,
    pub venues: HashMap<u32, Venue>,
    pub schedule_calls: AtomicUsize,
    pub venue_calls: AtomicUsize,
}

#[async_trait]
impl StatsGateway for FakeStats {
    async fn scheduled_candidates(
        &self,
        _date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, SourceError> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        self.schedule
            .clone()
            .ok_or_else(|| SourceError::Transport("schedule offline".into()))
    }

    async fn recent_form(&self, pitcher_id: u32, season: i32) -> Result<RecentForm, SourceError> {
        self.forms
            .get(&pitcher_id)
            .cloned()
            .ok_or(SourceError::NoAppearances { pitcher_id, season })
    }

    async fn offense(&self, team_id: u32, _season: i32) -> Result<OffenseStats, SourceError> {
        self.offense
            .get(&team_id)
            .cloned()
            .ok_or(SourceError::Status { code: 503 })
    }

    async fn venue_detail(&self, venue_id: u32) -> Result<Venue, SourceError> {
        self.venue_calls.fetch_add(1, Ordering::SeqCst);
        self.venues
            .get(&venue_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("venue {venue_id}")))
    }
}

/// Weather provider returning one fixed snapshot, or failing when unset.
#[derive(Default)]
pub struct FakeWeather {
    pub snapshot: Option<WeatherSnapshot>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl WeatherGateway for FakeWeather {
    async fn weather(
        &self,
        venue: &Venue,
        date: NaiveDate,
    ) -> Result<WeatherSnapshot, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if venue.coordinates().is_none() {
            return Err(SourceError::MissingCoordinates { venue_id: venue.id });
        }
        self.snapshot
            .clone()
            .ok_or(SourceError::NoHourlySamples { date })
    }
}

pub fn assembler(
    stats: Arc<FakeStats>,
    weather: Arc<FakeWeather>,
    venues: Arc<VenueStore>,
) -> Assembler {
    Assembler::new(stats, weather, venues)
}
