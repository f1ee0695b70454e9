// MLB Stats API client.
//
// Serves the schedule (with probable starters), pitcher game logs, team
// season hitting and venue detail. Raw response shapes are private; the
// `parse_*` functions turn them into domain types and are tested on fixed
// JSON without any network.

use acecast_core::config::Config;
use acecast_core::gateway::{SourceError, StatsGateway};
use acecast_core::model::{
    innings_to_outs, Appearance, FieldDimensions, Handedness, OffenseStats, RecentForm,
    ScheduleEntry, Team, Venue,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::{build_client, endpoint, get_json};

/// Sport id for Major League Baseball.
const MLB_SPORT_ID: &str = "1";

// ---------------------------------------------------------------------------
// Raw response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDate {
    date: NaiveDate,
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleGame {
    game_pk: u64,
    teams: GameTeams,
    venue: IdName,
}

#[derive(Debug, Deserialize)]
struct GameTeams {
    away: GameSide,
    home: GameSide,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameSide {
    team: IdName,
    #[serde(default)]
    probable_pitcher: Option<ProbablePitcher>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbablePitcher {
    id: u32,
    full_name: String,
    #[serde(default)]
    pitch_hand: Option<CodeField>,
}

#[derive(Debug, Deserialize)]
struct CodeField {
    code: String,
}

#[derive(Debug, Clone, Deserialize)]
struct IdName {
    id: u32,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse<S> {
    #[serde(default = "Vec::new")]
    stats: Vec<StatGroup<S>>,
}

#[derive(Debug, Deserialize)]
struct StatGroup<S> {
    #[serde(default = "Vec::new")]
    splits: Vec<Split<S>>,
}

#[derive(Debug, Deserialize)]
struct Split<S> {
    #[serde(default)]
    date: Option<NaiveDate>,
    stat: S,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchingLine {
    innings_pitched: String,
    #[serde(default)]
    hits: u32,
    #[serde(default)]
    base_on_balls: u32,
    #[serde(default)]
    strike_outs: u32,
    #[serde(default)]
    earned_runs: u32,
    #[serde(default)]
    batters_faced: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HittingLine {
    avg: String,
    ops: String,
    #[serde(default)]
    strike_outs: u32,
    #[serde(default)]
    plate_appearances: u32,
}

#[derive(Debug, Deserialize)]
pub struct VenuesResponse {
    #[serde(default)]
    venues: Vec<RawVenue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVenue {
    id: u32,
    name: String,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    field_info: Option<RawFieldInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    city: Option<String>,
    state_abbrev: Option<String>,
    state: Option<String>,
    country: Option<String>,
    elevation: Option<f64>,
    default_coordinates: Option<RawCoordinates>,
}

#[derive(Debug, Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldInfo {
    left_line: Option<f64>,
    left_center: Option<f64>,
    center: Option<f64>,
    right_center: Option<f64>,
    right_line: Option<f64>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One entry per announced probable starter. Sides without a probable
/// pitcher are skipped.
pub fn parse_schedule(response: ScheduleResponse) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for day in response.dates {
        for game in day.games {
            let sides = [
                (&game.teams.away, &game.teams.home),
                (&game.teams.home, &game.teams.away),
            ];
            for (side, other) in sides {
                let Some(pitcher) = &side.probable_pitcher else {
                    continue;
                };
                entries.push(ScheduleEntry {
                    game_id: game.game_pk,
                    date: day.date,
                    pitcher_id: pitcher.id,
                    pitcher_name: pitcher.full_name.clone(),
                    hand: pitcher
                        .pitch_hand
                        .as_ref()
                        .map(|h| Handedness::from_code(&h.code))
                        .unwrap_or(Handedness::Unknown),
                    team: Team {
                        id: side.team.id,
                        name: side.team.name.clone(),
                    },
                    opponent: Team {
                        id: other.team.id,
                        name: other.team.name.clone(),
                    },
                    venue_id: game.venue.id,
                    venue_name: game.venue.name.clone(),
                });
            }
        }
    }
    entries
}

/// Game-log splits as appearances. Lines with unreadable innings or no date
/// are dropped.
pub fn parse_game_log(response: StatsResponse<PitchingLine>) -> Vec<Appearance> {
    response
        .stats
        .into_iter()
        .flat_map(|group| group.splits)
        .filter_map(|split| {
            let date = split.date?;
            let Some(outs) = innings_to_outs(&split.stat.innings_pitched) else {
                warn!(innings = %split.stat.innings_pitched, "unreadable innings in game log");
                return None;
            };
            Some(Appearance {
                date,
                outs,
                hits: split.stat.hits,
                walks: split.stat.base_on_balls,
                strikeouts: split.stat.strike_outs,
                earned_runs: split.stat.earned_runs,
                batters_faced: split.stat.batters_faced,
            })
        })
        .collect()
}

/// The first season hitting split. Rate stats arrive as strings like ".245".
pub fn parse_team_hitting(
    response: StatsResponse<HittingLine>,
) -> Result<OffenseStats, SourceError> {
    let line = response
        .stats
        .into_iter()
        .flat_map(|group| group.splits)
        .next()
        .ok_or_else(|| SourceError::NotFound("team hitting split".into()))?
        .stat;

    let rate = |field: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| SourceError::Decode(format!("invalid {field}: {value:?}")))
    };

    let strikeout_rate = if line.plate_appearances > 0 {
        f64::from(line.strike_outs) / f64::from(line.plate_appearances)
    } else {
        0.0
    };

    Ok(OffenseStats {
        batting_average: rate("avg", &line.avg)?,
        on_base_plus_slugging: rate("ops", &line.ops)?,
        strikeout_rate,
    })
}

pub fn parse_venue(response: VenuesResponse) -> Result<Venue, SourceError> {
    let raw = response
        .venues
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::NotFound("venue".into()))?;

    let mut venue = Venue::stub(raw.id, raw.name);
    if let Some(loc) = raw.location {
        venue.city = loc.city;
        venue.region = loc.state_abbrev.or(loc.state);
        venue.country = loc.country;
        venue.elevation = loc.elevation;
        if let Some(coords) = loc.default_coordinates {
            venue.latitude = Some(coords.latitude);
            venue.longitude = Some(coords.longitude);
        }
    }
    venue.dimensions = raw.field_info.map(|f| FieldDimensions {
        left_line: f.left_line,
        left_center: f.left_center,
        center: f.center,
        right_center: f.right_center,
        right_line: f.right_line,
    });
    Ok(venue)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct MlbStatsClient {
    http: reqwest::Client,
    base_url: String,
    recent_appearances: usize,
}

impl MlbStatsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        recent_appearances: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            recent_appearances,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            build_client(&config.sources)?,
            config.sources.stats_base_url.clone(),
            config.prediction.recent_appearances,
        ))
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl StatsGateway for MlbStatsClient {
    async fn scheduled_candidates(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, SourceError> {
        let response: ScheduleResponse = get_json(
            &self.http,
            &self.url("schedule"),
            &[
                ("sportId", MLB_SPORT_ID.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
                ("hydrate", "probablePitcher".to_string()),
            ],
        )
        .await?;
        let entries = parse_schedule(response);
        debug!(%date, count = entries.len(), "parsed schedule");
        Ok(entries)
    }

    async fn recent_form(&self, pitcher_id: u32, season: i32) -> Result<RecentForm, SourceError> {
        let response: StatsResponse<PitchingLine> = get_json(
            &self.http,
            &self.url(&format!("people/{pitcher_id}/stats")),
            &[
                ("stats", "gameLog".to_string()),
                ("group", "pitching".to_string()),
                ("season", season.to_string()),
            ],
        )
        .await?;
        let appearances = parse_game_log(response);
        RecentForm::from_appearances(&appearances, self.recent_appearances)
            .ok_or(SourceError::NoAppearances { pitcher_id, season })
    }

    async fn offense(&self, team_id: u32, season: i32) -> Result<OffenseStats, SourceError> {
        let response: StatsResponse<HittingLine> = get_json(
            &self.http,
            &self.url(&format!("teams/{team_id}/stats")),
            &[
                ("stats", "season".to_string()),
                ("group", "hitting".to_string()),
                ("season", season.to_string()),
            ],
        )
        .await?;
        parse_team_hitting(response)
    }

    async fn venue_detail(&self, venue_id: u32) -> Result<Venue, SourceError> {
        let response: VenuesResponse = get_json(
            &self.http,
            &self.url(&format!("venues/{venue_id}")),
            &[("hydrate", "location,fieldInfo".to_string())],
        )
        .await?;
        parse_venue(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE_JSON: &str = r#"{
      "dates": [{
        "date": "2025-07-04",
        "games": [{
          "gamePk": 777001,
          "teams": {
            "away": {
              "team": { "id": 147, "name": "New York Yankees" },
              "probablePitcher": { "id": 543037, "fullName": "Gerrit Cole", "pitchHand": { "code": "R" } }
            },
            "home": {
              "team": { "id": 111, "name": "Boston Red Sox" }
            }
          },
          "venue": { "id": 3, "name": "Fenway Park" }
        }, {
          "gamePk": 777002,
          "teams": {
            "away": {
              "team": { "id": 115, "name": "Colorado Rockies" },
              "probablePitcher": { "id": 1001, "fullName": "Lefty Away", "pitchHand": { "code": "L" } }
            },
            "home": {
              "team": { "id": 119, "name": "Los Angeles Dodgers" },
              "probablePitcher": { "id": 1002, "fullName": "Home Starter" }
            }
          },
          "venue": { "id": 22, "name": "Dodger Stadium" }
        }]
      }]
    }"#;

    #[test]
    fn schedule_yields_one_entry_per_probable_starter() {
        let response: ScheduleResponse = serde_json::from_str(SCHEDULE_JSON).unwrap();
        let entries = parse_schedule(response);
        assert_eq!(entries.len(), 3);

        let cole = &entries[0];
        assert_eq!(cole.pitcher_id, 543037);
        assert_eq!(cole.hand, Handedness::Right);
        assert_eq!(cole.team.id, 147);
        assert_eq!(cole.opponent.name, "Boston Red Sox");
        assert_eq!(cole.venue_id, 3);
        assert_eq!(cole.date, NaiveDate::from_ymd_opt(2025, 7, 4).unwrap());

        let home = &entries[2];
        assert_eq!(home.pitcher_name, "Home Starter");
        assert_eq!(home.hand, Handedness::Unknown);
        assert_eq!(home.opponent.id, 115);
    }

    #[test]
    fn empty_schedule_parses() {
        let response: ScheduleResponse = serde_json::from_str(r#"{"dates": []}"#).unwrap();
        assert!(parse_schedule(response).is_empty());
    }

    #[test]
    fn game_log_to_recent_form() {
        let json = r#"{
          "stats": [{
            "splits": [
              { "date": "2025-06-01", "stat": { "inningsPitched": "6.1", "hits": 5, "baseOnBalls": 2, "strikeOuts": 7, "earnedRuns": 2, "battersFaced": 25 } },
              { "date": "2025-06-07", "stat": { "inningsPitched": "7.0", "hits": 3, "baseOnBalls": 1, "strikeOuts": 9, "earnedRuns": 1, "battersFaced": 24 } },
              { "date": "2025-06-13", "stat": { "inningsPitched": "x", "hits": 0 } },
              { "stat": { "inningsPitched": "1.0" } }
            ]
          }]
        }"#;
        let response: StatsResponse<PitchingLine> = serde_json::from_str(json).unwrap();
        let apps = parse_game_log(response);
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].outs, 19);

        let form = RecentForm::from_appearances(&apps, 3).unwrap();
        // 40 outs = 13.1 IP; 3 ER
        assert!((form.era - 3.0 * 9.0 / (40.0 / 3.0)).abs() < 1e-9);
        assert!((form.strikeout_rate - 16.0 / 49.0).abs() < 1e-9);
    }

    #[test]
    fn game_log_drops_out_of_range_innings() {
        let json = r#"{
          "stats": [{
            "splits": [
              { "date": "2025-06-01", "stat": { "inningsPitched": "2000000000.0", "hits": 1 } },
              { "date": "2025-06-07", "stat": { "inningsPitched": "5.2", "hits": 4 } }
            ]
          }]
        }"#;
        let response: StatsResponse<PitchingLine> = serde_json::from_str(json).unwrap();
        let apps = parse_game_log(response);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].outs, 17);
    }

    #[test]
    fn team_hitting_parses_string_rates() {
        let json = r#"{
          "stats": [{ "splits": [{ "stat": { "avg": ".245", "ops": ".712", "strikeOuts": 1320, "plateAppearances": 6000 } }] }]
        }"#;
        let response: StatsResponse<HittingLine> = serde_json::from_str(json).unwrap();
        let offense = parse_team_hitting(response).unwrap();
        assert!((offense.batting_average - 0.245).abs() < 1e-9);
        assert!((offense.on_base_plus_slugging - 0.712).abs() < 1e-9);
        assert!((offense.strikeout_rate - 0.22).abs() < 1e-9);
    }

    #[test]
    fn team_hitting_without_splits_is_not_found() {
        let response: StatsResponse<HittingLine> =
            serde_json::from_str(r#"{"stats": [{"splits": []}]}"#).unwrap();
        assert!(matches!(
            parse_team_hitting(response),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn team_hitting_with_bad_rate_is_decode_error() {
        let json = r#"{"stats": [{"splits": [{"stat": {"avg": "-.--", "ops": ".700"}}]}]}"#;
        let response: StatsResponse<HittingLine> = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_team_hitting(response),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn venue_detail_with_location_and_field_info() {
        let json = r#"{
          "venues": [{
            "id": 19,
            "name": "Coors Field",
            "location": {
              "city": "Denver", "state": "Colorado", "stateAbbrev": "CO", "country": "USA",
              "elevation": 5190,
              "defaultCoordinates": { "latitude": 39.756, "longitude": -104.994 }
            },
            "fieldInfo": { "leftLine": 347, "leftCenter": 390, "center": 415, "rightCenter": 375, "rightLine": 350 }
          }]
        }"#;
        let response: VenuesResponse = serde_json::from_str(json).unwrap();
        let venue = parse_venue(response).unwrap();
        assert_eq!(venue.name, "Coors Field");
        assert_eq!(venue.region.as_deref(), Some("CO"));
        assert_eq!(venue.elevation, Some(5190.0));
        assert_eq!(venue.coordinates(), Some((39.756, -104.994)));
        assert_eq!(venue.center_field(), Some(415.0));
        assert!(!venue.needs_detail());
    }

    #[test]
    fn venue_detail_without_hydration_is_partial() {
        let json = r#"{"venues": [{"id": 5, "name": "Progressive Field"}]}"#;
        let response: VenuesResponse = serde_json::from_str(json).unwrap();
        let venue = parse_venue(response).unwrap();
        assert!(venue.needs_detail());
        assert!(venue.elevation.is_none());
    }
}
