// Domain types shared by the scoring engine, the gateways and the cache.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Season attribution
// ---------------------------------------------------------------------------

/// Month/day before which a date still belongs to the previous season.
const SEASON_START: (u32, u32) = (4, 1);

/// The season a date's games are attributed to: the calendar year, unless
/// the date falls before April 1, in which case the prior year.
pub fn season_for(date: NaiveDate) -> i32 {
    let (month, day) = SEASON_START;
    if (date.month(), date.day()) < (month, day) {
        date.year() - 1
    } else {
        date.year()
    }
}

// ---------------------------------------------------------------------------
// Teams and pitchers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

/// Throwing hand of a pitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    /// Parse the one-letter code used by box scores ("L"/"R").
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "L" => Handedness::Left,
            "R" => Handedness::Right,
            _ => Handedness::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
            Handedness::Unknown => "?",
        }
    }
}

/// One probable starter on the day's schedule, as reported by the stats
/// provider before any per-game enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub game_id: u64,
    pub date: NaiveDate,
    pub pitcher_id: u32,
    pub pitcher_name: String,
    pub hand: Handedness,
    pub team: Team,
    pub opponent: Team,
    pub venue_id: u32,
    pub venue_name: String,
}

// ---------------------------------------------------------------------------
// Recent form
// ---------------------------------------------------------------------------

/// A single pitching line from a game log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub date: NaiveDate,
    /// Outs recorded (innings pitched x 3).
    pub outs: u32,
    pub hits: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub earned_runs: u32,
    pub batters_faced: u32,
}

/// Convert box-score innings notation to outs. "6.2" means six innings and
/// two outs, not 6.2 innings.
pub fn innings_to_outs(innings: &str) -> Option<u32> {
    let innings = innings.trim();
    let (whole, partial) = match innings.split_once('.') {
        Some((w, p)) => (w, p),
        None => (innings, "0"),
    };
    let whole: u32 = whole.parse().ok()?;
    let partial: u32 = partial.parse().ok()?;
    if partial > 2 {
        return None;
    }
    whole.checked_mul(3)?.checked_add(partial)
}

/// Pitching performance aggregated over a pitcher's most recent appearances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentForm {
    pub era: f64,
    pub whip: f64,
    /// Strikeouts per batter faced (0..1).
    pub strikeout_rate: f64,
    /// Walks per batter faced (0..1).
    pub walk_rate: f64,
    pub hits_per_nine: f64,
    /// Total innings pitched across the window.
    pub innings_pitched: f64,
}

impl RecentForm {
    /// Aggregate the `window` most recent appearances (by date). Returns
    /// `None` when there are no appearances at all.
    ///
    /// Rates are computed from summed totals rather than averaging per-game
    /// rates, so a short outing does not dominate the window.
    pub fn from_appearances(appearances: &[Appearance], window: usize) -> Option<Self> {
        if appearances.is_empty() || window == 0 {
            return None;
        }

        let mut recent: Vec<&Appearance> = appearances.iter().collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(window);

        // Summed as f64: provider counts are unchecked and a window of u32
        // totals can overflow.
        let total = |f: fn(&Appearance) -> u32| {
            recent.iter().map(|a| f64::from(f(a))).sum::<f64>()
        };
        let outs = total(|a| a.outs);
        let hits = total(|a| a.hits);
        let walks = total(|a| a.walks);
        let strikeouts = total(|a| a.strikeouts);
        let earned_runs = total(|a| a.earned_runs);
        let batters_faced = total(|a| a.batters_faced);

        let innings = outs / 3.0;
        let per_inning = |n: f64| if innings > 0.0 { n / innings } else { 0.0 };
        let per_batter = |n: f64| {
            if batters_faced > 0.0 {
                n / batters_faced
            } else {
                0.0
            }
        };

        Some(Self {
            era: per_inning(earned_runs) * 9.0,
            whip: per_inning(walks + hits),
            strikeout_rate: per_batter(strikeouts),
            walk_rate: per_batter(walks),
            hits_per_nine: per_inning(hits) * 9.0,
            innings_pitched: innings,
        })
    }
}

// ---------------------------------------------------------------------------
// Opponent offense
// ---------------------------------------------------------------------------

/// Season batting line of the opposing lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffenseStats {
    pub batting_average: f64,
    pub on_base_plus_slugging: f64,
    /// Strikeouts per plate appearance.
    pub strikeout_rate: f64,
}

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

/// Outfield wall distances in feet. Any of them may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDimensions {
    pub left_line: Option<f64>,
    pub left_center: Option<f64>,
    pub center: Option<f64>,
    pub right_center: Option<f64>,
    pub right_line: Option<f64>,
}

impl FieldDimensions {
    fn merged_over(self, older: FieldDimensions) -> FieldDimensions {
        FieldDimensions {
            left_line: self.left_line.or(older.left_line),
            left_center: self.left_center.or(older.left_center),
            center: self.center.or(older.center),
            right_center: self.right_center.or(older.right_center),
            right_line: self.right_line.or(older.right_line),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: u32,
    pub name: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// Feet above sea level.
    pub elevation: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub dimensions: Option<FieldDimensions>,
}

impl Venue {
    /// A bare record carrying only what the schedule knows.
    pub fn stub(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// True when the record is missing field dimensions or coordinates and
    /// a detail fetch could enrich it.
    pub fn needs_detail(&self) -> bool {
        self.dimensions.is_none() || self.coordinates().is_none()
    }

    pub fn center_field(&self) -> Option<f64> {
        self.dimensions.as_ref().and_then(|d| d.center)
    }

    /// Combine a freshly fetched record with what was known before. Fields
    /// present on `self` win; fields it lacks fall back to `older`.
    pub fn merged_over(self, older: Venue) -> Venue {
        let dimensions = match (self.dimensions, older.dimensions) {
            (Some(new), Some(old)) => Some(new.merged_over(old)),
            (new, old) => new.or(old),
        };
        Venue {
            id: self.id,
            name: if self.name.is_empty() {
                older.name
            } else {
                self.name
            },
            city: self.city.or(older.city),
            region: self.region.or(older.region),
            country: self.country.or(older.country),
            elevation: self.elevation.or(older.elevation),
            latitude: self.latitude.or(older.latitude),
            longitude: self.longitude.or(older.longitude),
            dimensions,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// One hourly observation/forecast point.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

/// Day-level weather at a venue: each field is the mean of the hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Fahrenheit.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Miles per hour.
    pub wind_speed: f64,
    /// Degrees.
    pub wind_direction: f64,
}

impl WeatherSnapshot {
    pub fn mean_of(samples: &[HourlySample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = |f: fn(&HourlySample) -> f64| samples.iter().map(f).sum::<f64>() / n;
        Some(Self {
            temperature: mean(|s| s.temperature),
            humidity: mean(|s| s.humidity),
            wind_speed: mean(|s| s.wind_speed),
            wind_direction: mean(|s| s.wind_direction),
        })
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// The game context attached to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub date: NaiveDate,
    pub opponent: Team,
    pub venue: Venue,
    pub opponent_offense: Option<OffenseStats>,
    pub weather: Option<WeatherSnapshot>,
}

/// A scheduled starting pitcher plus everything gathered for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    pub hand: Handedness,
    pub team: Team,
    pub recent_form: Option<RecentForm>,
    pub matchup: Option<Matchup>,
}

// ---------------------------------------------------------------------------
// Predictions and history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub detail: String,
    pub weight: f64,
}

/// The day's pick. At most one is authoritative per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub candidate: Candidate,
    pub confidence_score: f64,
    pub insights: Vec<Insight>,
    /// Set when the prediction is the fixed fallback rather than live data.
    pub is_sample: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub score: f64,
    pub pitcher_name: String,
    pub pitcher_id: u32,
}

impl From<&Prediction> for HistoryEntry {
    fn from(prediction: &Prediction) -> Self {
        Self {
            date: prediction.date,
            score: prediction.confidence_score,
            pitcher_name: prediction.candidate.name.clone(),
            pitcher_id: prediction.candidate.id,
        }
    }
}

/// Derived view over the full history. All fields are `None` when the
/// history is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySummary {
    pub best: Option<HistoryEntry>,
    pub worst: Option<HistoryEntry>,
    pub average: Option<f64>,
}

impl HistorySummary {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }
        let best = entries
            .iter()
            .fold(None::<&HistoryEntry>, |acc, e| match acc {
                Some(b) if b.score >= e.score => Some(b),
                _ => Some(e),
            })
            .cloned();
        let worst = entries
            .iter()
            .fold(None::<&HistoryEntry>, |acc, e| match acc {
                Some(w) if w.score <= e.score => Some(w),
                _ => Some(e),
            })
            .cloned();
        let average = entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64;
        Self {
            best,
            worst,
            average: Some(average),
        }
    }
}
