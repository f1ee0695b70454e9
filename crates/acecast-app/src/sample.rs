// Fixed fallback prediction used when live assembly fails and nothing is
// cached for the date.

use acecast_core::model::{
    Candidate, FieldDimensions, Handedness, Matchup, OffenseStats, Prediction, RecentForm, Team,
    Venue, WeatherSnapshot,
};
use acecast_core::scoring::build_insights;
use chrono::NaiveDate;

/// Confidence attached to the sample pick. Not derived from live data.
pub const SAMPLE_SCORE: f64 = 112.5;

fn sample_candidate(date: NaiveDate) -> Candidate {
    Candidate {
        id: 0,
        name: "Sample Starter".to_string(),
        hand: Handedness::Right,
        team: Team {
            id: 0,
            name: "Sample Club".to_string(),
        },
        recent_form: Some(RecentForm {
            era: 2.45,
            whip: 1.02,
            strikeout_rate: 0.29,
            walk_rate: 0.07,
            hits_per_nine: 6.8,
            innings_pitched: 19.0,
        }),
        matchup: Some(Matchup {
            date,
            opponent: Team {
                id: 0,
                name: "Sample Opponents".to_string(),
            },
            venue: Venue {
                elevation: Some(300.0),
                dimensions: Some(FieldDimensions {
                    center: Some(402.0),
                    ..FieldDimensions::default()
                }),
                ..Venue::stub(0, "Sample Park")
            },
            opponent_offense: Some(OffenseStats {
                batting_average: 0.238,
                on_base_plus_slugging: 0.690,
                strikeout_rate: 0.24,
            }),
            weather: Some(WeatherSnapshot {
                temperature: 72.0,
                humidity: 50.0,
                wind_speed: 6.0,
                wind_direction: 180.0,
            }),
        }),
    }
}

/// The synthetic prediction for `date`, flagged with `is_sample`.
pub fn sample_prediction(date: NaiveDate) -> Prediction {
    let candidate = sample_candidate(date);
    let insights = build_insights(&candidate, SAMPLE_SCORE);
    Prediction {
        date,
        candidate,
        confidence_score: SAMPLE_SCORE,
        insights,
        is_sample: true,
    }
}
