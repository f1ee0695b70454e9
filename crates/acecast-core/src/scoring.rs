// Confidence scoring for starting pitchers.
//
// A fixed, hand-tuned linear formula: recent form is the base, and weather,
// venue and opposing offense each add an independent adjustment when that
// data is present. The day's pick is the highest-scoring candidate.

use chrono::NaiveDate;

use crate::model::{
    Candidate, Insight, Matchup, OffenseStats, Prediction, RecentForm, Venue, WeatherSnapshot,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Ideal first-pitch temperature (F) and humidity (%).
const IDEAL_TEMPERATURE: f64 = 68.0;
const IDEAL_HUMIDITY: f64 = 55.0;

/// Elevation (ft) and center-field distance (ft) treated as neutral.
const NEUTRAL_ELEVATION: f64 = 500.0;
const NEUTRAL_CENTER_FIELD: f64 = 400.0;

/// League-average strikeout rate for a lineup.
const BASELINE_LINEUP_K_RATE: f64 = 0.30;

// ---------------------------------------------------------------------------
// Per-term scores
// ---------------------------------------------------------------------------

/// Score contribution from the pitcher's own recent performance.
pub fn form_term(form: &RecentForm) -> f64 {
    let era = (90.0 - form.era * 12.0).max(0.0);
    let whip = (80.0 - form.whip * 40.0).max(0.0);
    let strikeouts = form.strikeout_rate * 120.0;
    let walks = form.walk_rate * 60.0;
    let hits = form.hits_per_nine * 5.0;
    let workload = (form.innings_pitched * 2.5).min(35.0);

    era + whip + strikeouts - walks - hits + workload
}

/// Pitcher-friendly conditions: mild temperature, moderate humidity, calm wind.
pub fn weather_term(weather: &WeatherSnapshot) -> f64 {
    let temperature = (20.0 - (weather.temperature - IDEAL_TEMPERATURE).abs() * 1.2).max(0.0);
    let humidity = (15.0 - (weather.humidity - IDEAL_HUMIDITY).abs() * 0.5).max(0.0);
    let wind = (12.0 - weather.wind_speed * 1.5).max(0.0);
    temperature + humidity + wind
}

/// Thin air hurts pitchers; deep center field helps them. Each half is
/// skipped when the venue does not report it.
pub fn venue_term(venue: &Venue) -> f64 {
    let mut total = 0.0;
    if let Some(elevation) = venue.elevation {
        total += ((NEUTRAL_ELEVATION - elevation) / 100.0).clamp(-10.0, 10.0);
    }
    if let Some(center) = venue.center_field() {
        total += (center - NEUTRAL_CENTER_FIELD) / 10.0;
    }
    total
}

/// Penalty for facing a lineup that hits well; bonus when it strikes out a lot.
pub fn offense_term(offense: &OffenseStats) -> f64 {
    -offense.batting_average * 200.0 - offense.on_base_plus_slugging * 50.0
        + (BASELINE_LINEUP_K_RATE - offense.strikeout_rate) * 120.0
}

fn matchup_term(matchup: &Matchup) -> f64 {
    let mut total = venue_term(&matchup.venue);
    if let Some(weather) = &matchup.weather {
        total += weather_term(weather);
    }
    if let Some(offense) = &matchup.opponent_offense {
        total += offense_term(offense);
    }
    total
}

/// Total confidence score for one candidate, floored at zero.
///
/// A candidate without recent form scores exactly zero: none of the
/// contextual terms are evaluated in that case.
pub fn score_candidate(candidate: &Candidate) -> f64 {
    let Some(form) = &candidate.recent_form else {
        return 0.0;
    };

    let mut total = form_term(form);
    if let Some(matchup) = &candidate.matchup {
        total += matchup_term(matchup);
    }
    total.max(0.0)
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick the highest-scoring candidate and wrap it as the prediction for
/// `date`. Returns `None` only for an empty slate.
///
/// Ties go to the earliest candidate in input order: a later candidate must
/// score strictly higher to replace the current leader.
pub fn score(candidates: &[Candidate], date: NaiveDate) -> Option<Prediction> {
    let mut best: Option<(&Candidate, f64)> = None;
    for candidate in candidates {
        let s = score_candidate(candidate);
        match best {
            Some((_, leader)) if s <= leader => {}
            _ => best = Some((candidate, s)),
        }
    }

    let (winner, confidence_score) = best?;
    Some(Prediction {
        date,
        candidate: winner.clone(),
        confidence_score,
        insights: build_insights(winner, confidence_score),
        is_sample: false,
    })
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

fn insight(title: &str, detail: String, weight: f64) -> Insight {
    Insight {
        title: title.to_string(),
        detail,
        weight,
    }
}

/// Human-readable reasons behind a score, in a fixed order. Items whose data
/// is missing are left out rather than filled with placeholders.
pub fn build_insights(candidate: &Candidate, confidence_score: f64) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(form) = &candidate.recent_form {
        insights.push(insight(
            "Recent form",
            format!(
                "{:.2} ERA and {:.2} WHIP over {:.1} recent innings",
                form.era, form.whip, form.innings_pitched
            ),
            0.3,
        ));
        insights.push(insight(
            "Dominance",
            format!(
                "{:.1}% strikeout rate against a {:.1}% walk rate",
                form.strikeout_rate * 100.0,
                form.walk_rate * 100.0
            ),
            0.2,
        ));
    }

    if let Some(matchup) = &candidate.matchup {
        if let Some(offense) = &matchup.opponent_offense {
            insights.push(insight(
                "Opponent bats",
                format!(
                    "{} hitting {:.3} with a {:.3} OPS and {:.1}% strikeout rate",
                    matchup.opponent.name,
                    offense.batting_average,
                    offense.on_base_plus_slugging,
                    offense.strikeout_rate * 100.0
                ),
                0.15,
            ));
        }

        let venue_detail = match matchup.venue.elevation {
            Some(elevation) => format!("{} ({:.0} ft elevation)", matchup.venue.name, elevation),
            None => matchup.venue.name.clone(),
        };
        insights.push(insight("Venue", venue_detail, 0.15));

        insights.push(insight(
            "Opponent",
            format!("Facing the {}", matchup.opponent.name),
            0.1,
        ));
    }

    insights.push(insight(
        "Confidence",
        format!("Confidence score of {confidence_score:.1}"),
        0.1,
    ));

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDimensions, Handedness, Team};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
    }

    fn ace_form() -> RecentForm {
        RecentForm {
            era: 1.98,
            whip: 0.92,
            strikeout_rate: 0.32,
            walk_rate: 0.06,
            hits_per_nine: 5.1,
            innings_pitched: 21.2,
        }
    }

    fn candidate(id: u32, form: Option<RecentForm>, matchup: Option<Matchup>) -> Candidate {
        Candidate {
            id,
            name: format!("Pitcher {id}"),
            hand: Handedness::Right,
            team: Team {
                id: 100,
                name: "Home Club".into(),
            },
            recent_form: form,
            matchup,
        }
    }

    fn matchup(venue: Venue) -> Matchup {
        Matchup {
            date: date(),
            opponent: Team {
                id: 200,
                name: "Visitors".into(),
            },
            venue,
            opponent_offense: None,
            weather: None,
        }
    }

    fn neutral_venue() -> Venue {
        Venue {
            elevation: Some(500.0),
            dimensions: Some(FieldDimensions {
                center: Some(400.0),
                ..FieldDimensions::default()
            }),
            ..Venue::stub(1, "Neutral Park")
        }
    }

    // ------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------

    #[test]
    fn form_only_score_matches_worked_example() {
        let c = candidate(1, Some(ace_form()), None);
        assert!((score_candidate(&c) - 153.74).abs() < 1e-9);
    }

    #[test]
    fn ideal_weather_scores_forty_seven() {
        let weather = WeatherSnapshot {
            temperature: 68.0,
            humidity: 55.0,
            wind_speed: 0.0,
            wind_direction: 180.0,
        };
        assert_eq!(weather_term(&weather), 47.0);
    }

    #[test]
    fn harsh_weather_terms_floor_at_zero() {
        let weather = WeatherSnapshot {
            temperature: 20.0,
            humidity: 100.0,
            wind_speed: 25.0,
            wind_direction: 0.0,
        };
        assert_eq!(weather_term(&weather), 0.0);
    }

    #[test]
    fn neutral_venue_scores_zero() {
        assert_eq!(venue_term(&neutral_venue()), 0.0);
    }

    #[test]
    fn elevation_term_is_clamped() {
        let mile_high = Venue {
            elevation: Some(5200.0),
            ..Venue::stub(2, "Altitude Park")
        };
        assert_eq!(venue_term(&mile_high), -10.0);

        let below_sea = Venue {
            elevation: Some(-2000.0),
            ..Venue::stub(3, "Sunken Park")
        };
        assert_eq!(venue_term(&below_sea), 10.0);
    }

    #[test]
    fn venue_without_data_scores_zero() {
        assert_eq!(venue_term(&Venue::stub(4, "Unknown")), 0.0);
    }

    #[test]
    fn offense_term_formula() {
        let offense = OffenseStats {
            batting_average: 0.250,
            on_base_plus_slugging: 0.700,
            strikeout_rate: 0.25,
        };
        // -50 - 35 + 6
        assert!((offense_term(&offense) - (-79.0)).abs() < 1e-9);
    }

    // ------------------------------------------------------------------
    // Short-circuit and flooring
    // ------------------------------------------------------------------

    #[test]
    fn missing_recent_form_scores_zero_even_with_great_context() {
        let mut m = matchup(neutral_venue());
        m.weather = Some(WeatherSnapshot {
            temperature: 68.0,
            humidity: 55.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
        });
        let c = candidate(1, None, Some(m));
        assert_eq!(score_candidate(&c), 0.0);
    }

    #[test]
    fn negative_total_floors_at_zero() {
        let awful = RecentForm {
            era: 12.0,
            whip: 3.0,
            strikeout_rate: 0.05,
            walk_rate: 0.25,
            hits_per_nine: 18.0,
            innings_pitched: 3.0,
        };
        let c = candidate(1, Some(awful), None);
        assert_eq!(score_candidate(&c), 0.0);
    }

    #[test]
    fn matchup_terms_add_to_form() {
        let mut m = matchup(Venue {
            elevation: Some(0.0),
            ..Venue::stub(5, "Sea Level Park")
        });
        m.opponent_offense = Some(OffenseStats {
            batting_average: 0.250,
            on_base_plus_slugging: 0.700,
            strikeout_rate: 0.25,
        });
        let c = candidate(1, Some(ace_form()), Some(m));
        // 153.74 + 5 (elevation) - 79 (offense)
        assert!((score_candidate(&c) - 79.74).abs() < 1e-9);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    #[test]
    fn empty_slate_yields_none() {
        assert!(score(&[], date()).is_none());
    }

    #[test]
    fn highest_score_wins() {
        let weaker = RecentForm {
            era: 4.5,
            ..ace_form()
        };
        let candidates = vec![
            candidate(1, Some(weaker), None),
            candidate(2, Some(ace_form()), None),
            candidate(3, None, None),
        ];
        let prediction = score(&candidates, date()).unwrap();
        assert_eq!(prediction.candidate.id, 2);
        assert_eq!(prediction.date, date());
        assert!(!prediction.is_sample);

        let max = candidates
            .iter()
            .map(score_candidate)
            .fold(f64::MIN, f64::max);
        assert_eq!(prediction.confidence_score, max);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let candidates = vec![
            candidate(7, Some(ace_form()), None),
            candidate(8, Some(ace_form()), None),
        ];
        let prediction = score(&candidates, date()).unwrap();
        assert_eq!(prediction.candidate.id, 7);
    }

    #[test]
    fn all_zero_slate_still_produces_a_pick() {
        let candidates = vec![candidate(1, None, None), candidate(2, None, None)];
        let prediction = score(&candidates, date()).unwrap();
        assert_eq!(prediction.candidate.id, 1);
        assert_eq!(prediction.confidence_score, 0.0);
    }

    // ------------------------------------------------------------------
    // Insights
    // ------------------------------------------------------------------

    #[test]
    fn insights_without_matchup() {
        let c = candidate(1, Some(ace_form()), None);
        let insights = build_insights(&c, 153.74);
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Recent form", "Dominance", "Confidence"]);
        assert!(insights[2].detail.contains("153.7"));
    }

    #[test]
    fn insights_full_order_and_weights() {
        let mut m = matchup(Venue {
            elevation: Some(5200.0),
            ..Venue::stub(19, "Coors Field")
        });
        m.opponent_offense = Some(OffenseStats {
            batting_average: 0.262,
            on_base_plus_slugging: 0.745,
            strikeout_rate: 0.21,
        });
        let c = candidate(1, Some(ace_form()), Some(m));
        let insights = build_insights(&c, 120.0);

        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Recent form",
                "Dominance",
                "Opponent bats",
                "Venue",
                "Opponent",
                "Confidence"
            ]
        );
        assert!(insights[3].detail.contains("Coors Field"));
        assert!(insights[3].detail.contains("5200 ft"));

        let total: f64 = insights.iter().map(|i| i.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn venue_insight_without_elevation_is_just_the_name() {
        let c = candidate(1, Some(ace_form()), Some(matchup(Venue::stub(9, "Plain Park"))));
        let insights = build_insights(&c, 50.0);
        let venue = insights.iter().find(|i| i.title == "Venue").unwrap();
        assert_eq!(venue.detail, "Plain Park");
    }
}
