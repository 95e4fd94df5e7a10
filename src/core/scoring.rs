use chrono::{NaiveTime, Timelike};

use crate::models::{GameSystem, Signup};

/// Coarse preference tuple `(vibe, experience, points bucket)` used to order
/// and pair candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Preference {
    pub vibe: i64,
    pub experience: i64,
    pub points_bucket: i64,
}

/// Lexicographic pairing distance; smaller is a better match
///
/// The first three components decide the match, the rest only break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PairDistance {
    pub vibe: i64,
    pub experience: i64,
    pub points: i64,
    pub eta: i64,
    pub scenario: i64,
    pub mirror: i64,
}

impl PairDistance {
    pub const WORST: PairDistance = PairDistance {
        vibe: 99,
        experience: 99,
        points: 99,
        eta: 99,
        scenario: 99,
        mirror: 99,
    };

    pub fn is_perfect(&self) -> bool {
        *self == PairDistance::default()
    }
}

impl Default for PairDistance {
    fn default() -> Self {
        Self {
            vibe: 0,
            experience: 0,
            points: 0,
            eta: 0,
            scenario: 0,
            mirror: 0,
        }
    }
}

/// Matching key for a player name: whitespace collapsed, lower-cased
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Build the preference tuple for a signup
pub fn build_preference(signup: &Signup) -> Preference {
    let details = &signup.details;

    let vibe = match details.vibe.as_deref() {
        Some(v) if v.to_lowercase().starts_with("casual") => 0,
        _ => 1,
    };

    let experience_text = details
        .experience
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    let experience = [("new", 0), ("some", 1), ("veteran", 2), ("experienced", 2)]
        .into_iter()
        .find(|(needle, _)| experience_text.contains(needle))
        .map(|(_, weight)| weight)
        .unwrap_or(1);

    let points = details.points.unwrap_or(0) as f64;
    let points_bucket = (points / 250.0).round_ties_even() as i64;

    Preference {
        vibe,
        experience,
        points_bucket,
    }
}

fn lowered_vibe(signup: &Signup) -> String {
    signup
        .details
        .vibe
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Whether the signup asked for an intro game
pub fn is_intro_seeker(signup: &Signup) -> bool {
    signup
        .details
        .vibe
        .as_deref()
        .map(|v| v.to_lowercase() == "intro")
        .unwrap_or(false)
}

/// Vibe distance with "Either" treated as a wildcard
///
/// Intro keeps the raw distance because intro games are matched in their own
/// pass.
pub fn vibe_distance(a: &Signup, b: &Signup, raw: i64) -> i64 {
    let av = lowered_vibe(a);
    let bv = lowered_vibe(b);

    if av == "intro" || bv == "intro" {
        return raw;
    }
    if av == "either" || bv == "either" {
        return 0;
    }
    if av == bv {
        0
    } else {
        1
    }
}

/// Parse an `HH:MM` arrival time into minutes after midnight
pub fn eta_minutes(eta: Option<&str>) -> Option<i64> {
    let time = NaiveTime::parse_from_str(eta?.trim(), "%H:%M").ok()?;
    Some(i64::from(time.hour() * 60 + time.minute()))
}

/// Arrival time proximity: 0 within 15 minutes, 1 within 30, 2 within an hour
/// or unknown, 3 otherwise
pub fn eta_bucket(a: &Signup, b: &Signup) -> i64 {
    match (
        eta_minutes(a.details.eta.as_deref()),
        eta_minutes(b.details.eta.as_deref()),
    ) {
        (Some(am), Some(bm)) => match (am - bm).abs() {
            0..=15 => 0,
            16..=30 => 1,
            31..=60 => 2,
            _ => 3,
        },
        _ => 2,
    }
}

/// TOW scenario mismatch; unknown counts as a mismatch
pub fn scenario_distance(a: &Signup, b: &Signup, system: GameSystem) -> i64 {
    if system != GameSystem::Tow {
        return 0;
    }
    let sa = a.details.scenario.as_deref().unwrap_or_default().trim();
    let sb = b.details.scenario.as_deref().unwrap_or_default().trim();
    if sa.is_empty() || sb.is_empty() || sa != sb {
        1
    } else {
        0
    }
}

/// 1 when both players bring the same faction
pub fn mirror_flag(a: &Signup, b: &Signup) -> i64 {
    let fa = a.details.faction.as_deref().unwrap_or_default().trim().to_lowercase();
    let fb = b.details.faction.as_deref().unwrap_or_default().trim().to_lowercase();
    if !fa.is_empty() && fa == fb {
        1
    } else {
        0
    }
}

/// Raw preference distance, as used by the intro pass
pub fn raw_distance(a: &Preference, b: &Preference) -> PairDistance {
    PairDistance {
        vibe: (a.vibe - b.vibe).abs(),
        experience: (a.experience - b.experience).abs(),
        points: (a.points_bucket - b.points_bucket).abs(),
        ..PairDistance::default()
    }
}

/// Full distance between two open-pool candidates
pub fn pair_distance(
    a: &Signup,
    a_pref: &Preference,
    b: &Signup,
    b_pref: &Preference,
    system: GameSystem,
) -> PairDistance {
    let raw = raw_distance(a_pref, b_pref);
    PairDistance {
        vibe: vibe_distance(a, b, raw.vibe),
        eta: eta_bucket(a, b),
        scenario: scenario_distance(a, b, system),
        mirror: mirror_flag(a, b),
        ..raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignupDetails;
    use chrono::Utc;

    fn signup(vibe: &str, experience: &str, points: i64) -> Signup {
        Signup {
            id: 1,
            created_at: Utc::now(),
            week: "15/10/2025".to_string(),
            system: GameSystem::Tow,
            player_id: None,
            player_name: "Test".to_string(),
            details: SignupDetails {
                vibe: Some(vibe.to_string()),
                experience: Some(experience.to_string()),
                points: Some(points),
                ..SignupDetails::default()
            },
        }
    }

    #[test]
    fn test_preference_tuple() {
        let p = build_preference(&signup("Casual", "Veteran", 2000));
        assert_eq!(p, Preference { vibe: 0, experience: 2, points_bucket: 8 });

        let p = build_preference(&signup("Competitive", "somewhat", 0));
        assert_eq!(p, Preference { vibe: 1, experience: 1, points_bucket: 0 });
    }

    #[test]
    fn test_points_bucket_rounds_half_to_even() {
        assert_eq!(build_preference(&signup("Casual", "New", 625)).points_bucket, 2);
        assert_eq!(build_preference(&signup("Casual", "New", 875)).points_bucket, 4);
    }

    #[test]
    fn test_unknown_experience_defaults_to_middle() {
        assert_eq!(build_preference(&signup("Casual", "", 0)).experience, 1);
    }

    #[test]
    fn test_either_is_wildcard_except_intro() {
        let either = signup("Either", "Some", 2000);
        let casual = signup("Casual", "Some", 2000);
        let intro = signup("Intro", "Some", 2000);

        assert_eq!(vibe_distance(&either, &casual, 1), 0);
        assert_eq!(vibe_distance(&intro, &either, 1), 1);
        assert_eq!(vibe_distance(&casual, &signup("Competitive", "Some", 2000), 1), 1);
    }

    #[test]
    fn test_eta_bucket() {
        let mut a = signup("Casual", "Some", 2000);
        let mut b = signup("Casual", "Some", 2000);
        a.details.eta = Some("18:00".to_string());
        b.details.eta = Some("18:30".to_string());
        assert_eq!(eta_bucket(&a, &b), 1);
        b.details.eta = Some("19:15".to_string());
        assert_eq!(eta_bucket(&a, &b), 3);
        b.details.eta = None;
        assert_eq!(eta_bucket(&a, &b), 2);
    }

    #[test]
    fn test_eta_minutes_rejects_out_of_range_parts() {
        assert_eq!(eta_minutes(Some("18:30")), Some(1110));
        assert_eq!(eta_minutes(Some(" 9:05 ")), Some(545));
        assert_eq!(eta_minutes(Some("18:99")), None);
        assert_eq!(eta_minutes(Some("18:-5")), None);
        assert_eq!(eta_minutes(Some("0:1000")), None);
        assert_eq!(eta_minutes(Some("24:00")), None);
        assert_eq!(eta_minutes(Some("999999999999999999:00")), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Heinrich   Kemmler "), "heinrich kemmler");
    }

    #[test]
    fn test_distance_ordering_is_lexicographic() {
        let near = PairDistance { vibe: 0, experience: 2, points: 9, ..PairDistance::default() };
        let far = PairDistance { vibe: 1, ..PairDistance::default() };
        assert!(near < far);
        assert!(PairDistance::default().is_perfect());
    }
}
