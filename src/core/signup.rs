use crate::core::scoring::eta_minutes;
use crate::models::catalog::{self, EXPERIENCE_LEVELS, MAX_POINTS, SCENARIOS};
use crate::models::{GameSystem, SignupDetails};

/// Labels clients send for "no faction"
const NO_FACTION: &[&str] = &["", "— None —", "None"];

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn one_of(field: &str, value: Option<String>, allowed: &[&str]) -> Result<Option<String>, String> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => allowed
            .iter()
            .find(|a| a.eq_ignore_ascii_case(&v))
            .map(|a| Some(a.to_string()))
            .ok_or_else(|| format!("{} must be one of: {}", field, allowed.join(", "))),
    }
}

/// Check signup details against the option lists of `system`
///
/// Values are trimmed and canonicalised; TOW-only options are cleared for
/// other systems.
pub fn normalise_details(system: GameSystem, details: SignupDetails) -> Result<SignupDetails, String> {
    let faction = match non_empty(details.faction) {
        Some(f) if NO_FACTION.contains(&f.as_str()) => None,
        other => one_of("faction", other, system.factions())?,
    };

    if let Some(points) = details.points {
        if !(0..=MAX_POINTS).contains(&points) {
            return Err(format!("points must be between 0 and {}", MAX_POINTS));
        }
    }

    let eta = non_empty(details.eta);
    if let Some(eta) = &eta {
        if eta_minutes(Some(eta)).is_none() {
            return Err(format!("eta '{}' must be HH:MM", eta));
        }
    }

    let (tnt_ok, scenario) = if system.has_tow_options() {
        (details.tnt_ok, one_of("scenario", details.scenario, SCENARIOS)?)
    } else {
        (false, None)
    };

    Ok(SignupDetails {
        faction,
        points: details.points,
        eta,
        experience: one_of("experience", details.experience, EXPERIENCE_LEVELS)?,
        vibe: one_of("type of game", details.vibe, system.game_types())?,
        standby_ok: details.standby_ok,
        tnt_ok,
        scenario,
        can_demo: details.can_demo,
    })
}

/// Defaults for fields the client left out of a new signup
pub fn with_defaults(system: GameSystem, mut details: SignupDetails) -> SignupDetails {
    if details.points.is_none() {
        details.points = Some(system.default_points());
    }
    if details.eta.is_none() {
        details.eta = Some(catalog::DEFAULT_ETA.to_string());
    }
    details
}

/// "First Last" from the two form fields, both required
pub fn full_name(first: Option<&str>, last: Option<&str>) -> Result<String, String> {
    let first = first.unwrap_or_default().trim();
    let last = last.unwrap_or_default().trim();
    if first.is_empty() || last.is_empty() {
        return Err("please enter both first and last name".to_string());
    }
    Ok(format!("{} {}", first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> SignupDetails {
        SignupDetails {
            faction: Some("skaven".to_string()),
            points: Some(2000),
            eta: Some("18:30".to_string()),
            experience: Some("veteran".to_string()),
            vibe: Some("Casual".to_string()),
            standby_ok: false,
            tnt_ok: true,
            scenario: Some("Open Battle".to_string()),
            can_demo: true,
        }
    }

    #[test]
    fn test_canonicalises_options() {
        let d = normalise_details(GameSystem::Tow, details()).unwrap();
        assert_eq!(d.faction.as_deref(), Some("Skaven"));
        assert_eq!(d.experience.as_deref(), Some("Veteran"));
        assert!(d.tnt_ok);
    }

    #[test]
    fn test_tow_only_options_cleared_for_heresy() {
        let mut input = details();
        input.faction = Some("XX - Alpha Legion".to_string());
        input.vibe = Some("Standard".to_string());
        let d = normalise_details(GameSystem::HorusHeresy, input).unwrap();
        assert!(!d.tnt_ok);
        assert_eq!(d.scenario, None);
    }

    #[test]
    fn test_rejects_foreign_faction_and_type() {
        let mut input = details();
        input.faction = Some("XX - Alpha Legion".to_string());
        assert!(normalise_details(GameSystem::Tow, input).is_err());

        let mut input = details();
        input.faction = None;
        assert!(normalise_details(GameSystem::HorusHeresy, input).is_err());
    }

    #[test]
    fn test_blank_faction_is_none() {
        let mut input = details();
        input.faction = Some("— None —".to_string());
        assert_eq!(normalise_details(GameSystem::Tow, input).unwrap().faction, None);
    }

    #[test]
    fn test_points_and_eta_bounds() {
        let mut input = details();
        input.points = Some(10_050);
        assert!(normalise_details(GameSystem::Tow, input).is_err());

        let mut input = details();
        input.eta = Some("half six".to_string());
        assert!(normalise_details(GameSystem::Tow, input).is_err());

        for eta in ["18:99", "17:75", "18:-5", "0:1000", "999999999999999999:00"] {
            let mut input = details();
            input.eta = Some(eta.to_string());
            assert!(normalise_details(GameSystem::Tow, input).is_err(), "accepted {}", eta);
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name(Some(" Heinrich "), Some("Kemmler")).unwrap(), "Heinrich Kemmler");
        assert!(full_name(Some("Heinrich"), None).is_err());
    }
}
