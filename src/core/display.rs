use chrono::NaiveTime;

use crate::models::{AdminPairingRow, Pairing, PublicPairingRow, Signup};

/// Placeholder shown publicly in place of a missing opponent
pub const BYE_LABEL: &str = "BYE";

fn parse_eta(eta: Option<&str>) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(eta?.trim(), "%H:%M").ok()
}

/// The later of the two arrival times
pub fn combined_eta(a: Option<&Signup>, b: Option<&Signup>) -> Option<String> {
    let ta = parse_eta(a.and_then(|s| s.details.eta.as_deref()));
    let tb = parse_eta(b.and_then(|s| s.details.eta.as_deref()));
    ta.into_iter()
        .chain(tb)
        .max()
        .map(|t| t.format("%H:%M").to_string())
}

/// The lower of the two army sizes, so both players can build to it
pub fn combined_points(a: Option<&Signup>, b: Option<&Signup>) -> Option<i64> {
    a.and_then(|s| s.details.points)
        .into_iter()
        .chain(b.and_then(|s| s.details.points))
        .min()
}

/// Game type shown for a pairing: Intro dominates, Either defers to the
/// other player's choice
pub fn public_game_type(a: Option<&str>, b: Option<&str>) -> String {
    let av = a.unwrap_or_default().trim();
    let bv = b.unwrap_or_default().trim();
    let (al, bl) = (av.to_lowercase(), bv.to_lowercase());

    if al == "intro" || bl == "intro" {
        return "Intro".to_string();
    }
    if al == "either" && !bv.is_empty() {
        return bv.to_string();
    }
    if bl == "either" && !av.is_empty() {
        return av.to_string();
    }
    if !av.is_empty() {
        av.to_string()
    } else {
        bv.to_string()
    }
}

pub fn public_row(pairing: &Pairing, a: Option<&Signup>, b: Option<&Signup>) -> PublicPairingRow {
    PublicPairingRow {
        a: a.map(|s| s.player_name.clone())
            .unwrap_or_else(|| format!("A#{}", pairing.a_signup_id)),
        faction_a: pairing
            .a_faction
            .clone()
            .or_else(|| a.and_then(|s| s.details.faction.clone())),
        b: b.map(|s| s.player_name.clone()),
        faction_b: b.and_then(|s| pairing.b_faction.clone().or_else(|| s.details.faction.clone())),
        game_type: public_game_type(
            a.and_then(|s| s.details.vibe.as_deref()),
            b.and_then(|s| s.details.vibe.as_deref()),
        ),
        eta: combined_eta(a, b),
        points: combined_points(a, b),
    }
}

pub fn admin_row(pairing: &Pairing, a: Option<&Signup>, b: Option<&Signup>) -> AdminPairingRow {
    let b_label = match (b, pairing.b_signup_id) {
        (Some(s), _) => s.player_name.clone(),
        (None, None) => BYE_LABEL.to_string(),
        (None, Some(id)) => format!("B#{}", id),
    };

    AdminPairingRow {
        id: pairing.id,
        week: pairing.week.clone(),
        system: pairing.system,
        a: a.map(|s| s.player_name.clone())
            .unwrap_or_else(|| format!("A#{}", pairing.a_signup_id)),
        a_faction: pairing
            .a_faction
            .clone()
            .or_else(|| a.and_then(|s| s.details.faction.clone())),
        a_type: a.and_then(|s| s.details.vibe.clone()),
        b: b_label,
        b_faction: b.and_then(|s| pairing.b_faction.clone().or_else(|| s.details.faction.clone())),
        b_type: b.and_then(|s| s.details.vibe.clone()),
        status: pairing.status,
        table: pairing.table.clone(),
        eta: combined_eta(a, b),
        points: combined_points(a, b),
    }
}
