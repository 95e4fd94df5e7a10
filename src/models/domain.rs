use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::catalog;

/// Game systems the club runs weekly pairings for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSystem {
    #[serde(rename = "TOW")]
    Tow,
    #[serde(rename = "Horus Heresy")]
    HorusHeresy,
}

impl GameSystem {
    pub const ALL: [GameSystem; 2] = [GameSystem::Tow, GameSystem::HorusHeresy];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameSystem::Tow => "TOW",
            GameSystem::HorusHeresy => "Horus Heresy",
        }
    }

    pub fn factions(&self) -> &'static [&'static str] {
        match self {
            GameSystem::Tow => catalog::TOW_FACTIONS,
            GameSystem::HorusHeresy => catalog::HH_FACTIONS,
        }
    }

    pub fn game_types(&self) -> &'static [&'static str] {
        match self {
            GameSystem::Tow => catalog::TOW_GAME_TYPES,
            GameSystem::HorusHeresy => catalog::HH_GAME_TYPES,
        }
    }

    pub fn default_points(&self) -> i64 {
        match self {
            GameSystem::Tow => 2000,
            GameSystem::HorusHeresy => 3000,
        }
    }

    /// Triumph & Treachery and scenario preference only exist for TOW
    pub fn has_tow_options(&self) -> bool {
        matches!(self, GameSystem::Tow)
    }
}

impl Default for GameSystem {
    fn default() -> Self {
        GameSystem::Tow
    }
}

impl fmt::Display for GameSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameSystem::ALL
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown game system '{}'", s))
    }
}

/// Lifecycle of a generated pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    Pending,
    Played,
    Cancelled,
}

impl PairingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingStatus::Pending => "pending",
            PairingStatus::Played => "played",
            PairingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PairingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PairingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PairingStatus::Pending),
            "played" => Ok(PairingStatus::Played),
            "cancelled" => Ok(PairingStatus::Cancelled),
            other => Err(format!("unknown pairing status '{}'", other)),
        }
    }
}

/// Registered club player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    #[serde(rename = "defaultFaction")]
    pub default_faction: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// Preferences a player submits with a Call to Arms signup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupDetails {
    pub faction: Option<String>,
    pub points: Option<i64>,
    pub eta: Option<String>,
    pub experience: Option<String>,
    /// Type of game (Casual, Competitive, Standard, Intro, Either)
    pub vibe: Option<String>,
    #[serde(rename = "standbyOk", default)]
    pub standby_ok: bool,
    #[serde(rename = "tntOk", default)]
    pub tnt_ok: bool,
    pub scenario: Option<String>,
    #[serde(rename = "canDemo", default)]
    pub can_demo: bool,
}

/// One Call to Arms response; the latest per player wins at pairing time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signup {
    pub id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub week: String,
    pub system: GameSystem,
    #[serde(rename = "playerId")]
    pub player_id: Option<i64>,
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(flatten)]
    pub details: SignupDetails,
}

/// Generated pairing; `b_signup_id` is `None` for a BYE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    pub id: i64,
    pub week: String,
    pub system: GameSystem,
    #[serde(rename = "aSignupId")]
    pub a_signup_id: i64,
    #[serde(rename = "bSignupId")]
    pub b_signup_id: Option<i64>,
    pub status: PairingStatus,
    pub table: Option<String>,
    #[serde(rename = "aFaction")]
    pub a_faction: Option<String>,
    #[serde(rename = "bFaction")]
    pub b_faction: Option<String>,
}

impl Pairing {
    pub fn is_bye(&self) -> bool {
        self.b_signup_id.is_none()
    }
}

/// A pairing proposed by the generator, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPairing {
    pub a_signup_id: i64,
    pub b_signup_id: Option<i64>,
    pub a_faction: Option<String>,
    pub b_faction: Option<String>,
}

/// Public visibility gate for a week and system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishState {
    pub week: String,
    pub system: GameSystem,
    pub published: bool,
}
