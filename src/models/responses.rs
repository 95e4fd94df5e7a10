use serde::{Deserialize, Serialize};

use crate::models::domain::{GameSystem, PairingStatus, Player, Signup};
use crate::services::CacheStats;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub cache: CacheStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Option lists for one game system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCatalog {
    pub system: GameSystem,
    pub factions: Vec<String>,
    #[serde(rename = "gameTypes")]
    pub game_types: Vec<String>,
    #[serde(rename = "defaultPoints")]
    pub default_points: i64,
    #[serde(rename = "triumphAndTreachery")]
    pub triumph_and_treachery: bool,
    pub scenarios: Vec<String>,
}

/// Links and logos shown around the pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Branding {
    #[serde(rename = "logoUrl")]
    pub logo_url: Option<String>,
    #[serde(rename = "logoWidth")]
    pub logo_width: u32,
    #[serde(rename = "towLogoUrl")]
    pub tow_logo_url: Option<String>,
    #[serde(rename = "hhLogoUrl")]
    pub hh_logo_url: Option<String>,
    #[serde(rename = "headerLogoWidth")]
    pub header_logo_width: u32,
    #[serde(rename = "venueUrl")]
    pub venue_url: Option<String>,
    #[serde(rename = "venueLogoUrl")]
    pub venue_logo_url: Option<String>,
    #[serde(rename = "discordUrl")]
    pub discord_url: Option<String>,
    #[serde(rename = "discordLogoUrl")]
    pub discord_logo_url: Option<String>,
}

/// Everything a client needs to render the signup form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaResponse {
    #[serde(rename = "currentWeek")]
    pub current_week: String,
    pub systems: Vec<SystemCatalog>,
    #[serde(rename = "etaOptions")]
    pub eta_options: Vec<String>,
    #[serde(rename = "defaultEta")]
    pub default_eta: String,
    #[serde(rename = "experienceLevels")]
    pub experience_levels: Vec<String>,
    #[serde(rename = "maxPoints")]
    pub max_points: i64,
    pub branding: Branding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersResponse {
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub signup: Signup,
    pub message: String,
}

/// Row of the public pairings table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPairingRow {
    pub a: String,
    #[serde(rename = "factionA")]
    pub faction_a: Option<String>,
    /// `None` for a BYE / standby slot
    pub b: Option<String>,
    #[serde(rename = "factionB")]
    pub faction_b: Option<String>,
    #[serde(rename = "gameType")]
    pub game_type: String,
    pub eta: Option<String>,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPairingsResponse {
    pub week: String,
    pub system: GameSystem,
    pub published: bool,
    pub pairings: Vec<PublicPairingRow>,
}

/// Row of the admin pairings and history tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPairingRow {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Week")]
    pub week: String,
    #[serde(rename = "System")]
    pub system: GameSystem,
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "A Faction")]
    pub a_faction: Option<String>,
    #[serde(rename = "A Type")]
    pub a_type: Option<String>,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "B Faction")]
    pub b_faction: Option<String>,
    #[serde(rename = "B Type")]
    pub b_type: Option<String>,
    #[serde(rename = "Status")]
    pub status: PairingStatus,
    #[serde(rename = "Table")]
    pub table: Option<String>,
    #[serde(rename = "ETA")]
    pub eta: Option<String>,
    #[serde(rename = "Points")]
    pub points: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPairingsResponse {
    pub week: String,
    pub system: GameSystem,
    pub published: bool,
    pub pairings: Vec<AdminPairingRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupsResponse {
    pub week: String,
    pub system: GameSystem,
    pub signups: Vec<Signup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub week: String,
    pub system: GameSystem,
    pub created: usize,
    #[serde(rename = "removedPending")]
    pub removed_pending: u64,
    pub pairings: Vec<AdminPairingRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResponse {
    #[serde(rename = "hostPairingId")]
    pub host_pairing_id: i64,
    pub cancelled: Vec<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    pub week: String,
    pub system: GameSystem,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub system: GameSystem,
    pub total: usize,
    pub rows: Vec<AdminPairingRow>,
}
