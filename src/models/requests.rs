use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::WeekId;
use crate::models::domain::{GameSystem, SignupDetails};

/// Call to Arms signup
///
/// Either `playerId` names an existing player, or `firstName` and `lastName`
/// create (or reuse, case-insensitively) a player profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    pub week: Option<WeekId>,
    #[serde(default)]
    pub system: GameSystem,
    #[serde(alias = "player_id", rename = "playerId")]
    pub player_id: Option<i64>,
    #[validate(length(max = 80))]
    #[serde(alias = "first_name", rename = "firstName")]
    pub first_name: Option<String>,
    #[validate(length(max = 80))]
    #[serde(alias = "last_name", rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub details: SignupDetails,
}

/// `?week=DD/MM/YYYY&system=TOW`, both optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekQuery {
    pub week: Option<WeekId>,
    pub system: Option<GameSystem>,
}

impl WeekQuery {
    /// Fill in the current week and the default system
    pub fn resolve(&self) -> (WeekId, GameSystem) {
        (
            self.week.unwrap_or_else(WeekId::current),
            self.system.unwrap_or_default(),
        )
    }
}

/// Admin unlock
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UnlockRequest {
    #[validate(length(min = 1))]
    pub password: String,
}

/// Bulk delete by id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteIdsRequest {
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<i64>,
}

/// Generate pairings for a week and system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePairingsRequest {
    pub week: Option<WeekId>,
    #[serde(default)]
    pub system: GameSystem,
    #[serde(alias = "allow_rematches", rename = "allowRematches")]
    pub allow_rematches: Option<bool>,
}

/// Fold two BYE pairings into a host pairing as a 3-way game
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MergeThreeWayRequest {
    #[serde(alias = "host_pairing_id", rename = "hostPairingId")]
    pub host_pairing_id: i64,
    #[validate(length(equal = 2))]
    #[serde(alias = "bye_pairing_ids", rename = "byePairingIds")]
    pub bye_pairing_ids: Vec<i64>,
}

/// Publish or unpublish a week and system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub week: Option<WeekId>,
    #[serde(default)]
    pub system: GameSystem,
    pub published: bool,
}

/// History browser filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    pub system: Option<GameSystem>,
    #[serde(alias = "weekContains", rename = "week_contains")]
    pub week_contains: Option<String>,
    #[validate(range(min = 10, max = 1000))]
    pub limit: Option<i64>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: i64 = 200;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT) as usize
    }
}
