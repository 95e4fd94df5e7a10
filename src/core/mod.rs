// Core algorithm exports
pub mod display;
pub mod matcher;
pub mod scoring;
pub mod signup;
pub mod week;

pub use display::{admin_row, combined_eta, combined_points, public_game_type, public_row};
pub use matcher::{PairingGenerator, PairingOptions, PairingPlan, RecentOpponents};
pub use scoring::{build_preference, normalize_name, PairDistance, Preference};
pub use week::{InvalidWeekId, WeekId};
