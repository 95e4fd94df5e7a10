//! Call to Arms - weekly game pairings for a tabletop wargaming club
//!
//! Players sign up for the coming club night, an admin generates pairings
//! that balance game type, experience and army size while avoiding recent
//! rematches, and the pairings are published once they are final.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{PairingGenerator, PairingOptions, PairingPlan, RecentOpponents, WeekId};
pub use models::{GameSystem, Pairing, Signup, SignupDetails};
pub use routes::{configure_extractors, configure_routes, AppState};
pub use services::Database;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let week: WeekId = "15/01/2025".parse().unwrap();
        assert_eq!(week.to_string(), "15/01/2025");
        assert!(PairingGenerator::default().options().allow_rematches);
    }
}
