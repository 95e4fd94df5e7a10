use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::signup::{full_name, normalise_details, with_defaults};
use crate::core::{public_row, WeekId};
use crate::models::catalog::{self, DEFAULT_ETA, EXPERIENCE_LEVELS, MAX_POINTS, SCENARIOS};
use crate::models::{
    GameSystem, HealthResponse, MetaResponse, PlayersResponse, PublicPairingsResponse,
    SignupRequest, SignupResponse, SystemCatalog, WeekQuery,
};
use crate::routes::{signups_for, ApiError, AppState};

/// Configure the routes anyone can reach
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/meta", web::get().to(meta))
        .route("/players", web::get().to(list_players))
        .route("/signups", web::post().to(submit_signup))
        .route("/pairings", web::get().to(public_pairings));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let db_healthy = state.db.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.db.backend().as_str().to_string(),
        cache: state.cache.stats(),
        timestamp: chrono::Utc::now(),
    })
}

/// Option lists, current week and branding
///
/// GET /api/v1/meta
async fn meta(state: web::Data<AppState>) -> HttpResponse {
    let systems = GameSystem::ALL
        .iter()
        .map(|system| SystemCatalog {
            system: *system,
            factions: system.factions().iter().map(|f| f.to_string()).collect(),
            game_types: system.game_types().iter().map(|t| t.to_string()).collect(),
            default_points: system.default_points(),
            triumph_and_treachery: system.has_tow_options(),
            scenarios: if system.has_tow_options() {
                SCENARIOS.iter().map(|s| s.to_string()).collect()
            } else {
                Vec::new()
            },
        })
        .collect();

    HttpResponse::Ok().json(MetaResponse {
        current_week: WeekId::current().to_string(),
        systems,
        eta_options: catalog::eta_options(),
        default_eta: DEFAULT_ETA.to_string(),
        experience_levels: EXPERIENCE_LEVELS.iter().map(|e| e.to_string()).collect(),
        max_points: MAX_POINTS,
        branding: state.branding.clone(),
    })
}

/// Player directory for the "select your name" list
async fn list_players(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let players = state.cache.players(&state.db).await?;
    Ok(HttpResponse::Ok().json(PlayersResponse {
        players: players.as_ref().clone(),
    }))
}

/// Call to Arms signup
///
/// POST /api/v1/signups
///
/// Request body:
/// ```json
/// {
///   "system": "TOW",
///   "playerId": 3,
///   "faction": "Skaven",
///   "points": 2000,
///   "eta": "18:30",
///   "experience": "Some",
///   "vibe": "Casual",
///   "standbyOk": false,
///   "tntOk": false,
///   "scenario": "Open Battle",
///   "canDemo": false
/// }
/// ```
///
/// New players send `firstName` and `lastName` instead of `playerId`.
async fn submit_signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let week = req.week.unwrap_or_else(WeekId::current);
    let details = normalise_details(req.system, with_defaults(req.system, req.details))
        .map_err(ApiError::Validation)?;

    let player = match req.player_id {
        Some(id) => state
            .db
            .get_player(id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| ApiError::Validation(format!("unknown player {}", id)))?,
        None if req.first_name.is_some() || req.last_name.is_some() => {
            let name = full_name(req.first_name.as_deref(), req.last_name.as_deref())
                .map_err(ApiError::Validation)?;
            let (player, created) = state.db.find_or_create_player(&name).await?;
            if created {
                state.cache.invalidate_players().await;
            }
            player
        }
        None => {
            return Err(ApiError::Validation(
                "select your name from the player list, or give a first and last name".to_string(),
            ))
        }
    };

    let signup = state
        .db
        .insert_signup(&week.to_string(), req.system, &player, &details)
        .await?;

    tracing::info!(
        signup_id = signup.id,
        player = %signup.player_name,
        week = %signup.week,
        system = %signup.system,
        "Signup recorded"
    );

    Ok(HttpResponse::Created().json(SignupResponse {
        signup,
        message: "Thanks! You're on the list.".to_string(),
    }))
}

/// Published pairings for a week and system
///
/// GET /api/v1/pairings?week=DD/MM/YYYY&system=TOW
///
/// Unpublished weeks answer with `published: false` and no rows.
async fn public_pairings(
    state: web::Data<AppState>,
    query: web::Query<WeekQuery>,
) -> Result<HttpResponse, ApiError> {
    let (week, system) = query.resolve();
    let week = week.to_string();

    let gate = state.db.publish_state(&week, system).await?;
    if !gate.published {
        return Ok(HttpResponse::Ok().json(PublicPairingsResponse {
            week,
            system,
            published: false,
            pairings: Vec::new(),
        }));
    }

    let pairings = state.db.list_pairings(&week, system).await?;
    let signups = signups_for(&state.db, &pairings).await?;

    let rows = pairings
        .iter()
        .map(|p| {
            public_row(
                p,
                signups.get(&p.a_signup_id),
                p.b_signup_id.and_then(|id| signups.get(&id)),
            )
        })
        .collect();

    Ok(HttpResponse::Ok().json(PublicPairingsResponse {
        week,
        system,
        published: true,
        pairings: rows,
    }))
}
