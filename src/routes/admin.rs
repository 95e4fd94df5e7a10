use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};
use validator::Validate;

use crate::core::signup::normalise_details;
use crate::core::{admin_row, PairingGenerator, PairingOptions, RecentOpponents, WeekId};
use crate::models::{
    AdminPairingRow, AdminPairingsResponse, DeleteIdsRequest, DeletedResponse, GenerateResponse,
    GeneratePairingsRequest, HistoryQuery, HistoryResponse, MergeResponse, MergeThreeWayRequest,
    Pairing, PublishRequest, PublishResponse, SessionResponse, SignupDetails, SignupsResponse,
    UnlockRequest, WeekQuery,
};
use crate::routes::{signups_for, ApiError, AppState};
use crate::services::{AdminSession, AuthError, Database};

/// Configure the password-gated admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/session", web::post().to(unlock))
        .route("/admin/session", web::delete().to(lock))
        .route("/admin/signups", web::get().to(list_signups))
        .route("/admin/signups/delete", web::post().to(delete_signups))
        .route("/admin/signups/{id}", web::put().to(update_signup))
        .route("/admin/pairings", web::get().to(list_pairings))
        .route("/admin/pairings/generate", web::post().to(generate_pairings))
        .route("/admin/pairings/delete", web::post().to(delete_pairings))
        .route("/admin/pairings/merge", web::post().to(merge_three_way))
        .route("/admin/publish", web::put().to(set_published))
        .route("/admin/history", web::get().to(history))
        .route("/admin/history.csv", web::get().to(history_csv))
        .route("/admin/database", web::get().to(download_database));
}

/// Admin handlers take an [`AdminSession`] argument; requests without a valid
/// `Authorization: Bearer <token>` header are rejected with 401.
impl FromRequest for AdminSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req))
    }
}

fn session_from_request(req: &HttpRequest) -> Result<AdminSession, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state not configured".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    Ok(state.auth.verify(token)?)
}

/// Unlock admin mode
///
/// POST /api/v1/admin/session
///
/// Request body:
/// ```json
/// { "password": "string" }
/// ```
async fn unlock(
    state: web::Data<AppState>,
    req: web::Json<UnlockRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let session = state.auth.unlock(&req.password)?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// Lock admin mode again
async fn lock(state: web::Data<AppState>, session: AdminSession) -> HttpResponse {
    state.auth.lock(&session).await;
    HttpResponse::NoContent().finish()
}

async fn list_signups(
    state: web::Data<AppState>,
    _session: AdminSession,
    query: web::Query<WeekQuery>,
) -> Result<HttpResponse, ApiError> {
    let (week, system) = query.resolve();
    let week = week.to_string();
    let signups = state.db.list_signups(&week, system).await?;

    Ok(HttpResponse::Ok().json(SignupsResponse {
        week,
        system,
        signups,
    }))
}

/// Replace the editable fields of one signup
///
/// PUT /api/v1/admin/signups/{id}
async fn update_signup(
    state: web::Data<AppState>,
    _session: AdminSession,
    path: web::Path<i64>,
    req: web::Json<SignupDetails>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = state
        .db
        .get_signup(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("signup {} not found", id)))?;

    let details =
        normalise_details(existing.system, req.into_inner()).map_err(ApiError::Validation)?;
    let updated = state.db.update_signup(id, &details).await?;

    tracing::info!(signup_id = id, "Signup edited");
    Ok(HttpResponse::Ok().json(updated))
}

async fn delete_signups(
    state: web::Data<AppState>,
    _session: AdminSession,
    req: web::Json<DeleteIdsRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let deleted = state.db.delete_signups(&req.ids).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { deleted }))
}

/// Generate pairings for a week and system
///
/// POST /api/v1/admin/pairings/generate
///
/// Request body:
/// ```json
/// { "week": "DD/MM/YYYY", "system": "TOW", "allowRematches": true }
/// ```
///
/// Pending pairings for the week and system are replaced; played or
/// cancelled ones are kept.
async fn generate_pairings(
    state: web::Data<AppState>,
    _session: AdminSession,
    req: web::Json<GeneratePairingsRequest>,
) -> Result<HttpResponse, ApiError> {
    let week = req.week.unwrap_or_else(WeekId::current);
    let system = req.system;
    let week_text = week.to_string();
    let allow_rematches = req.allow_rematches.unwrap_or(state.pairing.allow_rematches);

    let signups = state.db.list_signups(&week_text, system).await?;
    let past = state.db.past_games(system, &week_text).await?;
    let recent = RecentOpponents::from_history(
        &week,
        past.iter()
            .map(|g| (g.week.as_str(), g.a_name.as_str(), g.b_name.as_str())),
        state.pairing.recent_weeks,
    );

    let signup_count = signups.len();
    let generator = PairingGenerator::new(PairingOptions { allow_rematches });
    let plan = generator.generate(system, signups, &recent);

    let (removed_pending, created) = state
        .db
        .replace_pending_pairings(&week_text, system, &plan.pairings)
        .await?;

    tracing::info!(
        week = %week_text,
        system = %system,
        signups = signup_count,
        candidates = plan.candidates,
        intro_pairs = plan.intro_pairs,
        byes = plan.byes,
        recent_pairs = recent.len(),
        removed_pending,
        created = created.len(),
        "Generated pairings"
    );

    let pairings = admin_rows(&state.db, &created).await?;
    Ok(HttpResponse::Ok().json(GenerateResponse {
        week: week_text,
        system,
        created: created.len(),
        removed_pending,
        pairings,
    }))
}

async fn list_pairings(
    state: web::Data<AppState>,
    _session: AdminSession,
    query: web::Query<WeekQuery>,
) -> Result<HttpResponse, ApiError> {
    let (week, system) = query.resolve();
    let week = week.to_string();

    let gate = state.db.publish_state(&week, system).await?;
    let pairings = state.db.list_pairings(&week, system).await?;
    let rows = admin_rows(&state.db, &pairings).await?;

    Ok(HttpResponse::Ok().json(AdminPairingsResponse {
        week,
        system,
        published: gate.published,
        pairings: rows,
    }))
}

async fn delete_pairings(
    state: web::Data<AppState>,
    _session: AdminSession,
    req: web::Json<DeleteIdsRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let deleted = state.db.delete_pairings(&req.ids).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { deleted }))
}

/// Fold two BYEs into an existing pairing as a 3-way game
///
/// POST /api/v1/admin/pairings/merge
///
/// Request body:
/// ```json
/// { "hostPairingId": 12, "byePairingIds": [14, 15] }
/// ```
async fn merge_three_way(
    state: web::Data<AppState>,
    _session: AdminSession,
    req: web::Json<MergeThreeWayRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let byes = [req.bye_pairing_ids[0], req.bye_pairing_ids[1]];
    let host = state.db.merge_three_way(req.host_pairing_id, byes).await?;

    Ok(HttpResponse::Ok().json(MergeResponse {
        host_pairing_id: host.id,
        cancelled: byes.to_vec(),
        message: "Merged. Please coordinate the 3-way game among the three players.".to_string(),
    }))
}

/// Publish or unpublish a week and system
///
/// PUT /api/v1/admin/publish
async fn set_published(
    state: web::Data<AppState>,
    _session: AdminSession,
    req: web::Json<PublishRequest>,
) -> Result<HttpResponse, ApiError> {
    let week = req.week.unwrap_or_else(WeekId::current).to_string();
    let gate = state.db.set_published(&week, req.system, req.published).await?;

    Ok(HttpResponse::Ok().json(PublishResponse {
        week: gate.week,
        system: gate.system,
        published: gate.published,
    }))
}

/// Browse all past pairings of a system, newest week first
///
/// GET /api/v1/admin/history?system=TOW&week_contains=2025&limit=200
async fn history(
    state: web::Data<AppState>,
    _session: AdminSession,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let system = query.system.unwrap_or_default();
    let (total, rows) = history_rows(&state.db, &query).await?;

    Ok(HttpResponse::Ok().json(HistoryResponse { system, total, rows }))
}

/// The same rows as [`history`] as a CSV download
async fn history_csv(
    state: web::Data<AppState>,
    _session: AdminSession,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let (_, rows) = history_rows(&state.db, &query).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &rows {
        writer.serialize(row)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"pairings_history.csv\"",
        ))
        .body(body))
}

/// Download the SQLite database file
///
/// Only available when the service runs on the local SQLite file.
async fn download_database(
    state: web::Data<AppState>,
    _session: AdminSession,
) -> Result<HttpResponse, ApiError> {
    let bytes = state.db.sqlite_snapshot().await?.ok_or_else(|| {
        ApiError::NotFound("database download is only available for a local SQLite file".to_string())
    })?;

    let filename = state
        .db
        .sqlite_file()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("pairings_db.sqlite")
        .to_string();

    tracing::info!(bytes = bytes.len(), "Database downloaded");
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

async fn admin_rows(db: &Database, pairings: &[Pairing]) -> Result<Vec<AdminPairingRow>, ApiError> {
    let signups = signups_for(db, pairings).await?;
    Ok(pairings
        .iter()
        .map(|p| {
            admin_row(
                p,
                signups.get(&p.a_signup_id),
                p.b_signup_id.and_then(|id| signups.get(&id)),
            )
        })
        .collect())
}

async fn history_rows(
    db: &Database,
    query: &HistoryQuery,
) -> Result<(usize, Vec<AdminPairingRow>), ApiError> {
    let system = query.system.unwrap_or_default();
    let mut pairings = db.history(system, query.week_contains.as_deref()).await?;
    let total = pairings.len();
    pairings.truncate(query.limit());
    Ok((total, admin_rows(db, &pairings).await?))
}
