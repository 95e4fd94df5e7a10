// HTTP API tests for Call to Arms

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use call_to_arms::config::Settings;
use call_to_arms::routes::{self, AppState};
use call_to_arms::services::Database;
use serde_json::{json, Value};

const PASSWORD: &str = "warhammer";
const WEEK: &str = "15/10/2025";

async fn create_state() -> AppState {
    let mut settings = Settings::default();
    settings.admin.password = PASSWORD.to_string();
    settings.admin.token_secret = Some("test-secret".to_string());
    let db = Database::in_memory().await.unwrap();
    AppState::new(db, &settings)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure_extractors)
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

fn signup_body(first: &str, last: &str, vibe: &str) -> Value {
    json!({
        "week": WEEK,
        "system": "TOW",
        "firstName": first,
        "lastName": last,
        "faction": "Skaven",
        "points": 2000,
        "eta": "18:30",
        "experience": "Some",
        "vibe": vibe,
        "scenario": "Open Battle"
    })
}

#[actix_web::test]
async fn test_health_reports_database() {
    let state = create_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "sqlite");
    assert_eq!(body["cache"]["ttl_secs"], 180);
    assert!(body["cache"]["entries"].is_u64());
}

#[actix_web::test]
async fn test_meta_lists_catalog() {
    let state = create_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/meta").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["systems"].as_array().unwrap().len(), 2);
    assert_eq!(body["systems"][0]["system"], "TOW");
    assert_eq!(body["systems"][0]["defaultPoints"], 2000);
    assert_eq!(body["systems"][1]["scenarios"].as_array().unwrap().len(), 0);
    assert_eq!(body["defaultEta"], "18:30");
}

#[actix_web::test]
async fn test_admin_password_gate() {
    let state = create_state().await;
    let app = init_app!(state);

    // No token
    let req = test::TestRequest::get().uri("/api/v1/admin/signups").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong password
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/session")
        .set_json(json!({ "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_password");

    // Empty password fails validation
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/session")
        .set_json(json!({ "password": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Forged token
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/signups")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct password
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/session")
        .set_json(json!({ "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/signups")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Lock, then the same token is refused
    let req = test::TestRequest::delete()
        .uri("/api/v1/admin/session")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/signups")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_signup_creates_player_once() {
    let state = create_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(signup_body("Karl", "Franz", "Casual"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["signup"]["playerName"], "Karl Franz");
    let player_id = body["signup"]["playerId"].as_i64().unwrap();

    // Same name in different case reuses the player
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(signup_body("karl", "FRANZ", "Competitive"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["signup"]["playerId"].as_i64(), Some(player_id));

    let req = test::TestRequest::get().uri("/api/v1/players").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["players"].as_array().unwrap().len(), 1);

    // Existing player by id, with defaults filled in
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(json!({ "week": WEEK, "system": "Horus Heresy", "playerId": player_id, "vibe": "Standard" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["signup"]["points"], 3000);
    assert_eq!(body["signup"]["eta"], "18:30");
}

#[actix_web::test]
async fn test_signup_validation_errors() {
    let state = create_state().await;
    let app = init_app!(state);

    // Neither a player id nor a name
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(json!({ "week": WEEK, "system": "TOW" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Faction from the wrong system
    let mut body = signup_body("Horus", "Lupercal", "Casual");
    body["faction"] = json!("XVI - Sons of Horus");
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Malformed week id
    let mut body = signup_body("Karl", "Franz", "Casual");
    body["week"] = json!("2025-10-15");
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");

    // Unknown player id
    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(json!({ "week": WEEK, "playerId": 42 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Arrival times with out-of-range parts
    for eta in ["18:99", "999999999999999999:00"] {
        let mut body = signup_body("Karl", "Franz", "Casual");
        body["eta"] = json!(eta);
        let req = test::TestRequest::post()
            .uri("/api/v1/signups")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_failed");
    }
}

#[actix_web::test]
async fn test_signup_generate_publish_flow() {
    let state = create_state().await;
    let app = init_app!(state);

    for (first, last, vibe) in [
        ("Karl", "Franz", "Casual"),
        ("Heinrich", "Kemmler", "Casual"),
        ("Grimgor", "Ironhide", "Competitive"),
        ("Queek", "Headtaker", "Competitive"),
        ("Tyrion", "Ulthuan", "Casual"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/signups")
            .set_json(signup_body(first, last, vibe))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let token = {
        let req = test::TestRequest::post()
            .uri("/api/v1/admin/session")
            .set_json(json!({ "password": PASSWORD }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        body["token"].as_str().unwrap().to_string()
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/pairings/generate")
        .insert_header(bearer(&token))
        .set_json(json!({ "week": WEEK, "system": "TOW" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["created"], 3);
    assert_eq!(body["removedPending"], 0);
    let rows = body["pairings"].as_array().unwrap();
    assert_eq!(rows.iter().filter(|r| r["B"] == "BYE").count(), 1);

    // Not visible until published
    let public_uri = format!("/api/v1/pairings?week={}&system=TOW", WEEK);
    let req = test::TestRequest::get().uri(&public_uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], false);
    assert!(body["pairings"].as_array().unwrap().is_empty());

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/publish")
        .insert_header(bearer(&token))
        .set_json(json!({ "week": WEEK, "system": "TOW", "published": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&public_uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], true);
    let rows = body["pairings"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|r| r["b"].is_null()).count(), 1);
    assert!(rows.iter().all(|r| r["points"] == 2000));

    // Publishing one system leaves the other hidden
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pairings?week={}&system=Horus%20Heresy", WEEK))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], false);

    // Unpublish hides them again
    let req = test::TestRequest::put()
        .uri("/api/v1/admin/publish")
        .insert_header(bearer(&token))
        .set_json(json!({ "week": WEEK, "system": "TOW", "published": false }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri(&public_uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["published"], false);
    assert!(body["pairings"].as_array().unwrap().is_empty());

    // Regenerating replaces the pending rows
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/pairings/generate")
        .insert_header(bearer(&token))
        .set_json(json!({ "week": WEEK, "system": "TOW" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["removedPending"], 3);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/admin/pairings?week={}&system=TOW", WEEK))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pairings"].as_array().unwrap().len(), 3);
    assert_eq!(body["published"], false);
}

#[actix_web::test]
async fn test_merge_and_history_export() {
    let state = create_state().await;
    let app = init_app!(state);

    // Two casual players and one competitive player left on a BYE
    for (first, last, vibe) in [
        ("Karl", "Franz", "Casual"),
        ("Heinrich", "Kemmler", "Casual"),
        ("Grimgor", "Ironhide", "Competitive"),
    ] {
        let body = signup_body(first, last, vibe);
        let req = test::TestRequest::post()
            .uri("/api/v1/signups")
            .set_json(body)
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/session")
        .set_json(json!({ "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/pairings/generate")
        .insert_header(bearer(&token))
        .set_json(json!({ "week": WEEK, "system": "TOW", "allowRematches": false }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rows = body["pairings"].as_array().unwrap();
    let host = rows.iter().find(|r| r["B"] != "BYE").unwrap()["ID"].as_i64().unwrap();
    let bye = rows.iter().find(|r| r["B"] == "BYE").unwrap()["ID"].as_i64().unwrap();

    // The host cannot double as one of the BYEs
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/pairings/merge")
        .insert_header(bearer(&token))
        .set_json(json!({ "hostPairingId": host, "byePairingIds": [bye, host] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/pairings/merge")
        .insert_header(bearer(&token))
        .set_json(json!({ "hostPairingId": host, "byePairingIds": [bye] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/history?system=TOW&week_contains=10/2025")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["rows"][0]["Week"], WEEK);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/history?system=TOW&limit=5")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/history.csv?system=TOW")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let csv = test::read_body(resp).await;
    let csv = std::str::from_utf8(&csv).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("ID,Week,System,A,A Faction"));
    assert_eq!(lines.count(), 2);

    // In-memory databases have no file to download
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/database")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_admin_signup_edit_and_delete() {
    let state = create_state().await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/signups")
        .set_json(signup_body("Karl", "Franz", "Casual"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["signup"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/session")
        .set_json(json!({ "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/signups/{}", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "faction": "Vampire Counts", "points": 2500, "vibe": "competitive", "tntOk": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["faction"], "Vampire Counts");
    assert_eq!(body["vibe"], "Competitive");
    assert_eq!(body["tntOk"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/signups/{}", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "eta": "17:75" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/signups/9999")
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/signups/delete")
        .insert_header(bearer(&token))
        .set_json(json!({ "ids": [id] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["deleted"], 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/signups/delete")
        .insert_header(bearer(&token))
        .set_json(json!({ "ids": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
