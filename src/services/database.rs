use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Executor, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::{DatabaseSettings, DatabaseTarget};
use crate::models::{
    GameSystem, NewPairing, Pairing, PairingStatus, Player, PublishState, Signup, SignupDetails,
};

/// Errors that can occur when talking to the database
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Database flavour behind the connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
        }
    }

    fn schema(&self) -> &'static [&'static str] {
        match self {
            Backend::Postgres => POSTGRES_SCHEMA,
            Backend::Sqlite => SQLITE_SCHEMA,
        }
    }
}

// Flags are stored as 0/1 integers so both backends decode them the same way.
const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        default_faction TEXT,
        created_at TEXT NOT NULL,
        active BIGINT NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS signups (
        id BIGSERIAL PRIMARY KEY,
        created_at TEXT NOT NULL,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        player_id BIGINT,
        player_name TEXT NOT NULL,
        faction TEXT,
        points BIGINT,
        eta TEXT,
        experience TEXT,
        vibe TEXT,
        standby_ok BIGINT NOT NULL DEFAULT 0,
        tnt_ok BIGINT NOT NULL DEFAULT 0,
        scenario TEXT,
        can_demo BIGINT NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_signups_week_system ON signups (week, system)",
    "CREATE INDEX IF NOT EXISTS ix_signups_player_id ON signups (player_id)",
    r#"
    CREATE TABLE IF NOT EXISTS pairings (
        id BIGSERIAL PRIMARY KEY,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        a_signup_id BIGINT NOT NULL,
        b_signup_id BIGINT,
        status TEXT NOT NULL DEFAULT 'pending',
        table_label TEXT,
        a_faction TEXT,
        b_faction TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_pairings_week_system ON pairings (week, system)",
    r#"
    CREATE TABLE IF NOT EXISTS publish_state (
        id BIGSERIAL PRIMARY KEY,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        published BIGINT NOT NULL DEFAULT 0,
        UNIQUE (week, system)
    )
    "#,
];

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        default_faction TEXT,
        created_at TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS signups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        player_id INTEGER,
        player_name TEXT NOT NULL,
        faction TEXT,
        points INTEGER,
        eta TEXT,
        experience TEXT,
        vibe TEXT,
        standby_ok INTEGER NOT NULL DEFAULT 0,
        tnt_ok INTEGER NOT NULL DEFAULT 0,
        scenario TEXT,
        can_demo INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_signups_week_system ON signups (week, system)",
    "CREATE INDEX IF NOT EXISTS ix_signups_player_id ON signups (player_id)",
    r#"
    CREATE TABLE IF NOT EXISTS pairings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        a_signup_id INTEGER NOT NULL,
        b_signup_id INTEGER,
        status TEXT NOT NULL DEFAULT 'pending',
        table_label TEXT,
        a_faction TEXT,
        b_faction TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_pairings_week_system ON pairings (week, system)",
    r#"
    CREATE TABLE IF NOT EXISTS publish_state (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        week TEXT NOT NULL,
        system TEXT NOT NULL,
        published INTEGER NOT NULL DEFAULT 0,
        UNIQUE (week, system)
    )
    "#,
];

const SIGNUP_COLUMNS: &str = "id, created_at, week, system, player_id, player_name, faction, points, eta, \
     experience, vibe, standby_ok, tnt_ok, scenario, can_demo";

const PAIRING_COLUMNS: &str =
    "id, week, system, a_signup_id, b_signup_id, status, table_label, a_faction, b_faction";

/// Batch size for `IN (...)` lists
const ID_CHUNK: usize = 500;

/// Past game between two named players, for rematch avoidance
#[derive(Debug, Clone)]
pub struct PastGame {
    pub week: String,
    pub a_name: String,
    pub b_name: String,
}

/// Relational store for players, signups, pairings and the publish gate
///
/// Backed by Postgres when a connection string is configured, otherwise by a
/// local SQLite file. Tables are created on connect.
pub struct Database {
    pool: AnyPool,
    backend: Backend,
    sqlite_file: Option<PathBuf>,
}

impl Database {
    /// Connect to the resolved target and make sure the schema exists
    pub async fn connect(target: &DatabaseTarget, settings: &DatabaseSettings) -> Result<Self, DatabaseError> {
        sqlx::any::install_default_drivers();

        let in_memory = target.backend == Backend::Sqlite && target.url.contains(":memory:");
        let mut options = AnyPoolOptions::new()
            .max_connections(settings.max_connections.unwrap_or(10))
            .min_connections(settings.min_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)))
            .test_before_acquire(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        if in_memory {
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        if target.backend == Backend::Sqlite {
            options = options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("PRAGMA journal_mode=WAL;").await?;
                    conn.execute("PRAGMA synchronous=NORMAL;").await?;
                    Ok(())
                })
            });
        }

        let pool = options.connect(&target.url).await?;

        let db = Self {
            pool,
            backend: target.backend,
            sqlite_file: target.sqlite_file.clone(),
        };
        db.ensure_schema().await?;

        tracing::info!(backend = db.backend.as_str(), "Database ready");
        Ok(db)
    }

    /// Private in-memory SQLite database
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let target = DatabaseTarget {
            url: "sqlite::memory:".to_string(),
            backend: Backend::Sqlite,
            sqlite_file: None,
        };
        Self::connect(&target, &DatabaseSettings::default()).await
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Local database file, when running on SQLite
    pub fn sqlite_file(&self) -> Option<&PathBuf> {
        self.sqlite_file.as_ref()
    }

    /// Create missing tables and indexes
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in self.backend.schema() {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("Schema ensured");
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    // ---- players ----

    pub async fn list_players(&self) -> Result<Vec<Player>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, name, default_faction, created_at, active FROM players ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(player_from_row).collect()
    }

    pub async fn get_player(&self, id: i64) -> Result<Option<Player>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, name, default_faction, created_at, active FROM players WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(player_from_row).transpose()
    }

    /// Reuse a player with the same name (case-insensitive) or create one
    ///
    /// Returns the player and whether it was created.
    pub async fn find_or_create_player(&self, name: &str) -> Result<(Player, bool), DatabaseError> {
        let existing = sqlx::query(
            "SELECT id, name, default_faction, created_at, active FROM players \
             WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok((player_from_row(&row)?, false));
        }

        let created_at = now_text();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO players (name, default_faction, created_at, active) \
             VALUES ($1, NULL, $2, 1) RETURNING id",
        )
        .bind(name)
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(player_id = id, name, "Created player");

        Ok((
            Player {
                id,
                name: name.to_string(),
                default_faction: None,
                created_at: parse_timestamp(&created_at)?,
                active: true,
            },
            true,
        ))
    }

    // ---- signups ----

    pub async fn insert_signup(
        &self,
        week: &str,
        system: GameSystem,
        player: &Player,
        details: &SignupDetails,
    ) -> Result<Signup, DatabaseError> {
        let created_at = now_text();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO signups (created_at, week, system, player_id, player_name, faction, points, eta, \
             experience, vibe, standby_ok, tnt_ok, scenario, can_demo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
        )
        .bind(&created_at)
        .bind(week)
        .bind(system.as_str())
        .bind(player.id)
        .bind(&player.name)
        .bind(details.faction.clone())
        .bind(details.points)
        .bind(details.eta.clone())
        .bind(details.experience.clone())
        .bind(details.vibe.clone())
        .bind(flag(details.standby_ok))
        .bind(flag(details.tnt_ok))
        .bind(details.scenario.clone())
        .bind(flag(details.can_demo))
        .fetch_one(&self.pool)
        .await?;

        Ok(Signup {
            id,
            created_at: parse_timestamp(&created_at)?,
            week: week.to_string(),
            system,
            player_id: Some(player.id),
            player_name: player.name.clone(),
            details: details.clone(),
        })
    }

    /// Signups for a week and system, oldest first
    pub async fn list_signups(&self, week: &str, system: GameSystem) -> Result<Vec<Signup>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM signups WHERE week = $1 AND system = $2 ORDER BY created_at, id",
            SIGNUP_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(week)
            .bind(system.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(signup_from_row).collect()
    }

    pub async fn get_signup(&self, id: i64) -> Result<Option<Signup>, DatabaseError> {
        let query = format!("SELECT {} FROM signups WHERE id = $1", SIGNUP_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(signup_from_row).transpose()
    }

    /// Load signups by id; missing ids are simply absent from the map
    pub async fn signups_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Signup>, DatabaseError> {
        let mut out = HashMap::with_capacity(ids.len());
        let mut unique: Vec<i64> = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        for chunk in unique.chunks(ID_CHUNK) {
            let query = format!(
                "SELECT {} FROM signups WHERE id IN ({})",
                SIGNUP_COLUMNS,
                placeholders(chunk.len())
            );
            let mut q = sqlx::query(&query);
            for id in chunk {
                q = q.bind(*id);
            }
            for row in q.fetch_all(&self.pool).await? {
                let signup = signup_from_row(&row)?;
                out.insert(signup.id, signup);
            }
        }
        Ok(out)
    }

    /// Replace the editable fields of a signup
    pub async fn update_signup(&self, id: i64, details: &SignupDetails) -> Result<Signup, DatabaseError> {
        let result = sqlx::query(
            "UPDATE signups SET faction = $1, points = $2, eta = $3, experience = $4, vibe = $5, \
             standby_ok = $6, tnt_ok = $7, scenario = $8, can_demo = $9 WHERE id = $10",
        )
        .bind(details.faction.clone())
        .bind(details.points)
        .bind(details.eta.clone())
        .bind(details.experience.clone())
        .bind(details.vibe.clone())
        .bind(flag(details.standby_ok))
        .bind(flag(details.tnt_ok))
        .bind(details.scenario.clone())
        .bind(flag(details.can_demo))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("signup {}", id)));
        }

        self.get_signup(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("signup {}", id)))
    }

    pub async fn delete_signups(&self, ids: &[i64]) -> Result<u64, DatabaseError> {
        self.delete_by_ids("signups", ids).await
    }

    // ---- pairings ----

    /// Games in `system` with two players, joined to their names
    ///
    /// Pending pairings of `regenerating_week` are left out because they are
    /// about to be replaced.
    pub async fn past_games(
        &self,
        system: GameSystem,
        regenerating_week: &str,
    ) -> Result<Vec<PastGame>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT p.week AS week, sa.player_name AS a_name, sb.player_name AS b_name \
             FROM pairings p \
             JOIN signups sa ON sa.id = p.a_signup_id \
             JOIN signups sb ON sb.id = p.b_signup_id \
             WHERE p.system = $1 AND p.b_signup_id IS NOT NULL \
             AND NOT (p.week = $2 AND p.status = $3)",
        )
        .bind(system.as_str())
        .bind(regenerating_week)
        .bind(PairingStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PastGame, DatabaseError> {
                Ok(PastGame {
                    week: row.try_get("week")?,
                    a_name: row.try_get("a_name")?,
                    b_name: row.try_get("b_name")?,
                })
            })
            .collect()
    }

    /// Delete the week's pending pairings and insert the new ones atomically
    ///
    /// Returns how many pending pairings were removed and the created rows.
    pub async fn replace_pending_pairings(
        &self,
        week: &str,
        system: GameSystem,
        new_pairings: &[NewPairing],
    ) -> Result<(u64, Vec<Pairing>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM pairings WHERE week = $1 AND system = $2 AND status = $3")
            .bind(week)
            .bind(system.as_str())
            .bind(PairingStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut created = Vec::with_capacity(new_pairings.len());
        for pairing in new_pairings {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO pairings (week, system, a_signup_id, b_signup_id, status, a_faction, b_faction) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(week)
            .bind(system.as_str())
            .bind(pairing.a_signup_id)
            .bind(pairing.b_signup_id)
            .bind(PairingStatus::Pending.as_str())
            .bind(pairing.a_faction.clone())
            .bind(pairing.b_faction.clone())
            .fetch_one(&mut *tx)
            .await?;

            created.push(Pairing {
                id,
                week: week.to_string(),
                system,
                a_signup_id: pairing.a_signup_id,
                b_signup_id: pairing.b_signup_id,
                status: PairingStatus::Pending,
                table: None,
                a_faction: pairing.a_faction.clone(),
                b_faction: pairing.b_faction.clone(),
            });
        }

        tx.commit().await?;

        tracing::info!(
            week,
            system = system.as_str(),
            removed,
            created = created.len(),
            "Replaced pending pairings"
        );

        Ok((removed, created))
    }

    pub async fn list_pairings(&self, week: &str, system: GameSystem) -> Result<Vec<Pairing>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM pairings WHERE week = $1 AND system = $2 ORDER BY id",
            PAIRING_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(week)
            .bind(system.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(pairing_from_row).collect()
    }

    pub async fn get_pairing(&self, id: i64) -> Result<Option<Pairing>, DatabaseError> {
        let query = format!("SELECT {} FROM pairings WHERE id = $1", PAIRING_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(pairing_from_row).transpose()
    }

    pub async fn delete_pairings(&self, ids: &[i64]) -> Result<u64, DatabaseError> {
        self.delete_by_ids("pairings", ids).await
    }

    /// Cancel two BYE pairings so their players join `host_id` as a 3-way game
    pub async fn merge_three_way(&self, host_id: i64, bye_ids: [i64; 2]) -> Result<Pairing, DatabaseError> {
        if bye_ids[0] == bye_ids[1] {
            return Err(DatabaseError::InvalidInput("pick two different BYE pairings".to_string()));
        }
        if bye_ids.contains(&host_id) {
            return Err(DatabaseError::InvalidInput("the host cannot also be a BYE".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let query = format!("SELECT {} FROM pairings WHERE id = $1", PAIRING_COLUMNS);

        let host = match sqlx::query(&query).bind(host_id).fetch_optional(&mut *tx).await? {
            Some(row) => pairing_from_row(&row)?,
            None => return Err(DatabaseError::NotFound(format!("pairing {}", host_id))),
        };
        if host.is_bye() {
            return Err(DatabaseError::InvalidInput(
                "pick a host that already has two players".to_string(),
            ));
        }

        for bye_id in bye_ids {
            let bye = match sqlx::query(&query).bind(bye_id).fetch_optional(&mut *tx).await? {
                Some(row) => pairing_from_row(&row)?,
                None => return Err(DatabaseError::NotFound(format!("pairing {}", bye_id))),
            };
            if !bye.is_bye() {
                return Err(DatabaseError::InvalidInput(format!("pairing {} is not a BYE", bye_id)));
            }
            if bye.week != host.week || bye.system != host.system {
                return Err(DatabaseError::InvalidInput(format!(
                    "pairing {} belongs to a different week or system",
                    bye_id
                )));
            }

            sqlx::query("UPDATE pairings SET status = $1 WHERE id = $2")
                .bind(PairingStatus::Cancelled.as_str())
                .bind(bye_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(host_id, ?bye_ids, "Merged BYEs into 3-way");
        Ok(host)
    }

    /// All pairings of a system, newest week first, optionally filtered by a
    /// case-insensitive substring of the week id
    pub async fn history(
        &self,
        system: GameSystem,
        week_contains: Option<&str>,
    ) -> Result<Vec<Pairing>, DatabaseError> {
        let filter = week_contains.map(str::trim).filter(|f| !f.is_empty());

        let rows = match filter {
            Some(filter) => {
                let query = format!(
                    "SELECT {} FROM pairings WHERE system = $1 AND LOWER(week) LIKE $2",
                    PAIRING_COLUMNS
                );
                sqlx::query(&query)
                    .bind(system.as_str())
                    .bind(format!("%{}%", filter.to_lowercase()))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {} FROM pairings WHERE system = $1", PAIRING_COLUMNS);
                sqlx::query(&query)
                    .bind(system.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut pairings = rows.iter().map(pairing_from_row).collect::<Result<Vec<_>, _>>()?;
        // Week ids are DD/MM/YYYY, so order on the parsed date rather than the text.
        pairings.sort_by(|a, b| {
            let wa = a.week.parse::<crate::core::WeekId>().ok();
            let wb = b.week.parse::<crate::core::WeekId>().ok();
            wb.cmp(&wa).then_with(|| b.id.cmp(&a.id))
        });
        Ok(pairings)
    }

    // ---- publish gate ----

    pub async fn publish_state(&self, week: &str, system: GameSystem) -> Result<PublishState, DatabaseError> {
        let published: Option<i64> =
            sqlx::query_scalar("SELECT published FROM publish_state WHERE week = $1 AND system = $2")
                .bind(week)
                .bind(system.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(PublishState {
            week: week.to_string(),
            system,
            published: published.unwrap_or(0) != 0,
        })
    }

    /// Set the public visibility flag in a single upsert
    pub async fn set_published(
        &self,
        week: &str,
        system: GameSystem,
        published: bool,
    ) -> Result<PublishState, DatabaseError> {
        sqlx::query(
            "INSERT INTO publish_state (week, system, published) VALUES ($1, $2, $3) \
             ON CONFLICT (week, system) DO UPDATE SET published = excluded.published",
        )
        .bind(week)
        .bind(system.as_str())
        .bind(flag(published))
        .execute(&self.pool)
        .await?;

        tracing::info!(week, system = system.as_str(), published, "Publish state changed");

        Ok(PublishState {
            week: week.to_string(),
            system,
            published,
        })
    }

    // ---- maintenance ----

    /// Bytes of the local SQLite file with the WAL folded in; `None` on Postgres
    pub async fn sqlite_snapshot(&self) -> Result<Option<Vec<u8>>, DatabaseError> {
        let Some(path) = &self.sqlite_file else {
            return Ok(None);
        };
        sqlx::query("PRAGMA wal_checkpoint(FULL)")
            .execute(&self.pool)
            .await?;
        Ok(Some(tokio::fs::read(path).await?))
    }

    async fn delete_by_ids(&self, table: &'static str, ids: &[i64]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for chunk in ids.chunks(ID_CHUNK) {
            let query = format!("DELETE FROM {} WHERE id IN ({})", table, placeholders(chunk.len()));
            let mut q = sqlx::query(&query);
            for id in chunk {
                q = q.bind(*id);
            }
            deleted += q.execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        tracing::info!(table, requested = ids.len(), deleted, "Deleted rows");
        Ok(deleted)
    }
}

fn flag(value: bool) -> i64 {
    i64::from(value)
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ")
}

fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt(format!("timestamp '{}': {}", raw, e)))
}

fn parse_system(raw: &str) -> Result<GameSystem, DatabaseError> {
    GameSystem::from_str(raw).map_err(DatabaseError::Corrupt)
}

fn player_from_row(row: &AnyRow) -> Result<Player, DatabaseError> {
    let created_at: String = row.try_get("created_at")?;
    let active: i64 = row.try_get("active")?;
    Ok(Player {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        default_faction: row.try_get("default_faction")?,
        created_at: parse_timestamp(&created_at)?,
        active: active != 0,
    })
}

fn signup_from_row(row: &AnyRow) -> Result<Signup, DatabaseError> {
    let created_at: String = row.try_get("created_at")?;
    let system: String = row.try_get("system")?;
    let standby_ok: i64 = row.try_get("standby_ok")?;
    let tnt_ok: i64 = row.try_get("tnt_ok")?;
    let can_demo: i64 = row.try_get("can_demo")?;

    Ok(Signup {
        id: row.try_get("id")?,
        created_at: parse_timestamp(&created_at)?,
        week: row.try_get("week")?,
        system: parse_system(&system)?,
        player_id: row.try_get("player_id")?,
        player_name: row.try_get("player_name")?,
        details: SignupDetails {
            faction: row.try_get("faction")?,
            points: row.try_get("points")?,
            eta: row.try_get("eta")?,
            experience: row.try_get("experience")?,
            vibe: row.try_get("vibe")?,
            standby_ok: standby_ok != 0,
            tnt_ok: tnt_ok != 0,
            scenario: row.try_get("scenario")?,
            can_demo: can_demo != 0,
        },
    })
}

fn pairing_from_row(row: &AnyRow) -> Result<Pairing, DatabaseError> {
    let system: String = row.try_get("system")?;
    let status: String = row.try_get("status")?;
    Ok(Pairing {
        id: row.try_get("id")?,
        week: row.try_get("week")?,
        system: parse_system(&system)?,
        a_signup_id: row.try_get("a_signup_id")?,
        b_signup_id: row.try_get("b_signup_id")?,
        status: PairingStatus::from_str(&status).map_err(DatabaseError::Corrupt)?,
        table: row.try_get("table_label")?,
        a_faction: row.try_get("a_faction")?,
        b_faction: row.try_get("b_faction")?,
    })
}
