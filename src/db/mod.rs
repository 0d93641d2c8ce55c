use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Local wall-clock time in the stored `YYYY-MM-DDTHH:MM` form
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string()
}

/// Shared SQLite handle (single connection behind a mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Outcome of deleting a team; carries the logo path so the caller can
/// remove the file.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedTeam {
    pub logo: Option<String>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;

        // Columns added after the first release of the teams table
        for column in ["color", "logo"] {
            let present: bool = conn
                .prepare("SELECT 1 FROM pragma_table_info('teams') WHERE name = ?1")?
                .exists(params![column])?;
            if !present {
                conn.execute_batch(&format!("ALTER TABLE teams ADD COLUMN {column} TEXT"))?;
            }
        }
        Ok(())
    }

    // ── Games (individual / tournament) ──────────────────────────────────────

    /// All games of a ledger, newest first
    pub fn list_games(&self, kind: GameKind) -> Result<Vec<GameRecord>> {
        self.query_games(&format!("SELECT {GAME_COLUMNS} FROM {} ORDER BY id DESC", kind.table()))
    }

    /// All games of a ledger, oldest first
    pub fn list_games_ascending(&self, kind: GameKind) -> Result<Vec<GameRecord>> {
        self.query_games(&format!("SELECT {GAME_COLUMNS} FROM {} ORDER BY id ASC", kind.table()))
    }

    fn query_games(&self, sql: &str) -> Result<Vec<GameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let games = stmt
            .query_map([], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    pub fn insert_game(&self, kind: GameKind, game: &NewGame) -> Result<i64> {
        let conn = self.lock()?;
        insert_game_row(&conn, kind.table(), None, game)?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many games in one transaction, returning the number inserted
    pub fn insert_games(&self, kind: GameKind, games: &[NewGame]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for game in games {
            insert_game_row(&tx, kind.table(), None, game)?;
        }
        tx.commit()?;
        Ok(games.len())
    }

    /// Delete one game; `false` when no such id exists
    pub fn delete_game(&self, kind: GameKind, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id],
        )?;
        Ok(deleted > 0)
    }

    /// Remove every game of a ledger and restart its ids at 1
    pub fn reset_games(&self, kind: GameKind) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(&format!("DELETE FROM {}", kind.table()), [])?;
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name = ?1",
            params![kind.table()],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    // ── Badges ───────────────────────────────────────────────────────────────

    pub fn list_badges(&self) -> Result<Vec<Badge>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, code, name, grade, COALESCE(description, '')
             FROM badges ORDER BY code ASC",
        )?;
        let badges = stmt
            .query_map([], map_badge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(badges)
    }

    /// Insert a badge; `None` when the code is already taken
    pub fn insert_badge(&self, badge: &NewBadge) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO badges (code, name, grade, description) VALUES (?1, ?2, ?3, ?4)",
            params![badge.code, badge.name, badge.grade, badge.description],
        );
        match inserted {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a badge and every grant of it; `false` when no such id exists
    pub fn delete_badge(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let code: Option<i64> = tx
            .query_row("SELECT code FROM badges WHERE id = ?1", params![id], |r| r.get(0))
            .optional()?;
        let Some(code) = code else {
            return Ok(false);
        };
        tx.execute("DELETE FROM player_badges WHERE badge_code = ?1", params![code])?;
        let deleted = tx.execute("DELETE FROM badges WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Insert or update badges keyed by code; returns (inserted, updated)
    pub fn upsert_badges(&self, badges: &[NewBadge]) -> Result<(usize, usize)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let (mut inserted, mut updated) = (0, 0);
        for badge in badges {
            let exists = tx
                .prepare_cached("SELECT 1 FROM badges WHERE code = ?1")?
                .exists(params![badge.code])?;
            if exists {
                tx.execute(
                    "UPDATE badges SET name = ?1, grade = ?2, description = ?3 WHERE code = ?4",
                    params![badge.name, badge.grade, badge.description, badge.code],
                )?;
                updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO badges (code, name, grade, description) VALUES (?1, ?2, ?3, ?4)",
                    params![badge.code, badge.name, badge.grade, badge.description],
                )?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok((inserted, updated))
    }

    // ── Player badges ────────────────────────────────────────────────────────

    /// Every grant, newest first
    pub fn list_player_badges(&self) -> Result<Vec<PlayerBadge>> {
        self.query_player_badges(
            &format!("{PLAYER_BADGE_SELECT} ORDER BY pb.id DESC"),
            params![],
        )
    }

    /// Grants of one player in the order they were given
    pub fn list_player_badges_for(&self, player_name: &str) -> Result<Vec<PlayerBadge>> {
        self.query_player_badges(
            &format!(
                "{PLAYER_BADGE_SELECT} WHERE pb.player_name = ?1 ORDER BY pb.granted_at ASC, pb.id ASC"
            ),
            params![player_name],
        )
    }

    /// Every grant, oldest first (export order)
    pub fn list_player_badges_ascending(&self) -> Result<Vec<PlayerBadge>> {
        self.query_player_badges(&format!("{PLAYER_BADGE_SELECT} ORDER BY pb.id ASC"), params![])
    }

    fn query_player_badges(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<PlayerBadge>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let grants = stmt
            .query_map(args, map_player_badge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(grants)
    }

    /// Grant a badge; `None` when the badge code is unknown
    pub fn grant_badge(&self, grant: &NewPlayerBadge) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let known = conn
            .prepare("SELECT 1 FROM badges WHERE code = ?1")?
            .exists(params![grant.badge_code])?;
        if !known {
            return Ok(None);
        }
        conn.execute(
            "INSERT INTO player_badges (player_name, badge_code, granted_at) VALUES (?1, ?2, ?3)",
            params![grant.player_name, grant.badge_code, grant.granted_at],
        )?;
        Ok(Some(conn.last_insert_rowid()))
    }

    pub fn revoke_badge(&self, grant_id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM player_badges WHERE id = ?1", params![grant_id])?;
        Ok(deleted > 0)
    }

    /// Bulk grant, skipping rows identical to an existing grant;
    /// returns (inserted, skipped)
    pub fn import_player_badges(&self, grants: &[NewPlayerBadge]) -> Result<(usize, usize)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let (mut inserted, mut skipped) = (0, 0);
        for grant in grants {
            let duplicate = tx
                .prepare_cached(
                    "SELECT 1 FROM player_badges
                     WHERE player_name = ?1 AND badge_code = ?2 AND granted_at = ?3 LIMIT 1",
                )?
                .exists(params![grant.player_name, grant.badge_code, grant.granted_at])?;
            if duplicate {
                skipped += 1;
                continue;
            }
            tx.execute(
                "INSERT INTO player_badges (player_name, badge_code, granted_at) VALUES (?1, ?2, ?3)",
                params![grant.player_name, grant.badge_code, grant.granted_at],
            )?;
            inserted += 1;
        }
        tx.commit()?;
        Ok((inserted, skipped))
    }

    // ── Archives ─────────────────────────────────────────────────────────────

    pub fn list_archives(&self) -> Result<Vec<Archive>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT a.id, a.name, a.created_at, COUNT(ag.id)
             FROM archives a
             LEFT JOIN archive_games ag ON ag.archive_id = a.id
             GROUP BY a.id, a.name, a.created_at
             ORDER BY a.id DESC",
        )?;
        let archives = stmt
            .query_map([], |row| {
                Ok(Archive {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    game_count: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(archives)
    }

    pub fn archive_games(&self, archive_id: i64) -> Result<Vec<GameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM archive_games WHERE archive_id = ?1 ORDER BY id ASC"
        ))?;
        let games = stmt
            .query_map(params![archive_id], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    /// Create an archive holding the given games. Nothing is written and
    /// `None` is returned when `games` is empty.
    pub fn create_archive(
        &self,
        name: &str,
        created_at: &str,
        games: &[NewGame],
    ) -> Result<Option<i64>> {
        if games.is_empty() {
            return Ok(None);
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO archives (name, created_at) VALUES (?1, ?2)",
            params![name, created_at],
        )?;
        let archive_id = tx.last_insert_rowid();
        for game in games {
            insert_game_row(&tx, "archive_games", Some(archive_id), game)?;
        }
        tx.commit()?;
        Ok(Some(archive_id))
    }

    pub fn delete_archive(&self, archive_id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM archive_games WHERE archive_id = ?1", params![archive_id])?;
        let deleted = tx.execute("DELETE FROM archives WHERE id = ?1", params![archive_id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    // ── Teams ────────────────────────────────────────────────────────────────

    /// Teams by name, each with its members
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, color, logo, created_at FROM teams ORDER BY name ASC")?;
        let mut teams = stmt
            .query_map([], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    logo: row.get(3)?,
                    created_at: row.get(4)?,
                    members: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut members = conn.prepare(
            "SELECT id, player_name, joined_at FROM team_members WHERE team_id = ?1 ORDER BY id ASC",
        )?;
        for team in &mut teams {
            team.members = members
                .query_map(params![team.id], |row| {
                    Ok(TeamMember {
                        id: row.get(0)?,
                        player_name: row.get(1)?,
                        joined_at: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }
        Ok(teams)
    }

    /// Create a team; `None` when the name is already taken
    pub fn insert_team(&self, name: &str, color: &str, created_at: &str) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO teams (name, color, created_at) VALUES (?1, ?2, ?3)",
            params![name, color, created_at],
        );
        match inserted {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_team_color(&self, team_id: i64, color: &str) -> Result<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE teams SET color = ?1 WHERE id = ?2",
            params![color, team_id],
        )?;
        Ok(updated > 0)
    }

    pub fn set_team_logo(&self, team_id: i64, logo: &str) -> Result<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE teams SET logo = ?1 WHERE id = ?2",
            params![logo, team_id],
        )?;
        Ok(updated > 0)
    }

    /// Delete a team and its memberships. Team games keep their rows; the
    /// seats simply lose their team name.
    pub fn delete_team(&self, team_id: i64) -> Result<Option<DeletedTeam>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let logo: Option<Option<String>> = tx
            .query_row("SELECT logo FROM teams WHERE id = ?1", params![team_id], |r| r.get(0))
            .optional()?;
        let Some(logo) = logo else {
            return Ok(None);
        };
        tx.execute("DELETE FROM team_members WHERE team_id = ?1", params![team_id])?;
        tx.execute("DELETE FROM teams WHERE id = ?1", params![team_id])?;
        tx.commit()?;
        Ok(Some(DeletedTeam { logo }))
    }

    /// Add a member; `None` when the player already belongs to the team
    pub fn add_team_member(
        &self,
        team_id: i64,
        player_name: &str,
        joined_at: &str,
    ) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO team_members (team_id, player_name, joined_at) VALUES (?1, ?2, ?3)",
            params![team_id, player_name, joined_at],
        );
        match inserted {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove_team_member(&self, member_id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM team_members WHERE id = ?1", params![member_id])?;
        Ok(deleted > 0)
    }

    // ── Team games ───────────────────────────────────────────────────────────

    /// Team games with team names resolved, newest first
    pub fn list_team_games(&self) -> Result<Vec<TeamGameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT g.id, g.created_at,
                    g.player1_team_id, g.player1_name, g.player1_score,
                    g.player2_team_id, g.player2_name, g.player2_score,
                    g.player3_team_id, g.player3_name, g.player3_score,
                    g.player4_team_id, g.player4_name, g.player4_score,
                    t1.name, t2.name, t3.name, t4.name
             FROM team_games g
             LEFT JOIN teams t1 ON g.player1_team_id = t1.id
             LEFT JOIN teams t2 ON g.player2_team_id = t2.id
             LEFT JOIN teams t3 ON g.player3_team_id = t3.id
             LEFT JOIN teams t4 ON g.player4_team_id = t4.id
             ORDER BY g.id DESC",
        )?;
        let games = stmt
            .query_map([], map_team_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    pub fn insert_team_game(&self, created_at: &str, seats: &[TeamSeat; 4]) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO team_games (
                created_at,
                player1_team_id, player1_name, player1_score,
                player2_team_id, player2_name, player2_score,
                player3_team_id, player3_name, player3_score,
                player4_team_id, player4_name, player4_score
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                created_at,
                seats[0].team_id,
                seats[0].name,
                seats[0].score,
                seats[1].team_id,
                seats[1].name,
                seats[1].score,
                seats[2].team_id,
                seats[2].name,
                seats[2].score,
                seats[3].team_id,
                seats[3].name,
                seats[3].score,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_team_game(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM team_games WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

const GAME_COLUMNS: &str = "id, created_at,
    player1_name, player2_name, player3_name, player4_name,
    player1_score, player2_score, player3_score, player4_score";

const PLAYER_BADGE_SELECT: &str = "SELECT pb.id, pb.player_name, pb.badge_code, pb.granted_at,
        COALESCE(b.name, ''), COALESCE(b.grade, ''), COALESCE(b.description, '')
    FROM player_badges pb
    LEFT JOIN badges b ON pb.badge_code = b.code";

fn insert_game_row(
    conn: &Connection,
    table: &str,
    archive_id: Option<i64>,
    game: &NewGame,
) -> rusqlite::Result<usize> {
    let [n1, n2, n3, n4] = &game.names;
    let [s1, s2, s3, s4] = game.scores;
    match archive_id {
        Some(archive_id) => conn.execute(
            &format!(
                "INSERT INTO {table} (
                    archive_id, created_at,
                    player1_name, player2_name, player3_name, player4_name,
                    player1_score, player2_score, player3_score, player4_score
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"
            ),
            params![archive_id, game.created_at, n1, n2, n3, n4, s1, s2, s3, s4],
        ),
        None => conn.execute(
            &format!(
                "INSERT INTO {table} (
                    created_at,
                    player1_name, player2_name, player3_name, player4_name,
                    player1_score, player2_score, player3_score, player4_score
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)"
            ),
            params![game.created_at, n1, n2, n3, n4, s1, s2, s3, s4],
        ),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn map_game(row: &rusqlite::Row) -> rusqlite::Result<GameRecord> {
    Ok(GameRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        player1_name: row.get(2)?,
        player2_name: row.get(3)?,
        player3_name: row.get(4)?,
        player4_name: row.get(5)?,
        player1_score: row.get(6)?,
        player2_score: row.get(7)?,
        player3_score: row.get(8)?,
        player4_score: row.get(9)?,
    })
}

fn map_badge(row: &rusqlite::Row) -> rusqlite::Result<Badge> {
    Ok(Badge {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        grade: row.get(3)?,
        description: row.get(4)?,
    })
}

fn map_player_badge(row: &rusqlite::Row) -> rusqlite::Result<PlayerBadge> {
    Ok(PlayerBadge {
        id: row.get(0)?,
        player_name: row.get(1)?,
        badge_code: row.get(2)?,
        code: row.get(2)?,
        granted_at: row.get(3)?,
        name: row.get(4)?,
        grade: row.get(5)?,
        description: row.get(6)?,
    })
}

fn map_team_game(row: &rusqlite::Row) -> rusqlite::Result<TeamGameRecord> {
    Ok(TeamGameRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        player1_team_id: row.get(2)?,
        player1_name: row.get(3)?,
        player1_score: row.get(4)?,
        player2_team_id: row.get(5)?,
        player2_name: row.get(6)?,
        player2_score: row.get(7)?,
        player3_team_id: row.get(8)?,
        player3_name: row.get(9)?,
        player3_score: row.get(10)?,
        player4_team_id: row.get(11)?,
        player4_name: row.get(12)?,
        player4_score: row.get(13)?,
        player1_team_name: row.get(14)?,
        player2_team_name: row.get(15)?,
        player3_team_name: row.get(16)?,
        player4_team_name: row.get(17)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at    TEXT    NOT NULL,
    player1_name  TEXT    NOT NULL,
    player2_name  TEXT    NOT NULL,
    player3_name  TEXT    NOT NULL,
    player4_name  TEXT    NOT NULL,
    player1_score INTEGER NOT NULL,
    player2_score INTEGER NOT NULL,
    player3_score INTEGER NOT NULL,
    player4_score INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tournament_games (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at    TEXT    NOT NULL,
    player1_name  TEXT    NOT NULL,
    player2_name  TEXT    NOT NULL,
    player3_name  TEXT    NOT NULL,
    player4_name  TEXT    NOT NULL,
    player1_score INTEGER NOT NULL,
    player2_score INTEGER NOT NULL,
    player3_score INTEGER NOT NULL,
    player4_score INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS badges (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    code        INTEGER UNIQUE NOT NULL,
    name        TEXT    NOT NULL,
    grade       TEXT    NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS player_badges (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    player_name TEXT    NOT NULL,
    badge_code  INTEGER NOT NULL,
    granted_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS archives (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    created_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS archive_games (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    archive_id    INTEGER NOT NULL,
    created_at    TEXT    NOT NULL,
    player1_name  TEXT    NOT NULL,
    player2_name  TEXT    NOT NULL,
    player3_name  TEXT    NOT NULL,
    player4_name  TEXT    NOT NULL,
    player1_score INTEGER NOT NULL,
    player2_score INTEGER NOT NULL,
    player3_score INTEGER NOT NULL,
    player4_score INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    UNIQUE NOT NULL,
    created_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS team_members (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id     INTEGER NOT NULL,
    player_name TEXT    NOT NULL,
    joined_at   TEXT    NOT NULL,
    UNIQUE(team_id, player_name)
);

CREATE TABLE IF NOT EXISTS team_games (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at      TEXT    NOT NULL,
    player1_team_id INTEGER,
    player1_name    TEXT,
    player1_score   INTEGER,
    player2_team_id INTEGER,
    player2_name    TEXT,
    player2_score   INTEGER,
    player3_team_id INTEGER,
    player3_name    TEXT,
    player3_score   INTEGER,
    player4_team_id INTEGER,
    player4_name    TEXT,
    player4_score   INTEGER
);

CREATE INDEX IF NOT EXISTS idx_archive_games_archive ON archive_games(archive_id);
CREATE INDEX IF NOT EXISTS idx_player_badges_player ON player_badges(player_name);
CREATE INDEX IF NOT EXISTS idx_team_members_team ON team_members(team_id);
"#;
