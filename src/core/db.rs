//! Local SQLite store for installed apps, favourites, update history,
//! and the starred-repo cache
//!
//! The schema is versioned through the `user_version` pragma and evolved
//! additively: version 2 added version-tracking columns to
//! `installed_apps`, version 3 added the `starred_repos` cache table.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::paths;
use crate::error::Result;

/// Current schema version
const SCHEMA_VERSION: i64 = 3;

/// Meta key holding the epoch seconds of the last starred sync
const META_STARRED_SYNCED_AT: &str = "starred_last_synced_at";

/// An application installed through the store
#[derive(Debug, Clone)]
pub struct InstalledApp {
    /// Stable identifier, the `owner/repo` slug
    pub app_id: String,
    pub repo_id: u64,
    pub repo_owner: String,
    pub repo_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub html_url: String,
    pub installed_version: String,
    pub installed_asset_name: Option<String>,
    pub install_path: Option<String>,
    pub latest_version: Option<String>,
    pub latest_asset_name: Option<String>,
    pub update_available: bool,
    pub installed_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// A repo the user bookmarked locally (independent of GitHub stars)
#[derive(Debug, Clone)]
pub struct FavouriteRepo {
    pub repo_id: u64,
    pub repo_owner: String,
    pub repo_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub html_url: String,
    pub added_at: DateTime<Utc>,
}

/// One install or update recorded in the history log
#[derive(Debug, Clone)]
pub struct UpdateRecord {
    pub id: i64,
    pub app_id: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub from_version: Option<String>,
    pub to_version: String,
    pub updated_at: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// A starred repo as cached by the sync job
#[derive(Debug, Clone)]
pub struct StarredRepo {
    pub repo_id: u64,
    pub repo_owner: String,
    pub repo_name: String,
    pub owner_avatar_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub html_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub open_issues_count: u32,
    pub latest_version: Option<String>,
    /// When the user starred the repo on GitHub, if the API reported it
    pub starred_at: Option<DateTime<Utc>>,
    /// When this row first entered the local cache
    pub added_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at the default data-dir location
    pub fn open() -> Result<Self> {
        let path = paths::database_path()?;
        Self::open_path(&path)
    }

    /// Open or create the database at a specific path
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        migrate(&mut conn)?;

        Ok(Self { conn })
    }

    // ==================== Installed apps ====================

    /// Insert or replace an installed-app record
    pub fn upsert_installed_app(&self, app: &InstalledApp) -> Result<()> {
        self.conn.execute(
            r"INSERT OR REPLACE INTO installed_apps
               (app_id, repo_id, repo_owner, repo_name, description, language,
                html_url, installed_version, installed_asset_name, install_path,
                latest_version, latest_asset_name, update_available,
                installed_at, last_checked_at, last_updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                app.app_id,
                app.repo_id,
                app.repo_owner,
                app.repo_name,
                app.description,
                app.language,
                app.html_url,
                app.installed_version,
                app.installed_asset_name,
                app.install_path,
                app.latest_version,
                app.latest_asset_name,
                i32::from(app.update_available),
                app.installed_at.timestamp(),
                app.last_checked_at.timestamp(),
                app.last_updated_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    /// All installed apps, alphabetical
    pub fn get_installed_apps(&self) -> Result<Vec<InstalledApp>> {
        let mut stmt = self.conn.prepare(
            "SELECT app_id, repo_id, repo_owner, repo_name, description, language,
                    html_url, installed_version, installed_asset_name, install_path,
                    latest_version, latest_asset_name, update_available,
                    installed_at, last_checked_at, last_updated_at
             FROM installed_apps ORDER BY app_id",
        )?;

        let apps = stmt.query_map([], row_to_installed_app)?;
        apps.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Look up a single installed app by its `owner/repo` slug
    pub fn get_installed_app(&self, app_id: &str) -> Result<Option<InstalledApp>> {
        let mut stmt = self.conn.prepare(
            "SELECT app_id, repo_id, repo_owner, repo_name, description, language,
                    html_url, installed_version, installed_asset_name, install_path,
                    latest_version, latest_asset_name, update_available,
                    installed_at, last_checked_at, last_updated_at
             FROM installed_apps WHERE app_id = ?1",
        )?;

        stmt.query_row(params![app_id], row_to_installed_app)
            .optional()
            .map_err(Into::into)
    }

    /// Record the outcome of an update check
    pub fn set_update_status(
        &self,
        app_id: &str,
        latest_version: Option<&str>,
        latest_asset_name: Option<&str>,
        update_available: bool,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE installed_apps
             SET latest_version = ?2, latest_asset_name = ?3,
                 update_available = ?4, last_checked_at = ?5
             WHERE app_id = ?1",
            params![
                app_id,
                latest_version,
                latest_asset_name,
                i32::from(update_available),
                Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn remove_installed_app(&self, app_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM installed_apps WHERE app_id = ?1",
            params![app_id],
        )?;
        Ok(())
    }

    // ==================== Favourites ====================

    pub fn add_favourite(&self, fav: &FavouriteRepo) -> Result<()> {
        self.conn.execute(
            r"INSERT OR REPLACE INTO favourite_repos
               (repo_id, repo_owner, repo_name, description, language, html_url, added_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fav.repo_id,
                fav.repo_owner,
                fav.repo_name,
                fav.description,
                fav.language,
                fav.html_url,
                fav.added_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Remove a favourite, returning whether a row was deleted
    pub fn remove_favourite(&self, repo_id: u64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM favourite_repos WHERE repo_id = ?1",
            params![repo_id],
        )?;
        Ok(deleted > 0)
    }

    /// All favourites, most recently added first
    pub fn get_favourites(&self) -> Result<Vec<FavouriteRepo>> {
        let mut stmt = self.conn.prepare(
            "SELECT repo_id, repo_owner, repo_name, description, language, html_url, added_at
             FROM favourite_repos ORDER BY added_at DESC",
        )?;

        let favs = stmt.query_map([], |row| {
            Ok(FavouriteRepo {
                repo_id: row.get(0)?,
                repo_owner: row.get(1)?,
                repo_name: row.get(2)?,
                description: row.get(3)?,
                language: row.get(4)?,
                html_url: row.get(5)?,
                added_at: epoch_to_datetime(row.get(6)?),
            })
        })?;
        favs.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn is_favourite(&self, repo_id: u64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM favourite_repos WHERE repo_id = ?1",
            params![repo_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ==================== Update history ====================

    pub fn record_update(
        &self,
        app_id: &str,
        repo_owner: &str,
        repo_name: &str,
        from_version: Option<&str>,
        to_version: &str,
        success: bool,
        error_message: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            r"INSERT INTO update_history
               (app_id, repo_owner, repo_name, from_version, to_version,
                updated_at, success, error_message)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                app_id,
                repo_owner,
                repo_name,
                from_version,
                to_version,
                Utc::now().timestamp(),
                i32::from(success),
                error_message,
            ],
        )?;
        Ok(())
    }

    /// Update history, most recent first, optionally scoped to one app
    pub fn get_update_history(
        &self,
        app_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<UpdateRecord>> {
        let mut records = Vec::new();

        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(UpdateRecord {
                id: row.get(0)?,
                app_id: row.get(1)?,
                repo_owner: row.get(2)?,
                repo_name: row.get(3)?,
                from_version: row.get(4)?,
                to_version: row.get(5)?,
                updated_at: epoch_to_datetime(row.get(6)?),
                success: row.get::<_, i32>(7)? != 0,
                error_message: row.get(8)?,
            })
        };

        match app_id {
            Some(id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, app_id, repo_owner, repo_name, from_version, to_version,
                            updated_at, success, error_message
                     FROM update_history WHERE app_id = ?1
                     ORDER BY updated_at DESC LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![id, limit as i64], map_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, app_id, repo_owner, repo_name, from_version, to_version,
                            updated_at, success, error_message
                     FROM update_history ORDER BY updated_at DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit as i64], map_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }

        Ok(records)
    }

    // ==================== Starred cache ====================

    /// Replace the starred cache wholesale inside one transaction.
    ///
    /// Rows whose repo id survives the sync keep their original
    /// `added_at`; new rows get the current time. The sync timestamp is
    /// stamped in the same transaction so a failed replace leaves both
    /// untouched.
    pub fn replace_starred(&mut self, repos: &[StarredRepo]) -> Result<()> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        let previous: HashMap<u64, i64> = {
            let mut stmt = tx.prepare("SELECT repo_id, added_at FROM starred_repos")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, u64>(0)?, row.get::<_, i64>(1)?)))?;
            rows.collect::<std::result::Result<HashMap<_, _>, _>>()?
        };

        tx.execute("DELETE FROM starred_repos", [])?;

        for repo in repos {
            let added_at = previous
                .get(&repo.repo_id)
                .copied()
                .unwrap_or_else(|| now.timestamp());

            tx.execute(
                r"INSERT INTO starred_repos
                   (repo_id, repo_owner, repo_name, owner_avatar_url, description,
                    language, html_url, stargazers_count, forks_count,
                    open_issues_count, latest_version, starred_at, added_at,
                    last_synced_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    repo.repo_id,
                    repo.repo_owner,
                    repo.repo_name,
                    repo.owner_avatar_url,
                    repo.description,
                    repo.language,
                    repo.html_url,
                    repo.stargazers_count,
                    repo.forks_count,
                    repo.open_issues_count,
                    repo.latest_version,
                    repo.starred_at.map(|dt| dt.timestamp()),
                    added_at,
                    now.timestamp(),
                ],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![META_STARRED_SYNCED_AT, now.timestamp().to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// The cached starred repos, most stars first
    pub fn get_starred(&self) -> Result<Vec<StarredRepo>> {
        let mut stmt = self.conn.prepare(
            "SELECT repo_id, repo_owner, repo_name, owner_avatar_url, description,
                    language, html_url, stargazers_count, forks_count,
                    open_issues_count, latest_version, starred_at, added_at,
                    last_synced_at
             FROM starred_repos ORDER BY stargazers_count DESC",
        )?;

        let repos = stmt.query_map([], |row| {
            Ok(StarredRepo {
                repo_id: row.get(0)?,
                repo_owner: row.get(1)?,
                repo_name: row.get(2)?,
                owner_avatar_url: row.get(3)?,
                description: row.get(4)?,
                language: row.get(5)?,
                html_url: row.get(6)?,
                stargazers_count: row.get(7)?,
                forks_count: row.get(8)?,
                open_issues_count: row.get(9)?,
                latest_version: row.get(10)?,
                starred_at: row.get::<_, Option<i64>>(11)?.map(epoch_to_datetime),
                added_at: epoch_to_datetime(row.get(12)?),
                last_synced_at: epoch_to_datetime(row.get(13)?),
            })
        })?;
        repos
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// When the starred cache was last replaced, if ever
    pub fn starred_synced_at(&self) -> Result<Option<DateTime<Utc>>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![META_STARRED_SYNCED_AT],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value
            .and_then(|v| v.parse::<i64>().ok())
            .map(epoch_to_datetime))
    }
}

fn row_to_installed_app(row: &rusqlite::Row<'_>) -> rusqlite::Result<InstalledApp> {
    Ok(InstalledApp {
        app_id: row.get(0)?,
        repo_id: row.get(1)?,
        repo_owner: row.get(2)?,
        repo_name: row.get(3)?,
        description: row.get(4)?,
        language: row.get(5)?,
        html_url: row.get(6)?,
        installed_version: row.get(7)?,
        installed_asset_name: row.get(8)?,
        install_path: row.get(9)?,
        latest_version: row.get(10)?,
        latest_asset_name: row.get(11)?,
        update_available: row.get::<_, i32>(12)? != 0,
        installed_at: epoch_to_datetime(row.get(13)?),
        last_checked_at: epoch_to_datetime(row.get(14)?),
        last_updated_at: epoch_to_datetime(row.get(15)?),
    })
}

fn epoch_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Bring the schema up to [`SCHEMA_VERSION`], one version at a time.
///
/// Each step runs in its own transaction together with the pragma bump,
/// so an interrupted migration leaves the version consistent with the
/// actual shape of the tables.
fn migrate(conn: &mut Connection) -> Result<()> {
    loop {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        let tx = conn.transaction()?;
        match version {
            0 => migrate_to_v1(&tx)?,
            1 => migrate_to_v2(&tx)?,
            2 => migrate_to_v3(&tx)?,
            _ => unreachable!("version checked above"),
        }
        tx.execute_batch(&format!("PRAGMA user_version = {}", version + 1))?;
        tx.commit()?;

        tracing::debug!(from = version, to = version + 1, "migrated database schema");
    }
}

/// Baseline schema: installed apps, favourites, update history, meta
fn migrate_to_v1(tx: &rusqlite::Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r"
        CREATE TABLE installed_apps (
            app_id TEXT PRIMARY KEY,
            repo_id INTEGER NOT NULL,
            repo_owner TEXT NOT NULL,
            repo_name TEXT NOT NULL,
            description TEXT,
            language TEXT,
            html_url TEXT NOT NULL,
            installed_version TEXT NOT NULL,
            installed_asset_name TEXT,
            install_path TEXT,
            installed_at INTEGER NOT NULL,
            last_updated_at INTEGER NOT NULL
        );

        CREATE TABLE favourite_repos (
            repo_id INTEGER PRIMARY KEY,
            repo_owner TEXT NOT NULL,
            repo_name TEXT NOT NULL,
            description TEXT,
            language TEXT,
            html_url TEXT NOT NULL,
            added_at INTEGER NOT NULL
        );

        CREATE TABLE update_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            app_id TEXT NOT NULL,
            repo_owner TEXT NOT NULL,
            repo_name TEXT NOT NULL,
            from_version TEXT,
            to_version TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            success INTEGER NOT NULL DEFAULT 1,
            error_message TEXT
        );

        CREATE TABLE meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX idx_update_history_app ON update_history(app_id);
        ",
    )?;
    Ok(())
}

/// v2 adds update-check tracking to installed apps
fn migrate_to_v2(tx: &rusqlite::Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r"
        ALTER TABLE installed_apps ADD COLUMN latest_version TEXT;
        ALTER TABLE installed_apps ADD COLUMN latest_asset_name TEXT;
        ALTER TABLE installed_apps ADD COLUMN update_available INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE installed_apps ADD COLUMN last_checked_at INTEGER NOT NULL DEFAULT 0;
        ",
    )?;
    Ok(())
}

/// v3 adds the starred-repo cache
fn migrate_to_v3(tx: &rusqlite::Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r"
        CREATE TABLE starred_repos (
            repo_id INTEGER PRIMARY KEY,
            repo_owner TEXT NOT NULL,
            repo_name TEXT NOT NULL,
            owner_avatar_url TEXT NOT NULL,
            description TEXT,
            language TEXT,
            html_url TEXT NOT NULL,
            stargazers_count INTEGER NOT NULL,
            forks_count INTEGER NOT NULL,
            open_issues_count INTEGER NOT NULL,
            latest_version TEXT,
            starred_at INTEGER,
            added_at INTEGER NOT NULL,
            last_synced_at INTEGER NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_test_db(dir: &tempfile::TempDir) -> Database {
        Database::open_path(&dir.path().join("test.sqlite")).unwrap()
    }

    fn sample_app(app_id: &str) -> InstalledApp {
        InstalledApp {
            app_id: app_id.to_string(),
            repo_id: 1,
            repo_owner: "octocat".to_string(),
            repo_name: "hello".to_string(),
            description: Some("demo".to_string()),
            language: Some("Rust".to_string()),
            html_url: "https://github.com/octocat/hello".to_string(),
            installed_version: "1.0.0".to_string(),
            installed_asset_name: Some("hello.AppImage".to_string()),
            install_path: None,
            latest_version: None,
            latest_asset_name: None,
            update_available: false,
            installed_at: Utc::now(),
            last_checked_at: Utc::now(),
            last_updated_at: Utc::now(),
        }
    }

    fn sample_starred(repo_id: u64, name: &str, stars: u32) -> StarredRepo {
        StarredRepo {
            repo_id,
            repo_owner: "dev".to_string(),
            repo_name: name.to_string(),
            owner_avatar_url: "https://example.com/a.png".to_string(),
            description: None,
            language: Some("Rust".to_string()),
            html_url: format!("https://github.com/dev/{name}"),
            stargazers_count: stars,
            forks_count: 0,
            open_issues_count: 0,
            latest_version: Some("v1.0.0".to_string()),
            starred_at: Some(Utc::now()),
            added_at: Utc::now(),
            last_synced_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_database_lands_on_current_version() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir);
        let version: i64 = db
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn migrations_from_v1_preserve_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.sqlite");

        // Build a version-1 database by hand, as an old release would have
        {
            let mut conn = Connection::open(&path).unwrap();
            let tx = conn.transaction().unwrap();
            migrate_to_v1(&tx).unwrap();
            tx.execute_batch("PRAGMA user_version = 1").unwrap();
            tx.commit().unwrap();

            conn.execute(
                r"INSERT INTO installed_apps
                   (app_id, repo_id, repo_owner, repo_name, description, language,
                    html_url, installed_version, installed_asset_name, install_path,
                    installed_at, last_updated_at)
                   VALUES ('octocat/hello', 1, 'octocat', 'hello', NULL, NULL,
                           'https://github.com/octocat/hello', '0.9.0', NULL, NULL, 100, 100)",
                [],
            )
            .unwrap();
        }

        let db = Database::open_path(&path).unwrap();
        let app = db.get_installed_app("octocat/hello").unwrap().unwrap();
        assert_eq!(app.installed_version, "0.9.0");
        // Columns added by v2 default sensibly
        assert!(app.latest_version.is_none());
        assert!(!app.update_available);
        // Table added by v3 exists and is empty
        assert!(db.get_starred().unwrap().is_empty());
    }

    #[test]
    fn installed_app_crud() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir);

        db.upsert_installed_app(&sample_app("octocat/hello")).unwrap();
        assert_eq!(db.get_installed_apps().unwrap().len(), 1);

        db.set_update_status("octocat/hello", Some("2.0.0"), Some("hello-2.AppImage"), true)
            .unwrap();
        let app = db.get_installed_app("octocat/hello").unwrap().unwrap();
        assert_eq!(app.latest_version.as_deref(), Some("2.0.0"));
        assert!(app.update_available);

        db.remove_installed_app("octocat/hello").unwrap();
        assert!(db.get_installed_app("octocat/hello").unwrap().is_none());
    }

    #[test]
    fn favourites_round_trip() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir);

        let fav = FavouriteRepo {
            repo_id: 7,
            repo_owner: "dev".to_string(),
            repo_name: "tool".to_string(),
            description: None,
            language: None,
            html_url: "https://github.com/dev/tool".to_string(),
            added_at: Utc::now(),
        };
        db.add_favourite(&fav).unwrap();

        assert!(db.is_favourite(7).unwrap());
        assert_eq!(db.get_favourites().unwrap().len(), 1);

        assert!(db.remove_favourite(7).unwrap());
        assert!(!db.remove_favourite(7).unwrap());
        assert!(!db.is_favourite(7).unwrap());
    }

    #[test]
    fn update_history_is_most_recent_first() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir);

        db.record_update("a/b", "a", "b", None, "1.0.0", true, None)
            .unwrap();
        db.record_update("a/b", "a", "b", Some("1.0.0"), "1.1.0", true, None)
            .unwrap();
        db.record_update("c/d", "c", "d", None, "0.1.0", false, Some("checksum mismatch"))
            .unwrap();

        let all = db.get_update_history(None, 10).unwrap();
        assert_eq!(all.len(), 3);

        let scoped = db.get_update_history(Some("a/b"), 10).unwrap();
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].to_version, "1.1.0");

        let failed = &db.get_update_history(Some("c/d"), 10).unwrap()[0];
        assert!(!failed.success);
        assert_eq!(failed.error_message.as_deref(), Some("checksum mismatch"));
    }

    #[test]
    fn replace_starred_is_wholesale() {
        let dir = tempdir().unwrap();
        let mut db = open_test_db(&dir);

        db.replace_starred(&[sample_starred(1, "one", 10), sample_starred(2, "two", 20)])
            .unwrap();
        assert_eq!(db.get_starred().unwrap().len(), 2);

        db.replace_starred(&[sample_starred(3, "three", 30)]).unwrap();
        let repos = db.get_starred().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].repo_id, 3);
        assert!(db.starred_synced_at().unwrap().is_some());
    }

    #[test]
    fn replace_starred_preserves_added_at_for_survivors() {
        let dir = tempdir().unwrap();
        let mut db = open_test_db(&dir);

        db.replace_starred(&[sample_starred(1, "one", 10)]).unwrap();
        let original_added = db.get_starred().unwrap()[0].added_at;

        std::thread::sleep(std::time::Duration::from_millis(1100));
        db.replace_starred(&[sample_starred(1, "one", 15), sample_starred(2, "two", 5)])
            .unwrap();

        let repos = db.get_starred().unwrap();
        let survivor = repos.iter().find(|r| r.repo_id == 1).unwrap();
        let newcomer = repos.iter().find(|r| r.repo_id == 2).unwrap();

        assert_eq!(survivor.added_at, original_added);
        assert!(newcomer.added_at > original_added);
        assert_eq!(survivor.stargazers_count, 15);
    }

    #[test]
    fn starred_sorted_by_stars() {
        let dir = tempdir().unwrap();
        let mut db = open_test_db(&dir);

        db.replace_starred(&[
            sample_starred(1, "small", 5),
            sample_starred(2, "big", 500),
            sample_starred(3, "mid", 50),
        ])
        .unwrap();

        let stars: Vec<u32> = db
            .get_starred()
            .unwrap()
            .iter()
            .map(|r| r.stargazers_count)
            .collect();
        assert_eq!(stars, vec![500, 50, 5]);
    }
}
