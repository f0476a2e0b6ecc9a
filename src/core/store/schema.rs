//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Store, SCHEMA_VERSION};
use crate::core::error::TrackerResult;

impl Store {
    /// Read the stored schema version, `None` on a fresh database
    pub(super) fn schema_version(&self) -> TrackerResult<Option<i32>> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Ok(None);
        }

        let version = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(version)
    }

    /// Initialize database schema
    pub(super) fn init_schema(&self) -> TrackerResult<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                display_name TEXT NOT NULL,
                system_role TEXT NOT NULL DEFAULT 'user',
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            -- Projects form a forest through parent_id
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_key TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT NOT NULL,
                description TEXT,
                parent_id INTEGER REFERENCES projects(id) ON DELETE CASCADE,
                owner_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'active',
                start_date TEXT,
                end_date TEXT,
                item_counter INTEGER NOT NULL DEFAULT 0 CHECK (item_counter >= 0),
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_parent ON projects(parent_id);

            CREATE TABLE IF NOT EXISTS project_members (
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                PRIMARY KEY (project_id, user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_project_members_user ON project_members(user_id);

            CREATE TABLE IF NOT EXISTS sprints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                goal TEXT,
                status TEXT NOT NULL DEFAULT 'planning',
                start_date TEXT,
                end_date TEXT,
                completed_at TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sprints_project ON sprints(project_id);
            -- At most one active sprint per project
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sprints_one_active
                ON sprints(project_id) WHERE status = 'active';

            CREATE TABLE IF NOT EXISTS work_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                item_number INTEGER NOT NULL,
                item_type TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'to_do',
                priority TEXT NOT NULL DEFAULT 'medium',
                sprint_id INTEGER REFERENCES sprints(id) ON DELETE SET NULL,
                parent_id INTEGER REFERENCES work_items(id) ON DELETE SET NULL,
                assignee_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                reporter_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                story_points INTEGER,
                start_date TEXT,
                due_date TEXT,
                estimated_hours REAL,
                logged_hours REAL NOT NULL DEFAULT 0,
                progress_pct INTEGER NOT NULL DEFAULT 0
                    CHECK (progress_pct BETWEEN 0 AND 100),
                completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (project_id, item_number)
            );
            CREATE INDEX IF NOT EXISTS idx_work_items_sprint ON work_items(sprint_id);
            CREATE INDEX IF NOT EXISTS idx_work_items_parent ON work_items(parent_id);
            CREATE INDEX IF NOT EXISTS idx_work_items_status ON work_items(status);
            CREATE INDEX IF NOT EXISTS idx_work_items_assignee ON work_items(assignee_id);

            CREATE TABLE IF NOT EXISTS work_item_dependencies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                predecessor_id INTEGER NOT NULL REFERENCES work_items(id) ON DELETE CASCADE,
                successor_id INTEGER NOT NULL REFERENCES work_items(id) ON DELETE CASCADE,
                dependency_type TEXT NOT NULL,
                UNIQUE (predecessor_id, successor_id)
            );
            CREATE INDEX IF NOT EXISTS idx_dependencies_successor ON work_item_dependencies(successor_id);

            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                work_item_id INTEGER NOT NULL REFERENCES work_items(id) ON DELETE CASCADE,
                author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                content TEXT NOT NULL,
                edited INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_item ON comments(work_item_id);

            -- Labels with a NULL project are global
            CREATE TABLE IF NOT EXISTS labels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER REFERENCES projects(id) ON DELETE CASCADE,
                name TEXT NOT NULL COLLATE NOCASE,
                color TEXT NOT NULL DEFAULT '#6DA3C7',
                UNIQUE (project_id, name)
            );
            CREATE INDEX IF NOT EXISTS idx_labels_project ON labels(project_id);

            CREATE TABLE IF NOT EXISTS work_item_labels (
                work_item_id INTEGER NOT NULL REFERENCES work_items(id) ON DELETE CASCADE,
                label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
                PRIMARY KEY (work_item_id, label_id)
            );
            CREATE INDEX IF NOT EXISTS idx_work_item_labels_label ON work_item_labels(label_id);
            "#,
        )?;

        // Set schema version
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
