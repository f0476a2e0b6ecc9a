//! Row-level lookups and writes
//!
//! `Repo` borrows either a plain connection or an open transaction, so the
//! same queries serve read paths and write transactions alike.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::error::TrackerResult;
use crate::core::identity::{
    CommentId, DependencyId, LabelId, ProjectId, ProjectMember, ProjectRole, SprintId, SystemRole,
    User, UserId, WorkItemId,
};
use crate::core::key::ProjectKey;
use crate::core::label::Label;
use crate::core::project::{NewProject, Project, ProjectStatus};
use crate::core::sprint::{NewSprint, Sprint, SprintStatus};
use crate::core::work_item::{
    Comment, Dependency, DependencyType, NewWorkItem, Priority, WorkItem, WorkItemStatus,
};

const USER_COLUMNS: &str = "id, username, display_name, system_role, active, created_at";

const PROJECT_COLUMNS: &str = "id, project_key, name, description, parent_id, owner_id, status, \
     start_date, end_date, item_counter, created_at";

const SPRINT_COLUMNS: &str =
    "id, project_id, name, goal, status, start_date, end_date, completed_at, created_at";

const WORK_ITEM_COLUMNS: &str = "w.id, w.project_id, p.project_key, w.item_number, w.item_type, \
     w.title, w.description, w.status, w.priority, w.sprint_id, w.parent_id, w.assignee_id, \
     w.reporter_id, w.story_points, w.start_date, w.due_date, w.estimated_hours, w.logged_hours, \
     w.progress_pct, w.completed_at, w.created_at, w.updated_at";

const LABEL_COLUMNS: &str = "l.id, l.project_id, l.name, l.color";

/// Query handle over a connection or transaction
pub struct Repo<'c> {
    conn: &'c Connection,
}

impl<'c> Repo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ---- Users ----

    pub fn insert_user(
        &self,
        username: &str,
        display_name: &str,
        system_role: SystemRole,
    ) -> TrackerResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (username, display_name, system_role, active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![username, display_name, system_role, Utc::now()],
        )?;
        Ok(UserId(self.conn.last_insert_rowid()))
    }

    pub fn user(&self, id: UserId) -> TrackerResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], user_from_row)
            .optional()?)
    }

    pub fn user_by_username(&self, username: &str) -> TrackerResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![username.trim()], user_from_row)
            .optional()?)
    }

    pub fn users(&self) -> TrackerResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], user_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn count_users(&self) -> TrackerResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    pub fn set_user_active(&self, id: UserId, active: bool) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE users SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(())
    }

    // ---- Projects ----

    pub fn insert_project(
        &self,
        key: &ProjectKey,
        new: &NewProject,
        parent_id: Option<ProjectId>,
        owner_id: UserId,
    ) -> TrackerResult<ProjectId> {
        self.conn.execute(
            "INSERT INTO projects
                 (project_key, name, description, parent_id, owner_id, status,
                  start_date, end_date, item_counter, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
            params![
                key.as_str(),
                new.name.trim(),
                new.description,
                parent_id,
                owner_id,
                ProjectStatus::Active,
                new.start_date,
                new.end_date,
                Utc::now(),
            ],
        )?;
        Ok(ProjectId(self.conn.last_insert_rowid()))
    }

    pub fn project(&self, id: ProjectId) -> TrackerResult<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], project_from_row)
            .optional()?)
    }

    pub fn project_by_key(&self, key: &str) -> TrackerResult<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE project_key = ?1",
            PROJECT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![key.trim()], project_from_row)
            .optional()?)
    }

    pub fn project_key_exists(&self, key: &ProjectKey) -> TrackerResult<bool> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM projects WHERE project_key = ?1",
            params![key.as_str()],
            |row| row.get(0),
        )?)
    }

    /// Parent of a project; `None` for roots and unknown ids
    pub fn project_parent(&self, id: ProjectId) -> TrackerResult<Option<ProjectId>> {
        Ok(self
            .conn
            .query_row(
                "SELECT parent_id FROM projects WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<ProjectId>>(0),
            )
            .optional()?
            .flatten())
    }

    /// Persist the mutable columns of a project (never the counter)
    pub fn update_project(&self, project: &Project) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE projects
             SET name = ?2, description = ?3, status = ?4, start_date = ?5, end_date = ?6
             WHERE id = ?1",
            params![
                project.id,
                project.name,
                project.description,
                project.status,
                project.start_date,
                project.end_date,
            ],
        )?;
        Ok(())
    }

    pub fn root_projects(&self) -> TrackerResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE parent_id IS NULL AND status != 'archived' ORDER BY name",
            PROJECT_COLUMNS
        );
        self.query_projects(&sql, params![])
    }

    /// Non-archived projects where the user holds a direct membership
    pub fn projects_for_member(&self, user_id: UserId) -> TrackerResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects
             WHERE status != 'archived'
               AND id IN (SELECT project_id FROM project_members WHERE user_id = ?1)
             ORDER BY name",
            PROJECT_COLUMNS
        );
        self.query_projects(&sql, params![user_id])
    }

    pub fn subprojects(&self, parent_id: ProjectId) -> TrackerResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE parent_id = ?1 ORDER BY name",
            PROJECT_COLUMNS
        );
        self.query_projects(&sql, params![parent_id])
    }

    fn query_projects(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> TrackerResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, project_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Atomically bump the project's item counter and return the new value
    ///
    /// A single `UPDATE ... RETURNING` statement, so two writers can never
    /// observe the same value.
    pub fn increment_item_counter(&self, id: ProjectId) -> TrackerResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "UPDATE projects SET item_counter = item_counter + 1
                 WHERE id = ?1
                 RETURNING item_counter",
                params![id],
                |row| row.get(0),
            )
            .optional()?)
    }

    // ---- Members ----

    pub fn direct_role(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TrackerResult<Option<ProjectRole>> {
        Ok(self
            .conn
            .query_row(
                "SELECT role FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn insert_member(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: ProjectRole,
    ) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO project_members (project_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![project_id, user_id, role],
        )?;
        Ok(())
    }

    pub fn set_member_role(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: ProjectRole,
    ) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE project_members SET role = ?3 WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id, role],
        )?;
        Ok(())
    }

    pub fn delete_member(&self, project_id: ProjectId, user_id: UserId) -> TrackerResult<()> {
        self.conn.execute(
            "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )?;
        Ok(())
    }

    /// Direct MANAGER memberships on exactly this project
    pub fn count_direct_managers(&self, project_id: ProjectId) -> TrackerResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM project_members WHERE project_id = ?1 AND role = ?2",
            params![project_id, ProjectRole::Manager],
            |row| row.get(0),
        )?)
    }

    pub fn members(&self, project_id: ProjectId) -> TrackerResult<Vec<ProjectMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.project_id, m.user_id, u.username, m.role
             FROM project_members m JOIN users u ON u.id = m.user_id
             WHERE m.project_id = ?1
             ORDER BY u.username",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(ProjectMember {
                project_id: row.get(0)?,
                user_id: row.get(1)?,
                username: row.get(2)?,
                role: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    // ---- Sprints ----

    pub fn insert_sprint(&self, project_id: ProjectId, new: &NewSprint) -> TrackerResult<SprintId> {
        self.conn.execute(
            "INSERT INTO sprints (project_id, name, goal, status, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project_id,
                new.name.trim(),
                new.goal,
                SprintStatus::Planning,
                new.start_date,
                new.end_date,
                Utc::now(),
            ],
        )?;
        Ok(SprintId(self.conn.last_insert_rowid()))
    }

    pub fn sprint(&self, id: SprintId) -> TrackerResult<Option<Sprint>> {
        let sql = format!("SELECT {} FROM sprints WHERE id = ?1", SPRINT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], sprint_from_row)
            .optional()?)
    }

    pub fn sprints_for_project(&self, project_id: ProjectId) -> TrackerResult<Vec<Sprint>> {
        let sql = format!(
            "SELECT {} FROM sprints WHERE project_id = ?1
             ORDER BY start_date IS NULL, start_date DESC, id DESC",
            SPRINT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], sprint_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn active_sprint(&self, project_id: ProjectId) -> TrackerResult<Option<Sprint>> {
        let sql = format!(
            "SELECT {} FROM sprints WHERE project_id = ?1 AND status = ?2",
            SPRINT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(
                &sql,
                params![project_id, SprintStatus::Active],
                sprint_from_row,
            )
            .optional()?)
    }

    /// Persist the mutable columns of a sprint
    pub fn update_sprint(&self, sprint: &Sprint) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE sprints
             SET name = ?2, goal = ?3, status = ?4, start_date = ?5, end_date = ?6,
                 completed_at = ?7
             WHERE id = ?1",
            params![
                sprint.id,
                sprint.name,
                sprint.goal,
                sprint.status,
                sprint.start_date,
                sprint.end_date,
                sprint.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Relink every non-terminal item of `sprint_id` to `target` (or backlog)
    pub fn move_open_items(
        &self,
        sprint_id: SprintId,
        target: Option<SprintId>,
    ) -> TrackerResult<usize> {
        Ok(self.conn.execute(
            "UPDATE work_items SET sprint_id = ?2, updated_at = ?5
             WHERE sprint_id = ?1 AND status NOT IN (?3, ?4)",
            params![
                sprint_id,
                target,
                WorkItemStatus::Done,
                WorkItemStatus::Cancelled,
                Utc::now(),
            ],
        )?)
    }

    /// Return every item of `sprint_id` to the backlog regardless of status
    pub fn clear_sprint_items(&self, sprint_id: SprintId) -> TrackerResult<usize> {
        Ok(self.conn.execute(
            "UPDATE work_items SET sprint_id = NULL, updated_at = ?2 WHERE sprint_id = ?1",
            params![sprint_id, Utc::now()],
        )?)
    }

    // ---- Work items ----

    pub fn insert_work_item(
        &self,
        project_id: ProjectId,
        item_number: i64,
        reporter_id: UserId,
        new: &NewWorkItem,
    ) -> TrackerResult<WorkItemId> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO work_items
                 (project_id, item_number, item_type, title, description, status, priority,
                  sprint_id, parent_id, assignee_id, reporter_id, story_points,
                  start_date, due_date, estimated_hours, progress_pct,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?17)",
            params![
                project_id,
                item_number,
                new.item_type,
                new.title.trim(),
                new.description,
                WorkItemStatus::ToDo,
                new.priority.unwrap_or_default(),
                new.sprint_id,
                new.parent_id,
                new.assignee_id,
                reporter_id,
                new.story_points,
                new.start_date,
                new.due_date,
                new.estimated_hours,
                new.progress_pct.unwrap_or(0),
                now,
            ],
        )?;
        Ok(WorkItemId(self.conn.last_insert_rowid()))
    }

    pub fn work_item(&self, id: WorkItemId) -> TrackerResult<Option<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id WHERE w.id = ?1",
            WORK_ITEM_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![id], work_item_from_row)
            .optional()?)
    }

    pub fn work_item_by_key(
        &self,
        project_key: &str,
        item_number: i64,
    ) -> TrackerResult<Option<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id
             WHERE p.project_key = ?1 AND w.item_number = ?2",
            WORK_ITEM_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![project_key, item_number], work_item_from_row)
            .optional()?)
    }

    pub fn work_items_in_sprint(&self, sprint_id: SprintId) -> TrackerResult<Vec<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id
             WHERE w.sprint_id = ?1 ORDER BY w.item_number",
            WORK_ITEM_COLUMNS
        );
        self.query_work_items(&sql, params![sprint_id])
    }

    pub fn backlog(&self, project_id: ProjectId) -> TrackerResult<Vec<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id
             WHERE w.project_id = ?1 AND w.sprint_id IS NULL ORDER BY w.item_number",
            WORK_ITEM_COLUMNS
        );
        self.query_work_items(&sql, params![project_id])
    }

    pub fn work_items_for_project(&self, project_id: ProjectId) -> TrackerResult<Vec<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id
             WHERE w.project_id = ?1 ORDER BY w.item_number",
            WORK_ITEM_COLUMNS
        );
        self.query_work_items(&sql, params![project_id])
    }

    /// Open items assigned to a user, across all projects
    pub fn open_items_assigned_to(&self, user_id: UserId) -> TrackerResult<Vec<WorkItem>> {
        let sql = format!(
            "SELECT {} FROM work_items w JOIN projects p ON p.id = w.project_id
             WHERE w.assignee_id = ?1 AND w.status NOT IN (?2, ?3)
             ORDER BY w.id",
            WORK_ITEM_COLUMNS
        );
        self.query_work_items(
            &sql,
            params![user_id, WorkItemStatus::Done, WorkItemStatus::Cancelled],
        )
    }

    fn query_work_items(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> TrackerResult<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, work_item_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn set_work_item_sprint(
        &self,
        id: WorkItemId,
        sprint_id: Option<SprintId>,
    ) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE work_items SET sprint_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, sprint_id, Utc::now()],
        )?;
        Ok(())
    }

    /// Persist the mutable columns of a work item
    ///
    /// Number, project, type and reporter are fixed at creation.
    pub fn update_work_item(&self, item: &WorkItem) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE work_items
             SET title = ?2, description = ?3, status = ?4, priority = ?5, sprint_id = ?6,
                 parent_id = ?7, assignee_id = ?8, story_points = ?9, start_date = ?10,
                 due_date = ?11, estimated_hours = ?12, logged_hours = ?13, progress_pct = ?14,
                 completed_at = ?15, updated_at = ?16
             WHERE id = ?1",
            params![
                item.id,
                item.title,
                item.description,
                item.status,
                item.priority,
                item.sprint_id,
                item.parent_id,
                item.assignee_id,
                item.story_points,
                item.start_date,
                item.due_date,
                item.estimated_hours,
                item.logged_hours,
                item.progress_pct,
                item.completed_at,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    pub fn delete_work_item(&self, id: WorkItemId) -> TrackerResult<()> {
        self.conn
            .execute("DELETE FROM work_items WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of items per status in a project
    pub fn status_counts(&self, project_id: ProjectId) -> TrackerResult<Vec<(WorkItemStatus, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM work_items WHERE project_id = ?1 GROUP BY status",
        )?;
        let rows = stmt.query_map(params![project_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    // ---- Dependencies ----

    /// Whether a dependency links the two items in either direction
    pub fn dependency_exists_between(
        &self,
        a: WorkItemId,
        b: WorkItemId,
    ) -> TrackerResult<bool> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM work_item_dependencies
             WHERE (predecessor_id = ?1 AND successor_id = ?2)
                OR (predecessor_id = ?2 AND successor_id = ?1)",
            params![a, b],
            |row| row.get(0),
        )?)
    }

    pub fn insert_dependency(
        &self,
        predecessor_id: WorkItemId,
        successor_id: WorkItemId,
        dependency_type: DependencyType,
    ) -> TrackerResult<DependencyId> {
        self.conn.execute(
            "INSERT INTO work_item_dependencies (predecessor_id, successor_id, dependency_type)
             VALUES (?1, ?2, ?3)",
            params![predecessor_id, successor_id, dependency_type],
        )?;
        Ok(DependencyId(self.conn.last_insert_rowid()))
    }

    pub fn dependency(&self, id: DependencyId) -> TrackerResult<Option<Dependency>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, predecessor_id, successor_id, dependency_type
                 FROM work_item_dependencies WHERE id = ?1",
                params![id],
                dependency_from_row,
            )
            .optional()?)
    }

    /// Dependencies where the item is predecessor or successor
    pub fn dependencies_of(&self, item_id: WorkItemId) -> TrackerResult<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, predecessor_id, successor_id, dependency_type
             FROM work_item_dependencies
             WHERE predecessor_id = ?1 OR successor_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![item_id], dependency_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn delete_dependency(&self, id: DependencyId) -> TrackerResult<()> {
        self.conn.execute(
            "DELETE FROM work_item_dependencies WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    // ---- Comments ----

    pub fn insert_comment(
        &self,
        work_item_id: WorkItemId,
        author_id: UserId,
        content: &str,
    ) -> TrackerResult<CommentId> {
        self.conn.execute(
            "INSERT INTO comments (work_item_id, author_id, content, edited, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![work_item_id, author_id, content, Utc::now()],
        )?;
        Ok(CommentId(self.conn.last_insert_rowid()))
    }

    pub fn comment(&self, id: CommentId) -> TrackerResult<Option<Comment>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, work_item_id, author_id, content, edited, created_at
                 FROM comments WHERE id = ?1",
                params![id],
                comment_from_row,
            )
            .optional()?)
    }

    pub fn comments_for(&self, work_item_id: WorkItemId) -> TrackerResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, work_item_id, author_id, content, edited, created_at
             FROM comments WHERE work_item_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![work_item_id], comment_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn update_comment_content(&self, id: CommentId, content: &str) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE comments SET content = ?2, edited = 1 WHERE id = ?1",
            params![id, content],
        )?;
        Ok(())
    }

    pub fn delete_comment(&self, id: CommentId) -> TrackerResult<()> {
        self.conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ---- Labels ----

    pub fn insert_label(
        &self,
        project_id: Option<ProjectId>,
        name: &str,
        color: &str,
    ) -> TrackerResult<LabelId> {
        self.conn.execute(
            "INSERT INTO labels (project_id, name, color) VALUES (?1, ?2, ?3)",
            params![project_id, name, color],
        )?;
        Ok(LabelId(self.conn.last_insert_rowid()))
    }

    pub fn label(&self, id: LabelId) -> TrackerResult<Option<Label>> {
        let sql = format!("SELECT {} FROM labels l WHERE l.id = ?1", LABEL_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], label_from_row)
            .optional()?)
    }

    /// Whether a label of this name exists in the same scope, other than `except`
    ///
    /// `IS` compares NULL project ids as equal, which the unique
    /// constraint does not.
    pub fn label_name_taken(
        &self,
        project_id: Option<ProjectId>,
        name: &str,
        except: Option<LabelId>,
    ) -> TrackerResult<bool> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM labels
             WHERE project_id IS ?1 AND name = ?2 AND id IS NOT ?3",
            params![project_id, name, except],
            |row| row.get(0),
        )?)
    }

    /// Labels of a project together with the global ones, by name
    pub fn labels_for_project(&self, project_id: ProjectId) -> TrackerResult<Vec<Label>> {
        let sql = format!(
            "SELECT {} FROM labels l
             WHERE l.project_id = ?1 OR l.project_id IS NULL
             ORDER BY l.name, l.id",
            LABEL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], label_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn labels_of_item(&self, work_item_id: WorkItemId) -> TrackerResult<Vec<Label>> {
        let sql = format!(
            "SELECT {} FROM labels l
             JOIN work_item_labels wl ON wl.label_id = l.id
             WHERE wl.work_item_id = ?1
             ORDER BY l.name, l.id",
            LABEL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![work_item_id], label_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn update_label(&self, label: &Label) -> TrackerResult<()> {
        self.conn.execute(
            "UPDATE labels SET name = ?2, color = ?3 WHERE id = ?1",
            params![label.id, label.name, label.color],
        )?;
        Ok(())
    }

    pub fn delete_label(&self, id: LabelId) -> TrackerResult<()> {
        self.conn
            .execute("DELETE FROM labels WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Link a label to an item; linking twice is a no-op
    pub fn attach_label(&self, work_item_id: WorkItemId, label_id: LabelId) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO work_item_labels (work_item_id, label_id) VALUES (?1, ?2)",
            params![work_item_id, label_id],
        )?;
        Ok(())
    }

    pub fn detach_label(&self, work_item_id: WorkItemId, label_id: LabelId) -> TrackerResult<()> {
        self.conn.execute(
            "DELETE FROM work_item_labels WHERE work_item_id = ?1 AND label_id = ?2",
            params![work_item_id, label_id],
        )?;
        Ok(())
    }

    pub fn clear_item_labels(&self, work_item_id: WorkItemId) -> TrackerResult<()> {
        self.conn.execute(
            "DELETE FROM work_item_labels WHERE work_item_id = ?1",
            params![work_item_id],
        )?;
        Ok(())
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        system_role: row.get(3)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        parent_id: row.get(4)?,
        owner_id: row.get(5)?,
        status: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        item_counter: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn sprint_from_row(row: &Row<'_>) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        goal: row.get(3)?,
        status: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        completed_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn work_item_from_row(row: &Row<'_>) -> rusqlite::Result<WorkItem> {
    Ok(WorkItem {
        id: row.get(0)?,
        project_id: row.get(1)?,
        project_key: row.get(2)?,
        item_number: row.get(3)?,
        item_type: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        status: row.get(7)?,
        priority: row.get::<_, Priority>(8)?,
        sprint_id: row.get(9)?,
        parent_id: row.get(10)?,
        assignee_id: row.get(11)?,
        reporter_id: row.get(12)?,
        story_points: row.get(13)?,
        start_date: row.get(14)?,
        due_date: row.get(15)?,
        estimated_hours: row.get(16)?,
        logged_hours: row.get(17)?,
        progress_pct: row.get(18)?,
        completed_at: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

fn label_from_row(row: &Row<'_>) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

fn dependency_from_row(row: &Row<'_>) -> rusqlite::Result<Dependency> {
    Ok(Dependency {
        id: row.get(0)?,
        predecessor_id: row.get(1)?,
        successor_id: row.get(2)?,
        dependency_type: row.get(3)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        work_item_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        edited: row.get(4)?,
        created_at: row.get(5)?,
    })
}
