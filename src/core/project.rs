//! Project hierarchy, membership management and the item-number allocator

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{sql_text_enum, ProjectId, ProjectMember, ProjectRole, UserId};
use crate::core::key::ProjectKey;
use crate::core::store::Repo;
use crate::core::tracker::Tracker;

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
    /// Hidden from listings, never physically deleted
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "active" => Ok(ProjectStatus::Active),
            "on_hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

sql_text_enum!(ProjectStatus);

/// A project (or subproject) row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<ProjectId>,
    pub owner_id: Option<UserId>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Last item number handed out; only item creation advances it
    pub item_counter: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for project creation
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewProject {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Changes applied by `update_project`; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub(crate) fn check_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    what: &str,
) -> TrackerResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(TrackerError::validation(format!(
                "{} end date cannot be before its start date",
                what
            )));
        }
    }
    Ok(())
}

impl Repo<'_> {
    /// Hand out the next sequential item number of a project
    pub fn next_item_number(&self, project: ProjectId) -> TrackerResult<i64> {
        self.increment_item_counter(project)?
            .ok_or_else(|| TrackerError::not_found("Project", project))
    }

    fn create_project_row(
        &self,
        actor: UserId,
        parent: Option<ProjectId>,
        new: &NewProject,
    ) -> TrackerResult<Project> {
        self.require_active_user(actor)?;
        let key = ProjectKey::parse(&new.key)?;
        if new.name.trim().is_empty() {
            return Err(TrackerError::validation("project name cannot be empty"));
        }
        check_date_range(new.start_date, new.end_date, "project")?;
        if self.project_key_exists(&key)? {
            return Err(TrackerError::validation(format!(
                "project key '{}' is already in use",
                key
            )));
        }

        let id = self.insert_project(&key, new, parent, actor)?;
        // The creator always starts out as the project's manager
        self.insert_member(id, actor, ProjectRole::Manager)?;
        self.require_project(id)
    }

    fn ensure_manager_remains(
        &self,
        project: ProjectId,
        current: ProjectRole,
        replacement: Option<ProjectRole>,
    ) -> TrackerResult<()> {
        let loses_manager =
            current == ProjectRole::Manager && replacement != Some(ProjectRole::Manager);
        if loses_manager && self.count_direct_managers(project)? <= 1 {
            return Err(TrackerError::validation(
                "project must retain at least one manager",
            ));
        }
        Ok(())
    }
}

impl Tracker {
    /// Create a root project; the creator becomes its manager
    pub fn create_project(&mut self, actor: UserId, new: NewProject) -> TrackerResult<Project> {
        self.store.write(|repo| {
            let project = repo.create_project_row(actor, None, &new)?;
            info!(key = %project.key, name = %project.name, "Created project");
            Ok(project)
        })
    }

    /// Create a project under an existing one; requires manage access on the parent
    pub fn create_subproject(
        &mut self,
        actor: UserId,
        parent: ProjectId,
        new: NewProject,
    ) -> TrackerResult<Project> {
        self.store.write(|repo| {
            let parent = repo.require_project(parent)?;
            repo.access().require_manage_access(parent.id, actor)?;
            let project = repo.create_project_row(actor, Some(parent.id), &new)?;
            info!(key = %project.key, parent = %parent.key, "Created subproject");
            Ok(project)
        })
    }

    pub fn update_project(
        &mut self,
        actor: UserId,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> TrackerResult<Project> {
        self.store.write(|repo| {
            let mut project = repo.require_project(id)?;
            repo.access().require_manage_access(id, actor)?;

            if let Some(name) = update.name {
                if name.trim().is_empty() {
                    return Err(TrackerError::validation("project name cannot be empty"));
                }
                project.name = name.trim().to_string();
            }
            if update.description.is_some() {
                project.description = update.description;
            }
            if let Some(status) = update.status {
                project.status = status;
            }
            if update.start_date.is_some() {
                project.start_date = update.start_date;
            }
            if update.end_date.is_some() {
                project.end_date = update.end_date;
            }
            check_date_range(project.start_date, project.end_date, "project")?;

            repo.update_project(&project)?;
            Ok(project)
        })
    }

    pub fn archive_project(&mut self, actor: UserId, id: ProjectId) -> TrackerResult<Project> {
        self.store.write(|repo| {
            let mut project = repo.require_project(id)?;
            repo.access().require_manage_access(id, actor)?;
            project.status = ProjectStatus::Archived;
            repo.update_project(&project)?;
            info!(key = %project.key, "Archived project");
            Ok(project)
        })
    }

    pub fn find_project(&self, actor: UserId, id: ProjectId) -> TrackerResult<Project> {
        self.store.read(|repo| {
            let project = repo.require_project(id)?;
            repo.access().require_access(id, actor)?;
            Ok(project)
        })
    }

    pub fn find_project_by_key(&self, actor: UserId, key: &str) -> TrackerResult<Project> {
        self.store.read(|repo| {
            let project = repo
                .project_by_key(key)?
                .ok_or_else(|| TrackerError::not_found("Project", key.trim()))?;
            repo.access().require_access(project.id, actor)?;
            Ok(project)
        })
    }

    /// Projects visible to the actor
    ///
    /// Administrators see every non-archived root project; other users see
    /// the non-archived projects they are direct members of.
    pub fn list_projects(&self, actor: UserId) -> TrackerResult<Vec<Project>> {
        self.store.read(|repo| {
            let user = repo.require_user(actor)?;
            if !user.can_authorize() {
                return Ok(Vec::new());
            }
            if user.is_admin() {
                repo.root_projects()
            } else {
                repo.projects_for_member(actor)
            }
        })
    }

    pub fn subprojects(&self, actor: UserId, id: ProjectId) -> TrackerResult<Vec<Project>> {
        self.store.read(|repo| {
            repo.require_project(id)?;
            repo.access().require_access(id, actor)?;
            repo.subprojects(id)
        })
    }

    /// Allocate a number without creating an item
    pub fn next_item_number(&mut self, actor: UserId, project: ProjectId) -> TrackerResult<i64> {
        self.store.write(|repo| {
            repo.require_project(project)?;
            repo.access().require_content_edit_access(project, actor)?;
            repo.next_item_number(project)
        })
    }

    // ---- Members ----

    /// Add a direct member; an existing membership has its role updated
    pub fn add_member(
        &mut self,
        actor: UserId,
        project: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> TrackerResult<ProjectMember> {
        self.store.write(|repo| {
            let project = repo.require_project(project)?;
            repo.access().require_manage_access(project.id, actor)?;
            let member = repo.require_user(user)?;

            match repo.direct_role(project.id, user)? {
                Some(current) => {
                    repo.ensure_manager_remains(project.id, current, Some(role))?;
                    repo.set_member_role(project.id, user, role)?;
                }
                None => {
                    repo.insert_member(project.id, user, role)?;
                    info!(username = %member.username, project = %project.key, role = %role, "Added member");
                }
            }

            Ok(ProjectMember {
                project_id: project.id,
                user_id: user,
                username: member.username,
                role,
            })
        })
    }

    pub fn update_member_role(
        &mut self,
        actor: UserId,
        project: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> TrackerResult<ProjectMember> {
        self.store.write(|repo| {
            repo.require_project(project)?;
            repo.access().require_manage_access(project, actor)?;
            let member = repo.require_user(user)?;
            let current = repo
                .direct_role(project, user)?
                .ok_or_else(|| TrackerError::not_found("Project member", &member.username))?;

            repo.ensure_manager_remains(project, current, Some(role))?;
            repo.set_member_role(project, user, role)?;

            Ok(ProjectMember {
                project_id: project,
                user_id: user,
                username: member.username,
                role,
            })
        })
    }

    /// Remove a direct membership
    ///
    /// The last direct manager of a project cannot be removed, even when
    /// inherited managers exist further up the tree.
    pub fn remove_member(
        &mut self,
        actor: UserId,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<()> {
        self.store.write(|repo| {
            let project = repo.require_project(project)?;
            repo.access().require_manage_access(project.id, actor)?;
            let current = repo
                .direct_role(project.id, user)?
                .ok_or_else(|| TrackerError::not_found("Project member", user))?;

            repo.ensure_manager_remains(project.id, current, None)?;
            repo.delete_member(project.id, user)?;
            info!(user = %user, project = %project.key, "Removed member");
            Ok(())
        })
    }

    pub fn list_members(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> TrackerResult<Vec<ProjectMember>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.members(project)
        })
    }
}
