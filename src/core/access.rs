//! Effective-role resolution with inheritance along the project tree
//!
//! A user's role in a project is, in order:
//! 1. nothing, if the user is unknown or deactivated
//! 2. MANAGER, if the user is a system administrator
//! 3. the role of the nearest project on the path from the queried project
//!    up to its root that has a direct membership for the user
//!
//! The nearest membership wins outright; roles are never merged across
//! ancestors.

use std::collections::HashSet;

use tracing::warn;

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{ProjectId, ProjectRole, UserId};
use crate::core::store::Repo;
use crate::core::tracker::Tracker;

/// Authorization-relevant facts about a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStanding {
    pub is_admin: bool,
    pub active: bool,
}

/// Lookups the resolver needs, served by the store or by plain test data
pub trait MembershipSource {
    /// Standing of the user, `None` if no such user exists
    fn standing(&self, user: UserId) -> TrackerResult<Option<UserStanding>>;

    /// Direct membership role on exactly this project
    fn direct_role(&self, project: ProjectId, user: UserId) -> TrackerResult<Option<ProjectRole>>;

    /// Parent of the project, `None` for a root
    fn parent_of(&self, project: ProjectId) -> TrackerResult<Option<ProjectId>>;
}

impl MembershipSource for Repo<'_> {
    fn standing(&self, user: UserId) -> TrackerResult<Option<UserStanding>> {
        Ok(self.user(user)?.map(|u| UserStanding {
            is_admin: u.is_admin(),
            active: u.can_authorize(),
        }))
    }

    fn direct_role(&self, project: ProjectId, user: UserId) -> TrackerResult<Option<ProjectRole>> {
        Repo::direct_role(self, project, user)
    }

    fn parent_of(&self, project: ProjectId) -> TrackerResult<Option<ProjectId>> {
        self.project_parent(project)
    }
}

/// Computes effective roles and enforces the three access levels
pub struct AccessResolver<'a, S: MembershipSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: MembershipSource + ?Sized> AccessResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Role the user is treated as holding in the project, if any
    pub fn effective_role(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<Option<ProjectRole>> {
        let Some(standing) = self.source.standing(user)? else {
            return Ok(None);
        };
        if !standing.active {
            return Ok(None);
        }
        if standing.is_admin {
            return Ok(Some(ProjectRole::Manager));
        }

        let mut visited = HashSet::new();
        let mut current = Some(project);
        while let Some(id) = current {
            if !visited.insert(id) {
                warn!(project = %project, at = %id, "Cycle in project parent chain");
                break;
            }
            if let Some(role) = self.source.direct_role(id, user)? {
                return Ok(Some(role));
            }
            current = self.source.parent_of(id)?;
        }

        Ok(None)
    }

    /// Any role at all
    pub fn require_access(&self, project: ProjectId, user: UserId) -> TrackerResult<ProjectRole> {
        self.effective_role(project, user)?
            .ok_or_else(|| TrackerError::access_denied("you do not have access to this project"))
    }

    /// MANAGER or TEAM_MEMBER
    pub fn require_content_edit_access(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<ProjectRole> {
        let role = self.require_access(project, user)?;
        if !role.can_edit_content() {
            return Err(TrackerError::access_denied(
                "you do not have permission to edit content in this project",
            ));
        }
        Ok(role)
    }

    /// MANAGER only
    pub fn require_manage_access(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<ProjectRole> {
        let role = self.require_access(project, user)?;
        if !role.can_manage_project() {
            return Err(TrackerError::access_denied(
                "only a project manager can manage this project",
            ));
        }
        Ok(role)
    }
}

impl<'c> Repo<'c> {
    pub fn access(&self) -> AccessResolver<'_, Self> {
        AccessResolver::new(self)
    }
}

impl Tracker {
    pub fn effective_role(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<Option<ProjectRole>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().effective_role(project, user)
        })
    }

    pub fn require_access(&self, project: ProjectId, user: UserId) -> TrackerResult<ProjectRole> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, user)
        })
    }

    pub fn require_content_edit_access(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<ProjectRole> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_content_edit_access(project, user)
        })
    }

    pub fn require_manage_access(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> TrackerResult<ProjectRole> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_manage_access(project, user)
        })
    }
}
