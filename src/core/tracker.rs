//! The `Tracker` facade and the identity-store operations
//!
//! Every operation takes the acting user explicitly; the tracker holds no
//! notion of a "current user". Project, sprint and work item operations are
//! implemented next to their types in `project`, `sprint` and `work_item`.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{
    CommentId, ProjectId, SprintId, SystemRole, User, UserId, WorkItemId,
};
use crate::core::project::Project;
use crate::core::sprint::Sprint;
use crate::core::store::{Repo, Store};
use crate::core::work_item::{Comment, WorkItem};

/// Entry point for callers of the tracking core
pub struct Tracker {
    pub(crate) store: Store,
}

impl Tracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open a tracker over a database file
    pub fn open(path: &Path, busy_timeout: Duration) -> TrackerResult<Self> {
        Ok(Self::new(Store::open(path, busy_timeout)?))
    }

    /// Open a tracker over a private in-memory database
    pub fn open_in_memory() -> TrackerResult<Self> {
        Ok(Self::new(Store::open_in_memory()?))
    }

    // ---- Identity ----

    /// Create the first administrator of an empty tracker
    pub fn bootstrap_admin(&mut self, username: &str, display_name: &str) -> TrackerResult<User> {
        self.store.write(|repo| {
            if repo.count_users()? > 0 {
                return Err(TrackerError::validation(
                    "tracker already has users; ask an administrator to add you",
                ));
            }
            let user = insert_user(repo, username, display_name, SystemRole::Admin)?;
            info!(username = %user.username, "Bootstrapped administrator");
            Ok(user)
        })
    }

    /// Provision a user (administrators only)
    pub fn create_user(
        &mut self,
        actor: UserId,
        username: &str,
        display_name: &str,
        system_role: SystemRole,
    ) -> TrackerResult<User> {
        self.store.write(|repo| {
            require_admin(repo, actor)?;
            let user = insert_user(repo, username, display_name, system_role)?;
            info!(username = %user.username, role = %user.system_role, "Created user");
            Ok(user)
        })
    }

    /// Deactivate a user; they immediately lose every role
    pub fn deactivate_user(&mut self, actor: UserId, user: UserId) -> TrackerResult<User> {
        self.store.write(|repo| {
            require_admin(repo, actor)?;
            if actor == user {
                return Err(TrackerError::validation("you cannot deactivate yourself"));
            }
            let mut target = repo.require_user(user)?;
            repo.set_user_active(user, false)?;
            target.active = false;
            info!(username = %target.username, "Deactivated user");
            Ok(target)
        })
    }

    pub fn find_user(&self, id: UserId) -> TrackerResult<User> {
        self.store.read(|repo| repo.require_user(id))
    }

    pub fn find_user_by_username(&self, username: &str) -> TrackerResult<User> {
        self.store.read(|repo| {
            repo.user_by_username(username)?
                .ok_or_else(|| TrackerError::not_found("User", username))
        })
    }

    pub fn users(&self) -> TrackerResult<Vec<User>> {
        self.store.read(|repo| repo.users())
    }
}

fn insert_user(
    repo: &Repo<'_>,
    username: &str,
    display_name: &str,
    system_role: SystemRole,
) -> TrackerResult<User> {
    let username = username.trim();
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(TrackerError::validation(
            "username must be non-empty and contain no whitespace",
        ));
    }
    if repo.user_by_username(username)?.is_some() {
        return Err(TrackerError::validation(format!(
            "username '{}' is already taken",
            username
        )));
    }
    let display_name = match display_name.trim() {
        "" => username,
        name => name,
    };
    let id = repo.insert_user(username, display_name, system_role)?;
    repo.require_user(id)
}

fn require_admin(repo: &Repo<'_>, actor: UserId) -> TrackerResult<User> {
    let user = repo.require_user(actor)?;
    if !(user.is_admin() && user.can_authorize()) {
        return Err(TrackerError::access_denied(
            "only an administrator can manage users",
        ));
    }
    Ok(user)
}

/// Lookups that turn a missing row into `NotFound`
impl Repo<'_> {
    pub fn require_user(&self, id: UserId) -> TrackerResult<User> {
        self.user(id)?
            .ok_or_else(|| TrackerError::not_found("User", id))
    }

    /// Resolve a user who is allowed to act; deactivated users are refused
    pub fn require_active_user(&self, id: UserId) -> TrackerResult<User> {
        let user = self.require_user(id)?;
        if !user.can_authorize() {
            return Err(TrackerError::access_denied(format!(
                "user '{}' is deactivated",
                user.username
            )));
        }
        Ok(user)
    }

    pub fn require_project(&self, id: ProjectId) -> TrackerResult<Project> {
        self.project(id)?
            .ok_or_else(|| TrackerError::not_found("Project", id))
    }

    pub fn require_sprint(&self, id: SprintId) -> TrackerResult<Sprint> {
        self.sprint(id)?
            .ok_or_else(|| TrackerError::not_found("Sprint", id))
    }

    pub fn require_work_item(&self, id: WorkItemId) -> TrackerResult<WorkItem> {
        self.work_item(id)?
            .ok_or_else(|| TrackerError::not_found("Work item", id))
    }

    pub fn require_comment(&self, id: CommentId) -> TrackerResult<Comment> {
        self.comment(id)?
            .ok_or_else(|| TrackerError::not_found("Comment", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_only_once() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        assert!(admin.is_admin());

        let err = tracker.bootstrap_admin("other", "Other").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_only_admin_creates_users() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "").unwrap();
        assert_eq!(admin.display_name, "root");

        let alice = tracker
            .create_user(admin.id, "alice", "Alice", SystemRole::User)
            .unwrap();
        let err = tracker
            .create_user(alice.id, "bob", "Bob", SystemRole::User)
            .unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_duplicate_username_case_insensitive() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        tracker
            .create_user(admin.id, "alice", "Alice", SystemRole::User)
            .unwrap();

        let err = tracker
            .create_user(admin.id, "ALICE", "Alice again", SystemRole::User)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(tracker.find_user_by_username("Alice").unwrap().username, "alice");
    }

    #[test]
    fn test_deactivate_user() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        let alice = tracker
            .create_user(admin.id, "alice", "Alice", SystemRole::User)
            .unwrap();

        assert!(tracker
            .deactivate_user(admin.id, admin.id)
            .unwrap_err()
            .is_validation());

        let alice = tracker.deactivate_user(admin.id, alice.id).unwrap();
        assert!(!alice.active);
        assert!(!tracker.find_user(alice.id).unwrap().active);
    }

    #[test]
    fn test_deactivated_user_cannot_create_projects() {
        use crate::core::project::NewProject;

        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        let bob = tracker
            .create_user(admin.id, "bob", "Bob", SystemRole::User)
            .unwrap();
        tracker.deactivate_user(admin.id, bob.id).unwrap();

        let err = tracker
            .create_project(bob.id, NewProject::new("GHOST", "Ghost"))
            .unwrap_err();
        assert!(err.is_access_denied());

        // Nothing was written: the key is still free
        let project = tracker
            .create_project(admin.id, NewProject::new("GHOST", "Ghost"))
            .unwrap();
        let members = tracker.list_members(admin.id, project.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username, "root");
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let tracker = Tracker::open_in_memory().unwrap();
        assert!(tracker.find_user(UserId(99)).unwrap_err().is_not_found());
        assert!(tracker
            .find_user_by_username("ghost")
            .unwrap_err()
            .is_not_found());
    }
}
