//! Sprint lifecycle
//!
//! ```text
//! PLANNING --start--> ACTIVE --complete--> COMPLETED
//!     |                  |
//!     +----cancel--------+--cancel--> CANCELLED
//! ```
//!
//! COMPLETED and CANCELLED are terminal. A project has at most one ACTIVE
//! sprint at a time.

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{sql_text_enum, ProjectId, SprintId, UserId, WorkItemId};
use crate::core::project::check_date_range;
use crate::core::tracker::Tracker;
use crate::core::work_item::WorkItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
    Cancelled,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintStatus::Planning => "planning",
            SprintStatus::Active => "active",
            SprintStatus::Completed => "completed",
            SprintStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SprintStatus::Completed | SprintStatus::Cancelled)
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SprintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(SprintStatus::Planning),
            "active" => Ok(SprintStatus::Active),
            "completed" => Ok(SprintStatus::Completed),
            "cancelled" | "canceled" => Ok(SprintStatus::Cancelled),
            _ => Err(format!("Unknown sprint status: {}", s)),
        }
    }
}

sql_text_enum!(SprintStatus);

/// Lifecycle actions a manager can take on a sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintAction {
    Start,
    Complete,
    Cancel,
}

impl fmt::Display for SprintAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SprintAction::Start => "start",
            SprintAction::Complete => "complete",
            SprintAction::Cancel => "cancel",
        };
        write!(f, "{}", name)
    }
}

/// Status reached by applying `action`, `None` if not allowed
pub fn transition(status: SprintStatus, action: SprintAction) -> Option<SprintStatus> {
    use SprintAction::*;
    use SprintStatus::*;

    match (status, action) {
        (Planning, Start) => Some(Active),
        (Active, Complete) => Some(Completed),
        (Planning, Cancel) | (Active, Cancel) => Some(Cancelled),
        _ => None,
    }
}

fn apply(sprint: &Sprint, action: SprintAction) -> TrackerResult<SprintStatus> {
    transition(sprint.status, action).ok_or_else(|| {
        TrackerError::validation(format!(
            "cannot {} sprint '{}' while it is {}",
            action, sprint.name, sprint.status
        ))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    pub goal: Option<String>,
    pub status: SprintStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Sprint {
    pub fn is_active(&self) -> bool {
        self.status == SprintStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewSprint {
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewSprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Tracker {
    pub fn create_sprint(
        &mut self,
        actor: UserId,
        project: ProjectId,
        new: NewSprint,
    ) -> TrackerResult<Sprint> {
        self.store.write(|repo| {
            repo.require_project(project)?;
            repo.access().require_manage_access(project, actor)?;
            if new.name.trim().is_empty() {
                return Err(TrackerError::validation("sprint name cannot be empty"));
            }
            check_date_range(new.start_date, new.end_date, "sprint")?;

            let id = repo.insert_sprint(project, &new)?;
            repo.require_sprint(id)
        })
    }

    /// Change name, goal or dates of a sprint that is not yet terminal
    pub fn update_sprint(
        &mut self,
        actor: UserId,
        id: SprintId,
        update: SprintUpdate,
    ) -> TrackerResult<Sprint> {
        self.store.write(|repo| {
            let mut sprint = repo.require_sprint(id)?;
            repo.access().require_manage_access(sprint.project_id, actor)?;
            if sprint.is_terminal() {
                return Err(TrackerError::validation(format!(
                    "sprint '{}' is {} and can no longer be changed",
                    sprint.name, sprint.status
                )));
            }

            if let Some(name) = update.name {
                if name.trim().is_empty() {
                    return Err(TrackerError::validation("sprint name cannot be empty"));
                }
                sprint.name = name.trim().to_string();
            }
            if update.goal.is_some() {
                sprint.goal = update.goal;
            }
            if update.start_date.is_some() {
                sprint.start_date = update.start_date;
            }
            if update.end_date.is_some() {
                sprint.end_date = update.end_date;
            }
            check_date_range(sprint.start_date, sprint.end_date, "sprint")?;

            repo.update_sprint(&sprint)?;
            Ok(sprint)
        })
    }

    pub fn start_sprint(&mut self, actor: UserId, id: SprintId) -> TrackerResult<Sprint> {
        self.store.write(|repo| {
            let mut sprint = repo.require_sprint(id)?;
            repo.access().require_manage_access(sprint.project_id, actor)?;
            let next = apply(&sprint, SprintAction::Start)?;

            if let Some(active) = repo.active_sprint(sprint.project_id)? {
                return Err(TrackerError::validation(format!(
                    "project already has an active sprint: '{}'",
                    active.name
                )));
            }

            sprint.status = next;
            if sprint.start_date.is_none() {
                sprint.start_date = Some(Local::now().date_naive());
            }
            repo.update_sprint(&sprint)?;
            info!(sprint = %sprint.name, project = %sprint.project_id, "Started sprint");
            Ok(sprint)
        })
    }

    /// Complete an active sprint, returning how many open items were moved
    ///
    /// Items not yet DONE or CANCELLED go to `target`, or to the backlog when
    /// no target is given. Finished items keep pointing at this sprint.
    pub fn complete_sprint(
        &mut self,
        actor: UserId,
        id: SprintId,
        target: Option<SprintId>,
    ) -> TrackerResult<usize> {
        self.store.write(|repo| {
            let mut sprint = repo.require_sprint(id)?;
            repo.access().require_manage_access(sprint.project_id, actor)?;
            let next = apply(&sprint, SprintAction::Complete)?;

            if let Some(target_id) = target {
                if target_id == sprint.id {
                    return Err(TrackerError::validation(
                        "cannot move items into the sprint being completed",
                    ));
                }
                let target = repo.require_sprint(target_id)?;
                if target.project_id != sprint.project_id {
                    return Err(TrackerError::validation(
                        "target sprint belongs to a different project",
                    ));
                }
                if target.is_terminal() {
                    return Err(TrackerError::validation(format!(
                        "target sprint '{}' is {}",
                        target.name, target.status
                    )));
                }
            }

            let migrated = repo.move_open_items(sprint.id, target)?;
            sprint.status = next;
            sprint.completed_at = Some(Utc::now());
            repo.update_sprint(&sprint)?;
            info!(sprint = %sprint.name, migrated, "Completed sprint");
            Ok(migrated)
        })
    }

    /// Cancel a sprint, returning every one of its items to the backlog
    pub fn cancel_sprint(&mut self, actor: UserId, id: SprintId) -> TrackerResult<usize> {
        self.store.write(|repo| {
            let mut sprint = repo.require_sprint(id)?;
            repo.access().require_manage_access(sprint.project_id, actor)?;
            sprint.status = apply(&sprint, SprintAction::Cancel)?;

            let unlinked = repo.clear_sprint_items(sprint.id)?;
            repo.update_sprint(&sprint)?;
            info!(sprint = %sprint.name, unlinked, "Cancelled sprint");
            Ok(unlinked)
        })
    }

    pub fn add_work_item_to_sprint(
        &mut self,
        actor: UserId,
        sprint: SprintId,
        item: WorkItemId,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(item)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            let sprint = repo.require_sprint(sprint)?;

            if sprint.is_terminal() {
                return Err(TrackerError::validation(format!(
                    "sprint '{}' is {}",
                    sprint.name, sprint.status
                )));
            }
            if sprint.project_id != item.project_id {
                return Err(TrackerError::validation(
                    "sprint and work item belong to different projects",
                ));
            }
            if !item.item_type.is_sprintable() {
                return Err(TrackerError::validation(format!(
                    "{} items cannot be planned into a sprint",
                    item.item_type
                )));
            }

            repo.set_work_item_sprint(item.id, Some(sprint.id))?;
            item.sprint_id = Some(sprint.id);
            Ok(item)
        })
    }

    /// Move an item back to the backlog
    pub fn remove_work_item_from_sprint(
        &mut self,
        actor: UserId,
        item: WorkItemId,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(item)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            repo.set_work_item_sprint(item.id, None)?;
            item.sprint_id = None;
            Ok(item)
        })
    }

    pub fn find_sprint(&self, actor: UserId, id: SprintId) -> TrackerResult<Sprint> {
        self.store.read(|repo| {
            let sprint = repo.require_sprint(id)?;
            repo.access().require_access(sprint.project_id, actor)?;
            Ok(sprint)
        })
    }

    pub fn sprints_for_project(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> TrackerResult<Vec<Sprint>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.sprints_for_project(project)
        })
    }

    pub fn active_sprint(&self, actor: UserId, project: ProjectId) -> TrackerResult<Option<Sprint>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.active_sprint(project)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{ProjectRole, SystemRole, User};
    use crate::core::project::{NewProject, Project};
    use crate::core::work_item::{NewWorkItem, WorkItemStatus, WorkItemType};

    struct Setup {
        tracker: Tracker,
        manager: User,
        dev: User,
        project: Project,
    }

    fn setup() -> Setup {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        let manager = tracker
            .create_user(admin.id, "maria", "Maria", SystemRole::User)
            .unwrap();
        let dev = tracker
            .create_user(admin.id, "dev", "Dev", SystemRole::User)
            .unwrap();
        let project = tracker
            .create_project(manager.id, NewProject::new("APP", "Application"))
            .unwrap();
        tracker
            .add_member(manager.id, project.id, dev.id, ProjectRole::TeamMember)
            .unwrap();
        Setup {
            tracker,
            manager,
            dev,
            project,
        }
    }

    fn item(s: &mut Setup, title: &str, sprint: Option<SprintId>) -> WorkItem {
        let mut new = NewWorkItem::new(WorkItemType::Task, title);
        new.sprint_id = sprint;
        s.tracker
            .create_work_item(s.dev.id, s.project.id, new)
            .unwrap()
    }

    #[test]
    fn test_transition_table() {
        use SprintAction::*;
        use SprintStatus::*;

        assert_eq!(transition(Planning, Start), Some(Active));
        assert_eq!(transition(Active, Complete), Some(Completed));
        assert_eq!(transition(Planning, Cancel), Some(Cancelled));
        assert_eq!(transition(Active, Cancel), Some(Cancelled));

        assert_eq!(transition(Planning, Complete), None);
        assert_eq!(transition(Active, Start), None);
        for terminal in [Completed, Cancelled] {
            for action in [Start, Complete, Cancel] {
                assert_eq!(transition(terminal, action), None);
            }
        }
    }

    #[test]
    fn test_create_sprint_requires_manager() {
        let mut s = setup();
        let err = s
            .tracker
            .create_sprint(s.dev.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap_err();
        assert!(err.is_access_denied());

        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        assert_eq!(sprint.status, SprintStatus::Planning);
    }

    #[test]
    fn test_create_sprint_rejects_inverted_dates() {
        let mut s = setup();
        let mut new = NewSprint::new("Sprint 1");
        new.start_date = NaiveDate::from_ymd_opt(2025, 6, 14);
        new.end_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        let err = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, new)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_single_active_sprint() {
        let mut s = setup();
        let first = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let second = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 2"))
            .unwrap();

        let started = s.tracker.start_sprint(s.manager.id, first.id).unwrap();
        assert!(started.is_active());
        assert!(started.start_date.is_some());

        let err = s.tracker.start_sprint(s.manager.id, second.id).unwrap_err();
        assert!(err.is_validation());

        let active = s
            .tracker
            .active_sprint(s.manager.id, s.project.id)
            .unwrap()
            .unwrap();
        assert_eq!(active.id, first.id);
        assert_eq!(
            s.tracker.find_sprint(s.manager.id, second.id).unwrap().status,
            SprintStatus::Planning
        );
    }

    #[test]
    fn test_start_requires_planning() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        s.tracker.start_sprint(s.manager.id, sprint.id).unwrap();
        let err = s.tracker.start_sprint(s.manager.id, sprint.id).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_complete_migrates_open_items_to_backlog() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let done = item(&mut s, "Done", Some(sprint.id));
        let open_a = item(&mut s, "Open A", Some(sprint.id));
        let open_b = item(&mut s, "Open B", Some(sprint.id));
        s.tracker
            .change_status(s.dev.id, done.id, WorkItemStatus::Done)
            .unwrap();
        s.tracker.start_sprint(s.manager.id, sprint.id).unwrap();

        let migrated = s
            .tracker
            .complete_sprint(s.manager.id, sprint.id, None)
            .unwrap();
        assert_eq!(migrated, 2);

        let sprint = s.tracker.find_sprint(s.manager.id, sprint.id).unwrap();
        assert_eq!(sprint.status, SprintStatus::Completed);
        assert!(sprint.completed_at.is_some());

        let backlog: Vec<_> = s
            .tracker
            .backlog(s.manager.id, s.project.id)
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(backlog, vec![open_a.id, open_b.id]);

        let done = s.tracker.find_work_item(s.manager.id, done.id).unwrap();
        assert_eq!(done.sprint_id, Some(sprint.id));
    }

    #[test]
    fn test_complete_migrates_to_target_sprint() {
        let mut s = setup();
        let current = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let next = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 2"))
            .unwrap();
        let open = item(&mut s, "Carry over", Some(current.id));
        s.tracker.start_sprint(s.manager.id, current.id).unwrap();

        assert_eq!(
            s.tracker
                .complete_sprint(s.manager.id, current.id, Some(next.id))
                .unwrap(),
            1
        );
        let open = s.tracker.find_work_item(s.manager.id, open.id).unwrap();
        assert_eq!(open.sprint_id, Some(next.id));
    }

    #[test]
    fn test_complete_rejects_bad_targets() {
        let mut s = setup();
        let current = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let cancelled = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Dropped"))
            .unwrap();
        s.tracker.cancel_sprint(s.manager.id, cancelled.id).unwrap();
        s.tracker.start_sprint(s.manager.id, current.id).unwrap();

        assert!(s
            .tracker
            .complete_sprint(s.manager.id, current.id, Some(current.id))
            .unwrap_err()
            .is_validation());
        assert!(s
            .tracker
            .complete_sprint(s.manager.id, current.id, Some(cancelled.id))
            .unwrap_err()
            .is_validation());
        assert!(s
            .tracker
            .complete_sprint(s.manager.id, current.id, Some(SprintId(999)))
            .unwrap_err()
            .is_not_found());

        // Failed attempts leave the sprint active
        assert!(s
            .tracker
            .find_sprint(s.manager.id, current.id)
            .unwrap()
            .is_active());
    }

    #[test]
    fn test_complete_requires_active() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let err = s
            .tracker
            .complete_sprint(s.manager.id, sprint.id, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_cancel_unlinks_all_items() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let done = item(&mut s, "Done", Some(sprint.id));
        item(&mut s, "Open", Some(sprint.id));
        s.tracker
            .change_status(s.dev.id, done.id, WorkItemStatus::Done)
            .unwrap();
        s.tracker.start_sprint(s.manager.id, sprint.id).unwrap();

        assert_eq!(s.tracker.cancel_sprint(s.manager.id, sprint.id).unwrap(), 2);
        assert!(s
            .tracker
            .sprint_items(s.manager.id, sprint.id)
            .unwrap()
            .is_empty());
        assert_eq!(
            s.tracker.backlog(s.manager.id, s.project.id).unwrap().len(),
            2
        );

        // A cancelled sprint frees the active slot
        let next = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 2"))
            .unwrap();
        s.tracker.start_sprint(s.manager.id, next.id).unwrap();
    }

    #[test]
    fn test_terminal_sprint_rejects_update_and_items() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        s.tracker.cancel_sprint(s.manager.id, sprint.id).unwrap();

        let err = s
            .tracker
            .update_sprint(
                s.manager.id,
                sprint.id,
                SprintUpdate {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        let task = item(&mut s, "Task", None);
        let err = s
            .tracker
            .add_work_item_to_sprint(s.dev.id, sprint.id, task.id)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_only_sprintable_types_join_sprints() {
        let mut s = setup();
        let sprint = s
            .tracker
            .create_sprint(s.manager.id, s.project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let epic = s
            .tracker
            .create_work_item(
                s.dev.id,
                s.project.id,
                NewWorkItem::new(WorkItemType::Epic, "Big theme"),
            )
            .unwrap();
        let err = s
            .tracker
            .add_work_item_to_sprint(s.dev.id, sprint.id, epic.id)
            .unwrap_err();
        assert!(err.is_validation());

        let story = s
            .tracker
            .create_work_item(
                s.dev.id,
                s.project.id,
                NewWorkItem::new(WorkItemType::Story, "User story"),
            )
            .unwrap();
        let story = s
            .tracker
            .add_work_item_to_sprint(s.dev.id, sprint.id, story.id)
            .unwrap();
        assert_eq!(story.sprint_id, Some(sprint.id));

        let story = s
            .tracker
            .remove_work_item_from_sprint(s.dev.id, story.id)
            .unwrap();
        assert_eq!(story.sprint_id, None);
    }

    #[test]
    fn test_sprint_from_other_project_rejected() {
        let mut s = setup();
        let other = s
            .tracker
            .create_project(s.manager.id, NewProject::new("OTHER", "Other"))
            .unwrap();
        let foreign = s
            .tracker
            .create_sprint(s.manager.id, other.id, NewSprint::new("Foreign"))
            .unwrap();
        let task = item(&mut s, "Task", None);
        let err = s
            .tracker
            .add_work_item_to_sprint(s.manager.id, foreign.id, task.id)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_concurrent_starts_leave_one_active_sprint() {
        use crate::core::store::DEFAULT_BUSY_TIMEOUT;
        use std::sync::{Arc, Barrier};
        use std::thread;
        use tempfile::tempdir;

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sprinter.db");

        let (admin, sprints) = {
            let mut tracker = Tracker::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
            let admin = tracker.bootstrap_admin("root", "Root").unwrap();
            let project = tracker
                .create_project(admin.id, NewProject::new("RACE", "Race"))
                .unwrap();
            let sprints: Vec<SprintId> = ["One", "Two"]
                .iter()
                .map(|name| {
                    tracker
                        .create_sprint(admin.id, project.id, NewSprint::new(*name))
                        .unwrap()
                        .id
                })
                .collect();
            (admin.id, sprints)
        };

        let barrier = Arc::new(Barrier::new(sprints.len()));
        let handles: Vec<_> = sprints
            .iter()
            .map(|&sprint| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut tracker = Tracker::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
                    barrier.wait();
                    tracker.start_sprint(admin, sprint)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let started = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(started, 1);
        let rejected: Vec<_> = results.into_iter().filter_map(Result::err).collect();
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].is_validation());

        let tracker = Tracker::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let statuses: Vec<SprintStatus> = sprints
            .iter()
            .map(|&id| tracker.find_sprint(admin, id).unwrap().status)
            .collect();
        assert_eq!(
            statuses.iter().filter(|s| **s == SprintStatus::Active).count(),
            1
        );
    }
}
