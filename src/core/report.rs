//! Progress summaries for projects and sprints

use serde::Serialize;

use crate::core::error::TrackerResult;
use crate::core::identity::{ProjectId, SprintId, UserId};
use crate::core::tracker::Tracker;
use crate::core::work_item::{WorkItem, WorkItemStatus};

/// Whole-number share of `part` in `total`, rounded down; 0 when empty
pub fn percent(part: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    (part.clamp(0, total) * 100 / total) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintProgress {
    pub total: usize,
    pub completed: usize,
    pub story_points: i64,
    pub completed_story_points: i64,
    pub percent: u8,
}

impl SprintProgress {
    pub fn from_items(items: &[WorkItem]) -> Self {
        let mut progress = Self {
            total: items.len(),
            completed: 0,
            story_points: 0,
            completed_story_points: 0,
            percent: 0,
        };
        for item in items {
            let points = i64::from(item.story_points.unwrap_or(0));
            progress.story_points += points;
            if item.status.is_terminal() {
                progress.completed += 1;
                progress.completed_story_points += points;
            }
        }
        progress.percent = percent(progress.completed as i64, progress.total as i64);
        progress
    }
}

impl Tracker {
    /// Count of items in every status, zeros included, in workflow order
    pub fn project_status_counts(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> TrackerResult<Vec<(WorkItemStatus, i64)>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            let stored = repo.status_counts(project)?;
            Ok(WorkItemStatus::ALL
                .iter()
                .map(|status| {
                    let count = stored
                        .iter()
                        .find(|(s, _)| s == status)
                        .map_or(0, |(_, n)| *n);
                    (*status, count)
                })
                .collect())
        })
    }

    /// Share of DONE or CANCELLED items in the project
    pub fn project_completion_percent(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> TrackerResult<u8> {
        let counts = self.project_status_counts(actor, project)?;
        let total: i64 = counts.iter().map(|(_, n)| n).sum();
        let done: i64 = counts
            .iter()
            .filter(|(status, _)| status.is_terminal())
            .map(|(_, n)| n)
            .sum();
        Ok(percent(done, total))
    }

    pub fn sprint_progress(&self, actor: UserId, sprint: SprintId) -> TrackerResult<SprintProgress> {
        let items = self.sprint_items(actor, sprint)?;
        Ok(SprintProgress::from_items(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::SystemRole;
    use crate::core::project::NewProject;
    use crate::core::sprint::NewSprint;
    use crate::core::work_item::{NewWorkItem, WorkItemType};

    #[test]
    fn test_percent_rounds_down() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_project_reports() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        let project = tracker
            .create_project(admin.id, NewProject::new("REP", "Reports"))
            .unwrap();
        assert_eq!(
            tracker
                .project_completion_percent(admin.id, project.id)
                .unwrap(),
            0
        );

        let sprint = tracker
            .create_sprint(admin.id, project.id, NewSprint::new("Sprint 1"))
            .unwrap();
        let mut ids = Vec::new();
        for (title, points) in [("a", 3), ("b", 5), ("c", 2)] {
            let mut new = NewWorkItem::new(WorkItemType::Task, title);
            new.sprint_id = Some(sprint.id);
            new.story_points = Some(points);
            ids.push(tracker.create_work_item(admin.id, project.id, new).unwrap().id);
        }
        tracker
            .change_status(admin.id, ids[0], WorkItemStatus::Done)
            .unwrap();
        tracker
            .change_status(admin.id, ids[1], WorkItemStatus::InProgress)
            .unwrap();

        let counts = tracker.project_status_counts(admin.id, project.id).unwrap();
        assert_eq!(counts.len(), WorkItemStatus::ALL.len());
        assert!(counts.contains(&(WorkItemStatus::ToDo, 1)));
        assert!(counts.contains(&(WorkItemStatus::InProgress, 1)));
        assert!(counts.contains(&(WorkItemStatus::Done, 1)));
        assert!(counts.contains(&(WorkItemStatus::Cancelled, 0)));

        assert_eq!(
            tracker
                .project_completion_percent(admin.id, project.id)
                .unwrap(),
            33
        );

        let progress = tracker.sprint_progress(admin.id, sprint.id).unwrap();
        assert_eq!(
            progress,
            SprintProgress {
                total: 3,
                completed: 1,
                story_points: 10,
                completed_story_points: 3,
                percent: 33,
            }
        );
    }

    #[test]
    fn test_reports_require_access() {
        let mut tracker = Tracker::open_in_memory().unwrap();
        let admin = tracker.bootstrap_admin("root", "Root").unwrap();
        let outsider = tracker
            .create_user(admin.id, "out", "Out", SystemRole::User)
            .unwrap();
        let project = tracker
            .create_project(admin.id, NewProject::new("REP", "Reports"))
            .unwrap();
        assert!(tracker
            .project_status_counts(outsider.id, project.id)
            .unwrap_err()
            .is_access_denied());
    }
}
