//! Work items, their status workflow, dependencies and comments

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{
    sql_text_enum, CommentId, DependencyId, LabelId, ProjectId, SprintId, UserId, WorkItemId,
};
use crate::core::key::ItemKey;
use crate::core::project::check_date_range;
use crate::core::store::Repo;
use crate::core::tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemType {
    Task,
    #[value(alias = "bug")]
    Issue,
    Story,
    Epic,
    Article,
}

impl WorkItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemType::Task => "task",
            WorkItemType::Issue => "issue",
            WorkItemType::Story => "story",
            WorkItemType::Epic => "epic",
            WorkItemType::Article => "article",
        }
    }

    /// Epics and articles live outside sprints
    pub fn is_sprintable(&self) -> bool {
        matches!(
            self,
            WorkItemType::Task | WorkItemType::Issue | WorkItemType::Story
        )
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(WorkItemType::Task),
            "issue" | "bug" => Ok(WorkItemType::Issue),
            "story" => Ok(WorkItemType::Story),
            "epic" => Ok(WorkItemType::Epic),
            "article" => Ok(WorkItemType::Article),
            _ => Err(format!("Unknown work item type: {}", s)),
        }
    }
}

sql_text_enum!(WorkItemType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    #[default]
    #[value(alias = "todo")]
    ToDo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

impl WorkItemStatus {
    pub const ALL: [WorkItemStatus; 5] = [
        WorkItemStatus::ToDo,
        WorkItemStatus::InProgress,
        WorkItemStatus::InReview,
        WorkItemStatus::Done,
        WorkItemStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemStatus::ToDo => "to_do",
            WorkItemStatus::InProgress => "in_progress",
            WorkItemStatus::InReview => "in_review",
            WorkItemStatus::Done => "done",
            WorkItemStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkItemStatus::Done | WorkItemStatus::Cancelled)
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "to_do" | "todo" => Ok(WorkItemStatus::ToDo),
            "in_progress" => Ok(WorkItemStatus::InProgress),
            "in_review" => Ok(WorkItemStatus::InReview),
            "done" => Ok(WorkItemStatus::Done),
            "cancelled" | "canceled" => Ok(WorkItemStatus::Cancelled),
            _ => Err(format!("Unknown work item status: {}", s)),
        }
    }
}

sql_text_enum!(WorkItemStatus);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Highest,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Lowest => "lowest",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Highest => "highest",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lowest" => Ok(Priority::Lowest),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "highest" => Ok(Priority::Highest),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

sql_text_enum!(Priority);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    #[default]
    #[value(alias = "fs")]
    FinishToStart,
    #[value(alias = "ss")]
    StartToStart,
    #[value(alias = "ff")]
    FinishToFinish,
    #[value(alias = "sf")]
    StartToFinish,
    Blocks,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "finish_to_start",
            DependencyType::StartToStart => "start_to_start",
            DependencyType::FinishToFinish => "finish_to_finish",
            DependencyType::StartToFinish => "start_to_finish",
            DependencyType::Blocks => "blocks",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "finish_to_start" | "fs" => Ok(DependencyType::FinishToStart),
            "start_to_start" | "ss" => Ok(DependencyType::StartToStart),
            "finish_to_finish" | "ff" => Ok(DependencyType::FinishToFinish),
            "start_to_finish" | "sf" => Ok(DependencyType::StartToFinish),
            "blocks" => Ok(DependencyType::Blocks),
            _ => Err(format!("Unknown dependency type: {}", s)),
        }
    }
}

sql_text_enum!(DependencyType);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub project_id: ProjectId,
    pub project_key: String,
    pub item_number: i64,
    pub item_type: WorkItemType,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkItemStatus,
    pub priority: Priority,
    /// `None` means the item sits in the backlog
    pub sprint_id: Option<SprintId>,
    pub parent_id: Option<WorkItemId>,
    pub assignee_id: Option<UserId>,
    pub reporter_id: Option<UserId>,
    pub story_points: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    /// Running total of `log_hours`
    pub logged_hours: f64,
    /// Always within 0..=100
    pub progress_pct: u8,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.project_key, self.item_number)
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkItem {
    pub item_type: WorkItemType,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub sprint_id: Option<SprintId>,
    pub parent_id: Option<WorkItemId>,
    pub assignee_id: Option<UserId>,
    pub story_points: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    /// Initial progress, clamped like `change_progress`
    pub progress_pct: Option<u8>,
    pub label_ids: Vec<LabelId>,
}

impl NewWorkItem {
    pub fn new(item_type: WorkItemType, title: impl Into<String>) -> Self {
        Self {
            item_type,
            title: title.into(),
            description: None,
            priority: None,
            sprint_id: None,
            parent_id: None,
            assignee_id: None,
            story_points: None,
            start_date: None,
            due_date: None,
            estimated_hours: None,
            progress_pct: None,
            label_ids: Vec::new(),
        }
    }
}

/// Field edits for `update_work_item`
///
/// Outer `None` leaves a field alone; `Some(None)` clears an optional one.
#[derive(Debug, Clone, Default)]
pub struct WorkItemUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<UserId>>,
    pub story_points: Option<Option<i32>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimated_hours: Option<Option<f64>>,
    /// Replaces the whole label set
    pub label_ids: Option<Vec<LabelId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,
    pub predecessor_id: WorkItemId,
    pub successor_id: WorkItemId,
    pub dependency_type: DependencyType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub work_item_id: WorkItemId,
    pub author_id: Option<UserId>,
    pub content: String,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

/// Set a new status and keep `completed_at` consistent with it
///
/// DONE stamps the completion time unless one is already recorded, any
/// non-terminal status clears it, CANCELLED keeps whatever was there.
pub fn apply_status(item: &mut WorkItem, status: WorkItemStatus, now: DateTime<Utc>) {
    match status {
        WorkItemStatus::Done => {
            if item.completed_at.is_none() {
                item.completed_at = Some(now);
            }
        }
        WorkItemStatus::Cancelled => {}
        _ => item.completed_at = None,
    }
    item.status = status;
}

fn check_story_points(points: Option<i32>) -> TrackerResult<()> {
    match points {
        Some(p) if p < 0 => Err(TrackerError::validation(
            "story points cannot be negative",
        )),
        _ => Ok(()),
    }
}

fn check_estimate(hours: Option<f64>) -> TrackerResult<()> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(TrackerError::validation(
            "estimated hours must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

/// Clamp a requested percentage into 0..=100
pub fn clamp_progress(pct: i64) -> u8 {
    pct.clamp(0, 100) as u8
}

impl Repo<'_> {
    fn check_assignee(&self, assignee: Option<UserId>) -> TrackerResult<()> {
        if let Some(id) = assignee {
            let user = self.require_user(id)?;
            if !user.active {
                return Err(TrackerError::validation(format!(
                    "cannot assign work to deactivated user '{}'",
                    user.username
                )));
            }
        }
        Ok(())
    }
}

impl Tracker {
    /// Create a work item with the project's next number
    pub fn create_work_item(
        &mut self,
        actor: UserId,
        project: ProjectId,
        mut new: NewWorkItem,
    ) -> TrackerResult<WorkItem> {
        new.progress_pct = new.progress_pct.map(|p| clamp_progress(i64::from(p)));
        self.store.write(|repo| {
            let project = repo.require_project(project)?;
            repo.access()
                .require_content_edit_access(project.id, actor)?;

            if new.title.trim().is_empty() {
                return Err(TrackerError::validation("work item title cannot be empty"));
            }
            check_story_points(new.story_points)?;
            check_estimate(new.estimated_hours)?;
            check_date_range(new.start_date, new.due_date, "work item")?;
            repo.check_assignee(new.assignee_id)?;
            for label in &new.label_ids {
                repo.require_label_for(*label, project.id)?;
            }

            if let Some(parent) = new.parent_id {
                let parent = repo.require_work_item(parent)?;
                if parent.project_id != project.id {
                    return Err(TrackerError::validation(
                        "parent item belongs to a different project",
                    ));
                }
            }
            if let Some(sprint) = new.sprint_id {
                let sprint = repo.require_sprint(sprint)?;
                if sprint.project_id != project.id {
                    return Err(TrackerError::validation(
                        "sprint belongs to a different project",
                    ));
                }
                if sprint.is_terminal() {
                    return Err(TrackerError::validation(format!(
                        "sprint '{}' is {}",
                        sprint.name, sprint.status
                    )));
                }
                if !new.item_type.is_sprintable() {
                    return Err(TrackerError::validation(format!(
                        "{} items cannot be planned into a sprint",
                        new.item_type
                    )));
                }
            }

            let number = repo.next_item_number(project.id)?;
            let id = repo.insert_work_item(project.id, number, actor, &new)?;
            for label in &new.label_ids {
                repo.attach_label(id, *label)?;
            }
            let item = repo.require_work_item(id)?;
            info!(key = %item.key(), item_type = %item.item_type, "Created work item");
            Ok(item)
        })
    }

    /// Move an item to any status; transitions are unrestricted
    pub fn change_status(
        &mut self,
        actor: UserId,
        id: WorkItemId,
        status: WorkItemStatus,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(id)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;

            let old = item.status;
            apply_status(&mut item, status, Utc::now());
            repo.update_work_item(&item)?;
            debug!(key = %item.key(), from = %old, to = %status, "Changed status");
            repo.require_work_item(id)
        })
    }

    pub fn update_work_item(
        &mut self,
        actor: UserId,
        id: WorkItemId,
        update: WorkItemUpdate,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(id)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;

            if let Some(title) = update.title {
                if title.trim().is_empty() {
                    return Err(TrackerError::validation("work item title cannot be empty"));
                }
                item.title = title.trim().to_string();
            }
            if let Some(description) = update.description {
                item.description = description;
            }
            if let Some(priority) = update.priority {
                item.priority = priority;
            }
            if let Some(assignee) = update.assignee_id {
                repo.check_assignee(assignee)?;
                item.assignee_id = assignee;
            }
            if let Some(points) = update.story_points {
                check_story_points(points)?;
                item.story_points = points;
            }
            if let Some(start) = update.start_date {
                item.start_date = start;
            }
            if let Some(due) = update.due_date {
                item.due_date = due;
            }
            check_date_range(item.start_date, item.due_date, "work item")?;
            if let Some(hours) = update.estimated_hours {
                check_estimate(hours)?;
                item.estimated_hours = hours;
            }
            if let Some(labels) = update.label_ids {
                for label in &labels {
                    repo.require_label_for(*label, item.project_id)?;
                }
                repo.clear_item_labels(item.id)?;
                for label in &labels {
                    repo.attach_label(item.id, *label)?;
                }
            }

            repo.update_work_item(&item)?;
            repo.require_work_item(id)
        })
    }

    /// Set progress; values outside 0..=100 are clamped
    pub fn change_progress(
        &mut self,
        actor: UserId,
        id: WorkItemId,
        pct: i64,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(id)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            item.progress_pct = clamp_progress(pct);
            repo.update_work_item(&item)?;
            debug!(key = %item.key(), progress = item.progress_pct, "Changed progress");
            repo.require_work_item(id)
        })
    }

    /// Add worked hours to the item's running total
    pub fn log_hours(
        &mut self,
        actor: UserId,
        id: WorkItemId,
        hours: f64,
    ) -> TrackerResult<WorkItem> {
        self.store.write(|repo| {
            let mut item = repo.require_work_item(id)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            if !hours.is_finite() || hours <= 0.0 {
                return Err(TrackerError::validation(
                    "logged hours must be a positive number",
                ));
            }
            item.logged_hours += hours;
            repo.update_work_item(&item)?;
            debug!(key = %item.key(), hours, total = item.logged_hours, "Logged hours");
            repo.require_work_item(id)
        })
    }

    /// Delete an item; its children become top-level items
    pub fn delete_work_item(&mut self, actor: UserId, id: WorkItemId) -> TrackerResult<()> {
        self.store.write(|repo| {
            let item = repo.require_work_item(id)?;
            repo.access().require_manage_access(item.project_id, actor)?;
            repo.delete_work_item(id)?;
            info!(key = %item.key(), "Deleted work item");
            Ok(())
        })
    }

    pub fn find_work_item(&self, actor: UserId, id: WorkItemId) -> TrackerResult<WorkItem> {
        self.store.read(|repo| {
            let item = repo.require_work_item(id)?;
            repo.access().require_access(item.project_id, actor)?;
            Ok(item)
        })
    }

    /// Look up an item by its external key, e.g. `APP-42`
    pub fn find_by_key(&self, actor: UserId, key: &str) -> TrackerResult<WorkItem> {
        let key: ItemKey = key.parse()?;
        self.store.read(|repo| {
            let item = repo
                .work_item_by_key(&key.project_key, key.number)?
                .ok_or_else(|| TrackerError::not_found("Work item", &key))?;
            repo.access().require_access(item.project_id, actor)?;
            Ok(item)
        })
    }

    pub fn backlog(&self, actor: UserId, project: ProjectId) -> TrackerResult<Vec<WorkItem>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.backlog(project)
        })
    }

    pub fn work_items(&self, actor: UserId, project: ProjectId) -> TrackerResult<Vec<WorkItem>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.work_items_for_project(project)
        })
    }

    /// Open items assigned to the actor in projects they can still see
    ///
    /// Ordered by due date (undated last), then highest priority first.
    pub fn assigned_items(&self, actor: UserId) -> TrackerResult<Vec<WorkItem>> {
        self.store.read(|repo| {
            repo.require_user(actor)?;
            let access = repo.access();
            let mut items = Vec::new();
            for item in repo.open_items_assigned_to(actor)? {
                if access.effective_role(item.project_id, actor)?.is_some() {
                    items.push(item);
                }
            }
            items.sort_by_key(|i| (i.due_date.is_none(), i.due_date, Reverse(i.priority), i.id));
            Ok(items)
        })
    }

    pub fn sprint_items(&self, actor: UserId, sprint: SprintId) -> TrackerResult<Vec<WorkItem>> {
        self.store.read(|repo| {
            let sprint = repo.require_sprint(sprint)?;
            repo.access().require_access(sprint.project_id, actor)?;
            repo.work_items_in_sprint(sprint.id)
        })
    }

    // ---- Dependencies ----

    /// Record that `successor` depends on `predecessor`
    pub fn add_dependency(
        &mut self,
        actor: UserId,
        predecessor: WorkItemId,
        successor: WorkItemId,
        dependency_type: DependencyType,
    ) -> TrackerResult<Dependency> {
        self.store.write(|repo| {
            if predecessor == successor {
                return Err(TrackerError::validation(
                    "a work item cannot depend on itself",
                ));
            }
            let pred = repo.require_work_item(predecessor)?;
            let succ = repo.require_work_item(successor)?;
            repo.access()
                .require_content_edit_access(succ.project_id, actor)?;

            if repo.dependency_exists_between(pred.id, succ.id)? {
                return Err(TrackerError::validation(format!(
                    "{} and {} are already linked",
                    pred.key(),
                    succ.key()
                )));
            }

            let id = repo.insert_dependency(pred.id, succ.id, dependency_type)?;
            repo.dependency(id)?
                .ok_or_else(|| TrackerError::not_found("Dependency", id))
        })
    }

    pub fn remove_dependency(&mut self, actor: UserId, id: DependencyId) -> TrackerResult<()> {
        self.store.write(|repo| {
            let dependency = repo
                .dependency(id)?
                .ok_or_else(|| TrackerError::not_found("Dependency", id))?;
            let succ = repo.require_work_item(dependency.successor_id)?;
            repo.access()
                .require_content_edit_access(succ.project_id, actor)?;
            repo.delete_dependency(id)
        })
    }

    pub fn dependencies(&self, actor: UserId, item: WorkItemId) -> TrackerResult<Vec<Dependency>> {
        self.store.read(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access().require_access(item.project_id, actor)?;
            repo.dependencies_of(item.id)
        })
    }

    // ---- Comments ----

    /// Comment on an item; any role may comment, observers included
    pub fn add_comment(
        &mut self,
        actor: UserId,
        item: WorkItemId,
        content: &str,
    ) -> TrackerResult<Comment> {
        self.store.write(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access().require_access(item.project_id, actor)?;
            let content = content.trim();
            if content.is_empty() {
                return Err(TrackerError::validation("comment cannot be empty"));
            }
            let id = repo.insert_comment(item.id, actor, content)?;
            repo.require_comment(id)
        })
    }

    pub fn edit_comment(
        &mut self,
        actor: UserId,
        id: CommentId,
        content: &str,
    ) -> TrackerResult<Comment> {
        self.store.write(|repo| {
            let comment = repo.require_comment(id)?;
            require_comment_owner(repo, &comment, actor)?;
            let content = content.trim();
            if content.is_empty() {
                return Err(TrackerError::validation("comment cannot be empty"));
            }
            repo.update_comment_content(id, content)?;
            repo.require_comment(id)
        })
    }

    pub fn delete_comment(&mut self, actor: UserId, id: CommentId) -> TrackerResult<()> {
        self.store.write(|repo| {
            let comment = repo.require_comment(id)?;
            require_comment_owner(repo, &comment, actor)?;
            repo.delete_comment(id)
        })
    }

    pub fn comments(&self, actor: UserId, item: WorkItemId) -> TrackerResult<Vec<Comment>> {
        self.store.read(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access().require_access(item.project_id, actor)?;
            repo.comments_for(item.id)
        })
    }
}

/// Only the author, or an active administrator, may change a comment
fn require_comment_owner(repo: &Repo<'_>, comment: &Comment, actor: UserId) -> TrackerResult<()> {
    let user = repo.require_user(actor)?;
    let is_author = comment.author_id == Some(actor);
    if user.can_authorize() && (is_author || user.is_admin()) {
        Ok(())
    } else {
        Err(TrackerError::access_denied(
            "only the author can change this comment",
        ))
    }
}
