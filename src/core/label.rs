//! Labels attached to work items
//!
//! A label belongs to one project or, with no project, is global and
//! usable everywhere. Names are unique within their scope.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::identity::{LabelId, ProjectId, UserId, WorkItemId};
use crate::core::store::Repo;
use crate::core::tracker::Tracker;

pub const DEFAULT_LABEL_COLOR: &str = "#6DA3C7";
const MAX_NAME_LEN: usize = 50;
const MAX_COLOR_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    /// `None` for global labels
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn is_global(&self) -> bool {
        self.project_id.is_none()
    }
}

/// Changes applied by `update_label`; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

fn clean_name(name: &str) -> TrackerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::validation("label name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TrackerError::validation(format!(
            "label name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn clean_color(color: &str) -> TrackerResult<String> {
    let color = color.trim();
    if color.is_empty() || color.chars().count() > MAX_COLOR_LEN {
        return Err(TrackerError::validation(format!(
            "label color must be 1 to {} characters",
            MAX_COLOR_LEN
        )));
    }
    Ok(color.to_string())
}

impl Repo<'_> {
    pub fn require_label(&self, id: LabelId) -> TrackerResult<Label> {
        self.label(id)?
            .ok_or_else(|| TrackerError::not_found("Label", id))
    }

    /// A label usable on items of `project`: its own or a global one
    pub fn require_label_for(&self, id: LabelId, project: ProjectId) -> TrackerResult<Label> {
        let label = self.require_label(id)?;
        match label.project_id {
            Some(owner) if owner != project => Err(TrackerError::validation(format!(
                "label '{}' belongs to a different project",
                label.name
            ))),
            _ => Ok(label),
        }
    }

    /// Managers own project labels; global labels are for administrators
    fn require_label_admin(&self, scope: Option<ProjectId>, actor: UserId) -> TrackerResult<()> {
        match scope {
            Some(project) => {
                self.require_project(project)?;
                self.access().require_manage_access(project, actor)?;
            }
            None => {
                let user = self.require_active_user(actor)?;
                if !user.is_admin() {
                    return Err(TrackerError::access_denied(
                        "only an administrator can manage global labels",
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_label_name_free(
        &self,
        scope: Option<ProjectId>,
        name: &str,
        except: Option<LabelId>,
    ) -> TrackerResult<()> {
        if self.label_name_taken(scope, name, except)? {
            return Err(TrackerError::validation(format!(
                "label '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}

impl Tracker {
    /// Create a label in `project`, or a global one when `project` is `None`
    pub fn create_label(
        &mut self,
        actor: UserId,
        project: Option<ProjectId>,
        name: &str,
        color: Option<&str>,
    ) -> TrackerResult<Label> {
        self.store.write(|repo| {
            repo.require_label_admin(project, actor)?;
            let name = clean_name(name)?;
            let color = clean_color(color.unwrap_or(DEFAULT_LABEL_COLOR))?;
            repo.check_label_name_free(project, &name, None)?;

            let id = repo.insert_label(project, &name, &color)?;
            info!(label = %name, global = project.is_none(), "Created label");
            repo.require_label(id)
        })
    }

    pub fn update_label(
        &mut self,
        actor: UserId,
        id: LabelId,
        update: LabelUpdate,
    ) -> TrackerResult<Label> {
        self.store.write(|repo| {
            let mut label = repo.require_label(id)?;
            repo.require_label_admin(label.project_id, actor)?;
            if let Some(name) = update.name {
                let name = clean_name(&name)?;
                repo.check_label_name_free(label.project_id, &name, Some(label.id))?;
                label.name = name;
            }
            if let Some(color) = update.color {
                label.color = clean_color(&color)?;
            }
            repo.update_label(&label)?;
            repo.require_label(id)
        })
    }

    /// Delete a label and detach it from every item
    pub fn delete_label(&mut self, actor: UserId, id: LabelId) -> TrackerResult<()> {
        self.store.write(|repo| {
            let label = repo.require_label(id)?;
            repo.require_label_admin(label.project_id, actor)?;
            repo.delete_label(id)?;
            info!(label = %label.name, "Deleted label");
            Ok(())
        })
    }

    /// Labels usable in a project, global ones included, by name
    pub fn labels(&self, actor: UserId, project: ProjectId) -> TrackerResult<Vec<Label>> {
        self.store.read(|repo| {
            repo.require_project(project)?;
            repo.access().require_access(project, actor)?;
            repo.labels_for_project(project)
        })
    }

    pub fn find_label(&self, actor: UserId, id: LabelId) -> TrackerResult<Label> {
        self.store.read(|repo| {
            let label = repo.require_label(id)?;
            match label.project_id {
                Some(project) => {
                    repo.access().require_access(project, actor)?;
                }
                None => {
                    repo.require_active_user(actor)?;
                }
            }
            Ok(label)
        })
    }

    pub fn attach_label(
        &mut self,
        actor: UserId,
        item: WorkItemId,
        label: LabelId,
    ) -> TrackerResult<()> {
        self.store.write(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            let label = repo.require_label_for(label, item.project_id)?;
            repo.attach_label(item.id, label.id)
        })
    }

    pub fn detach_label(
        &mut self,
        actor: UserId,
        item: WorkItemId,
        label: LabelId,
    ) -> TrackerResult<()> {
        self.store.write(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access()
                .require_content_edit_access(item.project_id, actor)?;
            repo.require_label(label)?;
            repo.detach_label(item.id, label)
        })
    }

    pub fn item_labels(&self, actor: UserId, item: WorkItemId) -> TrackerResult<Vec<Label>> {
        self.store.read(|repo| {
            let item = repo.require_work_item(item)?;
            repo.access().require_access(item.project_id, actor)?;
            repo.labels_of_item(item.id)
        })
    }
}
