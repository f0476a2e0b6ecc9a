//! Workspace, configuration and acting-user resolution shared by commands

use miette::{miette, Result};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::{ProjectId, User};
use crate::core::label::Label;
use crate::core::project::Project;
use crate::core::tracker::Tracker;
use crate::core::work_item::WorkItem;
use crate::core::workspace::{Workspace, WorkspaceError};

/// Find the workspace named by `--project`, or the one enclosing the cwd
pub fn locate_workspace(global: &GlobalOpts) -> Result<Workspace, WorkspaceError> {
    match &global.project {
        Some(path) => Workspace::discover_from(path),
        None => Workspace::discover(),
    }
}

/// An open tracker plus the context a command runs in
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub tracker: Tracker,
    actor_name: Option<String>,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = locate_workspace(global).map_err(|e| miette!("{}", e))?;
        let config = Config::load(Some(&workspace));
        let db = config.database_path(&workspace);
        debug!(path = %db.display(), "Opening database");
        let tracker = Tracker::open(&db, config.busy_timeout())?;

        // --as wins over SPRINTER_USER and the config files
        let actor_name = global.actor.clone().or_else(|| config.user.clone());

        Ok(Self {
            workspace,
            config,
            tracker,
            actor_name,
        })
    }

    /// The user commands act as
    pub fn actor(&self) -> Result<User> {
        let name = self.actor_name.as_deref().ok_or_else(|| {
            miette!(
                help = "pass --as <username>, set SPRINTER_USER, or add `user:` to .sprinter/config.yaml",
                "no acting user configured"
            )
        })?;
        Ok(self.tracker.find_user_by_username(name)?)
    }

    pub fn user(&self, username: &str) -> Result<User> {
        Ok(self.tracker.find_user_by_username(username)?)
    }

    pub fn project(&self, actor: &User, key: &str) -> Result<Project> {
        Ok(self.tracker.find_project_by_key(actor.id, key)?)
    }

    /// Look up a work item by key, e.g. `APP-12`
    pub fn item(&self, actor: &User, key: &str) -> Result<WorkItem> {
        Ok(self.tracker.find_by_key(actor.id, key)?)
    }

    /// Resolve a label usable in `project` by name, ignoring case
    pub fn label(&self, actor: &User, project: ProjectId, name: &str) -> Result<Label> {
        self.tracker
            .labels(actor.id, project)?
            .into_iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| miette!("No label named '{}' in this project", name))
    }
}
