//! Core module - domain types, access control and storage

pub mod access;
pub mod config;
pub mod error;
pub mod identity;
pub mod key;
pub mod label;
pub mod project;
pub mod report;
pub mod sprint;
pub mod store;
pub mod tracker;
pub mod work_item;
pub mod workspace;

pub use access::{AccessResolver, MembershipSource};
pub use config::Config;
pub use error::{TrackerError, TrackerResult};
pub use identity::{ProjectRole, SystemRole, User, UserId};
pub use key::{ItemKey, ProjectKey};
pub use label::Label;
pub use project::{NewProject, Project, ProjectStatus};
pub use sprint::{NewSprint, Sprint, SprintStatus};
pub use tracker::Tracker;
pub use work_item::{NewWorkItem, WorkItem, WorkItemStatus, WorkItemType};
pub use workspace::{Workspace, WorkspaceError};
