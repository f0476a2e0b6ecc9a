//! Users, roles and typed row identifiers

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

row_id!(
    /// Identifier of a user row
    UserId
);
row_id!(
    /// Identifier of a project row
    ProjectId
);
row_id!(
    /// Identifier of a sprint row
    SprintId
);
row_id!(
    /// Identifier of a work item row (not the human-facing item key)
    WorkItemId
);
row_id!(
    /// Identifier of a work item dependency row
    DependencyId
);
row_id!(
    /// Identifier of a comment row
    CommentId
);
row_id!(
    /// Identifier of a label row
    LabelId
);

/// Implements text storage for enums that expose `as_str` and `FromStr`
macro_rules! sql_text_enum {
    ($name:ident) => {
        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse()
                    .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
            }
        }
    };
}

pub(crate) use sql_text_enum;

/// System-wide role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    Admin,
    #[default]
    User,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::Admin => "admin",
            SystemRole::User => "user",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(SystemRole::Admin),
            "user" => Ok(SystemRole::User),
            _ => Err(format!("Unknown system role: {}", s)),
        }
    }
}

sql_text_enum!(SystemRole);

/// Role a user holds within a single project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Manager,
    TeamMember,
    Observer,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Manager => "manager",
            ProjectRole::TeamMember => "team_member",
            ProjectRole::Observer => "observer",
        }
    }

    /// Observers may read and comment but not mutate content
    pub fn can_edit_content(&self) -> bool {
        matches!(self, ProjectRole::Manager | ProjectRole::TeamMember)
    }

    pub fn can_manage_project(&self) -> bool {
        matches!(self, ProjectRole::Manager)
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "manager" => Ok(ProjectRole::Manager),
            "team_member" | "member" => Ok(ProjectRole::TeamMember),
            "observer" => Ok(ProjectRole::Observer),
            _ => Err(format!("Unknown project role: {}", s)),
        }
    }
}

sql_text_enum!(ProjectRole);

/// A user known to the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub system_role: SystemRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if user is an administrator (bypasses per-project checks)
    pub fn is_admin(&self) -> bool {
        self.system_role == SystemRole::Admin
    }

    /// Inactive users never resolve to a role, administrators included
    pub fn can_authorize(&self) -> bool {
        self.active
    }
}

/// A direct membership of a user in a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub username: String,
    pub role: ProjectRole,
}
