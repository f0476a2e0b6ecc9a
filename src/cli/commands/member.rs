//! `sprinter member` command - Project membership

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::ProjectRole;

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Add a member (or change an existing member's role)
    Add(AddArgs),

    /// Change a member's role
    Role(RoleArgs),

    /// Remove a direct member
    Remove(RemoveArgs),

    /// List direct members of a project
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Project key
    pub project: String,

    pub username: String,

    #[arg(long, short = 'r', default_value = "team-member")]
    pub role: ProjectRole,
}

#[derive(clap::Args, Debug)]
pub struct RoleArgs {
    /// Project key
    pub project: String,

    pub username: String,

    pub role: ProjectRole,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Project key
    pub project: String,

    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project key
    pub project: String,
}

const MEMBER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("username", "USERNAME", 20),
    ColumnDef::new("role", "ROLE", 12),
];

pub fn run(cmd: MemberCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        MemberCommands::Add(args) => {
            let project = session.project(&actor, &args.project)?;
            let user = session.user(&args.username)?;
            let member = session
                .tracker
                .add_member(actor.id, project.id, user.id, args.role)?;
            success(
                global.quiet,
                format!(
                    "{} is now {} of {}",
                    style(&member.username).cyan(),
                    member.role,
                    style(&project.key).cyan()
                ),
            );
        }
        MemberCommands::Role(args) => {
            let project = session.project(&actor, &args.project)?;
            let user = session.user(&args.username)?;
            let member =
                session
                    .tracker
                    .update_member_role(actor.id, project.id, user.id, args.role)?;
            success(
                global.quiet,
                format!(
                    "{} is now {} of {}",
                    style(&member.username).cyan(),
                    member.role,
                    style(&project.key).cyan()
                ),
            );
        }
        MemberCommands::Remove(args) => {
            let project = session.project(&actor, &args.project)?;
            let user = session.user(&args.username)?;
            session
                .tracker
                .remove_member(actor.id, project.id, user.id)?;
            success(
                global.quiet,
                format!(
                    "Removed {} from {}",
                    style(&user.username).cyan(),
                    style(&project.key).cyan()
                ),
            );
        }
        MemberCommands::List(args) => {
            let project = session.project(&actor, &args.project)?;
            let members = session.tracker.list_members(actor.id, project.id)?;
            if print_structured(&members, global.format)? {
                return Ok(());
            }
            let rows = members.iter().map(|m| {
                TableRow::new(&m.username)
                    .cell("username", CellValue::Key(m.username.clone()))
                    .cell("role", CellValue::Role(m.role))
            });
            TableFormatter::new(MEMBER_COLUMNS, "member")
                .quiet(global.quiet)
                .output(rows, global.format);
        }
    }

    Ok(())
}
