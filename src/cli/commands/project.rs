//! `sprinter project` command - Projects and subprojects

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_date, print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::key::ProjectKey;
use crate::core::project::{NewProject, Project};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a root project
    New(NewArgs),

    /// Create a subproject under an existing project
    Sub(SubArgs),

    /// List projects visible to the acting user
    List,

    /// Show project details
    Show(KeyArg),

    /// Archive a project
    Archive(KeyArg),

    /// Show a user's effective role in a project
    Role(RoleArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    pub name: String,

    /// Project key (default: suggested from the name)
    #[arg(long, short = 'k')]
    pub key: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl NewArgs {
    fn into_new_project(self) -> NewProject {
        let key = self.key.unwrap_or_else(|| ProjectKey::suggest(&self.name));
        NewProject {
            key,
            name: self.name,
            description: self.description,
            start_date: self.start,
            end_date: self.end,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SubArgs {
    /// Key of the parent project
    pub parent: String,

    #[command(flatten)]
    pub project: NewArgs,
}

#[derive(clap::Args, Debug)]
pub struct KeyArg {
    /// Project key
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct RoleArgs {
    /// Project key
    pub key: String,

    /// User to check (default: the acting user)
    #[arg(long, short = 'u')]
    pub user: Option<String>,
}

const PROJECT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 12),
    ColumnDef::new("name", "NAME", 36),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("items", "ITEMS", 7),
    ColumnDef::new("end", "END", 12),
];

fn project_row(project: &Project) -> TableRow {
    TableRow::new(&project.key)
        .cell("key", CellValue::Key(project.key.clone()))
        .cell("name", CellValue::Text(project.name.clone()))
        .cell("status", CellValue::ProjectStatus(project.status))
        .cell("items", CellValue::Number(Some(project.item_counter)))
        .cell("end", CellValue::Date(project.end_date))
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        ProjectCommands::New(args) => {
            let project = session
                .tracker
                .create_project(actor.id, args.into_new_project())?;
            if !print_structured(&project, global.format)? {
                success(
                    global.quiet,
                    format!(
                        "Created project {} {}",
                        style(&project.key).cyan(),
                        project.name
                    ),
                );
            }
        }
        ProjectCommands::Sub(args) => {
            let parent = session.project(&actor, &args.parent)?;
            let project = session.tracker.create_subproject(
                actor.id,
                parent.id,
                args.project.into_new_project(),
            )?;
            if !print_structured(&project, global.format)? {
                success(
                    global.quiet,
                    format!(
                        "Created subproject {} under {}",
                        style(&project.key).cyan(),
                        style(&parent.key).cyan()
                    ),
                );
            }
        }
        ProjectCommands::List => {
            let projects = session.tracker.list_projects(actor.id)?;
            if print_structured(&projects, global.format)? {
                return Ok(());
            }
            TableFormatter::new(PROJECT_COLUMNS, "project")
                .quiet(global.quiet)
                .output(projects.iter().map(project_row), global.format);
        }
        ProjectCommands::Show(args) => {
            let project = session.project(&actor, &args.key)?;
            if print_structured(&project, global.format)? {
                return Ok(());
            }
            let subprojects = session.tracker.subprojects(actor.id, project.id)?;
            let members = session.tracker.list_members(actor.id, project.id)?;
            let active = session.tracker.active_sprint(actor.id, project.id)?;

            println!(
                "{} {}",
                style(&project.key).cyan().bold(),
                style(&project.name).bold()
            );
            if let Some(description) = &project.description {
                println!("{}", description);
            }
            println!();
            if let Some(parent) = project.parent_id {
                let parent = session.tracker.find_project(actor.id, parent)?;
                println!("  parent:      {}", style(&parent.key).cyan());
            }
            println!("  status:      {}", project.status);
            println!(
                "  dates:       {} .. {}",
                format_date(project.start_date),
                format_date(project.end_date)
            );
            println!("  items:       {}", project.item_counter);
            println!("  members:     {}", members.len());
            match active {
                Some(sprint) => println!("  sprint:      {} (#{})", sprint.name, sprint.id),
                None => println!("  sprint:      -"),
            }
            if !subprojects.is_empty() {
                let keys: Vec<&str> = subprojects.iter().map(|p| p.key.as_str()).collect();
                println!("  subprojects: {}", keys.join(", "));
            }
        }
        ProjectCommands::Archive(args) => {
            let project = session.project(&actor, &args.key)?;
            let project = session.tracker.archive_project(actor.id, project.id)?;
            success(
                global.quiet,
                format!("Archived project {}", style(&project.key).cyan()),
            );
        }
        ProjectCommands::Role(args) => {
            let project = session.project(&actor, &args.key)?;
            let user = match &args.user {
                Some(name) => session.user(name)?,
                None => actor,
            };
            match session.tracker.effective_role(project.id, user.id)? {
                Some(role) => println!("{}", role),
                None => println!("{}", style("none").dim()),
            }
        }
    }

    Ok(())
}
