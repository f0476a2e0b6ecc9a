//! `sprinter sprint` command - Sprint lifecycle

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::SprintId;
use crate::core::sprint::NewSprint;

#[derive(Subcommand, Debug)]
pub enum SprintCommands {
    /// Plan a new sprint
    New(NewArgs),

    /// List sprints of a project
    List(ListArgs),

    /// Start a planned sprint
    Start(IdArg),

    /// Complete the active sprint, moving unfinished items
    Complete(CompleteArgs),

    /// Cancel a sprint, returning its items to the backlog
    Cancel(IdArg),

    /// Add a work item to a sprint
    Add(AddArgs),

    /// Move a work item back to the backlog
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project key
    pub project: String,

    pub name: String,

    #[arg(long, short = 'g')]
    pub goal: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project key
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Sprint id
    pub sprint: SprintId,
}

#[derive(clap::Args, Debug)]
pub struct CompleteArgs {
    /// Sprint id
    pub sprint: SprintId,

    /// Move unfinished items into this sprint instead of the backlog
    #[arg(long, value_name = "SPRINT")]
    pub into: Option<SprintId>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Sprint id
    pub sprint: SprintId,

    /// Work item key, e.g. APP-12
    pub item: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Work item key, e.g. APP-12
    pub item: String,
}

const SPRINT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("start", "START", 12),
    ColumnDef::new("end", "END", 12),
    ColumnDef::new("goal", "GOAL", 40),
];

pub fn run(cmd: SprintCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        SprintCommands::New(args) => {
            let project = session.project(&actor, &args.project)?;
            let sprint = session.tracker.create_sprint(
                actor.id,
                project.id,
                NewSprint {
                    name: args.name,
                    goal: args.goal,
                    start_date: args.start,
                    end_date: args.end,
                },
            )?;
            if !print_structured(&sprint, global.format)? {
                success(
                    global.quiet,
                    format!(
                        "Planned sprint {} {} in {}",
                        style(format!("#{}", sprint.id)).cyan(),
                        sprint.name,
                        style(&project.key).cyan()
                    ),
                );
            }
        }
        SprintCommands::List(args) => {
            let project = session.project(&actor, &args.project)?;
            let sprints = session.tracker.sprints_for_project(actor.id, project.id)?;
            if print_structured(&sprints, global.format)? {
                return Ok(());
            }
            let rows = sprints.iter().map(|s| {
                TableRow::new(s.id.to_string())
                    .cell("id", CellValue::Key(s.id.to_string()))
                    .cell("name", CellValue::Text(s.name.clone()))
                    .cell("status", CellValue::SprintStatus(s.status))
                    .cell("start", CellValue::Date(s.start_date))
                    .cell("end", CellValue::Date(s.end_date))
                    .cell(
                        "goal",
                        s.goal
                            .clone()
                            .map_or(CellValue::Empty, CellValue::Text),
                    )
            });
            TableFormatter::new(SPRINT_COLUMNS, "sprint")
                .quiet(global.quiet)
                .output(rows, global.format);
        }
        SprintCommands::Start(args) => {
            let sprint = session.tracker.start_sprint(actor.id, args.sprint)?;
            success(
                global.quiet,
                format!("Started sprint {}", style(&sprint.name).cyan()),
            );
        }
        SprintCommands::Complete(args) => {
            let moved = session
                .tracker
                .complete_sprint(actor.id, args.sprint, args.into)?;
            let destination = match args.into {
                Some(target) => format!("sprint #{}", target),
                None => "the backlog".to_string(),
            };
            success(
                global.quiet,
                format!(
                    "Completed sprint #{}; moved {} unfinished item(s) to {}",
                    args.sprint, moved, destination
                ),
            );
        }
        SprintCommands::Cancel(args) => {
            let unlinked = session.tracker.cancel_sprint(actor.id, args.sprint)?;
            success(
                global.quiet,
                format!(
                    "Cancelled sprint #{}; {} item(s) returned to the backlog",
                    args.sprint, unlinked
                ),
            );
        }
        SprintCommands::Add(args) => {
            let item = session.item(&actor, &args.item)?;
            let item = session
                .tracker
                .add_work_item_to_sprint(actor.id, args.sprint, item.id)?;
            success(
                global.quiet,
                format!(
                    "Added {} to sprint #{}",
                    style(item.key()).cyan(),
                    args.sprint
                ),
            );
        }
        SprintCommands::Remove(args) => {
            let item = session.item(&actor, &args.item)?;
            let item = session
                .tracker
                .remove_work_item_from_sprint(actor.id, item.id)?;
            success(
                global.quiet,
                format!("Moved {} to the backlog", style(item.key()).cyan()),
            );
        }
    }

    Ok(())
}
