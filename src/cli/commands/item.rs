//! `sprinter item` command - Work items

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_date, format_datetime_local, print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::SprintId;
use crate::core::work_item::{NewWorkItem, Priority, WorkItem, WorkItemStatus, WorkItemType};

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Create a work item
    New(NewArgs),

    /// Show a work item with its dependencies and comments
    Show(KeyArg),

    /// Change the status of a work item
    Status(StatusArgs),

    /// List work items of a project
    List(ListArgs),

    /// Set the completion percentage (clamped to 0..100)
    Progress(ProgressArgs),

    /// Add worked hours to an item
    Log(LogArgs),

    /// Open items assigned to you, by due date then priority
    Mine,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project key
    pub project: String,

    pub title: String,

    #[arg(long = "type", short = 't', default_value = "task")]
    pub item_type: WorkItemType,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Priority (default: medium)
    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    /// Plan directly into this sprint
    #[arg(long, short = 's')]
    pub sprint: Option<SprintId>,

    /// Parent item key, e.g. APP-3
    #[arg(long)]
    pub parent: Option<String>,

    /// Username of the assignee
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    #[arg(long)]
    pub points: Option<i32>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Estimated hours of work
    #[arg(long)]
    pub estimate: Option<f64>,

    /// Label name; repeat for several
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct KeyArg {
    /// Work item key, e.g. APP-12
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Work item key, e.g. APP-12
    pub key: String,

    pub status: WorkItemStatus,
}

#[derive(clap::Args, Debug)]
pub struct ProgressArgs {
    /// Work item key, e.g. APP-12
    pub key: String,

    #[arg(allow_negative_numbers = true)]
    pub percent: i64,
}

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Work item key, e.g. APP-12
    pub key: String,

    pub hours: f64,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project key
    pub project: String,

    /// Only items in this sprint
    #[arg(long, short = 's', conflicts_with = "backlog")]
    pub sprint: Option<SprintId>,

    /// Only items without a sprint
    #[arg(long)]
    pub backlog: bool,

    /// Only items with this status
    #[arg(long)]
    pub status: Option<WorkItemStatus>,
}

const ITEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 14),
    ColumnDef::new("type", "TYPE", 8),
    ColumnDef::new("title", "TITLE", 44),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("priority", "PRIORITY", 9),
    ColumnDef::new("points", "PTS", 5),
];

const MINE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 14),
    ColumnDef::new("title", "TITLE", 44),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("priority", "PRIORITY", 9),
    ColumnDef::new("due", "DUE", 12),
];

fn item_row(item: &WorkItem) -> TableRow {
    let key = item.key().to_string();
    TableRow::new(key.clone())
        .cell("key", CellValue::Key(key))
        .cell("type", CellValue::Text(item.item_type.to_string()))
        .cell("title", CellValue::Text(item.title.clone()))
        .cell("status", CellValue::ItemStatus(item.status))
        .cell("priority", CellValue::Priority(item.priority))
        .cell("points", CellValue::Number(item.story_points.map(i64::from)))
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        ItemCommands::New(args) => {
            let project = session.project(&actor, &args.project)?;
            let parent_id = match &args.parent {
                Some(key) => Some(session.item(&actor, key)?.id),
                None => None,
            };
            let assignee_id = match &args.assignee {
                Some(name) => Some(session.user(name)?.id),
                None => None,
            };
            let label_ids = args
                .labels
                .iter()
                .map(|name| session.label(&actor, project.id, name).map(|l| l.id))
                .collect::<Result<Vec<_>>>()?;
            let new = NewWorkItem {
                description: args.description,
                priority: args.priority,
                sprint_id: args.sprint,
                parent_id,
                assignee_id,
                story_points: args.points,
                start_date: args.start,
                due_date: args.due,
                estimated_hours: args.estimate,
                label_ids,
                ..NewWorkItem::new(args.item_type, args.title)
            };
            let item = session.tracker.create_work_item(actor.id, project.id, new)?;
            if !print_structured(&item, global.format)? {
                success(
                    global.quiet,
                    format!("Created {} {}", style(item.key()).cyan(), item.title),
                );
            }
        }
        ItemCommands::Show(args) => {
            let item = session.item(&actor, &args.key)?;
            if print_structured(&item, global.format)? {
                return Ok(());
            }
            let dependencies = session.tracker.dependencies(actor.id, item.id)?;
            let labels = session.tracker.item_labels(actor.id, item.id)?;
            let comments = session.tracker.comments(actor.id, item.id)?;

            println!(
                "{} {}",
                style(item.key()).cyan().bold(),
                style(&item.title).bold()
            );
            println!();
            println!("  type:      {}", item.item_type);
            println!("  status:    {}", item.status);
            println!("  priority:  {}", item.priority);
            if let Some(points) = item.story_points {
                println!("  points:    {}", points);
            }
            match item.sprint_id {
                Some(sprint) => println!("  sprint:    #{}", sprint),
                None => println!("  sprint:    backlog"),
            }
            if let Some(assignee) = item.assignee_id {
                println!("  assignee:  {}", session.tracker.find_user(assignee)?.username);
            }
            if item.start_date.is_some() || item.due_date.is_some() {
                println!(
                    "  schedule:  {} .. {}",
                    format_date(item.start_date),
                    format_date(item.due_date)
                );
            }
            println!("  progress:  {}%", item.progress_pct);
            match item.estimated_hours {
                Some(estimate) => println!("  hours:     {} of {}", item.logged_hours, estimate),
                None => println!("  hours:     {}", item.logged_hours),
            }
            if !labels.is_empty() {
                let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
                println!("  labels:    {}", names.join(", "));
            }
            if let Some(done) = &item.completed_at {
                println!("  completed: {}", format_datetime_local(done));
            }
            if let Some(description) = &item.description {
                println!();
                println!("{}", description);
            }

            if !dependencies.is_empty() {
                println!();
                println!("{}", style("Dependencies").bold());
                for dep in &dependencies {
                    let (direction, other) = if dep.successor_id == item.id {
                        ("after", dep.predecessor_id)
                    } else {
                        ("before", dep.successor_id)
                    };
                    let other = session.tracker.find_work_item(actor.id, other)?;
                    println!(
                        "  #{} {} {} ({})",
                        dep.id,
                        direction,
                        style(other.key()).cyan(),
                        dep.dependency_type
                    );
                }
            }

            if !comments.is_empty() {
                println!();
                println!("{}", style("Comments").bold());
                for comment in &comments {
                    let author = match comment.author_id {
                        Some(id) => session.tracker.find_user(id)?.username,
                        None => "(deleted user)".to_string(),
                    };
                    let edited = if comment.edited { " (edited)" } else { "" };
                    println!(
                        "  {} {}{}: {}",
                        style(format_datetime_local(&comment.created_at)).dim(),
                        style(author).cyan(),
                        edited,
                        comment.content
                    );
                }
            }
        }
        ItemCommands::Status(args) => {
            let item = session.item(&actor, &args.key)?;
            let item = session
                .tracker
                .change_status(actor.id, item.id, args.status)?;
            success(
                global.quiet,
                format!("{} is now {}", style(item.key()).cyan(), item.status),
            );
        }
        ItemCommands::Progress(args) => {
            let item = session.item(&actor, &args.key)?;
            let item = session
                .tracker
                .change_progress(actor.id, item.id, args.percent)?;
            success(
                global.quiet,
                format!("{} is {}% done", style(item.key()).cyan(), item.progress_pct),
            );
        }
        ItemCommands::Log(args) => {
            let item = session.item(&actor, &args.key)?;
            let item = session.tracker.log_hours(actor.id, item.id, args.hours)?;
            success(
                global.quiet,
                format!(
                    "Logged {}h on {} ({}h total)",
                    args.hours,
                    style(item.key()).cyan(),
                    item.logged_hours
                ),
            );
        }
        ItemCommands::Mine => {
            let items = session.tracker.assigned_items(actor.id)?;
            if print_structured(&items, global.format)? {
                return Ok(());
            }
            TableFormatter::new(MINE_COLUMNS, "item")
                .quiet(global.quiet)
                .output(
                    items.iter().map(|i| {
                        item_row(i).cell("due", CellValue::Date(i.due_date))
                    }),
                    global.format,
                );
        }
        ItemCommands::List(args) => {
            let project = session.project(&actor, &args.project)?;
            let mut items = if let Some(sprint) = args.sprint {
                session.tracker.sprint_items(actor.id, sprint)?
            } else if args.backlog {
                session.tracker.backlog(actor.id, project.id)?
            } else {
                session.tracker.work_items(actor.id, project.id)?
            };
            items.retain(|i| i.project_id == project.id);
            if let Some(status) = args.status {
                items.retain(|i| i.status == status);
            }

            if print_structured(&items, global.format)? {
                return Ok(());
            }
            TableFormatter::new(ITEM_COLUMNS, "item")
                .quiet(global.quiet)
                .output(items.iter().map(item_row), global.format);
        }
    }

    Ok(())
}
