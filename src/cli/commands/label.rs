//! `sprinter label` command - Project and global labels

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, success};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::LabelId;
use crate::core::label::LabelUpdate;

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// Create a label in a project, or a global one
    New(NewArgs),

    /// List labels usable in a project
    List(ListArgs),

    /// Rename or recolor a label
    Edit(EditArgs),

    /// Delete a label and remove it from all items
    Delete(IdArg),

    /// Put a label on a work item
    Attach(LinkArgs),

    /// Take a label off a work item
    Detach(LinkArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    pub name: String,

    /// Project key; omit for a global label (administrators only)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Display color, e.g. #FF8800
    #[arg(long, short = 'c')]
    pub color: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project key
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: LabelId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub color: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    pub id: LabelId,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Work item key, e.g. APP-12
    pub item: String,

    /// Label name
    pub label: String,
}

const LABEL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("color", "COLOR", 10),
    ColumnDef::new("scope", "SCOPE", 8),
];

pub fn run(cmd: LabelCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        LabelCommands::New(args) => {
            let project = match &args.project {
                Some(key) => Some(session.project(&actor, key)?.id),
                None => None,
            };
            let label = session.tracker.create_label(
                actor.id,
                project,
                &args.name,
                args.color.as_deref(),
            )?;
            if !print_structured(&label, global.format)? {
                success(
                    global.quiet,
                    format!("Created label {} (#{})", style(&label.name).cyan(), label.id),
                );
            }
        }
        LabelCommands::List(args) => {
            let project = session.project(&actor, &args.project)?;
            let labels = session.tracker.labels(actor.id, project.id)?;
            if print_structured(&labels, global.format)? {
                return Ok(());
            }
            let rows = labels.iter().map(|l| {
                let scope = if l.is_global() { "global" } else { "project" };
                TableRow::new(l.id.to_string())
                    .cell("id", CellValue::Key(l.id.to_string()))
                    .cell("name", CellValue::Text(l.name.clone()))
                    .cell("color", CellValue::Text(l.color.clone()))
                    .cell("scope", CellValue::Text(scope.to_string()))
            });
            TableFormatter::new(LABEL_COLUMNS, "label")
                .quiet(global.quiet)
                .output(rows, global.format);
        }
        LabelCommands::Edit(args) => {
            let label = session.tracker.update_label(
                actor.id,
                args.id,
                LabelUpdate {
                    name: args.name,
                    color: args.color,
                },
            )?;
            success(
                global.quiet,
                format!("Updated label {} (#{})", style(&label.name).cyan(), label.id),
            );
        }
        LabelCommands::Delete(args) => {
            let label = session.tracker.find_label(actor.id, args.id)?;
            session.tracker.delete_label(actor.id, label.id)?;
            success(global.quiet, format!("Deleted label {}", label.name));
        }
        LabelCommands::Attach(args) => {
            let item = session.item(&actor, &args.item)?;
            let label = session.label(&actor, item.project_id, &args.label)?;
            session.tracker.attach_label(actor.id, item.id, label.id)?;
            success(
                global.quiet,
                format!("Labelled {} {}", style(item.key()).cyan(), label.name),
            );
        }
        LabelCommands::Detach(args) => {
            let item = session.item(&actor, &args.item)?;
            let label = session.label(&actor, item.project_id, &args.label)?;
            session.tracker.detach_label(actor.id, item.id, label.id)?;
            success(
                global.quiet,
                format!("Removed {} from {}", label.name, style(item.key()).cyan()),
            );
        }
    }

    Ok(())
}
