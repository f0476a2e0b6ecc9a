//! `sprinter comment` command - Discussion on work items

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_datetime_local, print_structured, success, truncate_str};
use crate::cli::session::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::CommentId;

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// Comment on a work item
    Add(AddArgs),

    /// List comments on a work item
    List(ListArgs),

    /// Replace the text of your comment
    Edit(EditArgs),

    /// Delete your comment
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Work item key, e.g. APP-12
    pub item: String,

    pub text: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Work item key, e.g. APP-12
    pub item: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    pub id: CommentId,

    pub text: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub id: CommentId,
}

const COMMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("author", "AUTHOR", 16),
    ColumnDef::new("when", "WHEN", 17),
    ColumnDef::new("text", "TEXT", 60),
];

pub fn run(cmd: CommentCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let actor = session.actor()?;

    match cmd {
        CommentCommands::Add(args) => {
            let item = session.item(&actor, &args.item)?;
            let comment = session.tracker.add_comment(actor.id, item.id, &args.text)?;
            if !print_structured(&comment, global.format)? {
                success(
                    global.quiet,
                    format!(
                        "Commented on {} (#{})",
                        style(item.key()).cyan(),
                        comment.id
                    ),
                );
            }
        }
        CommentCommands::List(args) => {
            let item = session.item(&actor, &args.item)?;
            let comments = session.tracker.comments(actor.id, item.id)?;
            if print_structured(&comments, global.format)? {
                return Ok(());
            }
            let mut rows = Vec::with_capacity(comments.len());
            for comment in &comments {
                let author = match comment.author_id {
                    Some(id) => session.tracker.find_user(id)?.username,
                    None => "-".to_string(),
                };
                rows.push(
                    TableRow::new(comment.id.to_string())
                        .cell("id", CellValue::Key(comment.id.to_string()))
                        .cell("author", CellValue::Text(author))
                        .cell(
                            "when",
                            CellValue::Text(format_datetime_local(&comment.created_at)),
                        )
                        .cell("text", CellValue::Text(truncate_str(&comment.content, 60))),
                );
            }
            TableFormatter::new(COMMENT_COLUMNS, "comment")
                .quiet(global.quiet)
                .output(rows, global.format);
        }
        CommentCommands::Edit(args) => {
            session.tracker.edit_comment(actor.id, args.id, &args.text)?;
            success(global.quiet, format!("Edited comment #{}", args.id));
        }
        CommentCommands::Delete(args) => {
            session.tracker.delete_comment(actor.id, args.id)?;
            success(global.quiet, format!("Deleted comment #{}", args.id));
        }
    }

    Ok(())
}
